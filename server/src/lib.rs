//! # Session Server Library
//!
//! This library provides the contestant-facing half of the millionaire game.
//! It accepts contestant connections, plays one game per connection, and
//! calls out to the lifeline server whenever a contestant asks for help.
//!
//! ## Core Responsibilities
//!
//! ### Game Authority
//! The server alone knows the correct answers. Contestants only ever see the
//! question text and the four options until an answer has been graded, and
//! prize values are decided here, never on the client.
//!
//! ### Session Lifecycle
//! Every accepted connection becomes a session that runs until the contestant
//! wins, answers wrongly, or goes away:
//! - A question is sent, followed by zero or more lifeline round trips
//! - Exactly one answer is graded per question
//! - A `game_over` message closes a finished game
//!
//! ### Lifeline Brokering
//! Lifelines are resolved by a separate process. The session server forwards
//! the current question to it over a single shared connection and relays the
//! result to the contestant.
//!
//! ## Architecture Design
//!
//! ### Task Per Connection
//! Each contestant is served by its own tokio task which exclusively owns the
//! game state. A slow or misbehaving contestant can only stall its own task.
//!
//! ### Serialized Lifeline Channel
//! The lifeline connection is guarded by an async mutex held across the whole
//! request and reply. Concurrent lifeline requests queue up rather than
//! interleaving, so every reply reaches the session that asked for it.
//!
//! ### Newline Delimited JSON
//! Both sockets carry one JSON object per line. See `shared::codec`.
//!
//! ## Module Organization
//!
//! - `config`: runtime settings and pacing delays
//! - `question_bank`: loading and validating the question file
//! - `session`: the I/O free game state machine
//! - `connection`: drives a session over a byte stream
//! - `lifeline_client`: the shared connection to the lifeline server
//! - `network`: the accept loop
//! - `counters` and `status`: aggregate session counts and their reporting
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::SessionServer;
//! use server::question_bank::load_questions;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let questions = load_questions(&config.questions_path)?;
//!
//!     let server = SessionServer::bind(&config, questions).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod counters;
pub mod lifeline_client;
pub mod network;
pub mod question_bank;
pub mod session;
pub mod status;

pub use lifeline_client::LifelineError;
pub use question_bank::QuestionBankError;
pub use session::SessionError;

//! # Lifeline Server Library
//!
//! Resolves the two lifelines a contestant may spend during a question. The
//! session server forwards the current question's correct label and options;
//! this crate answers with either a simulated audience vote or the option set
//! reduced to two entries.
//!
//! ## Module Organization
//!
//! ### Resolver Module (`resolver`)
//! Pure functions with no state between calls:
//! - Audience poll biased toward the correct option, normalized to exactly 100%
//! - 50:50 keeping the correct option and one random incorrect option
//! - Request dispatch turning invalid input into an error reply
//!
//! ### Server Module (`server`)
//! TCP listener speaking the newline-delimited JSON protocol from `shared`.
//! Each connection is served in its own task and answers its requests strictly
//! in order, one reply per request.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use lifeline::server::LifelineServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = LifelineServer::bind("127.0.0.1:4338", 1024).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod resolver;
pub mod server;

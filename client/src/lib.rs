//! # Contestant Client Library
//!
//! This library provides the terminal front end for the millionaire game. It
//! connects to the session server, shows each question, and turns what the
//! contestant types into commands.
//!
//! ## Design
//!
//! The client holds no game rules. Grading, prizes and lifeline bookkeeping
//! all happen on the server; the client only mirrors the list of lifelines the
//! server last offered so that it can refuse a spent one before sending it.
//!
//! All I/O goes through generic async readers and writers, so a whole game can
//! be driven from in-memory input in tests just as it is from stdin.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Parses typed lines into answers, lifeline requests and yes/no replies.
//!
//! ### Network Module (`network`)
//! Owns the connection and the game loop:
//! - Connects with a fresh socket per game
//! - Prompts again after lifeline results and errors
//! - Offers another game when one ends
//!
//! ### Rendering Module (`rendering`)
//! Formats server messages as plain text, including the audience poll chart.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Contestant;
//! use tokio::io::BufReader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut contestant = Contestant::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
//!     contestant.run("127.0.0.1:4337").await?;
//!     Ok(())
//! }
//! ```

pub mod input;
pub mod network;
pub mod rendering;

//! # Emailer Legend Pro
//!
//! Drafts replies to difficult messages using a named communication
//! strategy, delegating the writing to Gemini with a JSON response schema.
//!
//! ## Features
//!
//! - **Strategy Catalog**: Six persuasion tactics with fixed instructions
//! - **Single Response**: One reply plus a short analysis
//! - **Multiple Variations**: Three titled variations of a reply
//! - **Compare Strategies**: Three strategies side by side with a recommendation
//! - **History & Stats**: Saved replies and usage counters persisted in SQLite
//! - **Clipboard & Export**: Copy a reply or write it to a text file
//!
//! ## Architecture
//!
//! ```text
//! CLI / REPL → Session → Prompt Builder → Model Gateway → Gemini (HTTP)
//!                 ↓
//!           SQLite (key-value)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use emailer_legend::{Config, Session, Strategy};
//! use emailer_legend::gemini::GeminiClient;
//! use emailer_legend::storage::SqliteStorage;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let storage = SqliteStorage::new(&config.database).await?;
//!     let gemini = GeminiClient::new(&config.gemini, config.request.clone())?;
//!     let mut session = Session::hydrate(Arc::new(storage), Arc::new(gemini)).await?;
//!     session.set_message("Where is my refund?");
//!     session.set_context("Customer, second email this week. Calm them down.");
//!     session.select_strategy(Some(Strategy::DeescalateConflict));
//!     session.generate().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Command-line and interactive surfaces.
pub mod cli;
/// Configuration loaded from the environment.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// The model gateway seam and completion parsing.
pub mod gateway;
/// Gemini API client and wire types.
pub mod gemini;
/// Clipboard and file export.
pub mod output;
/// Prompt and response schema construction.
pub mod prompts;
/// Result types and the generation workflow.
pub mod replies;
/// Session state machine, history, stats and notices.
pub mod session;
/// Key-value persistence.
pub mod storage;
/// Strategy catalog and message templates.
pub mod strategy;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use replies::{GenerationMode, ReplyResult};
pub use session::Session;
pub use strategy::Strategy;

//! acbot - Telegram bot for the Aalto Cocktail association
//!
//! Walks applicants through the membership form, lets actives approve them,
//! and posts upcoming events scraped from the association's web shop.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, and export helpers
//! - `storage`: Row store contract, SQLite and in-memory stores, typed records
//! - `join`: The join conversation and the application registry
//! - `events`: Event scraping and the cached event list
//! - `messaging`: Transport-neutral outbound messages
//! - `telegram`: Telegram bot integration and handlers

pub mod cli;
pub mod core;
pub mod events;
pub mod join;
pub mod messaging;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use join::{JoinRegistry, Step};
pub use storage::{RowStore, SqliteRowStore};

//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the Telegram bot.
//! Handler logic works on plain [`Caller`] values so integration tests can
//! drive the same code as production.

pub mod commands;
pub mod membership;
mod schema;
mod types;

pub use schema::schema;
pub use types::{normalize_username, user_id, Caller, HandlerDeps, HandlerError};

//! Upcoming events scraped from the association's web shop.
//!
//! This module has zero teloxide dependency; the `/events` command reads the
//! cached list and formats it for Telegram.

pub mod cache;
pub mod scraper;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::error::AppResult;

pub use cache::{start_refresh_scheduler, EventCache};
pub use scraper::HolviScraper;

/// An event with tickets still on sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub title: String,
    pub location: String,
    pub time: String,
    pub description: String,
    pub image_url: Option<String>,
    /// Product page where tickets are sold
    pub url: String,
}

/// Produces the current list of events.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self) -> AppResult<Vec<Event>>;
}

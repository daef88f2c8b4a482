//! In-memory event list with periodic refresh.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

use crate::core::error::AppResult;
use crate::events::{Event, EventSource};

/// Latest successfully fetched event list.
///
/// A refresh swaps in a whole new list, so readers see either the old or the
/// new one and never a mix.
pub struct EventCache {
    source: Arc<dyn EventSource>,
    events: RwLock<Arc<Vec<Event>>>,
}

impl EventCache {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self {
            source,
            events: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Fetches the list again. On failure the cached list is kept.
    pub async fn refresh(&self) -> AppResult<usize> {
        let events = self.source.fetch_events().await?;
        let count = events.len();
        *self.events.write().await = Arc::new(events);
        Ok(count)
    }

    pub async fn events(&self) -> Arc<Vec<Event>> {
        self.events.read().await.clone()
    }
}

/// Refreshes `cache` right away and then every `period`.
pub fn start_refresh_scheduler(cache: Arc<EventCache>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        log::info!("Event refresh scheduler started (interval: {}s)", period.as_secs());

        loop {
            ticker.tick().await;

            match cache.refresh().await {
                Ok(count) => log::info!("Event list refreshed: {} event(s)", count),
                Err(e) => log::error!("Event refresh failed, keeping cached list: {}", e),
            }
        }
    })
}

//! Test fixtures: an in-memory environment wired like production

#![allow(dead_code)]

use std::sync::Arc;

use acbot::events::{Event, EventCache, EventSource};
use acbot::join::{Applicant, ApplicantProfile, Inbound, JoinRegistry};
use acbot::storage::records::{active_values, MemberRecord};
use acbot::storage::{MemoryRowStore, RowStore, Table};
use acbot::telegram::handlers::{Caller, HandlerDeps};
use acbot::AppResult;
use async_trait::async_trait;
use chrono::Utc;

use super::RecordingMessenger;

pub const COMMUNITY_LINK: &str = "https://t.me/+accommunity";
pub const ACTIVE_GROUP_ID: i64 = -1001234567890;
pub const OPERATOR_ID: i64 = 5001;

/// Event source returning a fixed list
pub struct StaticEvents(pub Vec<Event>);

#[async_trait]
impl EventSource for StaticEvents {
    async fn fetch_events(&self) -> AppResult<Vec<Event>> {
        Ok(self.0.clone())
    }
}

pub fn sample_event(title: &str, image_url: Option<&str>) -> Event {
    Event {
        title: title.to_string(),
        location: "Otaniemi".to_string(),
        time: "Friday 18:00".to_string(),
        description: format!("WHAT: {}", title),
        image_url: image_url.map(str::to_string),
        url: "https://holvi.com/shop/AaltoCocktail/product/abc/".to_string(),
    }
}

/// Everything a handler or registry test needs
pub struct TestEnvironment {
    pub store: Arc<MemoryRowStore>,
    pub messenger: Arc<RecordingMessenger>,
    pub registry: Arc<JoinRegistry>,
    pub events: Arc<EventCache>,
    pub deps: HandlerDeps,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self::with_events(Vec::new())
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        Self::with_store(Arc::new(MemoryRowStore::new()), events)
    }

    pub fn with_store(store: Arc<MemoryRowStore>, events: Vec<Event>) -> Self {
        let messenger = Arc::new(RecordingMessenger::new());
        let registry = Arc::new(JoinRegistry::new(store.clone(), messenger.clone(), COMMUNITY_LINK));
        let events = Arc::new(EventCache::new(Arc::new(StaticEvents(events))));
        let deps = HandlerDeps::new(
            registry.clone(),
            store.clone(),
            messenger.clone(),
            events.clone(),
            ACTIVE_GROUP_ID,
            COMMUNITY_LINK,
        );

        Self {
            store,
            messenger,
            registry,
            events,
            deps,
        }
    }

    pub async fn add_active(&self, id: i64, username: &str) {
        self.store.append(Table::Actives, active_values(id, username)).await.unwrap();
    }

    pub async fn add_member(&self, id: i64, username: &str) {
        let member = MemberRecord {
            id,
            joined_at: Utc::now(),
            username: username.to_string(),
            first_name: "Existing".to_string(),
            last_name: "Member".to_string(),
            email: "member@example.com".to_string(),
            city: "Espoo".to_string(),
            ayy_member: false,
            school: None,
        };
        self.store.append(Table::Members, member.to_values()).await.unwrap();
    }

    pub async fn rows(&self, table: Table) -> Vec<acbot::storage::Row> {
        self.store.rows(table).await.unwrap()
    }

    /// Sends `texts` through the registry as applicant `id`, creating the attempt on the first one
    pub async fn converse(&self, id: i64, username: &str, profile: &ApplicantProfile, texts: &[&str]) {
        for text in texts {
            let inbound = Inbound {
                chat_id: id,
                text,
                profile,
            };
            if !self.registry.handle_message(id, &inbound).await {
                let applicant = Applicant {
                    id,
                    username: username.to_string(),
                };
                self.registry.handle_join(applicant, &inbound).await;
            }
        }
    }
}

/// Private-chat caller with the given Telegram profile
pub fn private_caller(id: i64, username: Option<&str>, first_name: &str, last_name: Option<&str>) -> Caller {
    Caller {
        user_id: id,
        chat_id: id,
        is_private: true,
        username: username.map(str::to_string),
        profile: ApplicantProfile::new(Some(first_name), last_name),
    }
}

pub fn operator() -> Caller {
    private_caller(OPERATOR_ID, Some("boardmember"), "Board", Some("Member"))
}

/// Applicant answers that reach `done` without AYY membership
pub const NON_AYY_ANSWERS: [&str; 5] = ["/join", "Yes", "alex@x.io", "Helsinki", "No"];

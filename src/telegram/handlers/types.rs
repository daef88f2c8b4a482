//! Handler types, dependencies, and caller helpers

use std::sync::Arc;

use dashmap::DashSet;
use teloxide::types::{Message, User};

use crate::events::EventCache;
use crate::join::{ApplicantProfile, JoinRegistry};
use crate::messaging::Messenger;
use crate::storage::RowStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub registry: Arc<JoinRegistry>,
    pub store: Arc<dyn RowStore>,
    pub messenger: Arc<dyn Messenger>,
    pub events: Arc<EventCache>,
    /// Operators whose next private message names a username to confirm
    pub awaiting_confirm: Arc<DashSet<i64>>,
    pub active_group_id: i64,
    pub community_link: String,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(
        registry: Arc<JoinRegistry>,
        store: Arc<dyn RowStore>,
        messenger: Arc<dyn Messenger>,
        events: Arc<EventCache>,
        active_group_id: i64,
        community_link: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            store,
            messenger,
            events,
            awaiting_confirm: Arc::new(DashSet::new()),
            active_group_id,
            community_link: community_link.into(),
        }
    }
}

/// Telegram user id as the signed id used everywhere else.
pub fn user_id(user: &User) -> Option<i64> {
    i64::try_from(user.id.0).ok()
}

/// Who sent a message, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub chat_id: i64,
    pub is_private: bool,
    pub username: Option<String>,
    pub profile: ApplicantProfile,
}

impl Caller {
    /// Extract caller info from a Telegram message
    pub fn from_message(msg: &Message) -> Option<Self> {
        let user = msg.from.as_ref()?;
        Some(Self {
            user_id: user_id(user)?,
            chat_id: msg.chat.id.0,
            is_private: msg.chat.is_private(),
            username: user.username.clone(),
            profile: ApplicantProfile::new(Some(user.first_name.as_str()), user.last_name.as_deref()),
        })
    }

    /// First name, or last name when the first one is empty.
    pub fn display_name(&self) -> &str {
        self.profile
            .first_name
            .as_deref()
            .or(self.profile.last_name.as_deref())
            .unwrap_or_default()
    }
}

/// Trims a username argument and drops a leading `@`.
pub fn normalize_username(raw: &str) -> Option<String> {
    let username = raw.trim();
    let username = username.strip_prefix('@').unwrap_or(username).trim();
    (!username.is_empty()).then(|| username.to_string())
}

use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};

// Configuration constants for the bot

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Custom Bot API server URL (optional)
/// Read from BOT_API_URL environment variable
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok());

/// Database file path backing the row store
/// Read from DATABASE_PATH environment variable
/// Default: acbot.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "acbot.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: acbot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "acbot.log".to_string()));

/// Invite link to the community group, sent to approved members
/// Read from AC_COMMUNITY_GROUP environment variable
pub static COMMUNITY_GROUP_LINK: Lazy<Option<String>> =
    Lazy::new(|| env::var("AC_COMMUNITY_GROUP").ok().filter(|link| !link.trim().is_empty()));

/// Chat id of the actives group. Members of that group are operators.
/// Read from ACTIVE_GROUP_ID environment variable
pub static ACTIVE_GROUP_ID: Lazy<Option<i64>> =
    Lazy::new(|| env::var("ACTIVE_GROUP_ID").ok().and_then(|id| id.trim().parse().ok()));

/// Storefront page listing the events
/// Read from EVENTS_SHOP_URL environment variable
pub static EVENTS_SHOP_URL: Lazy<String> = Lazy::new(|| {
    env::var("EVENTS_SHOP_URL").unwrap_or_else(|_| events::DEFAULT_SHOP_URL.to_string())
});

/// Checks that every required variable is present.
///
/// All missing variables are reported at once so a fresh deployment can be
/// fixed in one go.
pub fn validate() -> AppResult<()> {
    let mut missing = Vec::new();
    if BOT_TOKEN.is_empty() {
        missing.push("BOT_TOKEN");
    }
    if COMMUNITY_GROUP_LINK.is_none() {
        missing.push("AC_COMMUNITY_GROUP");
    }
    if ACTIVE_GROUP_ID.is_none() {
        missing.push("ACTIVE_GROUP_ID");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "required environment variables are not set: {}",
            missing.join(", ")
        )))
    }
}

/// Event listing configuration
pub mod events {
    use super::Duration;

    pub const DEFAULT_SHOP_URL: &str = "https://holvi.com/shop/AaltoCocktail/";

    /// How often the event list is scraped again (24 hours)
    pub const REFRESH_INTERVAL_SECS: u64 = 86_400;

    /// Timeout for a single storefront request
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    pub fn refresh_interval() -> Duration {
        Duration::from_secs(REFRESH_INTERVAL_SECS)
    }

    pub fn request_timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Join flow answer tables
pub mod join {
    /// Cities offered as quick replies; anything else is asked as free text
    pub const CITIES: [&str; 3] = ["espoo", "helsinki", "vantaa"];

    /// Aalto school codes, matched case-insensitively and stored upper-cased
    pub const SCHOOLS: [&str; 6] = ["arts", "biz", "chem", "elec", "eng", "sci"];
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

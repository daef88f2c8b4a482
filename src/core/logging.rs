//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A configuration summary logged once at startup

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup.
///
/// Secrets are never printed; only whether they are set.
pub fn log_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if config::BOT_TOKEN.is_empty() {
        log::error!("❌ BOT_TOKEN: not set");
    } else {
        log::info!("✅ BOT_TOKEN: set");
    }

    match *config::ACTIVE_GROUP_ID {
        Some(id) => log::info!("✅ ACTIVE_GROUP_ID: {}", id),
        None => log::error!("❌ ACTIVE_GROUP_ID: not set or not a number (use /chatid in the group)"),
    }

    if config::COMMUNITY_GROUP_LINK.is_some() {
        log::info!("✅ AC_COMMUNITY_GROUP: set");
    } else {
        log::error!("❌ AC_COMMUNITY_GROUP: not set");
    }

    if let Some(ref url) = *config::BOT_API_URL {
        log::info!("BOT_API_URL: {}", url);
    }
    log::info!("DATABASE_PATH: {}", *config::DATABASE_PATH);
    log::info!("EVENTS_SHOP_URL: {}", *config::EVENTS_SHOP_URL);
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

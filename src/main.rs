use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use acbot::cli::{Cli, Commands};
use acbot::core::{config, export, init_logger, log_configuration};
use acbot::events::{start_refresh_scheduler, EventCache, EventSource, HolviScraper};
use acbot::join::JoinRegistry;
use acbot::messaging::Messenger;
use acbot::storage::{RowStore, SqliteRowStore};
use acbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, TelegramMessenger};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    // Log panics in handler tasks instead of losing them
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
        Some(Commands::RefreshEvents) => run_refresh_events().await,
        Some(Commands::ExportMembers { output }) => run_export_members(output).await,
    }
}

async fn run_bot() -> Result<()> {
    log_configuration();
    config::validate()?;

    let active_group_id = config::ACTIVE_GROUP_ID.ok_or_else(|| anyhow::anyhow!("ACTIVE_GROUP_ID is not set"))?;
    let community_link = config::COMMUNITY_GROUP_LINK
        .clone()
        .ok_or_else(|| anyhow::anyhow!("AC_COMMUNITY_GROUP is not set"))?;

    let store: Arc<dyn RowStore> = Arc::new(SqliteRowStore::open(&config::DATABASE_PATH)?);
    let bot = create_bot()?;
    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(bot.clone()));

    let registry = Arc::new(JoinRegistry::new(
        Arc::clone(&store),
        Arc::clone(&messenger),
        community_link.clone(),
    ));
    registry.rehydrate().await;

    let scraper = HolviScraper::new(&config::EVENTS_SHOP_URL)?;
    let events = Arc::new(EventCache::new(Arc::new(scraper)));
    let _refresh = start_refresh_scheduler(Arc::clone(&events), config::events::refresh_interval());

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let deps = HandlerDeps::new(registry, store, messenger, events, active_group_id, community_link);

    log::info!("Bot started");
    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Scrape events once and print them
async fn run_refresh_events() -> Result<()> {
    let scraper = HolviScraper::new(&config::EVENTS_SHOP_URL)?;
    let events = scraper.fetch_events().await?;
    log::info!("Scraped {} event(s)", events.len());
    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}

/// Export the member list as CSV
async fn run_export_members(output: Option<String>) -> Result<()> {
    let store = SqliteRowStore::open(&config::DATABASE_PATH)?;
    let csv = export::export_members(&store).await?;

    match output {
        Some(path) => {
            std::fs::write(&path, csv)?;
            log::info!("Members written to {}", path);
        }
        None => print!("{}", csv),
    }
    Ok(())
}

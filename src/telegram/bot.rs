//! Bot initialization
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command list shown in the Telegram UI

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "say hello and get started")]
    Start,
    #[command(description = "apply for membership")]
    Join,
    #[command(description = "show upcoming events")]
    Events,
    #[command(description = "confirm a membership application (actives only)")]
    Confirm(String),
    #[command(description = "preapprove a username (actives only)")]
    Preapprove(String),
    #[command(description = "check whether a username is a member (actives only)")]
    Check(String),
    #[command(description = "download the member list (actives only)")]
    Download,
    #[command(description = "delete a member (actives only)")]
    DeleteMember(String),
    #[command(description = "cancel the current operation")]
    Cancel,
    #[command(description = "show the id of this chat")]
    ChatId,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (invalid URL, HTTP client setup)
pub fn create_bot() -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(config::BOT_TOKEN.as_str(), client);

    // Local Bot API server, if configured
    let bot = match config::BOT_API_URL.as_deref() {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Public commands shown in the Telegram command menu.
///
/// Operator commands stay hidden; they still work when typed.
pub fn public_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "say hello and get started"),
        BotCommand::new("join", "apply for membership"),
        BotCommand::new("events", "show upcoming events"),
    ]
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(public_commands()).await?;
    Ok(())
}

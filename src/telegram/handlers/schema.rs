//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands;
use super::membership::{handle_member_left, handle_members_joined, GroupMember};
use super::types::{user_id, Caller, HandlerDeps, HandlerError};
use crate::core::error::AppResult;
use crate::telegram::bot::Command;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Commands come first, then the actives group membership mirror, then plain
/// private messages (join answers, confirm picks, the Yes/No after /start).
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_membership = deps.clone();
    let deps_messages = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(group_membership_handler(deps_membership))
        .branch(private_message_handler(deps_messages))
}

fn log_failure(what: &str, caller: &Caller, result: AppResult<()>) {
    if let Err(e) = result {
        log::error!("{} failed for user {}: {}", what, caller.user_id, e);
    }
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let Some(caller) = Caller::from_message(&msg) else {
                    return Ok(());
                };
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                let result = match &cmd {
                    Command::Start => commands::handle_start(&deps, &caller).await,
                    Command::Join => commands::handle_join(&deps, &caller, msg.text().unwrap_or_default()).await,
                    Command::Events => commands::handle_events(&deps, &caller).await,
                    Command::Confirm(args) => commands::handle_confirm(&deps, &caller, args).await,
                    Command::Preapprove(args) => commands::handle_preapprove(&deps, &caller, args).await,
                    Command::Check(args) => commands::handle_check(&deps, &caller, args).await,
                    Command::Download => commands::handle_download(&deps, &caller).await,
                    Command::DeleteMember(args) => commands::handle_delete_member(&deps, &caller, args).await,
                    Command::Cancel => commands::handle_cancel(&deps, &caller).await,
                    Command::ChatId => commands::handle_chat_id(&deps, &caller).await,
                };
                log_failure(&format!("{:?}", cmd), &caller, result);
                Ok(())
            }
        },
    ))
}

/// Joins and leaves in the actives group
fn group_membership_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let active_group_id = deps.active_group_id;

    Update::filter_message()
        .filter(move |msg: Message| msg.chat.id.0 == active_group_id)
        .endpoint(move |msg: Message| {
            let deps = deps.clone();
            async move {
                if let Some(users) = msg.new_chat_members() {
                    let members: Vec<GroupMember> = users
                        .iter()
                        .filter_map(|user| {
                            Some(GroupMember {
                                id: user_id(user)?,
                                username: user.username.clone(),
                            })
                        })
                        .collect();
                    if let Err(e) = handle_members_joined(&deps, &members).await {
                        log::error!("Failed to mirror new actives: {}", e);
                    }
                }

                if let Some(user) = msg.left_chat_member() {
                    if let Some(id) = user_id(user) {
                        let member = GroupMember {
                            id,
                            username: user.username.clone(),
                        };
                        if let Err(e) = handle_member_left(&deps, &member).await {
                            log::error!("Failed to remove active {}: {}", id, e);
                        }
                    }
                }
                Ok(())
            }
        })
}

/// Plain text in private chats
fn private_message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private() && msg.text().is_some())
        .endpoint(move |msg: Message| {
            let deps = deps.clone();
            async move {
                let (Some(caller), Some(text)) = (Caller::from_message(&msg), msg.text()) else {
                    return Ok(());
                };
                let result = commands::handle_private_text(&deps, &caller, text).await;
                log_failure("Private message", &caller, result);
                Ok(())
            }
        })
}

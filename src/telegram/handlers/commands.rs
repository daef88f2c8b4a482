//! Command and private-message handlers.
//!
//! Handlers take a [`Caller`] instead of a Telegram message and reply through
//! the [`Messenger`](crate::messaging::Messenger) in [`HandlerDeps`], so the
//! same code runs under the dispatcher and in tests.

use teloxide::utils::html;

use super::types::{normalize_username, Caller, HandlerDeps};
use crate::core::error::AppResult;
use crate::core::export::{self, MEMBERS_FILE_NAME};
use crate::events::Event;
use crate::join::{prompts, Applicant, Inbound};
use crate::messaging::{Keyboard, OutgoingText};
use crate::storage::records::{find_active, find_member};

/// Buttons per row in the `/confirm` picker
const CONFIRM_PICKER_COLUMNS: usize = 3;

async fn reply(deps: &HandlerDeps, caller: &Caller, message: OutgoingText) -> AppResult<()> {
    deps.messenger.send_text(caller.chat_id, message).await
}

async fn is_member(deps: &HandlerDeps, username: &str) -> AppResult<bool> {
    Ok(find_member(deps.store.as_ref(), username).await?.is_some())
}

/// Operator commands only work in a private chat with someone in the actives group.
pub async fn is_operator(deps: &HandlerDeps, caller: &Caller) -> bool {
    if !caller.is_private {
        return false;
    }
    match find_active(deps.store.as_ref(), caller.user_id).await {
        Ok(active) => active.is_some(),
        Err(e) => {
            log::error!("Failed to look up active {}: {}", caller.user_id, e);
            false
        }
    }
}

fn already_member_greeting(community_link: &str) -> String {
    format!(
        "You can use the /events command to see upcoming events or you can join the AC Community group here: {}",
        community_link
    )
}

/// Handle /start
pub async fn handle_start(deps: &HandlerDeps, caller: &Caller) -> AppResult<()> {
    let Some(username) = caller.username.as_deref().filter(|_| caller.is_private) else {
        return Ok(());
    };

    let message = if is_member(deps, username).await? {
        OutgoingText::plain(format!(
            "Hello {}! I see you are already a member! {}",
            caller.display_name(),
            already_member_greeting(&deps.community_link)
        ))
    } else {
        OutgoingText::plain(format!(
            "Hello {}! Do you want to become an Aalto Cocktail member?",
            caller.display_name()
        ))
        .with_keyboard(Keyboard::yes_no())
    };
    reply(deps, caller, message).await
}

/// Handle /join
pub async fn handle_join(deps: &HandlerDeps, caller: &Caller, text: &str) -> AppResult<()> {
    if !caller.is_private || caller.chat_id == deps.active_group_id {
        return Ok(());
    }
    start_join(deps, caller, text).await
}

/// Starts or continues the join flow for a non-member.
async fn start_join(deps: &HandlerDeps, caller: &Caller, text: &str) -> AppResult<()> {
    let Some(username) = caller.username.as_deref() else {
        return reply(
            deps,
            caller,
            OutgoingText::plain("Please set a Telegram username in your settings first, then try /join again.")
                .with_keyboard(Keyboard::Remove),
        )
        .await;
    };

    if is_member(deps, username).await? {
        let message = OutgoingText::plain(format!(
            "You are already a member! {}",
            already_member_greeting(&deps.community_link)
        ))
        .with_keyboard(Keyboard::Remove);
        return reply(deps, caller, message).await;
    }

    let applicant = Applicant {
        id: caller.user_id,
        username: username.to_string(),
    };
    let inbound = Inbound {
        chat_id: caller.chat_id,
        text,
        profile: &caller.profile,
    };
    deps.registry.handle_join(applicant, &inbound).await;
    Ok(())
}

/// Handle /confirm. Without a username, offers the applicants waiting for approval.
pub async fn handle_confirm(deps: &HandlerDeps, caller: &Caller, args: &str) -> AppResult<()> {
    if !is_operator(deps, caller).await {
        return Ok(());
    }
    if !args.trim().is_empty() {
        return confirm_username(deps, caller, args).await;
    }

    let pending = deps.registry.pending_usernames().await;
    if pending.is_empty() {
        return reply(
            deps,
            caller,
            OutgoingText::plain("No one to confirm!").with_keyboard(Keyboard::Remove),
        )
        .await;
    }

    let mut rows: Vec<Vec<String>> = pending
        .chunks(CONFIRM_PICKER_COLUMNS)
        .map(|chunk| chunk.iter().map(|username| format!("@{}", username)).collect())
        .collect();
    rows.push(vec!["/cancel".to_string()]);

    deps.awaiting_confirm.insert(caller.user_id);
    reply(
        deps,
        caller,
        OutgoingText::plain("Who do you want to confirm?").with_keyboard(Keyboard::Options(rows)),
    )
    .await
}

async fn confirm_username(deps: &HandlerDeps, caller: &Caller, raw: &str) -> AppResult<()> {
    let Some(username) = normalize_username(raw) else {
        return Ok(());
    };

    if is_member(deps, &username).await? {
        return reply(deps, caller, prompts::already_member(&username)).await;
    }

    let outcome = deps.registry.confirm(caller.chat_id, &username).await?;
    log::info!("Confirm of @{} by {}: {:?}", username, caller.user_id, outcome);
    Ok(())
}

/// Handle /preapprove
pub async fn handle_preapprove(deps: &HandlerDeps, caller: &Caller, args: &str) -> AppResult<()> {
    if !is_operator(deps, caller).await {
        return Ok(());
    }
    let Some(username) = normalize_username(args) else {
        return reply(deps, caller, OutgoingText::plain("Usage: /preapprove <username>")).await;
    };

    if is_member(deps, &username).await? {
        return reply(deps, caller, prompts::already_member(&username)).await;
    }
    deps.registry.preapprove(caller.chat_id, &username).await?;
    Ok(())
}

/// Handle /check
pub async fn handle_check(deps: &HandlerDeps, caller: &Caller, args: &str) -> AppResult<()> {
    let Some(username) = normalize_username(args) else {
        return Ok(());
    };
    if !is_operator(deps, caller).await {
        return Ok(());
    }

    let text = if is_member(deps, &username).await? {
        format!("@{} is a member.", username)
    } else {
        format!("@{} is not a member!", username)
    };
    reply(deps, caller, OutgoingText::plain(text)).await
}

/// Handle /download: sends the member list as CSV.
pub async fn handle_download(deps: &HandlerDeps, caller: &Caller) -> AppResult<()> {
    if !is_operator(deps, caller).await {
        return Ok(());
    }

    let csv = export::export_members(deps.store.as_ref()).await?;
    deps.messenger
        .send_document(caller.chat_id, MEMBERS_FILE_NAME, csv.into_bytes())
        .await
}

/// Handle /deletemember
pub async fn handle_delete_member(deps: &HandlerDeps, caller: &Caller, args: &str) -> AppResult<()> {
    if !is_operator(deps, caller).await {
        return Ok(());
    }
    let Some(username) = normalize_username(args) else {
        return Ok(());
    };

    match find_member(deps.store.as_ref(), &username).await? {
        Some(row) => {
            deps.store.delete(row.handle()).await?;
            log::info!("Member @{} deleted by {}", username, caller.user_id);
            reply(deps, caller, OutgoingText::plain(format!("Deleted @{}!", username))).await
        }
        None => reply(deps, caller, OutgoingText::plain(format!("@{} is not a member!", username))).await,
    }
}

/// Handle /cancel
pub async fn handle_cancel(deps: &HandlerDeps, caller: &Caller) -> AppResult<()> {
    if !caller.is_private || deps.awaiting_confirm.remove(&caller.user_id).is_none() {
        return Ok(());
    }
    reply(
        deps,
        caller,
        OutgoingText::plain("Cancelled!").with_keyboard(Keyboard::Remove),
    )
    .await
}

/// Handle /chatid
pub async fn handle_chat_id(deps: &HandlerDeps, caller: &Caller) -> AppResult<()> {
    reply(deps, caller, OutgoingText::plain(format!("Chat ID: {}", caller.chat_id))).await
}

/// HTML caption used for an event post.
pub fn event_caption(event: &Event) -> String {
    format!(
        "<b>{}</b>\nOn {} at {}\n\n<a href=\"{}\">Get tickets here »</a>",
        html::escape(&event.title),
        html::escape(&event.time),
        html::escape(&event.location),
        html::escape(&event.url)
    )
}

/// Handle /events
pub async fn handle_events(deps: &HandlerDeps, caller: &Caller) -> AppResult<()> {
    let events = deps.events.events().await;
    if events.is_empty() {
        return reply(
            deps,
            caller,
            OutgoingText::plain("No upcoming events with tickets available!"),
        )
        .await;
    }

    for event in events.iter() {
        let caption = OutgoingText::html(event_caption(event));
        let sent = match &event.image_url {
            Some(image_url) => deps.messenger.send_photo(caller.chat_id, image_url, caption).await,
            None => deps.messenger.send_text(caller.chat_id, caption).await,
        };
        if let Err(e) = sent {
            log::warn!("Failed to send event {:?} to {}: {}", event.title, caller.chat_id, e);
        }
    }
    Ok(())
}

/// Handles a private text message that is not a command.
pub async fn handle_private_text(deps: &HandlerDeps, caller: &Caller, text: &str) -> AppResult<()> {
    if deps.awaiting_confirm.contains(&caller.user_id) {
        return confirm_username(deps, caller, text).await;
    }

    let inbound = Inbound {
        chat_id: caller.chat_id,
        text,
        profile: &caller.profile,
    };
    if deps.registry.handle_message(caller.user_id, &inbound).await {
        return Ok(());
    }

    if is_member(deps, caller.username.as_deref().unwrap_or_default()).await? {
        return Ok(());
    }
    match text {
        "Yes" => start_join(deps, caller, text).await,
        "No" => {
            reply(
                deps,
                caller,
                OutgoingText::plain("No worries, you can always join later by typing /join!")
                    .with_keyboard(Keyboard::Remove),
            )
            .await
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_caption_escapes_fields() {
        let event = Event {
            title: "Gin & Tonic night".to_string(),
            location: "<Dipoli>".to_string(),
            time: "Friday".to_string(),
            description: String::new(),
            image_url: None,
            url: "https://holvi.com/p/a?b=1&c=2".to_string(),
        };

        assert_eq!(
            event_caption(&event),
            "<b>Gin &amp; Tonic night</b>\nOn Friday at &lt;Dipoli&gt;\n\n\
             <a href=\"https://holvi.com/p/a?b=1&amp;c=2\">Get tickets here »</a>"
        );
    }
}

//! Mirrors the actives group membership into the `Actives` table.

use super::types::HandlerDeps;
use crate::core::error::AppResult;
use crate::storage::records::{active_values, find_active};
use crate::storage::Table;

/// A user who joined or left the actives group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub id: i64,
    pub username: Option<String>,
}

/// Adds new group members that have a username and are not mirrored yet.
pub async fn handle_members_joined(deps: &HandlerDeps, members: &[GroupMember]) -> AppResult<usize> {
    let store = deps.store.as_ref();
    let mut added = 0;

    for member in members {
        let Some(username) = member.username.as_deref() else {
            log::debug!("Skipping active {} without a username", member.id);
            continue;
        };
        if find_active(store, member.id).await?.is_some() {
            continue;
        }
        store.append(Table::Actives, active_values(member.id, username)).await?;
        log::info!("Added @{} ({}) to actives", username, member.id);
        added += 1;
    }

    Ok(added)
}

/// Removes a user who left the group from the mirror. Returns whether a row was removed.
pub async fn handle_member_left(deps: &HandlerDeps, member: &GroupMember) -> AppResult<bool> {
    if member.username.is_none() {
        return Ok(false);
    }

    let store = deps.store.as_ref();
    match find_active(store, member.id).await? {
        Some(row) => {
            store.delete(row.handle()).await?;
            log::info!("Removed {} from actives", member.id);
            Ok(true)
        }
        None => Ok(false),
    }
}

//! Tracks every in-flight application and owns the approve/confirm workflow.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::core::error::AppResult;
use crate::join::attempt::{Applicant, Effect, Inbound, JoinAttempt};
use crate::join::prompts;
use crate::join::step::Step;
use crate::messaging::{Messenger, OutgoingText};
use crate::storage::records::{self, columns, PartialProgressRecord};
use crate::storage::rows::{delete_matching, find_row, Row, RowStore, Table};

/// Result of an operator confirm or pre-approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The application was committed to the members table.
    Member,
    /// The username was newly pre-approved.
    Preapproved,
    /// The username already had a pre-approval.
    AlreadyPreapproved,
    /// The username already has a member row.
    AlreadyMember,
}

struct AttemptSlot {
    username: String,
    attempt: Arc<Mutex<JoinAttempt>>,
}

/// Registry of join attempts keyed by Telegram user id.
///
/// Each attempt sits behind its own mutex, so messages for one applicant are
/// handled one at a time while different applicants proceed in parallel.
/// Map guards are never held across an `.await`.
pub struct JoinRegistry {
    store: Arc<dyn RowStore>,
    messenger: Arc<dyn Messenger>,
    community_link: String,
    attempts: DashMap<i64, AttemptSlot>,
    /// Applicant username → chat of the operator who pre-approved it.
    preapproval_contexts: DashMap<String, i64>,
}

impl JoinRegistry {
    pub fn new(store: Arc<dyn RowStore>, messenger: Arc<dyn Messenger>, community_link: impl Into<String>) -> Self {
        Self {
            store,
            messenger,
            community_link: community_link.into(),
            attempts: DashMap::new(),
            preapproval_contexts: DashMap::new(),
        }
    }

    /// Restores one idle attempt per partial-progress row.
    ///
    /// Store errors are logged and leave the registry empty. Attempts that
    /// already exist are kept; for duplicate rows the newest one wins.
    pub async fn rehydrate(&self) -> usize {
        let rows = match self.store.rows(Table::PartialProgress).await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("Failed to load partial progress: {}", e);
                return 0;
            }
        };

        let mut restored = 0;
        for row in rows.iter().rev() {
            let Some(record) = PartialProgressRecord::from_row(row) else {
                log::warn!("Skipping partial progress row without id or username: {:?}", row.handle());
                continue;
            };
            if self.attempts.contains_key(&record.id) {
                continue;
            }
            self.attempts.insert(
                record.id,
                AttemptSlot {
                    username: record.username.clone(),
                    attempt: Arc::new(Mutex::new(JoinAttempt::from_progress(record))),
                },
            );
            restored += 1;
        }

        log::info!("Rehydrated {} join attempt(s)", restored);
        restored
    }

    /// Forwards `inbound` to the applicant's attempt, creating it first if needed.
    pub async fn handle_join(&self, applicant: Applicant, inbound: &Inbound<'_>) {
        let attempt = self
            .attempts
            .entry(applicant.id)
            .or_insert_with(|| {
                log::info!("Starting join attempt for {} (@{})", applicant.id, applicant.username);
                AttemptSlot {
                    username: applicant.username.clone(),
                    attempt: Arc::new(Mutex::new(JoinAttempt::new(applicant.clone()))),
                }
            })
            .attempt
            .clone();

        self.drive(attempt, inbound).await;
    }

    /// Forwards `inbound` only when the user already has an attempt.
    /// Returns whether the message was consumed.
    pub async fn handle_message(&self, id: i64, inbound: &Inbound<'_>) -> bool {
        let Some(attempt) = self.attempts.get(&id).map(|slot| slot.attempt.clone()) else {
            return false;
        };
        self.drive(attempt, inbound).await
    }

    pub fn has_attempt(&self, id: i64) -> bool {
        self.attempts.contains_key(&id)
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    /// Usernames of applicants waiting for approval, sorted.
    pub async fn pending_usernames(&self) -> Vec<String> {
        let attempts: Vec<_> = self.attempts.iter().map(|slot| slot.attempt.clone()).collect();

        let mut usernames = Vec::new();
        for attempt in attempts {
            let attempt = attempt.lock().await;
            if attempt.step() == Step::Done && !attempt.is_retired() {
                usernames.push(attempt.username().to_string());
            }
        }
        usernames.sort();
        usernames
    }

    pub async fn find_preapproved(&self, username: &str) -> AppResult<Option<Row>> {
        find_row(self.store.as_ref(), Table::PreApprovals, columns::USERNAME, username).await
    }

    pub async fn find_partial_progress(&self, id: i64) -> AppResult<Option<Row>> {
        find_row(self.store.as_ref(), Table::PartialProgress, columns::ID, &id.to_string()).await
    }

    /// Pre-approves `username` and reports the result to the operator.
    pub async fn preapprove(&self, operator_chat: i64, username: &str) -> AppResult<ApprovalOutcome> {
        self.record_preapproval(Some(operator_chat), username).await
    }

    /// Commits the application of `username` if it is complete, otherwise
    /// pre-approves the username. A username that already has a member row
    /// is left alone.
    pub async fn confirm(&self, operator_chat: i64, username: &str) -> AppResult<ApprovalOutcome> {
        let attempt = self
            .attempts
            .iter()
            .find(|slot| slot.username == username)
            .map(|slot| slot.attempt.clone());

        match attempt {
            Some(attempt) => {
                let mut attempt = attempt.lock().await;
                if attempt.is_retired() {
                    self.send(operator_chat, prompts::already_member(username)).await;
                    return Ok(ApprovalOutcome::AlreadyMember);
                }
                self.confirm_attempt(Some(operator_chat), &mut attempt).await
            }
            None => {
                if records::find_member(self.store.as_ref(), username).await?.is_some() {
                    self.send(operator_chat, prompts::already_member(username)).await;
                    return Ok(ApprovalOutcome::AlreadyMember);
                }
                self.record_preapproval(Some(operator_chat), username).await
            }
        }
    }

    /// Number of remembered pre-approving operators.
    pub fn preapproval_context_count(&self) -> usize {
        self.preapproval_contexts.len()
    }

    async fn drive(&self, attempt: Arc<Mutex<JoinAttempt>>, inbound: &Inbound<'_>) -> bool {
        let mut attempt = attempt.lock().await;
        if attempt.is_retired() {
            log::debug!("Dropping message for committed attempt {}", attempt.id());
            return false;
        }

        for effect in attempt.advance(inbound) {
            match effect {
                Effect::Reply(message) => self.send(inbound.chat_id, message).await,
                Effect::PersistProgress => self.save_progress(&attempt).await,
                Effect::Finish => self.finish(&mut attempt, inbound.chat_id).await,
            }
        }
        true
    }

    async fn finish(&self, attempt: &mut JoinAttempt, chat_id: i64) {
        match self.find_preapproved(attempt.username()).await {
            Ok(Some(_)) if attempt.member_record(Utc::now()).is_none() => {
                log::info!(
                    "@{} is preapproved but the application is incomplete, waiting",
                    attempt.username()
                );
                self.send(chat_id, prompts::pending_approval()).await;
            }
            Ok(Some(_)) => {
                let operator_chat = self.preapproval_contexts.get(attempt.username()).map(|chat| *chat);
                if operator_chat.is_none() {
                    log::info!("@{} is preapproved but the approving operator is unknown", attempt.username());
                }
                if let Err(e) = self.confirm_attempt(operator_chat, attempt).await {
                    log::error!("Failed to confirm preapproved @{}: {}", attempt.username(), e);
                }
            }
            Ok(None) => self.send(chat_id, prompts::pending_approval()).await,
            Err(e) => {
                log::error!("Failed to look up preapproval for @{}: {}", attempt.username(), e);
                self.send(chat_id, prompts::pending_approval()).await;
            }
        }
    }

    async fn confirm_attempt(&self, operator_chat: Option<i64>, attempt: &mut JoinAttempt) -> AppResult<ApprovalOutcome> {
        let Some(member) = attempt.member_record(Utc::now()) else {
            log::info!("Application of @{} is incomplete, preapproving instead", attempt.username());
            return self.record_preapproval(operator_chat, attempt.username()).await;
        };

        let outcome = if records::find_member(self.store.as_ref(), &member.username).await?.is_some() {
            log::warn!("@{} already has a member row, dropping the application", member.username);
            ApprovalOutcome::AlreadyMember
        } else {
            self.store.append(Table::Members, member.to_values()).await?;
            log::info!("@{} ({}) is now a member", member.username, member.id);
            ApprovalOutcome::Member
        };

        match attempt.approval_chat() {
            Some(chat_id) => self.send(chat_id, prompts::approved(&self.community_link)).await,
            None => log::warn!("No chat recorded to notify @{} of approval", member.username),
        }
        self.retire_attempt(attempt).await;

        if let Some(chat_id) = operator_chat {
            let message = match outcome {
                ApprovalOutcome::Member => prompts::now_member(&member.username),
                _ => prompts::already_member(&member.username),
            };
            self.send(chat_id, message).await;
        }
        Ok(outcome)
    }

    /// Drops a committed attempt and the rows that belonged to its application.
    async fn retire_attempt(&self, attempt: &mut JoinAttempt) {
        attempt.retire();
        self.attempts.remove(&attempt.id());
        self.preapproval_contexts.remove(attempt.username());

        let store = self.store.as_ref();
        let username = attempt.username();
        if let Err(e) = delete_matching(store, Table::PreApprovals, columns::USERNAME, username).await {
            log::error!("Failed to delete preapproval of @{}: {}", username, e);
        }
        let id = attempt.id().to_string();
        if let Err(e) = delete_matching(store, Table::PartialProgress, columns::ID, &id).await {
            log::error!("Failed to delete partial progress of {}: {}", id, e);
        }
    }

    /// Records a pre-approval. Operator contexts whose pre-approval row is
    /// gone are forgotten here, so the map never outgrows the table.
    async fn record_preapproval(&self, operator_chat: Option<i64>, username: &str) -> AppResult<ApprovalOutcome> {
        let rows = self.store.rows(Table::PreApprovals).await?;
        let listed = |name: &str| rows.iter().any(|row| row.get(columns::USERNAME) == Some(name));
        self.preapproval_contexts.retain(|pending, _| listed(pending));

        let outcome = if listed(username) {
            ApprovalOutcome::AlreadyPreapproved
        } else {
            self.store
                .append(Table::PreApprovals, records::preapproval_values(username))
                .await?;
            if let Some(chat_id) = operator_chat {
                self.preapproval_contexts.insert(username.to_string(), chat_id);
            }
            log::info!("@{} is now preapproved", username);
            ApprovalOutcome::Preapproved
        };

        if let Some(chat_id) = operator_chat {
            let message = match outcome {
                ApprovalOutcome::AlreadyPreapproved => prompts::already_preapproved(username),
                _ => prompts::now_preapproved(username),
            };
            self.send(chat_id, message).await;
        }
        Ok(outcome)
    }

    async fn save_progress(&self, attempt: &JoinAttempt) {
        let key = attempt.id().to_string();
        let values = attempt.snapshot().to_values();
        if let Err(e) = self
            .store
            .replace(Table::PartialProgress, columns::ID, &key, values)
            .await
        {
            log::error!("Failed to save partial progress of {}: {}", attempt.id(), e);
        }
    }

    async fn send(&self, chat_id: i64, message: OutgoingText) {
        if let Err(e) = self.messenger.send_text(chat_id, message).await {
            log::error!("Failed to send message to {}: {}", chat_id, e);
        }
    }
}

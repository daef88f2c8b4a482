//! Row store contract.
//!
//! Persistence is tabular: each [`Table`] is an ordered sequence of
//! string-keyed rows. Stores give no transactional guarantees across calls;
//! every call is a full round trip.

use std::collections::BTreeMap;

use async_trait::async_trait;
use strum::{AsRefStr, Display, EnumString};

use crate::core::error::AppResult;

/// The four tables the bot works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum Table {
    /// Committed members
    Members,
    /// Mirror of the actives group membership (operators)
    Actives,
    /// Snapshots of unfinished join applications
    PartialProgress,
    /// Usernames cleared by an operator before they finished applying
    PreApprovals,
}

/// Column name → cell value. Cells are always strings.
pub type RowValues = BTreeMap<String, String>;

/// Identifies a stored row so it can be deleted later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowHandle {
    pub table: Table,
    pub id: i64,
}

/// A row read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    handle: RowHandle,
    values: RowValues,
}

impl Row {
    pub fn new(handle: RowHandle, values: RowValues) -> Self {
        Self { handle, values }
    }

    pub fn handle(&self) -> RowHandle {
        self.handle
    }

    pub fn values(&self) -> &RowValues {
        &self.values
    }

    /// Returns the cell for `column`, treating empty cells as absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Tabular persistence used by the join flow and the bot commands.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Reads every row of `table` in insertion order.
    async fn rows(&self, table: Table) -> AppResult<Vec<Row>>;

    /// Appends a row and returns it with its handle.
    async fn append(&self, table: Table, values: RowValues) -> AppResult<Row>;

    /// Deletes a previously read row.
    async fn delete(&self, handle: RowHandle) -> AppResult<()>;

    /// Replaces every row whose `column` equals `key` with one row holding `values`.
    ///
    /// The default is delete-then-append: a reader running between the two
    /// steps sees no row for `key`, and a failed append leaves none behind.
    /// Stores that can do better override it.
    async fn replace(&self, table: Table, column: &str, key: &str, values: RowValues) -> AppResult<Row> {
        for row in self.rows(table).await? {
            if row.get(column) == Some(key) {
                self.delete(row.handle()).await?;
            }
        }
        self.append(table, values).await
    }
}

/// Finds the first row of `table` whose `column` equals `value`.
pub async fn find_row(store: &dyn RowStore, table: Table, column: &str, value: &str) -> AppResult<Option<Row>> {
    let rows = store.rows(table).await?;
    Ok(rows.into_iter().find(|row| row.get(column) == Some(value)))
}

/// Deletes every row of `table` whose `column` equals `value`, returning how many went.
pub async fn delete_matching(store: &dyn RowStore, table: Table, column: &str, value: &str) -> AppResult<usize> {
    let mut deleted = 0;
    for row in store.rows(table).await? {
        if row.get(column) == Some(value) {
            store.delete(row.handle()).await?;
            deleted += 1;
        }
    }
    Ok(deleted)
}

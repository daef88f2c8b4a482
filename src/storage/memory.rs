//! In-process row store.
//!
//! Backs the unit and integration tests. It can be switched into a failing
//! mode to exercise the error paths of its callers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::error::{AppError, AppResult};
use crate::storage::rows::{Row, RowHandle, RowStore, RowValues, Table};

#[derive(Default)]
struct Tables {
    next_id: i64,
    rows: HashMap<Table, Vec<Row>>,
}

/// Row store kept entirely in memory.
#[derive(Default)]
pub struct MemoryRowStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
    appends: AtomicUsize,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Total number of successful appends, `replace` included.
    pub fn append_count(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AppError::RowStore("memory store is in failing mode".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn rows(&self, table: Table) -> AppResult<Vec<Row>> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables.rows.get(&table).cloned().unwrap_or_default())
    }

    async fn append(&self, table: Table, values: RowValues) -> AppResult<Row> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        tables.next_id += 1;
        let row = Row::new(
            RowHandle {
                table,
                id: tables.next_id,
            },
            values,
        );
        tables.rows.entry(table).or_default().push(row.clone());
        self.appends.fetch_add(1, Ordering::SeqCst);
        Ok(row)
    }

    async fn delete(&self, handle: RowHandle) -> AppResult<()> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        let rows = tables.rows.entry(handle.table).or_default();
        let before = rows.len();
        rows.retain(|row| row.handle() != handle);
        if rows.len() == before {
            return Err(AppError::RowStore(format!(
                "row {} not found in {}",
                handle.id, handle.table
            )));
        }
        Ok(())
    }
}

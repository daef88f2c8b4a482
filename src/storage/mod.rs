//! Tabular persistence: the row store contract, its backends, and typed records

pub mod memory;
pub mod records;
pub mod rows;
pub mod sqlite;

// Re-exports for convenience
pub use memory::MemoryRowStore;
pub use rows::{Row, RowHandle, RowStore, RowValues, Table};
pub use sqlite::SqliteRowStore;

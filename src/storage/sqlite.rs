//! SQLite-backed row store.
//!
//! Every table lives in one `sheet_rows` table; a row's cells are kept as a
//! JSON object so tables can grow columns without migrations.

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection};

use crate::core::error::{AppError, AppResult};
use crate::storage::rows::{Row, RowHandle, RowStore, RowValues, Table};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sheet_rows (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    sheet TEXT NOT NULL,
    data  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sheet_rows_sheet ON sheet_rows(sheet);
";

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 4 connections and creates the schema.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder().max_size(4).build(manager)?;

    let conn = pool.get()?;
    migrate_schema(&conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> AppResult<DbConnection> {
    Ok(pool.get()?)
}

fn migrate_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Row store persisting into a local SQLite file.
pub struct SqliteRowStore {
    pool: DbPool,
}

impl SqliteRowStore {
    pub fn open(database_path: &str) -> AppResult<Self> {
        let pool = create_pool(database_path)?;
        log::info!("Row store opened at {}", database_path);
        Ok(Self { pool })
    }

    fn read_rows(conn: &Connection, table: Table) -> AppResult<Vec<Row>> {
        let mut stmt = conn.prepare("SELECT id, data FROM sheet_rows WHERE sheet = ?1 ORDER BY id")?;
        let raw = stmt
            .query_map(params![table.as_ref()], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(id, data)| {
                let values: RowValues = serde_json::from_str(&data)?;
                Ok(Row::new(RowHandle { table, id }, values))
            })
            .collect()
    }

    fn insert_row(conn: &Connection, table: Table, values: RowValues) -> AppResult<Row> {
        let data = serde_json::to_string(&values)?;
        conn.execute(
            "INSERT INTO sheet_rows (sheet, data) VALUES (?1, ?2)",
            params![table.as_ref(), data],
        )?;
        let id = conn.last_insert_rowid();
        Ok(Row::new(RowHandle { table, id }, values))
    }
}

#[async_trait]
impl RowStore for SqliteRowStore {
    async fn rows(&self, table: Table) -> AppResult<Vec<Row>> {
        let conn = get_connection(&self.pool)?;
        Self::read_rows(&conn, table)
    }

    async fn append(&self, table: Table, values: RowValues) -> AppResult<Row> {
        let conn = get_connection(&self.pool)?;
        Self::insert_row(&conn, table, values)
    }

    async fn delete(&self, handle: RowHandle) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        let affected = conn.execute(
            "DELETE FROM sheet_rows WHERE id = ?1 AND sheet = ?2",
            params![handle.id, handle.table.as_ref()],
        )?;
        if affected == 0 {
            return Err(AppError::RowStore(format!(
                "row {} not found in {}",
                handle.id, handle.table
            )));
        }
        Ok(())
    }

    /// Runs the delete and the insert in one transaction, so readers never
    /// observe a missing or duplicated row for `key`.
    async fn replace(&self, table: Table, column: &str, key: &str, values: RowValues) -> AppResult<Row> {
        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;

        for row in Self::read_rows(&tx, table)? {
            if row.get(column) == Some(key) {
                tx.execute("DELETE FROM sheet_rows WHERE id = ?1", params![row.handle().id])?;
            }
        }
        let row = Self::insert_row(&tx, table, values)?;

        tx.commit()?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn values(pairs: &[(&str, &str)]) -> RowValues {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn temp_store() -> (NamedTempFile, SqliteRowStore) {
        let file = NamedTempFile::new().unwrap();
        let store = SqliteRowStore::open(file.path().to_str().unwrap()).unwrap();
        (file, store)
    }

    #[tokio::test]
    async fn test_append_and_read_in_order() {
        let (_file, store) = temp_store();

        store.append(Table::Members, values(&[("username", "first")])).await.unwrap();
        store.append(Table::Members, values(&[("username", "second")])).await.unwrap();
        store.append(Table::Actives, values(&[("username", "other")])).await.unwrap();

        let rows = store.rows(Table::Members).await.unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.get("username").unwrap()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_delete_removes_only_that_row() {
        let (_file, store) = temp_store();

        let a = store.append(Table::PreApprovals, values(&[("username", "a")])).await.unwrap();
        store.append(Table::PreApprovals, values(&[("username", "b")])).await.unwrap();

        store.delete(a.handle()).await.unwrap();
        let rows = store.rows(Table::PreApprovals).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("username"), Some("b"));

        // Second delete of the same handle reports the missing row
        assert!(store.delete(a.handle()).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_checks_table() {
        let (_file, store) = temp_store();

        let row = store.append(Table::Members, values(&[("username", "a")])).await.unwrap();
        let wrong_table = RowHandle {
            table: Table::Actives,
            id: row.handle().id,
        };
        assert!(store.delete(wrong_table).await.is_err());
        assert_eq!(store.rows(Table::Members).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_keeps_single_row_per_key() {
        let (_file, store) = temp_store();

        store
            .append(Table::PartialProgress, values(&[("id", "7"), ("step", "cityCheck")]))
            .await
            .unwrap();
        store
            .append(Table::PartialProgress, values(&[("id", "8"), ("step", "start")]))
            .await
            .unwrap();

        store
            .replace(
                Table::PartialProgress,
                "id",
                "7",
                values(&[("id", "7"), ("step", "done")]),
            )
            .await
            .unwrap();

        let rows = store.rows(Table::PartialProgress).await.unwrap();
        assert_eq!(rows.len(), 2);
        let seven: Vec<_> = rows.iter().filter(|r| r.get("id") == Some("7")).collect();
        assert_eq!(seven.len(), 1);
        assert_eq!(seven[0].get("step"), Some("done"));
    }

    #[tokio::test]
    async fn test_rows_survive_reopen() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();

        {
            let store = SqliteRowStore::open(&path).unwrap();
            store.append(Table::Members, values(&[("username", "kept")])).await.unwrap();
        }

        let store = SqliteRowStore::open(&path).unwrap();
        let rows = store.rows(Table::Members).await.unwrap();
        assert_eq!(rows[0].get("username"), Some("kept"));
    }
}

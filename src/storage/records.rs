//! Typed records stored in the row tables and their column layout.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::core::error::AppResult;
use crate::join::step::Step;
use crate::storage::rows::{find_row, Row, RowStore, RowValues, Table};

/// Column names shared by the tables.
pub mod columns {
    pub const ID: &str = "id";
    pub const USERNAME: &str = "username";
    pub const STEP: &str = "step";
    pub const JOINED_AT: &str = "joinedAt";
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const EMAIL: &str = "email";
    pub const CITY: &str = "city";
    pub const AYY_MEMBER: &str = "ayyMember";
    pub const SCHOOL: &str = "school";
}

const TRUE_CELL: &str = "TRUE";
const FALSE_CELL: &str = "FALSE";

fn bool_cell(value: bool) -> String {
    let cell = if value { TRUE_CELL } else { FALSE_CELL };
    cell.to_string()
}

/// Anything other than `TRUE`/`FALSE` means the question was never answered.
fn parse_bool_cell(cell: Option<&str>) -> Option<bool> {
    match cell {
        Some(TRUE_CELL) => Some(true),
        Some(FALSE_CELL) => Some(false),
        _ => None,
    }
}

fn put(values: &mut RowValues, column: &str, value: impl Into<String>) {
    values.insert(column.to_string(), value.into());
}

fn put_opt(values: &mut RowValues, column: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        put(values, column, value);
    }
}

fn owned(row: &Row, column: &str) -> Option<String> {
    row.get(column).map(str::to_string)
}

/// A committed member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    pub id: i64,
    pub joined_at: DateTime<Utc>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub city: String,
    pub ayy_member: bool,
    pub school: Option<String>,
}

impl MemberRecord {
    /// Column order used by exports.
    pub const COLUMNS: [&'static str; 9] = [
        columns::ID,
        columns::JOINED_AT,
        columns::USERNAME,
        columns::FIRST_NAME,
        columns::LAST_NAME,
        columns::EMAIL,
        columns::CITY,
        columns::AYY_MEMBER,
        columns::SCHOOL,
    ];

    pub fn to_values(&self) -> RowValues {
        let mut values = RowValues::new();
        put(&mut values, columns::ID, self.id.to_string());
        put(
            &mut values,
            columns::JOINED_AT,
            self.joined_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        put(&mut values, columns::USERNAME, self.username.as_str());
        put(&mut values, columns::FIRST_NAME, self.first_name.as_str());
        put(&mut values, columns::LAST_NAME, self.last_name.as_str());
        put(&mut values, columns::EMAIL, self.email.as_str());
        put(&mut values, columns::CITY, self.city.as_str());
        put(&mut values, columns::AYY_MEMBER, bool_cell(self.ayy_member));
        put_opt(&mut values, columns::SCHOOL, self.school.as_deref());
        values
    }
}

/// Snapshot of an unfinished application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialProgressRecord {
    pub id: i64,
    pub username: String,
    pub step: Step,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub ayy_member: Option<bool>,
    pub school: Option<String>,
}

impl PartialProgressRecord {
    pub fn to_values(&self) -> RowValues {
        let mut values = RowValues::new();
        put(&mut values, columns::ID, self.id.to_string());
        put(&mut values, columns::USERNAME, self.username.as_str());
        put(&mut values, columns::STEP, self.step.to_string());
        put_opt(&mut values, columns::FIRST_NAME, self.first_name.as_deref());
        put_opt(&mut values, columns::LAST_NAME, self.last_name.as_deref());
        put_opt(&mut values, columns::EMAIL, self.email.as_deref());
        put_opt(&mut values, columns::CITY, self.city.as_deref());
        if let Some(ayy_member) = self.ayy_member {
            put(&mut values, columns::AYY_MEMBER, bool_cell(ayy_member));
        }
        put_opt(&mut values, columns::SCHOOL, self.school.as_deref());
        values
    }

    /// Reads a snapshot back. Rows without a numeric id or a username are
    /// skipped; an unreadable step restarts the conversation.
    pub fn from_row(row: &Row) -> Option<Self> {
        let id = row.get(columns::ID)?.trim().parse().ok()?;
        let username = owned(row, columns::USERNAME)?;
        let step = match row.get(columns::STEP).map(str::parse::<Step>) {
            Some(Ok(step)) => step,
            other => {
                log::warn!(
                    "Partial progress for {} has unreadable step {:?}, restarting from start",
                    id,
                    other
                );
                Step::Start
            }
        };

        Some(Self {
            id,
            username,
            step,
            first_name: owned(row, columns::FIRST_NAME),
            last_name: owned(row, columns::LAST_NAME),
            email: owned(row, columns::EMAIL),
            city: owned(row, columns::CITY),
            ayy_member: parse_bool_cell(row.get(columns::AYY_MEMBER)),
            school: owned(row, columns::SCHOOL),
        })
    }
}

/// Values for a pre-approval row.
pub fn preapproval_values(username: &str) -> RowValues {
    let mut values = RowValues::new();
    put(&mut values, columns::USERNAME, username);
    values
}

/// Values for an actives-mirror row.
pub fn active_values(id: i64, username: &str) -> RowValues {
    let mut values = RowValues::new();
    put(&mut values, columns::ID, id.to_string());
    put(&mut values, columns::USERNAME, username);
    values
}

/// Looks up a committed member by username.
pub async fn find_member(store: &dyn RowStore, username: &str) -> AppResult<Option<Row>> {
    find_row(store, Table::Members, columns::USERNAME, username).await
}

/// Looks up an active (operator) by numeric Telegram id.
pub async fn find_active(store: &dyn RowStore, id: i64) -> AppResult<Option<Row>> {
    let rows = store.rows(Table::Actives).await?;
    Ok(rows
        .into_iter()
        .find(|row| row.get(columns::ID).and_then(|v| v.trim().parse::<i64>().ok()) == Some(id)))
}

use crate::core::error::AppResult;
use crate::storage::records::MemberRecord;
use crate::storage::rows::{Row, RowStore, Table};

/// File name used when the export is sent as a document.
pub const MEMBERS_FILE_NAME: &str = "members.csv";

fn csv_field(value: &str) -> String {
    // Escape quotes; newlines would break the row
    let value = value.replace('"', "\"\"").replace(['\r', '\n'], " ");
    format!("\"{}\"", value)
}

/// Renders member rows as CSV, one column per member field.
pub fn members_to_csv(rows: &[Row]) -> String {
    let mut content = MemberRecord::COLUMNS.join(",");
    content.push('\n');

    for row in rows {
        let fields: Vec<String> = MemberRecord::COLUMNS
            .iter()
            .map(|column| csv_field(row.get(column).unwrap_or_default()))
            .collect();
        content.push_str(&fields.join(","));
        content.push('\n');
    }

    content
}

/// Reads the members table and renders it as CSV.
pub async fn export_members(store: &dyn RowStore) -> AppResult<String> {
    let rows = store.rows(Table::Members).await?;
    log::info!("Exporting {} member(s)", rows.len());
    Ok(members_to_csv(&rows))
}

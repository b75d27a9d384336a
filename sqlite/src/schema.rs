//! SQL generation for the snippet table.
//!
//! The table stores one row per snippet:
//!
//! - `keyword`: the snippet name, `PRIMARY KEY` so the database enforces
//!   at most one row per name
//! - `message`: the snippet text
//!
//! The table name is configurable so several isolated snippet sets can share
//! one database file. It must contain only alphanumeric characters and
//! underscores.

use crate::error::{Result, StoreError};

/// Validates that a table name contains only alphanumeric characters and underscores.
pub(crate) fn validate_table(table: &str) -> Result<()> {
    if table.is_empty() {
        return Err(StoreError::InvalidTable(table.to_string()));
    }
    if !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidTable(table.to_string()));
    }
    Ok(())
}

/// Generates the `CREATE TABLE` statement for the given table name.
///
/// Uses `IF NOT EXISTS`, so the SQL is safe to run repeatedly.
///
/// # Errors
///
/// Returns [`StoreError::InvalidTable`] if the name contains characters
/// other than alphanumerics and underscores, or if it is empty.
pub fn generate_schema_sql(table: &str) -> Result<String> {
    validate_table(table)?;

    let sql = format!(
        r#"
CREATE TABLE IF NOT EXISTS {table} (
    keyword TEXT PRIMARY KEY NOT NULL,
    message TEXT NOT NULL
);
"#
    );

    Ok(sql)
}

/// Generates SQL to drop the snippet table.
///
/// # Errors
///
/// Returns [`StoreError::InvalidTable`] if the table name is invalid.
pub fn generate_drop_sql(table: &str) -> Result<String> {
    validate_table(table)?;
    Ok(format!("DROP TABLE IF EXISTS {table};\n"))
}

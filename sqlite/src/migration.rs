//! Migration lifecycle operations for the snippet table.
//!
//! Provides [`Migration`] for creating, dropping, and seeding the table that
//! [`SnippetStore`](crate::SnippetStore) reads and writes. All mutation
//! operations use transactions to ensure atomicity.
//!
//! # Example
//!
//! ```no_run
//! use snippets_sqlite::Migration;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("snippets.db").unwrap();
//! let mut migration = Migration::new(conn, "snippets").unwrap();
//!
//! // Create the table
//! migration.up().unwrap();
//!
//! // Load snippets from a JSON bundle
//! let report = migration.seed("snippets.json").unwrap();
//! println!("{} inserted, {} updated", report.inserted, report.updated);
//! ```

use std::path::Path;

use rusqlite::{Connection, TransactionBehavior, params};
use snippets_core::{SnippetBundle, validate_bundle};
use tracing::info;

use crate::error::{Result, StoreError};
use crate::schema::{generate_drop_sql, generate_schema_sql, validate_table};
use crate::store::{table_exists, upsert};

/// Manages the lifecycle of the snippet table.
///
/// Provides operations to create the table ([`up`](Self::up)), drop it
/// ([`down`](Self::down)), load snippets from a JSON bundle
/// ([`seed`](Self::seed)), and check the current state
/// ([`status`](Self::status)).
pub struct Migration {
    conn: Connection,
    table: String,
}

impl Migration {
    /// Creates a new migration manager for the given connection and table name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTable`] if the table name contains invalid characters.
    pub fn new(conn: Connection, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_table(&table)?;
        Ok(Self { conn, table })
    }

    /// Creates the snippet table.
    ///
    /// Uses `CREATE TABLE IF NOT EXISTS` so it is safe to call multiple times.
    pub fn up(&mut self) -> Result<()> {
        let sql = generate_schema_sql(&self.table)?;
        let tx = self.conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| StoreError::MigrationError(format!("failed to create table: {e}")))?;
        tx.commit()?;
        info!(table = %self.table, "snippet table ready");
        Ok(())
    }

    /// Drops the snippet table and every snippet in it.
    ///
    /// Uses `DROP TABLE IF EXISTS` so it is safe to call even if the table
    /// does not exist.
    pub fn down(&mut self) -> Result<()> {
        let sql = generate_drop_sql(&self.table)?;
        let tx = self.conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| StoreError::MigrationError(format!("failed to drop table: {e}")))?;
        tx.commit()?;
        info!(table = %self.table, "snippet table dropped");
        Ok(())
    }

    /// Returns whether the table exists and how many snippets it holds.
    pub fn status(&self) -> Result<MigrationStatus> {
        if !table_exists(&self.conn, &self.table)? {
            return Ok(MigrationStatus {
                table_exists: false,
                snippet_count: 0,
            });
        }

        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;

        Ok(MigrationStatus {
            table_exists: true,
            snippet_count: count as usize,
        })
    }

    /// Upserts every snippet of a JSON bundle file.
    ///
    /// The whole bundle is validated first and written in one immediate
    /// transaction: either every snippet lands or none does.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Core`] if the file cannot be read or parsed,
    /// [`StoreError::Validation`] for the first invalid or duplicate name,
    /// and [`StoreError::TablesMissing`] if [`up`](Self::up) has not run.
    pub fn seed(&mut self, source: impl AsRef<Path>) -> Result<SeedReport> {
        let bundle = SnippetBundle::from_path(source)?;
        self.seed_bundle(&bundle)
    }

    /// Upserts every snippet of an in-memory bundle.
    pub fn seed_bundle(&mut self, bundle: &SnippetBundle) -> Result<SeedReport> {
        if let Some(err) = validate_bundle(bundle).into_iter().next() {
            return Err(err.into());
        }
        if !table_exists(&self.conn, &self.table)? {
            return Err(StoreError::TablesMissing(self.table.clone()));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut report = SeedReport::default();

        for snippet in &bundle.snippets {
            let existed: bool = tx.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE keyword = ?1", self.table),
                params![snippet.name],
                |row| Ok(row.get::<_, i64>(0)? > 0),
            )?;
            upsert(&tx, &self.table, &snippet.name, &snippet.text)?;
            if existed {
                report.updated += 1;
            } else {
                report.inserted += 1;
            }
        }

        tx.commit()?;
        info!(
            table = %self.table,
            inserted = report.inserted,
            updated = report.updated,
            "seeded snippets"
        );
        Ok(report)
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the migration and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

/// Status of the snippet table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Whether the snippet table exists in the database.
    pub table_exists: bool,
    /// Number of snippets stored.
    pub snippet_count: usize,
}

/// Report of a seed operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Snippets whose name was not in the table before seeding.
    pub inserted: usize,
    /// Snippets whose existing text was replaced.
    pub updated: usize,
}

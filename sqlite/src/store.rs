//! Runtime snippet access via SQLite queries.
//!
//! Provides [`SnippetStore`], which owns the process's single database
//! connection and exposes the four snippet operations. Each operation is a
//! single SQL statement and therefore a single transactional unit; nothing
//! is cached between calls.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use snippets_sqlite::SnippetStore;
//!
//! let store = SnippetStore::open("snippets.db", "snippets", Duration::from_secs(5)).unwrap();
//!
//! store.put("greeting", "hello world").unwrap();
//! assert_eq!(store.get("greeting").unwrap().as_deref(), Some("hello world"));
//!
//! for snippet in store.search("world").unwrap() {
//!     println!("{}: {}", snippet.name, snippet.text);
//! }
//!
//! store.close().unwrap();
//! ```

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use snippets_core::{Snippet, SnippetBundle, validate_name};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::schema::validate_table;

/// Inserts a snippet or replaces the text of the existing row with that name.
///
/// One statement, so the database's primary key arbitrates concurrent
/// writers: the last one to commit wins and no duplicate row can appear.
pub(crate) fn upsert(conn: &Connection, table: &str, name: &str, text: &str) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {table} (keyword, message) VALUES (?1, ?2)
             ON CONFLICT(keyword) DO UPDATE SET message = excluded.message"
        ),
        params![name, text],
    )?;
    Ok(())
}

/// Returns `true` if `table` exists in the connected database.
pub(crate) fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Snippet store backed by one SQLite table.
///
/// Owns its connection for the lifetime of the process. The connection is
/// released when the store is dropped, or explicitly through
/// [`close`](Self::close) when the caller wants to observe close errors.
///
/// # Examples
///
/// ```
/// use rusqlite::Connection;
/// use snippets_sqlite::{Migration, SnippetStore};
///
/// let mut migration = Migration::new(Connection::open_in_memory().unwrap(), "snippets").unwrap();
/// migration.up().unwrap();
///
/// let store = SnippetStore::from_connection(migration.into_connection(), "snippets").unwrap();
/// store.put("greeting", "hello").unwrap();
/// store.put("greeting", "hello world").unwrap();
///
/// assert_eq!(store.get("greeting").unwrap().as_deref(), Some("hello world"));
/// assert_eq!(store.get("missing").unwrap(), None);
/// assert_eq!(store.catalog().unwrap(), vec!["greeting".to_string()]);
/// ```
pub struct SnippetStore {
    conn: Connection,
    table: String,
}

impl SnippetStore {
    /// Opens the database at `path`, creating the file if needed, and binds
    /// the store to `table`.
    ///
    /// `busy_timeout` bounds how long a write waits while another process
    /// holds the database lock.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the file cannot be opened,
    /// [`StoreError::InvalidTable`] for a bad table name, and
    /// [`StoreError::TablesMissing`] if the table has not been created.
    pub fn open(path: impl AsRef<Path>, table: &str, busy_timeout: Duration) -> Result<Self> {
        Self::open_with_flags(path.as_ref(), table, busy_timeout, OpenFlags::default())
    }

    /// Opens an existing database at `path` without ever creating it.
    ///
    /// A missing file is reported as [`StoreError::Unavailable`] rather than
    /// silently replaced by an empty database.
    pub fn open_existing(
        path: impl AsRef<Path>,
        table: &str,
        busy_timeout: Duration,
    ) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Self::open_with_flags(path.as_ref(), table, busy_timeout, flags)
    }

    fn open_with_flags(
        path: &Path,
        table: &str,
        busy_timeout: Duration,
        flags: OpenFlags,
    ) -> Result<Self> {
        validate_table(table)?;
        let conn =
            Connection::open_with_flags(path, flags).map_err(|source| StoreError::Unavailable {
                path: path.to_path_buf(),
                source,
            })?;
        conn.busy_timeout(busy_timeout)?;
        debug!(path = %path.display(), table, "opened snippet database");
        Self::from_connection(conn, table)
    }

    /// Wraps an already-open connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTable`] for a bad table name, or
    /// [`StoreError::TablesMissing`] if the table does not exist.
    pub fn from_connection(conn: Connection, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_table(&table)?;
        if !table_exists(&conn, &table)? {
            return Err(StoreError::TablesMissing(table));
        }
        Ok(Self { conn, table })
    }

    /// Stores `text` under `name`, replacing any existing text.
    ///
    /// Returns the stored snippet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the name is empty.
    pub fn put(&self, name: &str, text: &str) -> Result<Snippet> {
        validate_name(name)?;
        upsert(&self.conn, &self.table, name, text)?;
        debug!(name, bytes = text.len(), "stored snippet");
        Ok(Snippet::new(name, text))
    }

    /// Looks up the text stored under `name`.
    ///
    /// Returns `None` if no snippet has that exact name.
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        let text = self
            .conn
            .query_row(
                &format!("SELECT message FROM {} WHERE keyword = ?1", self.table),
                params![name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        debug!(name, found = text.is_some(), "looked up snippet");
        Ok(text)
    }

    /// Returns every stored name, sorted ascending by byte order.
    pub fn catalog(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT keyword FROM {} ORDER BY keyword",
            self.table
        ))?;

        let names: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(count = names.len(), "listed catalog");
        Ok(names)
    }

    /// Returns every snippet whose text contains `substring`, sorted by name.
    ///
    /// Matching is case-sensitive and unanchored. `substring` is bound as a
    /// parameter and matched with `instr`, so `%` and `_` are literal
    /// characters. An empty substring matches every snippet.
    pub fn search(&self, substring: &str) -> Result<Vec<Snippet>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT keyword, message FROM {} WHERE ?1 = '' OR instr(message, ?1) > 0 ORDER BY keyword",
            self.table
        ))?;

        let matches: Vec<Snippet> = stmt
            .query_map(params![substring], |row| {
                Ok(Snippet::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(substring, count = matches.len(), "searched snippets");
        Ok(matches)
    }

    /// Number of stored snippets.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Reads every snippet into a bundle, sorted by name.
    pub fn export(&self) -> Result<SnippetBundle> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT keyword, message FROM {} ORDER BY keyword",
            self.table
        ))?;

        let snippets: Vec<Snippet> = stmt
            .query_map([], |row| {
                Ok(Snippet::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(SnippetBundle::new(snippets))
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, reporting any error SQLite raises on close.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| StoreError::DatabaseError(err))
    }
}

//! SQLite storage backend for named text snippets.
//!
//! This crate keeps snippets in a single two-column table and exposes the
//! four store operations (put, get, catalog, search) plus the setup tooling
//! that creates and seeds the table.
//!
//! # Architecture
//!
//! - **`schema`**: SQL generation for a configurable table name
//! - **`migration`**: Lifecycle operations (up/down/seed/status)
//! - **`store`**: Runtime snippet access over one owned connection
//!
//! # Quick start: migrations
//!
//! ```no_run
//! use snippets_sqlite::Migration;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("snippets.db").unwrap();
//! let mut migration = Migration::new(conn, "snippets").unwrap();
//!
//! migration.up().unwrap();
//! let status = migration.status().unwrap();
//! println!("Snippets: {}", status.snippet_count);
//! ```
//!
//! # Quick start: store
//!
//! ```no_run
//! use std::time::Duration;
//! use snippets_sqlite::SnippetStore;
//!
//! let store = SnippetStore::open("snippets.db", "snippets", Duration::from_secs(5)).unwrap();
//! store.put("greeting", "hello world").unwrap();
//!
//! match store.get("greeting").unwrap() {
//!     Some(text) => println!("{text}"),
//!     None => println!("not found"),
//! }
//! ```
//!
//! # Table name
//!
//! The table name is the only identifier interpolated into SQL text, so it
//! must contain only alphanumeric characters and underscores. Every
//! caller-supplied value (names, text, search substrings) is bound as a
//! statement parameter.

mod error;
mod migration;
mod schema;
mod store;

pub use error::{Result, StoreError};
pub use migration::{Migration, MigrationStatus, SeedReport};
pub use schema::{generate_drop_sql, generate_schema_sql};
pub use store::SnippetStore;

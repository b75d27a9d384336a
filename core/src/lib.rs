//! Core snippet types and shared configuration primitives.
//!
//! This crate defines the foundational pieces shared by the storage backend
//! and the command-line front end:
//!
//! - [`Snippet`]: a named piece of text.
//! - [`SnippetBundle`]: a JSON document of snippets used for seeding and
//!   exporting a store.
//! - [`SnippetsConfig`]: YAML-backed settings (database path, table name,
//!   logging).
//!
//! Validation ([`validate_name`], [`validate_bundle`]) rejects the empty
//! name and duplicate names within a bundle.
//!
//! # Example
//!
//! ```
//! use snippets_core::*;
//!
//! let snippet = Snippet::new("greeting", "hello world");
//! assert!(validate_name(&snippet.name).is_ok());
//! assert!(validate_name("").is_err());
//!
//! let bundle = SnippetBundle::new(vec![snippet]);
//! assert!(validate_bundle(&bundle).is_empty());
//! ```

mod config;
mod error;
mod types;
mod validate;

pub use config::{DEFAULT_CONFIG_FILE, SnippetsConfig};
pub use error::{CoreError, Result};
pub use types::{Snippet, SnippetBundle};
pub use validate::{ValidationError, validate_bundle, validate_name};

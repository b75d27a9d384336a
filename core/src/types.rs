//! Snippet type definitions.
//!
//! A snippet is a unique name paired with arbitrary text. The types are
//! designed for serialization with [`serde`] so they can move between the
//! SQLite store, JSON bundles, and JSON command output unchanged.

use std::io::{BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A named piece of text persisted by the store.
///
/// # Examples
///
/// ```
/// use snippets_core::Snippet;
///
/// let snippet = Snippet::new("greeting", "hello world");
/// assert_eq!(snippet.name, "greeting");
/// assert_eq!(snippet.text, "hello world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Unique key chosen by the caller.
    pub name: String,
    /// Arbitrary content.
    pub text: String,
}

impl Snippet {
    /// Creates a snippet from a name and its text.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// A portable collection of snippets.
///
/// Serialized as `{"snippets": [{"name": ..., "text": ...}, ...]}`. Used to
/// seed a fresh database and to export an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetBundle {
    /// Snippets in the bundle, in document order.
    #[serde(default)]
    pub snippets: Vec<Snippet>,
}

impl SnippetBundle {
    /// Creates a bundle from a list of snippets.
    pub fn new(snippets: Vec<Snippet>) -> Self {
        Self { snippets }
    }

    /// Loads a bundle from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CoreError::IoError) if the file cannot be
    /// read, or [`JsonError`](crate::CoreError::JsonError) if parsing fails.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let bundle = serde_json::from_reader(BufReader::new(file))?;
        Ok(bundle)
    }

    /// Writes the bundle as pretty-printed JSON.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        Ok(())
    }

    /// Number of snippets in the bundle.
    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    /// Returns `true` if the bundle holds no snippets.
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

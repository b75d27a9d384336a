//! Configuration for the snippets tool.
//!
//! Settings are read from a YAML file (by default `snippets.yml` in the
//! working directory). Every field is optional; anything left out falls back
//! to [`SnippetsConfig::default`].
//!
//! # Example YAML
//!
//! ```yaml
//! database: /var/lib/snippets/snippets.db
//! table: snippets
//! log_file: snippets.log
//! log_level: debug
//! busy_timeout_ms: 5000
//! auto_migrate: true
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// File name looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "snippets.yml";

/// Top-level tool configuration.
///
/// # Examples
///
/// ```
/// use snippets_core::SnippetsConfig;
///
/// let config: SnippetsConfig = serde_yaml::from_str("table: notes").unwrap();
/// assert_eq!(config.table, "notes");
/// assert_eq!(config.database.to_str(), Some("snippets.db"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnippetsConfig {
    /// SQLite database file.
    pub database: PathBuf,
    /// Table holding the snippets. Alphanumerics and underscores only.
    pub table: String,
    /// Diagnostic log file; `None` disables logging.
    pub log_file: Option<PathBuf>,
    /// Default log filter when `SNIPPETS_LOG` is unset.
    pub log_level: String,
    /// How long a writer waits on a locked database before giving up.
    pub busy_timeout_ms: u64,
    /// Create the table on startup if it does not exist yet.
    pub auto_migrate: bool,
}

impl Default for SnippetsConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("snippets.db"),
            table: "snippets".to_string(),
            log_file: Some(PathBuf::from("snippets.log")),
            log_level: "debug".to_string(),
            busy_timeout_ms: 5000,
            auto_migrate: true,
        }
    }
}

impl SnippetsConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CoreError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::CoreError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

//! Snippet and bundle validation.
//!
//! Names are chosen by the caller and stored byte-for-byte. The one name the
//! store refuses is the empty string. Text is never validated.
//!
//! # Examples
//!
//! ```
//! use snippets_core::*;
//!
//! assert!(validate_name("greeting").is_ok());
//! assert_eq!(validate_name(""), Err(ValidationError::EmptyName));
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::SnippetBundle;

/// Snippet/bundle validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name is the empty string.
    #[error("snippet name cannot be empty")]
    EmptyName,
    /// Two snippets in the same bundle share a name.
    #[error("duplicate snippet in bundle: {0}")]
    DuplicateName(String),
}

/// Validates a single snippet name.
///
/// Whitespace and control characters are ordinary name characters.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

/// Validates every snippet of a bundle.
///
/// Returns all problems found rather than stopping at the first; an empty
/// vector means the bundle can be seeded as-is.
pub fn validate_bundle(bundle: &SnippetBundle) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for snippet in &bundle.snippets {
        if let Err(err) = validate_name(&snippet.name) {
            errors.push(err);
            continue;
        }
        if !seen.insert(snippet.name.as_str()) {
            errors.push(ValidationError::DuplicateName(snippet.name.clone()));
        }
    }

    errors
}

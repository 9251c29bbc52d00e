//! Error types for plugin setting declarations and file providers

use std::path::PathBuf;
use thiserror::Error;

/// A declared intent that cannot be accepted
///
/// Raised while building descriptors and catalogs. Never retried: the
/// declaration itself has to be corrected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identity is not of the form `<section>/<setting>`
    #[error("invalid identity '{0}': expected <section>/<setting> without whitespace")]
    InvalidIdentity(String),

    /// Ensure is neither `present` nor `absent`
    #[error("invalid ensure state '{0}': expected 'present' or 'absent'")]
    InvalidEnsure(String),

    /// Two declarations target the same `(section, setting)` in one run
    #[error("duplicate identity '{0}': each setting may be declared once per run")]
    DuplicateIdentity(String),
}

/// The target file cannot be read or written as required
///
/// Scoped to the resource that triggered it; other resources in the same
/// run are unaffected.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Target file does not exist and the provider may not create it
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to read the file
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the file
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not a flat `key = value` INI file
    #[error("cannot parse {} at line {line}: {reason}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The setting has no single addressable location in the file
    #[error("{section}/{setting} is not addressable: {reason}")]
    Ambiguous {
        section: String,
        setting: String,
        reason: String,
    },

    /// The value cannot be represented on a single `key = value` line
    #[error("cannot write {section}/{setting}: {reason}")]
    Unwritable {
        section: String,
        setting: String,
        reason: String,
    },
}

//! Typed error definitions for fsource.
//! Every failure crossing the FileSource contract boundary is one of these
//! three kinds, so callers can tell "nothing there" from "something broke".

use std::io;
use thiserror::Error;

/// Result alias used throughout the storage contract.
pub type Result<T> = std::result::Result<T, SourceError>;

#[derive(Debug, Error)]
pub enum SourceError {
    /// The root or a named artifact was absent where presence was required.
    /// Never raised for an existing-but-empty root.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A key or name violates the delimiter or dimension-cardinality rules.
    #[error("Invalid key or name '{name}': {reason}")]
    InvalidKey { name: String, reason: String },

    /// Backend-level I/O error, transient or permanent.
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),
}

impl SourceError {
    /// Stable numeric code for structured error logs and exit statuses.
    pub fn code(&self) -> i32 {
        match self {
            SourceError::NotFound(_) => 2,
            SourceError::InvalidKey { .. } => 3,
            SourceError::Io(_) => 4,
        }
    }

    /// Short machine-readable kind for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::NotFound(_) => "not_found",
            SourceError::InvalidKey { .. } => "invalid_key",
            SourceError::Io(_) => "io_failure",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_))
    }

    pub(crate) fn invalid_key(name: impl Into<String>, reason: impl Into<String>) -> Self {
        SourceError::InvalidKey {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Map an I/O error to NotFound for the given subject, passing others through.
pub(crate) fn io_to_source(err: io::Error, subject: &str) -> SourceError {
    if err.kind() == io::ErrorKind::NotFound {
        SourceError::NotFound(subject.to_string())
    } else {
        SourceError::Io(err)
    }
}

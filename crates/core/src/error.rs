//! Error types surfaced by the catalog engine.

use std::path::PathBuf;

use thiserror::Error;

/// Caller bugs: invalid pagination parameters or configuration values.
///
/// These are never shown to end users; they fail the offending call
/// immediately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Page sizes must be strictly positive.
    #[error("page size must be greater than zero")]
    ZeroPageSize,

    /// A configuration key held a value outside its allowed range.
    #[error("invalid configuration value for `{key}`: {reason}")]
    InvalidConfig {
        /// Offending configuration key.
        key: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
}

/// Failure to produce a usable catalog. Recoverable by retrying the load.
#[derive(Debug, Error)]
pub enum LoadFailure {
    /// The catalog file could not be read.
    #[error("failed to read catalog {}: {source}", path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not a valid list of game records.
    #[error("failed to parse catalog {}: {source}", path.display())]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Two records share the same identifier.
    #[error("duplicate game id `{0}` in catalog")]
    DuplicateId(String),

    /// A record carries an empty identifier.
    #[error("game at position {0} has an empty id")]
    EmptyId(usize),
}

impl LoadFailure {
    /// Short message suitable for a status line.
    pub fn user_message(&self) -> String {
        match self {
            LoadFailure::Read { .. } => "The game catalog is unavailable right now.".to_string(),
            LoadFailure::Parse { .. } | LoadFailure::DuplicateId(_) | LoadFailure::EmptyId(_) => {
                "The game catalog appears to be corrupt.".to_string()
            }
        }
    }
}

//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing persisted collections.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A collection file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collection file exists but does not hold valid JSON of the right shape.
    #[error("corrupt collection {path}: {source}")]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The store directory path exists but is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
}

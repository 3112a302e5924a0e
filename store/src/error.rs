//! Error types for store operations.
//!
//! Wraps storage failures and the core merge errors so a run reports one
//! error type.

use std::path::PathBuf;

use openapi_fragments_core::MergeError;
use thiserror::Error;

/// Errors that can occur while loading, merging or emitting.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the fragment directory or a fragment, or writing the output.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Run configuration file could not be parsed or serialized.
    #[error("invalid config '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Parsing, fidelity or merge failure.
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Worker pool for parallel loading could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;

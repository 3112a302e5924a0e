//! Error types for fragment parsing, fidelity checking and merging.
//!
//! Every variant is fatal for a run: there is no partial-success mode.

use thiserror::Error;

use crate::fidelity::FidelityReport;

/// Errors raised while turning fragments into a merged document.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Fragment bytes could not be parsed into a tree or the typed model.
    #[error("failed to parse fragment '{fragment}': {message}")]
    Parse { fragment: String, message: String },

    /// The typed model does not round-trip to the untyped tree.
    #[error("{0}")]
    FidelityViolation(FidelityReport),

    /// A component schema name was declared by more than one fragment.
    #[error("duplicate component schema '{schema}' in fragment '{fragment}'")]
    DuplicateSchemaName { schema: String, fragment: String },

    /// A path+method was declared by more than one fragment while
    /// [`PathCollisionPolicy::Reject`](crate::PathCollisionPolicy::Reject)
    /// is in effect.
    #[error("duplicate operation {method} {path} in fragment '{fragment}'")]
    DuplicateOperation {
        path: String,
        method: String,
        fragment: String,
    },

    /// The merged document could not be serialized.
    #[error("failed to serialize document: {0}")]
    Serialize(String),
}

impl MergeError {
    pub(crate) fn parse(fragment: &str, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            fragment: fragment.to_string(),
            message: err.to_string(),
        }
    }

    /// Name of the fragment the error was detected in, if any.
    pub fn fragment(&self) -> Option<&str> {
        match self {
            Self::Parse { fragment, .. }
            | Self::DuplicateSchemaName { fragment, .. }
            | Self::DuplicateOperation { fragment, .. } => Some(fragment),
            Self::FidelityViolation(report) => Some(&report.fragment),
            Self::Serialize(_) => None,
        }
    }
}

/// Convenience alias for results with [`MergeError`].
pub type Result<T> = std::result::Result<T, MergeError>;

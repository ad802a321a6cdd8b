//! Engine errors.

use crate::core::{ConfigError, SelectionError};
use crate::ports::SourceError;

/// Errors surfaced by cursors and traversals
#[derive(Debug, thiserror::Error)]
pub enum TraversalError {
    /// Empty file list; raised before anything is opened
    #[error("no source files provided to extract data from")]
    NoSourcesProvided,

    /// A dataset's content violates its declared shape or type
    #[error("data integrity error in variable {variable} ({file}): {reason}")]
    DataIntegrity {
        variable: String,
        file: String,
        reason: String,
    },

    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl TraversalError {
    /// Re-tag a source error with the variable and file it came from
    pub(crate) fn in_variable(err: SourceError, variable: &str, file: &str) -> Self {
        match err {
            SourceError::DataIntegrity { reason, .. } => TraversalError::DataIntegrity {
                variable: variable.to_string(),
                file: file.to_string(),
                reason,
            },
            other => TraversalError::Source(other),
        }
    }
}

pub type TraversalResult<T> = Result<T, TraversalError>;

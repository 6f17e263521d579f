//! Error types for stack-explorer.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for stack-explorer operations.
#[derive(Error, Debug)]
pub enum StackExplorerError {
    /// A frame index outside `[0, len)` was requested.
    #[error("frame index {index} out of bounds (stack has {len} frames)")]
    OutOfBoundsFrame { index: isize, len: usize },

    /// A frame manager cannot govern an empty frame sequence.
    #[error("cannot create a frame manager without frames")]
    EmptyFrames,

    /// Host supplied an unusable call stack.
    #[error("invalid call stack: {0}")]
    InvalidCallStack(String),

    /// Session identifier could not be parsed.
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization error.
    #[error("snapshot parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StackExplorerError {
    /// Build an out-of-bounds error for a requested index.
    pub(crate) fn out_of_bounds(index: impl TryInto<isize>, len: usize) -> Self {
        Self::OutOfBoundsFrame {
            index: index.try_into().unwrap_or(isize::MAX),
            len,
        }
    }
}

/// Convenience Result type for stack-explorer operations.
pub type Result<T> = std::result::Result<T, StackExplorerError>;

//! Error types for channel operations

use std::path::PathBuf;

/// Errors raised by a channel before or around running a command.
///
/// A command that runs and exits non-zero is *not* an error at this level;
/// it comes back as a [`CommandOutput`](crate::CommandOutput) with a non-zero
/// `exited` value.
#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    /// The program could not be started at all
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A required client binary is not on PATH
    #[error("'{tool}' not found on PATH")]
    BinaryNotFound {
        /// Name of the missing binary
        tool: String,
    },

    /// Invalid SSH destination string
    #[error("invalid ssh target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Copying a file back from the channel failed
    #[error("failed to fetch {path}: {reason}")]
    FetchFailed { path: PathBuf, reason: String },

    /// Local I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for channel operations
pub type Result<T> = std::result::Result<T, TunnelError>;

//! Error type shared by every cloud service connection.

use thiserror::Error;

use crate::command::CommandError;

/// Errors raised by cloud service connections.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CloudError {
    /// Raised when the client process cannot be started.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// Raised when the client exits with a non-zero status.
    #[error("{program} exited with status {status_text}: {stderr}")]
    CommandFailure {
        /// Program that failed (typically `aws`).
        program: String,
        /// Exit status reported by the OS.
        status: Option<i32>,
        /// Human readable representation of the exit status.
        status_text: String,
        /// Stderr captured from the command.
        stderr: String,
    },
    /// Raised when a service response cannot be decoded.
    #[error("failed to parse {operation} output: {message}")]
    Parse {
        /// Service operation whose output was being decoded.
        operation: String,
        /// Parser error message.
        message: String,
    },
}

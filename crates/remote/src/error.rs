//! Remote boundary errors
//!
//! None of these reach business logic: a failed flush is reported as a
//! [`RemoteSignal::Fail`](crate::RemoteSignal::Fail) and the local update
//! that produced the batch stays in place.

use thiserror::Error;

/// Errors raised at the remote store boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Request failed at the transport level
    #[error("network error: {0}")]
    Network(String),

    /// Remote answered with a non-200 status
    #[error("remote returned status {0}")]
    Status(u16),

    /// Request timed out
    #[error("remote request timed out")]
    Timeout,

    /// Remote refused to apply the batch (nothing was applied)
    #[error("remote rejected batch: {0}")]
    Rejected(String),

    /// Body could not be encoded or decoded
    #[error("parse error: {0}")]
    Parse(String),

    /// Flush queue is full
    #[error("flush queue is full")]
    Backpressure,

    /// Flush queue has been shut down
    #[error("flush queue is shut down")]
    Shutdown,

    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<restore_core::Error> for RemoteError {
    fn from(e: restore_core::Error) -> Self {
        RemoteError::Parse(e.to_string())
    }
}

/// Map an HTTP status to success or [`RemoteError::Status`]
///
/// Only exactly 200 counts as success.
pub fn check_status(status: u16) -> Result<(), RemoteError> {
    if status == 200 {
        Ok(())
    } else {
        Err(RemoteError::Status(status))
    }
}

//! Error types for row sessions
//!
//! This module defines the row-level error taxonomy shared by every crate.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Row-level errors are raised synchronously by the offending table call and
//! leave the rest of the session usable. Remote flush failures live in the
//! remote crate and never surface here.

use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sessions and the row model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A row handed to `create` has no usable `id` field
    #[error("Required property \"id\" is missing in {table} row: {detail}")]
    Validation {
        /// Collection the row was destined for
        table: String,
        /// Description of the offending row
        detail: String,
    },

    /// `create` targets an id that is already present (original or tracked)
    #[error("A row with id {id} already exists in {table}")]
    Conflict {
        /// Collection name
        table: String,
        /// The conflicting id, rendered for display
        id: String,
    },

    /// A stored row lacks an id (the caller's own state is corrupt)
    #[error("Invariant violated in {table}: {message}")]
    Invariant {
        /// Collection name
        table: String,
        /// What was found
        message: String,
    },

    /// The session has no collection with this name
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Validation error for a row without a usable id
    pub fn missing_id(table: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::Validation {
            table: table.into(),
            detail: detail.into(),
        }
    }

    /// Conflict error for a duplicate id
    pub fn conflict(table: impl Into<String>, id: impl ToString) -> Self {
        Error::Conflict {
            table: table.into(),
            id: id.to_string(),
        }
    }

    /// Invariant error for corrupt stored data
    pub fn invariant(table: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Invariant {
            table: table.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input (validation/conflict)
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::Conflict { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

//! Core types for restore
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: Unified value enum for row fields
//! - RowId / Row / Collection: the row model and snapshot utilities
//! - Dataset: Ordered mapping of collection name to collection
//! - OperationRecord: Serializable description of one detected change
//! - Error: Row-level error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dataset;
pub mod error;
pub mod op;
pub mod row;
pub mod value;

pub use dataset::Dataset;
pub use error::{Error, Result};
pub use op::{OpKind, OperationRecord};
pub use row::{clone_row, same_fields, Collection, Row, RowId, ID_FIELD};
pub use value::Value;

//! Change-tracking sessions over in-memory datasets
//!
//! This crate implements copy-on-write row tracking:
//! - TrackedRow: Shared handle onto a per-session working copy
//! - TableSession: Lazy tracking, reads, deletes and inserts for one collection
//! - Session: One table session per collection of a dataset
//! - Finalize: Diffing against the original snapshot into new collections
//!   plus ordered operation records
//!
//! Sessions are single-threaded and synchronous. Nothing is written back
//! unless the caller finalizes and merges the result.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod filter;
pub mod session;
pub mod table;
pub mod tracked;

pub use filter::Filter;
pub use session::{Session, SessionCommit};
pub use table::{TableCommit, TableSession};
pub use tracked::{Tracked, TrackedRow, TrackedSet};

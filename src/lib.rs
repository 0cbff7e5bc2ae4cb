//! restore - change-tracking sessions over in-memory relational datasets
//!
//! Business logic reads and mutates rows through a [`Session`]; finalizing
//! the session yields the changed collections and an ordered list of
//! [`OperationRecord`]s describing what was created, updated and deleted.
//! Unchanged collections keep their identity, so hosts can detect "nothing
//! changed" with a pointer comparison.
//!
//! # Quick Start
//!
//! ```
//! use restore::{Collection, Dataset, OpKind, Row, RowId, Session};
//!
//! let data = Dataset::new().with(
//!     "todo",
//!     Collection::new(vec![Row::new().with("id", 0).with("text", "Use Redux")]),
//! );
//!
//! let session = Session::new(&data);
//! let todo = session.table("todo")?.by_id(&RowId::from(0))?.unwrap();
//! todo.set("text", "Use sessions");
//!
//! let commit = session.finalize();
//! assert_eq!(commit.ops[0].kind, OpKind::Update);
//! # Ok::<(), restore::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `restore-core`: values, rows, collections, datasets, operation records
//! - `restore-session`: table sessions and the session that finalizes them
//! - `restore-remote`: action wrapper, background flush, remote stores
//!
//! This crate re-exports their public API.

pub use restore_core::{
    clone_row, same_fields, Collection, Dataset, Error, OpKind, OperationRecord, Result, Row,
    RowId, Value, ID_FIELD,
};
pub use restore_session::{
    Filter, Session, SessionCommit, TableCommit, TableSession, Tracked, TrackedRow, TrackedSet,
};
pub use restore_remote::{
    apply_to_dataset, check_status, ignore_signals, load_data, with_session, ActionOutcome,
    ActionWrapper, DataHost, FlushQueue, FlushStats, MemoryRemote, RemoteConfig, RemoteError,
    RemoteSignal, RemoteStore, SignalSink, CONFIG_FILE_NAME,
};

#[cfg(feature = "http")]
pub use restore_remote::HttpRemote;

/// Operation batch encoding for the remote `POST` body
pub mod op {
    pub use restore_core::op::{from_json_slice, to_json_bytes};
}

//! Session over a whole dataset
//!
//! A [`Session`] wraps a [`Dataset`] and creates one [`TableSession`] per
//! collection up front (rows are still materialized lazily inside each
//! table). Finalizing the session finalizes every table in dataset order.
//!
//! # Usage
//!
//! ```
//! use restore_core::{Collection, Dataset, Row, RowId};
//! use restore_session::Session;
//!
//! let data = Dataset::new().with(
//!     "users",
//!     Collection::new(vec![Row::new().with("id", 1).with("name", "a")]),
//! );
//!
//! let session = Session::new(&data);
//! let users = session.table("users")?;
//! users.by_id(&RowId::from(1))?.unwrap().set("name", "a1");
//!
//! let commit = session.finalize();
//! assert_eq!(commit.ops.len(), 1);
//! assert_eq!(commit.updates.get("users").unwrap().rows()[0].get("name").unwrap().as_str(), Some("a1"));
//! # Ok::<(), restore_core::Error>(())
//! ```

use crate::table::TableSession;
use restore_core::{Dataset, Error, OperationRecord, Result};
use tracing::debug;

/// Result of finalizing a session
#[derive(Debug, Clone, Default)]
pub struct SessionCommit {
    /// Collections that changed, in dataset order
    pub updates: Dataset,
    /// Every table's records, concatenated in dataset order
    pub ops: Vec<OperationRecord>,
}

impl SessionCommit {
    /// True when nothing changed
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.ops.is_empty()
    }
}

/// Change-tracking session over a dataset
///
/// A session is created fresh for one business-logic invocation, driven
/// synchronously, finalized, and dropped. It is deliberately `!Send`.
#[derive(Debug)]
pub struct Session {
    tables: Vec<TableSession>,
}

impl Session {
    /// Create a session with one table session per collection
    ///
    /// The dataset is not modified; the session keeps its own (shared)
    /// references to the collections.
    pub fn new(data: &Dataset) -> Self {
        let tables = data
            .iter()
            .map(|(name, rows)| TableSession::new(name, rows.clone()))
            .collect();
        Self { tables }
    }

    /// Table session for a collection
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`] if the dataset has no such collection.
    pub fn table(&self, name: &str) -> Result<&TableSession> {
        self.tables
            .iter()
            .find(|table| table.name() == name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// Collection names in dataset order
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(TableSession::name)
    }

    /// Iterate all table sessions in dataset order
    pub fn tables(&self) -> impl Iterator<Item = &TableSession> {
        self.tables.iter()
    }

    /// Finalize every table
    ///
    /// A collection appears in `updates` only if its table returned a new
    /// collection. Records keep per-table order, tables keep dataset order.
    pub fn finalize(&self) -> SessionCommit {
        let mut commit = SessionCommit::default();

        for table in &self.tables {
            let table_commit = table.finalize();
            if table_commit.changed(table.original()) {
                commit.updates.insert(table.name(), table_commit.rows);
            }
            commit.ops.extend(table_commit.ops);
        }

        debug!(
            target: "restore::session",
            tables = self.tables.len(),
            updated = commit.updates.len(),
            ops = commit.ops.len(),
            "Session finalized"
        );

        commit
    }
}

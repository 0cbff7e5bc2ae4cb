//! Operation records: serializable descriptions of detected changes
//!
//! Each finalized session yields an ordered list of `OperationRecord`s. The
//! list is the exact payload sent to the remote store, which applies the
//! records in array order as upserts/deletes keyed by `fields.id`.
//!
//! ## Format
//!
//! ```json
//! [{"type": "UPDATE", "table": "users", "fields": {"id": 1, "name": "a1"}}]
//! ```

use crate::error::Result;
use crate::row::{Row, RowId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of change an operation record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpKind {
    /// Row did not exist in the original collection
    Create,
    /// Row existed and at least one field changed
    Update,
    /// Row existed and was removed
    Delete,
}

impl OpKind {
    /// Wire name (`"CREATE"`, `"UPDATE"`, `"DELETE"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Create => "CREATE",
            OpKind::Update => "UPDATE",
            OpKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected change, destined for the remote store
///
/// For deletes, `fields` holds the *original* row as it was before removal;
/// for creates and updates it holds the tracked row's fields at finalize time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Create, update or delete
    #[serde(rename = "type")]
    pub kind: OpKind,
    /// Collection name
    pub table: String,
    /// Row field data
    pub fields: Row,
}

impl OperationRecord {
    /// Build a record
    pub fn new(kind: OpKind, table: impl Into<String>, fields: Row) -> Self {
        Self {
            kind,
            table: table.into(),
            fields,
        }
    }

    /// CREATE record
    pub fn create(table: impl Into<String>, fields: Row) -> Self {
        Self::new(OpKind::Create, table, fields)
    }

    /// UPDATE record
    pub fn update(table: impl Into<String>, fields: Row) -> Self {
        Self::new(OpKind::Update, table, fields)
    }

    /// DELETE record
    pub fn delete(table: impl Into<String>, fields: Row) -> Self {
        Self::new(OpKind::Delete, table, fields)
    }

    /// Id of the affected row
    pub fn row_id(&self) -> Option<RowId> {
        self.fields.id()
    }
}

/// Serialize a batch of records to the JSON body sent to the remote store.
pub fn to_json_bytes(ops: &[OperationRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(ops)?)
}

/// Deserialize a batch of records from a JSON body.
pub fn from_json_slice(bytes: &[u8]) -> Result<Vec<OperationRecord>> {
    Ok(serde_json::from_slice(bytes)?)
}

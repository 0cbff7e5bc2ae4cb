//! Row model
//!
//! This module defines:
//! - RowId: identifier of a row within its collection
//! - Row: flat field map, required to carry an `id` field
//! - Collection: immutable, shared, ordered sequence of rows
//!
//! Rows are value objects. Two rows with the same fields are interchangeable;
//! the only identity a row carries is its `id`.

use crate::value::Value;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Name of the identifier field every row must carry
pub const ID_FIELD: &str = "id";

/// Identifier of a row within its collection
///
/// Ids compare strictly: `Int(1)` and `Str("1")` are different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowId {
    /// Numeric id
    Int(i64),
    /// Textual id
    Str(String),
}

impl RowId {
    /// Interpret a field value as an id
    ///
    /// Only `Int` and `String` values are usable ids; anything else
    /// (including `Null`) is treated as "no id".
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(RowId::Int(*i)),
            Value::String(s) => Some(RowId::Str(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(i) => write!(f, "{}", i),
            RowId::Str(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for RowId {
    fn from(i: i64) -> Self {
        RowId::Int(i)
    }
}

impl From<i32> for RowId {
    fn from(i: i32) -> Self {
        RowId::Int(i as i64)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId::Str(s.to_string())
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        RowId::Str(s)
    }
}

/// A flat mapping from field name to value
///
/// Field order is irrelevant for equality. Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: BTreeMap<String, Value>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter
    ///
    /// ```
    /// use restore_core::Row;
    ///
    /// let row = Row::new().with("id", 1).with("name", "a");
    /// assert_eq!(row.len(), 2);
    /// ```
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// The row's id, if the `id` field holds a usable id value
    pub fn id(&self) -> Option<RowId> {
        self.fields.get(ID_FIELD).and_then(RowId::from_value)
    }

    /// Get a field value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set a field value, returning the previous one
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Check whether a field is present
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the row has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Borrow the underlying field map
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Short human-readable rendering used in error messages
    pub fn describe(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self.fields))
    }
}

impl From<BTreeMap<String, Value>> for Row {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// Row snapshot utilities
// ============================================================================

/// Shallow copy of a row: same field names, same values
///
/// The copy shares nothing with `row`, so mutating it never reaches the
/// original collection.
pub fn clone_row(row: &Row) -> Row {
    Row {
        fields: row.fields.clone(),
    }
}

/// True iff both rows have exactly the same field names and, for every
/// field, strictly equal values
///
/// Field order is irrelevant. Used to tell a row that was only fetched from
/// one that was actually changed.
pub fn same_fields(a: &Row, b: &Row) -> bool {
    if a.fields.len() != b.fields.len() {
        return false;
    }

    a.fields
        .iter()
        .all(|(name, value)| b.fields.get(name).is_some_and(|other| other == value))
}

// ============================================================================
// Collection
// ============================================================================

/// Immutable, shared, ordered sequence of rows for one named table
///
/// Cloning a collection is cheap and yields the *same* collection:
/// [`Collection::ptr_eq`] lets callers detect "nothing changed" without
/// comparing rows.
#[derive(Debug, Clone, Default)]
pub struct Collection(Arc<Vec<Row>>);

impl Collection {
    /// Wrap a row vector
    pub fn new(rows: Vec<Row>) -> Self {
        Self(Arc::new(rows))
    }

    /// Reference equality: both handles point at the same allocation
    pub fn ptr_eq(&self, other: &Collection) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Borrow the rows
    pub fn rows(&self) -> &[Row] {
        &self.0
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the collection holds no rows
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the rows in storage order
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.0.iter()
    }

    /// Position of the row with the given id
    pub fn position(&self, id: &RowId) -> Option<usize> {
        self.0.iter().position(|row| row.id().as_ref() == Some(id))
    }

    /// Copy the rows out for copy-on-write editing
    pub fn to_vec(&self) -> Vec<Row> {
        self.0.as_ref().clone()
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl From<Vec<Row>> for Collection {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

impl FromIterator<Row> for Collection {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Collection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Row>::deserialize(deserializer).map(Collection::new)
    }
}

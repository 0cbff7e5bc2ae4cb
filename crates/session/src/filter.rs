//! Exact-field equality filter for table scans

use restore_core::{Row, Value};
use std::collections::BTreeMap;

/// Conjunction of `field == value` predicates
///
/// An empty filter selects every row. Comparison is strict: a row matches
/// only if it has every listed field and each value is equal under
/// [`Value`] equality (`Int(1)` does not match `String("1")`, and a missing
/// field does not match `Null`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: BTreeMap<String, Value>,
}

impl Filter {
    /// Filter that selects every row
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a `field == value` predicate
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// True when no predicate was given
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Test a row against every predicate
    pub fn matches(&self, row: &Row) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| row.get(field) == Some(expected))
    }
}

impl From<Row> for Filter {
    fn from(row: Row) -> Self {
        Self {
            fields: row.fields().clone(),
        }
    }
}

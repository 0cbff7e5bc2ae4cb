//! Dataset: the unit of application state a session wraps
//!
//! A Dataset maps collection names to collections and remembers the order in
//! which collections were added. That order is observable: a session emits
//! operation records table by table in dataset order, so a dataset read from
//! JSON keeps the document's key order rather than sorting it.

use crate::row::Collection;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered mapping from collection name to [`Collection`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    tables: Vec<(String, Collection)>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, rows: impl Into<Collection>) -> Self {
        self.insert(name, rows.into());
        self
    }

    /// Insert or replace a collection
    ///
    /// Replacing keeps the collection's original position.
    pub fn insert(&mut self, name: impl Into<String>, rows: Collection) -> Option<Collection> {
        let name = name.into();
        match self.tables.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, rows)),
            None => {
                self.tables.push((name, rows));
                None
            }
        }
    }

    /// Look up a collection by name
    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.tables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| rows)
    }

    /// Check whether a collection exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Collection names in dataset order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate `(name, collection)` in dataset order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Collection)> {
        self.tables.iter().map(|(n, rows)| (n.as_str(), rows))
    }

    /// Number of collections
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True when the dataset holds no collections
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Shallow per-collection override
    ///
    /// Every collection in `updates` replaces the same-named collection in
    /// `self` (or is appended if new); all other collections are carried over
    /// untouched (same references).
    pub fn merge(&self, updates: &Dataset) -> Dataset {
        let mut merged = self.clone();
        for (name, rows) in updates.iter() {
            merged.insert(name, rows.clone());
        }
        merged
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for (name, rows) in &self.tables {
            map.serialize_entry(name, rows)?;
        }
        map.end()
    }
}

struct DatasetVisitor;

impl<'de> Visitor<'de> for DatasetVisitor {
    type Value = Dataset;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a map of collection name to row array")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Dataset, A::Error> {
        let mut dataset = Dataset::new();
        while let Some((name, rows)) = access.next_entry::<String, Collection>()? {
            dataset.insert(name, rows);
        }
        Ok(dataset)
    }
}

impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DatasetVisitor)
    }
}

//! Tracked rows: per-session working copies
//!
//! A [`TrackedRow`] is a shared handle onto one working copy. Every handle a
//! table session hands out for the same id points at the same copy, so a
//! mutation made through any of them is what finalize later diffs against
//! the original row.
//!
//! [`TrackedSet`] is the table session's bookkeeping: which ids were touched,
//! in which order, and whether each one is live or marked deleted.

use restore_core::{Row, RowId, Value};
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Handle onto a per-session working copy of a row
///
/// Cloning the handle does not copy the row; use [`TrackedRow::ptr_eq`] to
/// check whether two handles refer to the same working copy.
#[derive(Clone)]
pub struct TrackedRow(Rc<RefCell<Row>>);

impl TrackedRow {
    pub(crate) fn new(row: Row) -> Self {
        Self(Rc::new(RefCell::new(row)))
    }

    /// True when both handles refer to the same working copy
    pub fn ptr_eq(&self, other: &TrackedRow) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Current id of the working copy
    pub fn id(&self) -> Option<RowId> {
        self.0.borrow().id()
    }

    /// Current value of a field
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name).cloned()
    }

    /// Set a field, returning the previous value
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.borrow_mut().set(name, value)
    }

    /// Borrow the working copy
    ///
    /// The borrow must be released before the row is mutated again.
    pub fn fields(&self) -> Ref<'_, Row> {
        self.0.borrow()
    }

    /// Run a closure over the working copy
    pub fn with_fields<R>(&self, f: impl FnOnce(&Row) -> R) -> R {
        f(&self.0.borrow())
    }

    /// Mutate the working copy in place
    pub fn update<R>(&self, f: impl FnOnce(&mut Row) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    /// Owned copy of the current fields
    pub fn snapshot(&self) -> Row {
        self.0.borrow().clone()
    }
}

impl fmt::Debug for TrackedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TrackedRow").field(&*self.0.borrow()).finish()
    }
}

/// State of one touched id
#[derive(Debug, Clone)]
pub enum Tracked {
    /// Working copy (fetched or created)
    Live(TrackedRow),
    /// Marked deleted in this session
    Deleted,
}

impl Tracked {
    /// The working copy, unless the id is marked deleted
    pub fn live(&self) -> Option<&TrackedRow> {
        match self {
            Tracked::Live(row) => Some(row),
            Tracked::Deleted => None,
        }
    }

    /// True for the deletion marker
    pub fn is_deleted(&self) -> bool {
        matches!(self, Tracked::Deleted)
    }
}

/// Touched ids in first-touch order
#[derive(Debug, Default)]
pub struct TrackedSet {
    order: Vec<RowId>,
    entries: HashMap<RowId, Tracked>,
}

impl TrackedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for an id
    pub fn get(&self, id: &RowId) -> Option<&Tracked> {
        self.entries.get(id)
    }

    /// Check whether an id has been touched
    pub fn contains(&self, id: &RowId) -> bool {
        self.entries.contains_key(id)
    }

    /// Set the entry for an id
    ///
    /// An id keeps the position of its first touch when overwritten.
    pub fn insert(&mut self, id: RowId, entry: Tracked) {
        if self.entries.insert(id.clone(), entry).is_none() {
            self.order.push(id);
        }
    }

    /// Iterate entries in first-touch order
    pub fn iter(&self) -> impl Iterator<Item = (&RowId, &Tracked)> {
        self.order
            .iter()
            .filter_map(move |id| self.entries.get(id).map(|entry| (id, entry)))
    }

    /// Number of touched ids
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing was touched
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

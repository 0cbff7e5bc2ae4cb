//! Table session: change tracking for one named collection
//!
//! A `TableSession` wraps one committed [`Collection`] and hands out tracked
//! working copies of its rows. The original collection is never touched;
//! everything the business logic does lands in the session's [`TrackedSet`].
//!
//! # Read-Your-Writes Semantics
//!
//! When looking up an id, the table session checks in order:
//! 1. **tracked set**: the working copy (or `None` for an id marked deleted)
//! 2. **original collection**: clones the row into a new working copy
//!
//! # Finalize
//!
//! `finalize` walks the tracked set in first-touch order and diffs every
//! entry against the original rows:
//! - deletion marker on an original row → row removed, `DELETE` record
//! - working copy with different fields → row replaced, `UPDATE` record
//! - working copy with identical fields → nothing
//! - working copy with no original row → row appended, `CREATE` record
//!
//! The result collection is copied on the first structural change only; if
//! nothing changed, `finalize` returns the original collection itself.

use crate::filter::Filter;
use crate::tracked::{Tracked, TrackedRow, TrackedSet};
use restore_core::{clone_row, same_fields, Collection, Error, OperationRecord, Result, Row, RowId};
use std::cell::RefCell;
use tracing::debug;

/// Result of finalizing one table session
#[derive(Debug, Clone)]
pub struct TableCommit {
    /// Resulting rows; the original collection itself when nothing changed
    pub rows: Collection,
    /// Detected changes in first-touch order
    pub ops: Vec<OperationRecord>,
}

impl TableCommit {
    /// True when `rows` is a new collection
    pub fn changed(&self, original: &Collection) -> bool {
        !self.rows.ptr_eq(original)
    }
}

/// Change-tracking view over one collection
///
/// All methods take `&self` so business logic can hold several table
/// sessions of one [`Session`](crate::Session) at the same time.
#[derive(Debug)]
pub struct TableSession {
    name: String,
    original: Collection,
    tracked: RefCell<TrackedSet>,
}

impl TableSession {
    /// Wrap a committed collection
    pub fn new(name: impl Into<String>, original: Collection) -> Self {
        Self {
            name: name.into(),
            original,
            tracked: RefCell::new(TrackedSet::new()),
        }
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The committed collection this session started from
    pub fn original(&self) -> &Collection {
        &self.original
    }

    /// Number of ids touched so far
    pub fn touched(&self) -> usize {
        self.tracked.borrow().len()
    }

    // === Read Operations ===

    /// Tracked row for `id`
    ///
    /// The first lookup clones the original row into a working copy; every
    /// later lookup returns a handle to that same copy. Returns `None` if the
    /// id was removed in this session or exists neither in the original
    /// collection nor among rows created in this session.
    pub fn by_id(&self, id: &RowId) -> Result<Option<TrackedRow>> {
        if let Some(entry) = self.tracked.borrow().get(id) {
            return Ok(entry.live().cloned());
        }

        match self.original.position(id) {
            Some(i) => self.materialize(&self.original.rows()[i]).map(Some),
            None => Ok(None),
        }
    }

    /// Tracked rows of every original row matching `filter`
    ///
    /// Only the original collection is scanned: rows created in this session
    /// are not visible here until the session is finalized. Matching is done
    /// on the original field values, and rows already removed in this session
    /// are skipped.
    pub fn filter(&self, filter: &Filter) -> Result<Vec<TrackedRow>> {
        let mut result = Vec::new();
        for row in self.original.iter().filter(|row| filter.matches(row)) {
            if let Some(tracked) = self.lookup_or_materialize(row)? {
                result.push(tracked);
            }
        }
        Ok(result)
    }

    fn lookup_or_materialize(&self, row: &Row) -> Result<Option<TrackedRow>> {
        let id = self.require_stored_id(row)?;
        if let Some(entry) = self.tracked.borrow().get(&id) {
            return Ok(entry.live().cloned());
        }
        self.materialize(row).map(Some)
    }

    /// Clone an original row into a new working copy
    fn materialize(&self, row: &Row) -> Result<TrackedRow> {
        let id = self.require_stored_id(row)?;
        let tracked = TrackedRow::new(clone_row(row));
        self.tracked
            .borrow_mut()
            .insert(id, Tracked::Live(tracked.clone()));
        Ok(tracked)
    }

    fn require_stored_id(&self, row: &Row) -> Result<RowId> {
        row.id().ok_or_else(|| {
            Error::invariant(
                &self.name,
                format!("Required property id is missing for {}", row.describe()),
            )
        })
    }

    // === Write Operations ===

    /// Mark the row identified by `row`'s id as deleted
    ///
    /// Removing an already removed row simply re-marks it.
    pub fn remove(&self, row: &TrackedRow) -> Result<()> {
        let id = row
            .id()
            .ok_or_else(|| Error::missing_id(&self.name, format!("{:?}", row)))?;
        self.remove_id(id);
        Ok(())
    }

    /// Mark `id` as deleted
    pub fn remove_id(&self, id: RowId) {
        self.tracked.borrow_mut().insert(id, Tracked::Deleted);
    }

    /// Register a new row
    ///
    /// The row itself becomes the working copy (no clone is made); the
    /// returned handle can keep mutating it until finalize.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the row has no usable `id`
    /// - [`Error::Conflict`] if the id is already tracked in this session
    ///   (including ids removed in this session) or present in the original
    ///   collection
    ///
    /// Neither error changes any tracked state.
    pub fn create(&self, row: Row) -> Result<TrackedRow> {
        let id = row
            .id()
            .ok_or_else(|| Error::missing_id(&self.name, row.describe()))?;

        if self.tracked.borrow().contains(&id) || self.original.position(&id).is_some() {
            return Err(Error::conflict(&self.name, &id));
        }

        let tracked = TrackedRow::new(row);
        self.tracked
            .borrow_mut()
            .insert(id, Tracked::Live(tracked.clone()));
        Ok(tracked)
    }

    // === Finalize ===

    /// Diff the tracked set against the original collection
    ///
    /// Does not consume the tracked set; finalizing twice without further
    /// changes yields the same result.
    pub fn finalize(&self) -> TableCommit {
        let tracked = self.tracked.borrow();
        let original = self.original.rows();
        let mut working: Option<Vec<Row>> = None;
        let mut ops = Vec::new();

        for (id, entry) in tracked.iter() {
            let position = working
                .as_deref()
                .unwrap_or(original)
                .iter()
                .position(|row| row.id().as_ref() == Some(id));

            match (position, entry) {
                (Some(i), Tracked::Deleted) => {
                    let rows = working.get_or_insert_with(|| original.to_vec());
                    let removed = rows.remove(i);
                    ops.push(OperationRecord::delete(&self.name, removed));
                }
                (Some(i), Tracked::Live(row)) => {
                    let current = row.snapshot();
                    if same_fields(&working.as_deref().unwrap_or(original)[i], &current) {
                        continue;
                    }
                    let rows = working.get_or_insert_with(|| original.to_vec());
                    rows[i] = current.clone();
                    ops.push(OperationRecord::update(&self.name, current));
                }
                (None, Tracked::Live(row)) => {
                    let created = row.snapshot();
                    let rows = working.get_or_insert_with(|| original.to_vec());
                    rows.push(created.clone());
                    ops.push(OperationRecord::create(&self.name, created));
                }
                // Created and removed in the same session, or never existed
                (None, Tracked::Deleted) => {}
            }
        }

        let rows = match working {
            Some(rows) => Collection::new(rows),
            None => self.original.clone(),
        };

        debug!(
            target: "restore::session",
            table = %self.name,
            touched = tracked.len(),
            ops = ops.len(),
            "Table finalized"
        );

        TableCommit { rows, ops }
    }
}

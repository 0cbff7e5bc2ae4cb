//! Todo model and its business functions.
//!
//! Each action takes the session of the current invocation and returns
//! whether the targeted todo existed. The wrapper turns the session into the
//! new dataset and the operation batch.

use std::path::{Path, PathBuf};

use restore_core::{Collection, Dataset, Result, Row, RowId};
use restore_remote::DataHost;
use restore_session::{Filter, Session};

/// Collection holding the todos.
pub const TODO_TABLE: &str = "todo";

/// Todo list backed by a JSON dataset file.
#[derive(Debug)]
pub struct TodoModel {
    path: PathBuf,
    data: Dataset,
}

impl TodoModel {
    /// Open the dataset at `path`, seeding the first todo if the file is missing.
    pub fn open(path: &Path) -> std::result::Result<Self, String> {
        let data = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
            serde_json::from_str(&content)
                .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?
        } else {
            seed()
        };

        let mut model = Self {
            path: path.to_path_buf(),
            data,
        };
        model.ensure_table();
        Ok(model)
    }

    /// Write the current dataset back to its file.
    pub fn save(&self) -> std::result::Result<(), String> {
        let content = serde_json::to_string_pretty(&self.data)
            .map_err(|e| format!("Failed to encode dataset: {}", e))?;
        std::fs::write(&self.path, content)
            .map_err(|e| format!("Failed to write '{}': {}", self.path.display(), e))
    }

    /// Current todos in collection order.
    pub fn todos(&self) -> &[Row] {
        self.data.get(TODO_TABLE).map(Collection::rows).unwrap_or(&[])
    }

    /// Id for the next new todo: one past the largest integer id.
    ///
    /// Fails once the largest id is `i64::MAX`.
    pub fn next_id(&self) -> std::result::Result<i64, String> {
        match self
            .todos()
            .iter()
            .filter_map(|row| row.get("id").and_then(|v| v.as_int()))
            .max()
        {
            None => Ok(0),
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| format!("no todo id left after {}", max)),
        }
    }

    fn ensure_table(&mut self) {
        if !self.data.contains(TODO_TABLE) {
            self.data.insert(TODO_TABLE, Collection::default());
        }
    }
}

impl DataHost for TodoModel {
    fn data(&self) -> &Dataset {
        &self.data
    }

    fn set_data(&mut self, data: Dataset) {
        self.data = data;
        self.ensure_table();
    }
}

fn seed() -> Dataset {
    Dataset::new().with(
        TODO_TABLE,
        Collection::new(vec![Row::new()
            .with("text", "Use Redux")
            .with("completed", false)
            .with("id", 0)]),
    )
}

/// Add a new, not completed todo.
pub fn add(session: &Session, id: i64, text: &str) -> Result<bool> {
    session.table(TODO_TABLE)?.create(
        Row::new()
            .with("id", id)
            .with("completed", false)
            .with("text", text),
    )?;
    Ok(true)
}

/// Change the text of a todo.
pub fn edit(session: &Session, id: i64, text: &str) -> Result<bool> {
    match session.table(TODO_TABLE)?.by_id(&RowId::from(id))? {
        Some(todo) => {
            todo.set("text", text);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Toggle the completed flag of a todo.
pub fn complete(session: &Session, id: i64) -> Result<bool> {
    match session.table(TODO_TABLE)?.by_id(&RowId::from(id))? {
        Some(todo) => {
            let done = todo.get("completed").and_then(|v| v.as_bool()).unwrap_or(false);
            todo.set("completed", !done);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Delete a todo.
pub fn delete(session: &Session, id: i64) -> Result<bool> {
    let todos = session.table(TODO_TABLE)?;
    match todos.by_id(&RowId::from(id))? {
        Some(todo) => {
            todos.remove(&todo)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Delete every completed todo; returns whether any was deleted.
pub fn clear_completed(session: &Session) -> Result<bool> {
    let todos = session.table(TODO_TABLE)?;
    let done = todos.filter(&Filter::all().eq("completed", true))?;
    for todo in &done {
        todos.remove(todo)?;
    }
    Ok(!done.is_empty())
}

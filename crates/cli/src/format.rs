//! Output formatting for todos and operation batches.

use restore_core::{OperationRecord, Row};

/// Output mode selected by CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One line per todo.
    Human,
    /// JSON array of rows.
    Json,
}

/// Format the todo list.
pub fn format_todos(todos: &[Row], mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(todos).unwrap_or_default(),
        OutputMode::Human => {
            if todos.is_empty() {
                return "(empty list)".to_string();
            }
            todos
                .iter()
                .map(format_todo_line)
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

fn format_todo_line(todo: &Row) -> String {
    let done = todo
        .get("completed")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let id = todo
        .id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "?".to_string());
    let text = todo.get("text").and_then(|v| v.as_str()).unwrap_or("");
    format!("[{}] {} {}", if done { "x" } else { " " }, id, text)
}

/// Format an operation batch as the JSON array posted to the remote.
pub fn format_ops(ops: &[OperationRecord]) -> Result<String, String> {
    serde_json::to_string_pretty(ops).map_err(|e| format!("Failed to encode operations: {}", e))
}

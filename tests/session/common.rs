//! Shared fixtures for the session suite.

#![allow(dead_code)]

use parking_lot::Mutex;
use restore::{Collection, Dataset, DataHost, RemoteSignal, Row, SignalSink};
use std::sync::Arc;

pub fn user(id: i64, name: &str) -> Row {
    Row::new().with("id", id).with("name", name)
}

pub fn todo(id: i64, text: &str, completed: bool) -> Row {
    Row::new()
        .with("id", id)
        .with("text", text)
        .with("completed", completed)
}

/// `{ users: [{id:1,name:'a'},{id:2,name:'b'}] }`
pub fn users_dataset() -> Dataset {
    Dataset::new().with(
        "users",
        Collection::new(vec![user(1, "a"), user(2, "b")]),
    )
}

pub fn todo_dataset() -> Dataset {
    Dataset::new()
        .with("todo", Collection::new(vec![todo(0, "Use Redux", false)]))
        .with("users", users_dataset().get("users").cloned().unwrap_or_default())
}

/// Host counting how often its dataset was replaced.
pub struct Model {
    pub data: Dataset,
    pub renders: usize,
}

impl Model {
    pub fn new(data: Dataset) -> Self {
        Self { data, renders: 0 }
    }
}

impl DataHost for Model {
    fn data(&self) -> &Dataset {
        &self.data
    }

    fn set_data(&mut self, data: Dataset) {
        self.renders += 1;
        self.data = data;
    }
}

/// Sink recording every signal it receives.
pub fn recorder() -> (SignalSink, Arc<Mutex<Vec<RemoteSignal>>>) {
    let signals = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&signals);
    let sink: SignalSink = Arc::new(move |signal: RemoteSignal| s.lock().push(signal));
    (sink, signals)
}

pub fn text_of(row: &Row, field: &str) -> Option<String> {
    row.get(field).and_then(|v| v.as_str()).map(str::to_string)
}

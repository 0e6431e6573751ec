// todo.rs

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub text: String,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub created_date: String,
}

/// Partial update for a todo. Only fields present in the request body are
/// applied. A deadline that is present but empty clears the deadline.
#[derive(Debug, Default, Deserialize)]
pub struct TodoPatch {
    pub done: Option<bool>,
    pub text: Option<String>,
    pub deadline: Option<String>,
}

#[derive(Default, Serialize, Deserialize)]
pub struct TodoStore {
    todos: Vec<Todo>,
    next_id: u64,
}

impl TodoStore {
    pub fn new() -> Self {
        Self {
            todos: Vec::new(),
            next_id: 1,
        }
    }

    pub fn list(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: u64) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Ids are monotonic and never reused, even after deletes.
    pub fn add(&mut self, text: String, deadline: Option<String>) -> Result<Todo, String> {
        if text.trim().is_empty() {
            return Err("Todo text cannot be empty.".to_string());
        }
        let todo = Todo {
            id: self.next_id,
            text,
            done: false,
            deadline: deadline.filter(|d| !d.is_empty()),
            created_date: Local::now().format("%Y-%m-%d").to_string(),
        };
        self.next_id += 1;
        self.todos.push(todo.clone());
        Ok(todo)
    }

    pub fn update(&mut self, id: u64, patch: TodoPatch) -> Option<Todo> {
        let todo = self.todos.iter_mut().find(|t| t.id == id)?;
        if let Some(done) = patch.done {
            todo.done = done;
        }
        if let Some(text) = patch.text {
            todo.text = text;
        }
        if let Some(deadline) = patch.deadline {
            todo.deadline = if deadline.is_empty() {
                None
            } else {
                Some(deadline)
            };
        }
        Some(todo.clone())
    }

    pub fn delete(&mut self, id: u64) -> Option<Todo> {
        let pos = self.todos.iter().position(|t| t.id == id)?;
        Some(self.todos.remove(pos))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| format!("Failed to open file: {}", e))?;

        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| format!("Failed to write JSON!: {}", e))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let file = File::open(&path);
        if let Ok(file) = file {
            let reader = BufReader::new(file);
            let mut store: TodoStore =
                serde_json::from_reader(reader).unwrap_or_else(|_| TodoStore::new());
            // next_id must stay ahead of whatever the snapshot holds
            let max_id = store.todos.iter().map(|t| t.id).max().unwrap_or(0);
            if store.next_id <= max_id {
                store.next_id = max_id + 1;
            }
            store
        } else {
            TodoStore::new()
        }
    }
}

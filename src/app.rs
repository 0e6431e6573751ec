// app.rs
use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::deadline::parse_deadline;
use crate::item::ItemState;
use crate::todo::Todo;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    AddingText,
    AddingDeadline,
    EditingText,
    EditingDeadline,
}

/// One queued mutation or fetch. The event loop hands these to worker
/// threads; results come back through the channel as [`OpResult`].
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Refresh,
    Create { text: String, deadline: Option<String> },
    Toggle { id: u64, done: bool },
    Delete { id: u64 },
    SaveEdits { id: u64, text: String, deadline: String },
}

#[derive(Debug)]
pub enum OpResult {
    Loaded(Result<Vec<Todo>, String>),
    Created(Result<Todo, String>),
    Toggled { id: u64, result: Result<Todo, String> },
    Deleted { id: u64, result: Result<Todo, String> },
    Saved { id: u64, result: Result<Todo, String> },
}

pub struct App {
    pub todos: Vec<Todo>,
    pub items: HashMap<u64, ItemState>,
    pub input_mode: InputMode,
    pub input_text: String,
    pub input_deadline: String,
    pub selected: usize,
    pub error_message: Option<String>,
    pub editing_id: Option<u64>,
    pending_ops: VecDeque<Op>,
    results_tx: Sender<OpResult>,
    results_rx: Receiver<OpResult>,
}

impl Default for App {
    fn default() -> Self {
        App::new()
    }
}

impl App {
    pub fn new() -> Self {
        let (results_tx, results_rx) = channel();
        Self {
            todos: Vec::new(),
            items: HashMap::new(),
            input_mode: InputMode::Normal,
            input_text: String::new(),
            input_deadline: String::new(),
            selected: 0,
            error_message: None,
            editing_id: None,
            pending_ops: VecDeque::new(),
            results_tx,
            results_rx,
        }
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.todos.get(self.selected)
    }

    pub fn item(&mut self, id: u64) -> &mut ItemState {
        self.items.entry(id).or_default()
    }

    pub fn item_ref(&self, id: u64) -> Option<&ItemState> {
        self.items.get(&id)
    }

    // ── Outbound queue ───────────────────────────────────────────────

    pub fn take_pending_ops(&mut self) -> Vec<Op> {
        self.pending_ops.drain(..).collect()
    }

    pub fn pending_ops_len(&self) -> usize {
        self.pending_ops.len()
    }

    pub fn results_sender(&self) -> Sender<OpResult> {
        self.results_tx.clone()
    }

    pub fn request_refresh(&mut self) {
        self.pending_ops.push_back(Op::Refresh);
    }

    // ── Adding ───────────────────────────────────────────────────────

    pub fn begin_add(&mut self) {
        self.input_mode = InputMode::AddingText;
        self.input_text.clear();
        self.input_deadline.clear();
        self.error_message = None;
    }

    pub fn submit_add(&mut self) -> Result<(), String> {
        if self.input_text.trim().is_empty() {
            return Err("Description cannot be empty.".to_string());
        }

        let deadline = if self.input_deadline.trim().is_empty() {
            None
        } else {
            Some(parse_deadline(&self.input_deadline)?)
        };

        self.pending_ops.push_back(Op::Create {
            text: self.input_text.trim().to_string(),
            deadline,
        });
        self.input_text.clear();
        self.input_deadline.clear();
        self.error_message = None;
        Ok(())
    }

    // ── Toggle / delete, guarded per item ────────────────────────────

    pub fn request_toggle_selected(&mut self) {
        let Some(todo) = self.selected_todo() else {
            return;
        };
        let (id, done) = (todo.id, todo.done);
        if !self.item(id).begin_toggle() {
            return;
        }
        self.pending_ops.push_back(Op::Toggle { id, done: !done });
    }

    pub fn request_delete_selected(&mut self) {
        let Some(todo) = self.selected_todo() else {
            return;
        };
        let id = todo.id;
        if !self.item(id).begin_delete() {
            return;
        }
        self.pending_ops.push_back(Op::Delete { id });
    }

    // ── Inline editing ───────────────────────────────────────────────

    pub fn begin_edit_selected(&mut self) {
        let Some(todo) = self.selected_todo().cloned() else {
            return;
        };
        self.item(todo.id).begin_edit(&todo);
        self.editing_id = Some(todo.id);
        self.input_mode = InputMode::EditingText;
        self.error_message = None;
    }

    pub fn editing_item(&mut self) -> Option<&mut ItemState> {
        let id = self.editing_id?;
        Some(self.item(id))
    }

    pub fn cancel_edit(&mut self) {
        if let Some(id) = self.editing_id.take() {
            self.item(id).cancel_edit();
        }
        self.input_mode = InputMode::Normal;
    }

    /// Validate drafts, queue the save, and return to viewing. Validation
    /// failures keep the drafts so the user can fix them.
    pub fn save_edit(&mut self) -> Result<(), String> {
        let Some(id) = self.editing_id else {
            return Ok(());
        };
        let deadline = {
            let item = self.item(id);
            if item.draft_text.trim().is_empty() {
                return Err("Description cannot be empty.".to_string());
            }
            let draft = item.draft_deadline.trim().to_string();
            if draft.is_empty() {
                String::new()
            } else {
                parse_deadline(&draft)?
            }
        };
        let (text, _) = self.item(id).take_save_payload();
        self.pending_ops.push_back(Op::SaveEdits { id, text, deadline });
        self.editing_id = None;
        self.input_mode = InputMode::Normal;
        self.error_message = None;
        Ok(())
    }

    // ── Inbound results ──────────────────────────────────────────────

    /// Apply every result the workers have sent since the last tick. Busy
    /// flags clear on success and failure alike.
    pub fn drain_inbound(&mut self) {
        while let Ok(result) = self.results_rx.try_recv() {
            match result {
                OpResult::Loaded(Ok(todos)) => {
                    self.todos = todos;
                    self.clamp_selected();
                }
                OpResult::Loaded(Err(e)) => {
                    self.error_message = Some(e);
                }
                OpResult::Created(Ok(todo)) => {
                    self.todos.push(todo);
                }
                OpResult::Created(Err(e)) => {
                    self.error_message = Some(e);
                }
                OpResult::Toggled { id, result } => {
                    self.item(id).finish_toggle();
                    self.apply_mutation(result);
                }
                OpResult::Deleted { id, result } => {
                    self.item(id).finish_delete();
                    match result {
                        Ok(deleted) => {
                            self.todos.retain(|t| t.id != deleted.id);
                            self.items.remove(&deleted.id);
                            self.clamp_selected();
                        }
                        Err(e) => self.error_message = Some(e),
                    }
                }
                OpResult::Saved { result, .. } => {
                    self.apply_mutation(result);
                }
            }
        }
    }

    fn apply_mutation(&mut self, result: Result<Todo, String>) {
        match result {
            Ok(updated) => {
                if let Some(slot) = self.todos.iter_mut().find(|t| t.id == updated.id) {
                    *slot = updated;
                }
            }
            Err(e) => self.error_message = Some(e),
        }
    }

    fn clamp_selected(&mut self) {
        if self.selected >= self.todos.len() {
            self.selected = self.todos.len().saturating_sub(1);
        }
    }
}

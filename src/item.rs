// item.rs

use crate::todo::Todo;

/// Transient per-row state for one todo: busy flags for in-flight toggle or
/// delete requests, and the inline edit drafts. Each row is independent.
#[derive(Debug, Default)]
pub struct ItemState {
    toggling: bool,
    deleting: bool,
    editing: bool,
    pub draft_text: String,
    pub draft_deadline: String,
    had_deadline: bool,
}

impl ItemState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false while a toggle is already in flight, so repeated
    /// keypresses cannot queue duplicate requests.
    pub fn begin_toggle(&mut self) -> bool {
        if self.toggling {
            return false;
        }
        self.toggling = true;
        true
    }

    pub fn finish_toggle(&mut self) {
        self.toggling = false;
    }

    pub fn is_toggling(&self) -> bool {
        self.toggling
    }

    pub fn begin_delete(&mut self) -> bool {
        if self.deleting {
            return false;
        }
        self.deleting = true;
        true
    }

    pub fn finish_delete(&mut self) {
        self.deleting = false;
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn is_busy(&self) -> bool {
        self.toggling || self.deleting
    }

    /// Enter edit mode, copying the row's current text and deadline into the
    /// drafts.
    pub fn begin_edit(&mut self, todo: &Todo) {
        self.editing = true;
        self.draft_text = todo.text.clone();
        self.draft_deadline = todo.deadline.clone().unwrap_or_default();
        self.had_deadline = todo.deadline.is_some();
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Drop the drafts without saving.
    pub fn cancel_edit(&mut self) {
        self.editing = false;
        self.draft_text.clear();
        self.draft_deadline.clear();
        self.had_deadline = false;
    }

    /// Trimmed text plus the deadline draft (possibly empty, which means
    /// "clear the deadline"). Leaves edit mode.
    pub fn take_save_payload(&mut self) -> (String, String) {
        let payload = (
            self.draft_text.trim().to_string(),
            self.draft_deadline.clone(),
        );
        self.cancel_edit();
        payload
    }

    /// True when saving the current drafts would remove an existing
    /// deadline. Non-blocking; rendering shows it as a warning line.
    pub fn clears_deadline(&self) -> bool {
        self.editing && self.had_deadline && self.draft_deadline.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_todo(deadline: Option<&str>) -> Todo {
        Todo {
            id: 1,
            text: "Buy milk".to_string(),
            done: false,
            deadline: deadline.map(|s| s.to_string()),
            created_date: "2026-08-23".to_string(),
        }
    }

    #[test]
    fn toggle_guard_blocks_reentry() {
        let mut item = ItemState::new();
        assert!(item.begin_toggle());
        assert!(!item.begin_toggle());
        item.finish_toggle();
        assert!(item.begin_toggle());
    }

    #[test]
    fn delete_guard_blocks_reentry() {
        let mut item = ItemState::new();
        assert!(item.begin_delete());
        assert!(!item.begin_delete());
        item.finish_delete();
        assert!(item.begin_delete());
    }

    #[test]
    fn guards_are_independent() {
        let mut item = ItemState::new();
        assert!(item.begin_toggle());
        assert!(item.begin_delete());
        assert!(item.is_busy());
    }

    #[test]
    fn begin_edit_copies_current_values() {
        let mut item = ItemState::new();
        item.begin_edit(&sample_todo(Some("2099-01-01")));
        assert!(item.is_editing());
        assert_eq!(item.draft_text, "Buy milk");
        assert_eq!(item.draft_deadline, "2099-01-01");
    }

    #[test]
    fn save_payload_trims_text_and_keeps_empty_deadline() {
        let mut item = ItemState::new();
        item.begin_edit(&sample_todo(None));
        item.draft_text = "  Buy milk and bread  ".to_string();
        let (text, deadline) = item.take_save_payload();
        assert_eq!(text, "Buy milk and bread");
        assert_eq!(deadline, "");
        assert!(!item.is_editing());
    }

    #[test]
    fn cancel_discards_drafts() {
        let mut item = ItemState::new();
        item.begin_edit(&sample_todo(Some("2099-01-01")));
        item.draft_text = "changed".to_string();
        item.cancel_edit();
        assert!(!item.is_editing());
        assert_eq!(item.draft_text, "");
        assert_eq!(item.draft_deadline, "");
    }

    #[test]
    fn clear_deadline_warning_only_when_one_existed() {
        let mut item = ItemState::new();
        item.begin_edit(&sample_todo(Some("2099-01-01")));
        assert!(!item.clears_deadline());
        item.draft_deadline.clear();
        assert!(item.clears_deadline());

        let mut item = ItemState::new();
        item.begin_edit(&sample_todo(None));
        assert!(!item.clears_deadline());
    }
}

//! Linear undo/redo history over form snapshots.
//!
//! # Responsibility
//! - Track `past`, `present` and `future` snapshots of the edited form.
//! - Drop commits whose content equals `present`.
//!
//! # Invariants
//! - `past` and `future` are most-recent-first.
//! - `past` never exceeds the configured capacity.
//! - Every committed change clears `future`.
//! - Snapshots are owned values; they never alias the store's working copy.

use crate::model::form::Form;
use log::debug;
use std::collections::VecDeque;

/// Number of undo steps kept unless configured otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Result of offering a snapshot to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// First snapshot after construction or `clear_history`.
    Baseline,
    /// Snapshot became the new `present`.
    Committed,
    /// Snapshot equals `present` and was discarded.
    Unchanged,
}

/// Three-list undo/redo state machine.
#[derive(Debug, Clone)]
pub struct FormHistory {
    past: VecDeque<Form>,
    present: Option<Form>,
    future: VecDeque<Form>,
    capacity: usize,
}

impl FormHistory {
    /// Creates an empty history with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Creates an empty history keeping at most `capacity` undo steps.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: None,
            future: VecDeque::new(),
            capacity,
        }
    }

    /// Commits `snapshot` as the new present.
    pub fn save_state(&mut self, snapshot: Form) -> CommitOutcome {
        let Some(present) = self.present.take() else {
            self.present = Some(snapshot);
            debug!("event=history_commit module=history status=baseline");
            return CommitOutcome::Baseline;
        };

        if present.same_content(&snapshot) {
            self.present = Some(present);
            debug!("event=history_commit module=history status=unchanged");
            return CommitOutcome::Unchanged;
        }

        self.past.push_front(present);
        self.past.truncate(self.capacity);
        self.present = Some(snapshot);
        self.future.clear();
        debug!(
            "event=history_commit module=history status=ok past_len={}",
            self.past.len()
        );
        CommitOutcome::Committed
    }

    /// Steps back one snapshot and returns the new present.
    ///
    /// Returns `None` without any state change when there is nothing to undo.
    pub fn undo(&mut self) -> Option<&Form> {
        if self.present.is_none() {
            return None;
        }
        let previous = self.past.pop_front()?;
        if let Some(current) = self.present.replace(previous) {
            self.future.push_front(current);
        }
        self.present.as_ref()
    }

    /// Steps forward one snapshot and returns the new present.
    ///
    /// Returns `None` without any state change when there is nothing to redo.
    pub fn redo(&mut self) -> Option<&Form> {
        if self.present.is_none() {
            return None;
        }
        let next = self.future.pop_front()?;
        if let Some(current) = self.present.replace(next) {
            self.past.push_front(current);
        }
        self.present.as_ref()
    }

    /// Empties past, present and future.
    pub fn clear_history(&mut self) {
        self.past.clear();
        self.present = None;
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Older snapshots, most recent first.
    pub fn past(&self) -> &VecDeque<Form> {
        &self.past
    }

    pub fn present(&self) -> Option<&Form> {
        self.present.as_ref()
    }

    /// Undone snapshots, most recent first.
    pub fn future(&self) -> &VecDeque<Form> {
        &self.future
    }
}

impl Default for FormHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{CommitOutcome, FormHistory};
    use crate::model::form::Form;

    fn titled(base: &Form, title: &str) -> Form {
        let mut form = base.clone();
        form.title = title.to_string();
        form
    }

    #[test]
    fn undo_on_empty_history_is_noop() {
        let mut history = FormHistory::new();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(history.present().is_none());
    }

    #[test]
    fn redo_requires_present() {
        let base = Form::new();
        let mut history = FormHistory::new();
        history.save_state(base.clone());
        history.save_state(titled(&base, "a"));
        history.undo();
        history.clear_history();
        assert!(history.redo().is_none());
        assert!(!history.can_redo());
    }

    #[test]
    fn zero_capacity_keeps_no_past() {
        let base = Form::new();
        let mut history = FormHistory::with_capacity(0);
        assert_eq!(history.save_state(base.clone()), CommitOutcome::Baseline);
        assert_eq!(
            history.save_state(titled(&base, "a")),
            CommitOutcome::Committed
        );
        assert!(history.past().is_empty());
        assert!(!history.can_undo());
    }
}

use std::collections::VecDeque;

use crate::color::ColorData;
use crate::{log_info, log_warn};

// ============================================================================
// SNAPSHOTS
// ============================================================================

/// Full deep copy of a canvas's pixels, in storage order.
pub type Snapshot = Vec<ColorData>;

struct HistoryEntry {
    pixels: Snapshot,
    description: String,
}

impl HistoryEntry {
    fn memory_size(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<ColorData>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    /// Only the base state is left on the undo stack.
    NothingToUndo,
    /// The redo stack is empty.
    NothingToRedo,
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryError::NothingToUndo => write!(f, "nothing to undo"),
            HistoryError::NothingToRedo => write!(f, "nothing to redo"),
        }
    }
}

impl std::error::Error for HistoryError {}

// ============================================================================
// HISTORY MANAGER
// ============================================================================

/// Undo/redo over whole-canvas snapshots.
///
/// The top of the undo stack is always the state currently displayed; once a
/// canvas has been registered the undo stack never drops below one entry.
pub struct HistoryManager {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    max_history_size: usize,
    /// Optional memory cap in bytes.
    max_memory_bytes: Option<usize>,
    /// Running memory total across both stacks.
    total_memory: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(50)
    }
}

impl HistoryManager {
    /// `max_history_size` counts undo entries, base state included (min 1).
    pub fn new(max_history_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size: max_history_size.max(1),
            max_memory_bytes: None,
            total_memory: 0,
        }
    }

    /// Cap the snapshot bytes held across both stacks. The current state is
    /// kept even when it alone exceeds the cap.
    pub fn with_memory_limit(mut self, max_bytes: Option<usize>) -> Self {
        self.max_memory_bytes = max_bytes;
        self
    }

    /// Push the state after an edit. The redo branch is discarded.
    pub fn register_new_state(&mut self, pixels: Snapshot) {
        self.register_labeled(pixels, "Edit");
    }

    pub fn register_labeled(&mut self, pixels: Snapshot, description: impl Into<String>) {
        self.clear_redo_stack();
        let entry = HistoryEntry { pixels, description: description.into() };
        self.total_memory += entry.memory_size();
        self.undo_stack.push_back(entry);
        self.prune();
    }

    /// Move the current state onto the redo stack and return the state to
    /// display. Fails, changing nothing, when only the base state is left.
    pub fn undo(&mut self) -> Result<&[ColorData], HistoryError> {
        if self.undo_stack.len() <= 1 {
            log_warn!("undo requested with nothing to undo");
            return Err(HistoryError::NothingToUndo);
        }
        if let Some(entry) = self.undo_stack.pop_back() {
            log_info!("undo: {}", entry.description);
            self.redo_stack.push_back(entry);
        }
        self.current().ok_or(HistoryError::NothingToUndo)
    }

    /// Move the most recently undone state back and return it.
    pub fn redo(&mut self) -> Result<&[ColorData], HistoryError> {
        let Some(entry) = self.redo_stack.pop_back() else {
            log_warn!("redo requested with nothing to redo");
            return Err(HistoryError::NothingToRedo);
        };
        log_info!("redo: {}", entry.description);
        self.undo_stack.push_back(entry);
        self.current().ok_or(HistoryError::NothingToRedo)
    }

    /// The state on top of the undo stack.
    pub fn current(&self) -> Option<&[ColorData]> {
        self.undo_stack.back().map(|e| e.pixels.as_slice())
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        if self.can_undo() {
            self.undo_stack.back().map(|e| e.description.as_str())
        } else {
            None
        }
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|e| e.description.as_str())
    }

    /// Undoable descriptions, most recent first (base state excluded).
    pub fn undo_history(&self) -> Vec<String> {
        self.undo_stack
            .iter()
            .skip(1)
            .rev()
            .map(|e| e.description.clone())
            .collect()
    }

    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop both stacks, e.g. before a new canvas is loaded.
    pub fn clear_all(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.total_memory = 0;
    }

    fn clear_redo_stack(&mut self) {
        for entry in self.redo_stack.drain(..) {
            self.total_memory = self.total_memory.saturating_sub(entry.memory_size());
        }
    }

    /// Drop the oldest entries beyond the count or memory limits, always
    /// keeping the current state.
    fn prune(&mut self) {
        while self.undo_stack.len() > self.max_history_size {
            if let Some(removed) = self.undo_stack.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
            }
        }

        if let Some(max_bytes) = self.max_memory_bytes {
            while self.total_memory > max_bytes && self.undo_stack.len() > 1 {
                if let Some(removed) = self.undo_stack.pop_front() {
                    self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(v: f32) -> Snapshot {
        vec![ColorData::gray(v); 4]
    }

    fn with_base() -> HistoryManager {
        let mut h = HistoryManager::new(10);
        h.register_new_state(state(0.0));
        h
    }

    #[test]
    fn undo_returns_previous_and_redo_restores() {
        let mut h = with_base();
        h.register_new_state(state(0.5));
        assert_eq!(h.undo().unwrap(), state(0.0).as_slice());
        assert_eq!(h.redo().unwrap(), state(0.5).as_slice());
        assert_eq!(h.current(), Some(state(0.5).as_slice()));
    }

    #[test]
    fn base_state_cannot_be_undone() {
        let mut h = with_base();
        assert_eq!(h.undo(), Err(HistoryError::NothingToUndo));
        assert_eq!(h.undo_count(), 1);
        assert_eq!(h.current(), Some(state(0.0).as_slice()));
    }

    #[test]
    fn empty_redo_is_an_error() {
        let mut h = with_base();
        h.register_new_state(state(0.3));
        assert_eq!(h.redo(), Err(HistoryError::NothingToRedo));
        assert_eq!(h.undo_count(), 2);
    }

    #[test]
    fn new_state_discards_redo_branch() {
        let mut h = with_base();
        h.register_new_state(state(0.1));
        h.register_new_state(state(0.2));
        h.undo().unwrap();
        assert!(h.can_redo());
        h.register_new_state(state(0.9));
        assert!(!h.can_redo());
        assert_eq!(h.undo().unwrap(), state(0.1).as_slice());
    }

    #[test]
    fn prune_keeps_newest_entries() {
        let mut h = HistoryManager::new(3);
        for i in 0..6 {
            h.register_new_state(state(i as f32));
        }
        assert_eq!(h.undo_count(), 3);
        assert_eq!(h.undo().unwrap(), state(4.0).as_slice());
        assert_eq!(h.undo().unwrap(), state(3.0).as_slice());
        assert!(h.undo().is_err());
    }

    #[test]
    fn memory_limit_never_drops_current_state() {
        let one = 4 * std::mem::size_of::<ColorData>();
        let mut h = HistoryManager::new(50).with_memory_limit(Some(one));
        h.register_new_state(state(0.0));
        h.register_new_state(state(1.0));
        assert_eq!(h.undo_count(), 1);
        assert_eq!(h.memory_usage(), one);
    }

    #[test]
    fn descriptions_and_clear() {
        let mut h = with_base();
        h.register_labeled(state(0.2), "Pen");
        h.register_labeled(state(0.4), "Blur");
        assert_eq!(h.undo_history(), vec!["Blur".to_string(), "Pen".to_string()]);
        assert_eq!(h.undo_description(), Some("Blur"));
        h.undo().unwrap();
        assert_eq!(h.redo_description(), Some("Blur"));
        h.clear_all();
        assert_eq!((h.undo_count(), h.redo_count(), h.memory_usage()), (0, 0, 0));
        assert_eq!(h.current(), None);
    }
}

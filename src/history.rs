//! Undo/Redo History
//!
//! Snapshot-based history for the layer stack. Each entry stores the
//! document before and after one mutation, so undoing is a matter of
//! restoring a snapshot and recompositing.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ArtboardError, Result};
use crate::layers::Document;

/// Default maximum number of undo levels to keep.
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 50;

/// Kinds of stack mutation that can be undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    InsertLayer,
    RemoveLayer,
    MoveLayer,
    ToggleVisibility,
    EditSettings,
    EditIntensity,
    LoadDocument,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::InsertLayer => write!(f, "Insert Layer"),
            ActionType::RemoveLayer => write!(f, "Remove Layer"),
            ActionType::MoveLayer => write!(f, "Move Layer"),
            ActionType::ToggleVisibility => write!(f, "Toggle Visibility"),
            ActionType::EditSettings => write!(f, "Edit Settings"),
            ActionType::EditIntensity => write!(f, "Edit Intensity"),
            ActionType::LoadDocument => write!(f, "Load Document"),
        }
    }
}

/// One undoable mutation with complete stack snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub action: ActionType,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub before: Document,
    pub after: Document,
}

impl HistoryEntry {
    pub fn new(
        action: ActionType,
        description: impl Into<String>,
        before: Document,
        after: Document,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            description: description.into(),
            timestamp: Utc::now(),
            before,
            after,
        }
    }
}

/// Bounded undo and redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_undo_levels: usize,
    discarded: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_LEVELS)
    }
}

impl History {
    pub fn new(max_undo_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_levels,
            discarded: 0,
        }
    }

    /// Record a new entry.
    ///
    /// Clears the redo stack (history has diverged) and drops the oldest
    /// entries beyond `max_undo_levels`.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.redo_stack.clear();
        self.undo_stack.push(entry);
        self.trim();
    }

    /// Pop the latest entry and move it to the redo stack.
    ///
    /// Returns the entry so the caller can restore `before`.
    pub fn undo(&mut self) -> Result<&HistoryEntry> {
        let entry = self.undo_stack.pop().ok_or(ArtboardError::NothingToUndo)?;
        self.redo_stack.push(entry);
        self.redo_stack.last().ok_or(ArtboardError::NothingToUndo)
    }

    /// Pop the latest undone entry and move it back to the undo stack.
    ///
    /// Returns the entry so the caller can restore `after`.
    pub fn redo(&mut self) -> Result<&HistoryEntry> {
        let entry = self.redo_stack.pop().ok_or(ArtboardError::NothingToRedo)?;
        self.undo_stack.push(entry);
        self.undo_stack.last().ok_or(ArtboardError::NothingToRedo)
    }

    pub fn peek_undo(&self) -> Option<&HistoryEntry> {
        self.undo_stack.last()
    }

    pub fn peek_redo(&self) -> Option<&HistoryEntry> {
        self.redo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_undo_levels(&self) -> usize {
        self.max_undo_levels
    }

    /// Number of entries dropped by trimming or clearing
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Drop the oldest entries beyond `max_undo_levels`
    pub fn trim(&mut self) {
        let excess = self.undo_stack.len().saturating_sub(self.max_undo_levels);
        if excess > 0 {
            self.undo_stack.drain(..excess);
            self.discarded += excess;
        }
    }

    pub fn clear(&mut self) {
        self.discarded += self.undo_stack.len() + self.redo_stack.len();
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Undoable entries, most recent first
    pub fn summary(&self) -> Vec<(ActionType, &str)> {
        self.undo_stack
            .iter()
            .rev()
            .map(|e| (e.action, e.description.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{LayerStack, RasterLayer};

    fn snapshot(names: &[&str]) -> Document {
        let layers = names.iter().map(|n| RasterLayer::new(*n).into()).collect();
        Document::from_stack(&LayerStack::from_layers(layers).unwrap())
    }

    fn entry(description: &str) -> HistoryEntry {
        HistoryEntry::new(
            ActionType::InsertLayer,
            description,
            snapshot(&[]),
            snapshot(&[description]),
        )
    }

    #[test]
    fn test_new_history() {
        let history = History::new(10);
        assert_eq!(history.max_undo_levels(), 10);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_then_redo() {
        let mut history = History::default();
        history.push(entry("a"));

        let undone = history.undo().unwrap();
        assert_eq!(undone.description, "a");
        assert_eq!(history.redo_count(), 1);

        let redone = history.redo().unwrap();
        assert_eq!(redone.after.layers.len(), 1);
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_empty_history_errors() {
        let mut history = History::default();
        assert_eq!(history.undo().unwrap_err().error_code(), "NOTHING_TO_UNDO");
        assert_eq!(history.redo().unwrap_err().error_code(), "NOTHING_TO_REDO");
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::default();
        history.push(entry("a"));
        history.undo().unwrap();
        history.push(entry("b"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_trim_drops_oldest() {
        let mut history = History::new(3);
        for name in ["a", "b", "c", "d", "e"] {
            history.push(entry(name));
        }
        assert_eq!(history.undo_count(), 3);
        assert_eq!(history.discarded(), 2);
        let descriptions: Vec<_> = history.summary().into_iter().map(|(_, d)| d).collect();
        assert_eq!(descriptions, ["e", "d", "c"]);
    }

    #[test]
    fn test_clear() {
        let mut history = History::default();
        history.push(entry("a"));
        history.push(entry("b"));
        history.undo().unwrap();
        history.clear();
        assert_eq!(history.undo_count() + history.redo_count(), 0);
        assert_eq!(history.discarded(), 2);
    }
}

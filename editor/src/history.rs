//! Linear undo/redo history.
//!
//! Each entry is a full copy of the dashboard plus the selection at that
//! moment. Element ids are regenerated whenever a snapshot is restored, so
//! the selection is recorded as array indices rather than ids.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::dashboard::DashboardData;

/// One restorable editor state.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub data: DashboardData,
    /// Indices into `data.elements` that were selected.
    pub selected: Vec<usize>,
}

impl UndoEntry {
    #[must_use]
    pub fn new(data: DashboardData, selected: Vec<usize>) -> Self {
        Self { data, selected }
    }
}

/// Snapshot list with a cursor pointing at the current state.
#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    entries: Vec<UndoEntry>,
    cursor: usize,
}

impl UndoHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// History whose only entry is `entry`.
    #[must_use]
    pub fn with_initial(entry: UndoEntry) -> Self {
        Self { entries: vec![entry], cursor: 0 }
    }

    /// Drop everything and start over from `entry`.
    pub fn reset(&mut self, entry: UndoEntry) {
        self.entries = vec![entry];
        self.cursor = 0;
    }

    /// Record a new current state, discarding any redo tail.
    pub fn snapshot(&mut self, entry: UndoEntry) {
        if self.entries.is_empty() {
            self.entries.push(entry);
            self.cursor = 0;
            return;
        }
        self.cursor += 1;
        self.entries.truncate(self.cursor);
        self.entries.push(entry);
    }

    /// Overwrite the current state in place and drop any redo tail.
    ///
    /// Used to fold a run of edits to the same field into one undo step.
    pub fn replace_current(&mut self, entry: UndoEntry) {
        if self.entries.is_empty() {
            self.snapshot(entry);
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries[self.cursor] = entry;
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Step back; returns the state to restore.
    pub fn undo(&mut self) -> Option<&UndoEntry> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward; returns the state to restore.
    pub fn redo(&mut self) -> Option<&UndoEntry> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    #[must_use]
    pub fn current(&self) -> Option<&UndoEntry> {
        self.entries.get(self.cursor)
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

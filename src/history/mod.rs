//! Snapshot-based undo/redo
//!
//! [`HistoryStore`] keeps a bounded sequence of snapshots and a cursor. Pushing while the
//! cursor is not at the tail discards the redo tail first; once the store is full the oldest
//! snapshot is evicted and the cursor stays on the newest entry.

use std::collections::VecDeque;
use tracing::{debug, trace};

/// Default number of retained snapshots
pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded undo/redo history over snapshots of type `T`
#[derive(Debug, Clone)]
pub struct HistoryStore<T> {
    entries: VecDeque<T>,
    cursor: usize,
    capacity: usize,
}

impl<T: Clone> HistoryStore<T> {
    /// Create a history whose first entry is `initial`
    pub fn new(initial: T) -> Self {
        Self::with_capacity(initial, DEFAULT_CAPACITY)
    }

    /// Create a history with a custom capacity (at least 1)
    pub fn with_capacity(initial: T, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut entries = VecDeque::with_capacity(capacity);
        entries.push_back(initial);
        Self {
            entries,
            cursor: 0,
            capacity,
        }
    }

    /// Record a snapshot as the newest entry
    pub fn push(&mut self, snapshot: T) {
        let discarded = self.entries.len() - (self.cursor + 1);
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(snapshot);
        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            evicted += 1;
        }
        self.cursor = self.entries.len() - 1;
        debug!(
            entries = self.entries.len(),
            discarded_redo = discarded,
            evicted,
            "Recorded history snapshot"
        );
    }

    /// Step back one entry; `None` at the oldest entry
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        trace!(cursor = self.cursor, "Undo");
        self.entries.get(self.cursor)
    }

    /// Step forward one entry; `None` at the newest entry
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        trace!(cursor = self.cursor, "Redo");
        self.entries.get(self.cursor)
    }

    /// Whether an older entry exists
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a newer entry exists
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// The entry under the cursor
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a history holds at least its initial entry
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop everything and start over from `initial`
    pub fn reset(&mut self, initial: T) {
        self.entries.clear();
        self.entries.push_back(initial);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     H[HistoryStore] --> P[push]
    ///     H --> U[undo / redo]
    ///     H --> T[redo tail truncation]
    ///     H --> E[capacity eviction]
    /// ```

    #[test]
    fn test_undo_then_redo() {
        let mut history = HistoryStore::new("S0");
        history.push("S1");
        history.push("S2");

        assert_eq!(history.undo(), Some(&"S1"));
        assert_eq!(history.redo(), Some(&"S2"));
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_undo_is_clamped() {
        let mut history = HistoryStore::new(0);
        assert!(!history.can_undo());
        assert_eq!(history.undo(), None);
        assert_eq!(history.current(), Some(&0));
    }

    #[test]
    fn test_push_discards_redo_tail() {
        let mut history = HistoryStore::new(0);
        history.push(1);
        history.push(2);
        history.push(3);
        history.undo();
        history.undo();

        history.push(9);
        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some(&9));
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(&1));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = HistoryStore::new(0);
        for i in 1..=50 {
            history.push(i);
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history.cursor(), 49);
        assert_eq!(history.current(), Some(&50));

        let mut steps = 0;
        while history.undo().is_some() {
            steps += 1;
        }
        assert_eq!(steps, 49);
        assert_eq!(history.current(), Some(&1));
    }

    #[test]
    fn test_custom_capacity() {
        let mut history = HistoryStore::with_capacity('a', 2);
        history.push('b');
        history.push('c');
        assert_eq!(history.len(), 2);
        assert_eq!(history.undo(), Some(&'b'));
        assert!(!history.can_undo());
    }
}

//! Edit History
//!
//! A linear, bounded undo/redo log of paired before/after collection
//! snapshots. Structural operations change array shape and cross-cutting
//! derived fields, so a value-level snapshot per step is simpler and safer
//! than an inverse-operation log; the line count is bounded by one media
//! file's dialogue density, which keeps the O(n) memory per entry acceptable.

use std::sync::Arc;

use crate::subtitles::SubtitleLine;

/// One committed revision of the authoritative collection.
pub type Snapshot = Arc<Vec<SubtitleLine>>;

/// Paired snapshots of a single committed mutation.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub before: Snapshot,
    pub after: Snapshot,
}

/// Linear undo/redo history with a cursor and a fixed capacity.
///
/// The cursor counts applied entries: entries `[0, cursor)` are behind the
/// present, entries `[cursor, len)` are the redoable future.
#[derive(Debug)]
pub struct EditHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    capacity: usize,
}

impl EditHistory {
    /// Default maximum number of retained history entries.
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Records a committed mutation.
    ///
    /// Any entries beyond the cursor (a previously undone branch) are
    /// discarded first: a new edit invalidates the redo future. Once the
    /// capacity is exceeded the oldest entry is evicted from the head.
    pub fn record(&mut self, before: Snapshot, after: Snapshot) {
        self.entries.truncate(self.cursor);
        self.entries.push(HistoryEntry { before, after });
        self.cursor = self.entries.len();

        while self.entries.len() > self.capacity {
            self.entries.remove(0);
            self.cursor -= 1;
        }
    }

    /// Steps the cursor back and returns the entry to revert.
    ///
    /// The caller restores `before`. Returns `None` at the start of history.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    /// Steps the cursor forward and returns the entry to re-apply.
    ///
    /// The caller restores `after`. Returns `None` at the end of history.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if self.cursor == self.entries.len() {
            return None;
        }
        let entry = &self.entries[self.cursor];
        self.cursor += 1;
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Number of retained entries (applied and redoable).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

//! Selection & Transient-Line State Machine
//!
//! Tracks multi-selection of regions and the single in-progress line created
//! by a drag gesture on empty timeline space. At most one transient line may
//! exist; it lives outside the authoritative collection until committed.

use tracing::debug;

use crate::store::TimelineStore;
use crate::{LineId, TimeSec};

/// Observable state of the gesture machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    /// A drag-created, not-yet-committed line exists
    TransientActive,
    /// At least one region is selected
    Selecting,
}

/// A drag-created line that has not been committed into the store.
#[derive(Clone, Debug, PartialEq)]
pub struct TransientLine {
    pub start_time: TimeSec,
    pub end_time: TimeSec,
    pub text: String,
}

/// Selection set plus the transient-line singleton.
#[derive(Debug, Default)]
pub struct SelectionState {
    selected: Vec<LineId>,
    transient: Option<TransientLine>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        if self.transient.is_some() {
            GestureState::TransientActive
        } else if !self.selected.is_empty() {
            GestureState::Selecting
        } else {
            GestureState::Idle
        }
    }

    /// Currently selected line ids, in selection order.
    pub fn selected(&self) -> &[LineId] {
        &self.selected
    }

    pub fn transient(&self) -> Option<&TransientLine> {
        self.transient.as_ref()
    }

    // =========================================================================
    // Transient line
    // =========================================================================

    /// Starts a drag-create gesture. Any previous transient line is
    /// discarded first: at most one may exist.
    pub fn begin_transient(&mut self, start_time: TimeSec, end_time: TimeSec) {
        if self.transient.is_some() {
            debug!("Replacing existing transient line");
        }
        self.transient = Some(TransientLine {
            start_time: start_time.min(end_time),
            end_time: start_time.max(end_time),
            text: String::new(),
        });
    }

    /// Updates the in-progress drag bounds. No-op without a transient line.
    pub fn update_transient(&mut self, start_time: TimeSec, end_time: TimeSec) {
        if let Some(transient) = &mut self.transient {
            transient.start_time = start_time.min(end_time);
            transient.end_time = start_time.max(end_time);
        }
    }

    /// Commits the transient line into the store, returning its new id.
    ///
    /// Returns `None` when there is no transient line or its range is
    /// degenerate (zero width drags are discarded, not committed).
    pub fn commit_transient(&mut self, store: &mut TimelineStore) -> Option<LineId> {
        let transient = self.transient.take()?;
        if transient.start_time >= transient.end_time {
            debug!("Discarding zero-width transient line");
            return None;
        }
        let id = store.create_line(transient.start_time, transient.end_time, &transient.text);
        debug!(line_id = id, "Committed transient line");
        Some(id)
    }

    /// Discards the transient line without committing it.
    pub fn discard_transient(&mut self) {
        self.transient = None;
    }

    // =========================================================================
    // Selection set
    // =========================================================================

    /// Modifier-click: toggles a region's membership in the selection set.
    pub fn toggle_selected(&mut self, id: LineId) {
        match self.selected.iter().position(|&s| s == id) {
            Some(pos) => {
                self.selected.remove(pos);
            }
            None => self.selected.push(id),
        }
    }

    /// Plain click: the clicked region becomes the only selected one.
    pub fn select_only(&mut self, id: LineId) {
        self.selected.clear();
        self.selected.push(id);
    }

    /// Empty-space click: clears the selection set and any transient line.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.transient = None;
    }

    // =========================================================================
    // Selection commands
    // =========================================================================

    /// Merges the selected lines. Accepted only with ≥2 members; the
    /// selection is cleared afterwards.
    pub fn merge_selection(&mut self, store: &mut TimelineStore) {
        if self.selected.len() < 2 {
            debug!(selected = self.selected.len(), "Merge needs a multi-selection, ignoring");
            return;
        }
        store.merge_lines(&self.selected);
        self.selected.clear();
    }

    /// Groups the selected lines. Accepted only with ≥2 members; the
    /// selection is cleared afterwards.
    pub fn group_selection(&mut self, store: &mut TimelineStore) {
        if self.selected.len() < 2 {
            debug!(selected = self.selected.len(), "Grouping needs a multi-selection, ignoring");
            return;
        }
        store.group_lines(&self.selected);
        self.selected.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================

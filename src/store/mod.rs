//! Timeline Store
//!
//! Owns the authoritative ordered collection of subtitle lines and exposes
//! every structural and field mutator. Each mutator is transactional: it
//! computes a full next-state vector, normalizes it (sort order, group
//! integrity, neighbor fields), records a before/after snapshot pair in the
//! edit history, and only then publishes the new revision. The collection is
//! exposed as an immutable `Arc` value per revision; nothing outside the
//! store ever holds a writable reference.
//!
//! Mutators are total: invalid targets, status-forbidden edits, and
//! under-sized selections are silent no-ops that record nothing.

pub mod history;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::subtitles::{LineStatus, SubtitleLine};
use crate::{GroupId, LineId, TimeSec};

pub use history::{EditHistory, HistoryEntry, Snapshot};

/// Minimum duration a line keeps when a shift clamps it against zero.
const MIN_DURATION_SEC: TimeSec = 0.001;

/// Half of the gap inserted at a split boundary (100 ms total).
const SPLIT_GAP_HALF_SEC: TimeSec = 0.05;

/// Authoritative store for the subtitle line collection.
pub struct TimelineStore {
    lines: Snapshot,
    history: EditHistory,
    revision: u64,
}

impl TimelineStore {
    pub fn new() -> Self {
        Self {
            lines: Arc::new(Vec::new()),
            history: EditHistory::new(),
            revision: 0,
        }
    }

    /// Creates a store seeded with an imported collection.
    ///
    /// The seed is normalized but not recorded in history; undo cannot step
    /// back past an import.
    pub fn with_lines(lines: Vec<SubtitleLine>) -> Self {
        let mut lines = lines;
        Self::normalize(&mut lines);
        Self {
            lines: Arc::new(lines),
            history: EditHistory::new(),
            revision: 0,
        }
    }

    /// Replaces the default history capacity.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history = EditHistory::with_capacity(capacity);
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current revision of the collection.
    pub fn lines(&self) -> &Snapshot {
        &self.lines
    }

    /// Monotonic revision counter, bumped on every publish (including undo/redo).
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: LineId) -> Option<&SubtitleLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Returns the line active at a playback position, by range containment.
    pub fn line_at(&self, time: TimeSec) -> Option<&SubtitleLine> {
        self.lines.iter().find(|l| l.contains(time))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Next free line id (`max(existing) + 1`).
    pub fn next_id(&self) -> LineId {
        self.lines.iter().map(|l| l.id).max().unwrap_or(0) + 1
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Inserts a line and re-sorts. Never rejects; overlapping or duplicate
    /// time ranges are permitted.
    pub fn add_line(&mut self, line: SubtitleLine) {
        debug!(line_id = line.id, "Adding line");
        let mut next = self.lines.as_ref().clone();
        next.push(line);
        self.commit(next);
    }

    /// Allocates a fresh id and inserts a new normal line.
    pub fn create_line(&mut self, start_time: TimeSec, end_time: TimeSec, text: &str) -> LineId {
        let id = self.next_id();
        self.add_line(SubtitleLine::new(id, start_time, end_time, text));
        id
    }

    /// Removes a line. No-op if the id is absent.
    pub fn remove_line(&mut self, id: LineId) {
        if self.get(id).is_none() {
            debug!(line_id = id, "Remove target not found, ignoring");
            return;
        }
        let next: Vec<_> = self
            .lines
            .iter()
            .filter(|l| l.id != id)
            .cloned()
            .collect();
        self.commit(next);
    }

    /// Updates a line's text. Silent no-op when the target is absent or its
    /// status forbids editing.
    pub fn update_text(&mut self, id: LineId, text: &str) {
        let Some(target) = self.get(id) else {
            debug!(line_id = id, "Text edit target not found, ignoring");
            return;
        };
        if !target.is_editable() {
            debug!(line_id = id, status = ?target.status, "Text edit forbidden by status, ignoring");
            return;
        }
        if target.text == text {
            return;
        }

        let mut next = self.lines.as_ref().clone();
        if let Some(line) = next.iter_mut().find(|l| l.id == id) {
            line.text = text.to_string();
        }
        self.commit(next);
    }

    /// Updates a line's time range. Silent no-op when the target is absent,
    /// its status forbids editing, or the range is inverted.
    pub fn update_time(&mut self, id: LineId, start_time: TimeSec, end_time: TimeSec) {
        let Some(target) = self.get(id) else {
            debug!(line_id = id, "Time edit target not found, ignoring");
            return;
        };
        if !target.is_editable() {
            debug!(line_id = id, status = ?target.status, "Time edit forbidden by status, ignoring");
            return;
        }
        if !(start_time.is_finite() && end_time.is_finite() && start_time < end_time) {
            warn!(line_id = id, start_time, end_time, "Invalid time range, ignoring");
            return;
        }
        if target.start_time == start_time && target.end_time == end_time {
            return;
        }

        let mut next = self.lines.as_ref().clone();
        if let Some(line) = next.iter_mut().find(|l| l.id == id) {
            line.start_time = start_time;
            line.end_time = end_time;
        }
        self.commit(next);
    }

    /// Cycles a line's status: normal → locked → ignored → normal.
    pub fn toggle_status(&mut self, id: LineId) {
        if self.get(id).is_none() {
            debug!(line_id = id, "Status toggle target not found, ignoring");
            return;
        }
        let mut next = self.lines.as_ref().clone();
        if let Some(line) = next.iter_mut().find(|l| l.id == id) {
            line.status = line.status.cycled();
        }
        self.commit(next);
    }

    /// Shifts every line by an offset, regardless of status: a global
    /// re-sync with the source media must not be blocked by individual
    /// locks. Start times clamp to ≥0 and each line keeps a positive
    /// duration.
    pub fn shift_all(&mut self, offset_sec: TimeSec) {
        if !offset_sec.is_finite() || offset_sec == 0.0 || self.lines.is_empty() {
            return;
        }
        debug!(offset_sec, "Shifting all lines");

        let mut next = self.lines.as_ref().clone();
        for line in &mut next {
            let start = (line.start_time + offset_sec).max(0.0);
            let end = (line.end_time + offset_sec).max(start + MIN_DURATION_SEC);
            line.start_time = start;
            line.end_time = end;
        }
        self.commit(next);
    }

    /// Merges ≥2 normal lines into one.
    ///
    /// Targets are ordered chronologically; the result spans the earliest
    /// start to the latest end, joins the texts with line breaks, and keeps
    /// the id (and audio reference) of the chronologically-first input. All
    /// other inputs are removed. No-op if fewer than two targets resolve.
    pub fn merge_lines(&mut self, ids: &[LineId]) {
        let mut targets: Vec<&SubtitleLine> = self.resolve(ids, LineStatus::Normal);
        if targets.len() < 2 {
            debug!(requested = ids.len(), "Merge needs at least two normal lines, ignoring");
            return;
        }
        targets.sort_by(|a, b| {
            a.start_time
                .partial_cmp(&b.start_time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let first = targets[0];
        let mut merged = SubtitleLine::new(
            first.id,
            first.start_time,
            targets
                .iter()
                .map(|l| l.end_time)
                .fold(TimeSec::MIN, TimeSec::max),
            &targets
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        );
        merged.audio = first.audio.clone();

        debug!(kept_id = merged.id, absorbed = targets.len() - 1, "Merging lines");

        let absorbed: HashSet<LineId> = targets.iter().map(|l| l.id).collect();
        let mut next: Vec<_> = self
            .lines
            .iter()
            .filter(|l| !absorbed.contains(&l.id))
            .cloned()
            .collect();
        next.push(merged);
        self.commit(next);
    }

    /// Splits a normal line in two at its first whitespace character.
    ///
    /// The duration is divided in proportion to each half's character
    /// length; text without whitespace is copied to both halves with a 50/50
    /// time split. A 100 ms gap is opened at the boundary (shrunk for very
    /// short lines) so the resulting ranges never touch or overlap. The
    /// first half keeps the original id; the second gets a fresh one.
    /// Returns the new line's id, or `None` if the split was refused.
    pub fn split_line(&mut self, id: LineId) -> Option<LineId> {
        let target = self.get(id)?;
        if !target.is_editable() {
            debug!(line_id = id, status = ?target.status, "Split forbidden by status, ignoring");
            return None;
        }

        let (first_text, second_text) = match target.text.find(char::is_whitespace) {
            Some(pos) => {
                let (head, tail) = target.text.split_at(pos);
                (head.trim().to_string(), tail.trim().to_string())
            }
            None => (target.text.clone(), target.text.clone()),
        };

        let first_len = first_text.chars().count();
        let second_len = second_text.chars().count();
        let ratio = if first_len + second_len == 0 {
            0.5
        } else {
            first_len as f64 / (first_len + second_len) as f64
        };

        let start = target.start_time;
        let end = target.end_time;
        let duration = end - start;
        let gap_half = SPLIT_GAP_HALF_SEC.min(duration / 4.0);
        let boundary = (start + duration * ratio).clamp(start + 2.0 * gap_half, end - 2.0 * gap_half);

        let new_id = self.next_id();
        let mut first = SubtitleLine::new(id, start, boundary - gap_half, &first_text);
        first.status = target.status;
        let second = SubtitleLine::new(new_id, boundary + gap_half, end, &second_text);

        debug!(line_id = id, new_id, boundary, "Splitting line");

        let mut next: Vec<_> = self.lines.iter().filter(|l| l.id != id).cloned().collect();
        next.push(first);
        next.push(second);
        self.commit(next);
        Some(new_id)
    }

    /// Forms a contextual group from ≥2 lines.
    ///
    /// Every target receives a freshly generated group id; neighbor text and
    /// audio fields are derived from each member's ordinal neighbor within
    /// the group, sorted by start time, independent of the order ids were
    /// passed in. No-op with fewer than two resolvable targets.
    pub fn group_lines(&mut self, ids: &[LineId]) {
        let target_ids: HashSet<LineId> = self
            .lines
            .iter()
            .filter(|l| ids.contains(&l.id))
            .map(|l| l.id)
            .collect();
        if target_ids.len() < 2 {
            debug!(requested = ids.len(), "Grouping needs at least two lines, ignoring");
            return;
        }

        let group_id: GroupId = ulid::Ulid::new().to_string();
        debug!(group_id = %group_id, members = target_ids.len(), "Grouping lines");

        let mut next = self.lines.as_ref().clone();
        for line in &mut next {
            if target_ids.contains(&line.id) {
                line.clear_group_fields();
                line.group_id = Some(group_id.clone());
            }
        }
        // Neighbor fields are filled in by normalization
        self.commit(next);
    }

    /// Dissolves a group, clearing membership and neighbor fields.
    pub fn ungroup(&mut self, group_id: &str) {
        if !self.lines.iter().any(|l| l.group_id.as_deref() == Some(group_id)) {
            debug!(group_id, "Ungroup target not found, ignoring");
            return;
        }
        let mut next = self.lines.as_ref().clone();
        for line in &mut next {
            if line.group_id.as_deref() == Some(group_id) {
                line.clear_group_fields();
            }
        }
        self.commit(next);
    }

    // =========================================================================
    // Undo / Redo
    // =========================================================================

    /// Restores the previous revision. Returns false at the start of history.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.undo() else {
            debug!("Nothing to undo");
            return false;
        };
        self.lines = entry.before.clone();
        self.revision += 1;
        debug!(revision = self.revision, "Undo applied");
        true
    }

    /// Re-applies the next revision. Returns false at the end of history.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.redo() else {
            debug!("Nothing to redo");
            return false;
        };
        self.lines = entry.after.clone();
        self.revision += 1;
        debug!(revision = self.revision, "Redo applied");
        true
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Resolves requested ids to distinct existing lines of the given status.
    fn resolve(&self, ids: &[LineId], status: LineStatus) -> Vec<&SubtitleLine> {
        let requested: HashSet<LineId> = ids.iter().copied().collect();
        self.lines
            .iter()
            .filter(|l| requested.contains(&l.id) && l.status == status)
            .collect()
    }

    /// Normalizes and publishes a next-state vector as the new revision,
    /// recording the before/after pair in history.
    fn commit(&mut self, mut next: Vec<SubtitleLine>) {
        Self::normalize(&mut next);
        let after: Snapshot = Arc::new(next);
        self.history.record(self.lines.clone(), after.clone());
        self.lines = after;
        self.revision += 1;
    }

    /// Restores the collection invariants on a next-state vector: sorted by
    /// start time, groups with fewer than two members dissolved, and every
    /// grouped line's neighbor fields recomputed from its current group
    /// neighbors.
    fn normalize(lines: &mut [SubtitleLine]) {
        lines.sort_by(|a, b| {
            a.start_time
                .partial_cmp(&b.start_time)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });

        let mut group_ids: Vec<GroupId> = Vec::new();
        for line in lines.iter() {
            if let Some(gid) = &line.group_id {
                if !group_ids.contains(gid) {
                    group_ids.push(gid.clone());
                }
            }
        }

        for gid in group_ids {
            let members: Vec<usize> = lines
                .iter()
                .enumerate()
                .filter(|(_, l)| l.group_id.as_deref() == Some(gid.as_str()))
                .map(|(i, _)| i)
                .collect();

            if members.len() < 2 {
                for &i in &members {
                    lines[i].clear_group_fields();
                }
                continue;
            }

            // `lines` is sorted, so member order is chronological
            for (ord, &i) in members.iter().enumerate() {
                let prev = ord.checked_sub(1).map(|p| members[p]);
                let next = members.get(ord + 1).copied();

                let (prev_text, prev_audio) = match prev {
                    Some(p) => (Some(lines[p].text.clone()), lines[p].audio.clone()),
                    None => (None, None),
                };
                let (next_text, next_audio) = match next {
                    Some(n) => (Some(lines[n].text.clone()), lines[n].audio.clone()),
                    None => (None, None),
                };

                lines[i].prev_text = prev_text;
                lines[i].prev_audio = prev_audio;
                lines[i].next_text = next_text;
                lines[i].next_audio = next_audio;
            }
        }
    }
}

impl Default for TimelineStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

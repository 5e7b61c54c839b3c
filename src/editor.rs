//! Editor Container
//!
//! The root state container: owns the timeline store, the selection machine,
//! and the reconciler, and routes user gestures between them. The embedding
//! application owns exactly one `Editor` and passes it down by reference;
//! there is no process-wide singleton, and the undo history is private to
//! the store inside.
//!
//! Every gesture entry point checks the reconciler latch first: region
//! events fired while a reconciliation pass is in progress are programmatic
//! echoes, not user input, and must not re-enter the store.

use tracing::debug;

use crate::store::TimelineStore;
use crate::subtitles::{LineStatus, SubtitleDocument, SubtitleLine};
use crate::view::{GestureState, Reconciler, RegionHost, SelectionState};
use crate::{LineId, TimeSec};

// =============================================================================
// Collaborator Boundary
// =============================================================================

/// Seek request emitted toward the playback collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeekRequest {
    pub position_sec: TimeSec,
}

/// Flashcard creation request: a by-value snapshot of a line at the moment
/// of request, keyed by its id. The engine does not track what downstream
/// artifacts reference a line afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct CardRequest {
    pub line: SubtitleLine,
}

// =============================================================================
// Editor
// =============================================================================

/// Root container composing the store, selection machine, and reconciler.
pub struct Editor {
    store: TimelineStore,
    selection: SelectionState,
    reconciler: Reconciler,
}

impl Editor {
    pub fn new() -> Self {
        Self {
            store: TimelineStore::new(),
            selection: SelectionState::new(),
            reconciler: Reconciler::new(),
        }
    }

    /// Creates an editor over an imported subtitle document.
    pub fn from_document(document: SubtitleDocument) -> Self {
        Self {
            store: TimelineStore::with_lines(document.lines),
            selection: SelectionState::new(),
            reconciler: Reconciler::new(),
        }
    }

    pub fn store(&self) -> &TimelineStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn gesture_state(&self) -> GestureState {
        self.selection.state()
    }

    /// Re-derives the hosted regions from the current collection.
    pub fn sync(&mut self, host: &mut dyn RegionHost) {
        self.reconciler.reconcile(self.store.lines(), host);
    }

    /// Sets the global region visibility toggle and reconciles.
    pub fn set_hidden(&mut self, hidden: bool, host: &mut dyn RegionHost) {
        self.reconciler.set_hide_all(hidden);
        self.sync(host);
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    /// Drag-create on empty timeline space.
    pub fn drag_create(&mut self, start_time: TimeSec, end_time: TimeSec) {
        if self.reconciler.is_reconciling() {
            return;
        }
        self.selection.begin_transient(start_time, end_time);
    }

    /// Continued drag of the transient line.
    pub fn drag_update(&mut self, start_time: TimeSec, end_time: TimeSec) {
        if self.reconciler.is_reconciling() {
            return;
        }
        self.selection.update_transient(start_time, end_time);
    }

    /// Drag release: commits the transient line into the collection.
    pub fn drag_commit(&mut self, host: &mut dyn RegionHost) -> Option<LineId> {
        if self.reconciler.is_reconciling() {
            return None;
        }
        let id = self.selection.commit_transient(&mut self.store)?;
        self.sync(host);
        Some(id)
    }

    /// Click on an existing region. With a modifier key the region's
    /// selection membership toggles; a plain click makes it the sole
    /// selection.
    pub fn click_region(&mut self, id: LineId, modifier: bool) {
        if self.reconciler.is_reconciling() {
            return;
        }
        if modifier {
            self.selection.toggle_selected(id);
        } else {
            self.selection.select_only(id);
        }
    }

    /// Click on empty timeline space: clears selection and transient line.
    pub fn click_empty(&mut self) {
        if self.reconciler.is_reconciling() {
            return;
        }
        self.selection.clear();
    }

    /// A region was dragged or resized by the user.
    pub fn region_moved(
        &mut self,
        id: LineId,
        start_time: TimeSec,
        end_time: TimeSec,
        host: &mut dyn RegionHost,
    ) {
        if self.reconciler.is_reconciling() {
            debug!(line_id = id, "Region change during reconciliation, ignoring");
            return;
        }
        self.store.update_time(id, start_time, end_time);
        self.sync(host);
    }

    // =========================================================================
    // Edit commands
    // =========================================================================

    pub fn update_text(&mut self, id: LineId, text: &str, host: &mut dyn RegionHost) {
        self.store.update_text(id, text);
        self.sync(host);
    }

    pub fn toggle_status(&mut self, id: LineId, host: &mut dyn RegionHost) {
        self.store.toggle_status(id);
        self.sync(host);
    }

    pub fn remove_line(&mut self, id: LineId, host: &mut dyn RegionHost) {
        self.store.remove_line(id);
        self.sync(host);
    }

    pub fn split_line(&mut self, id: LineId, host: &mut dyn RegionHost) -> Option<LineId> {
        let new_id = self.store.split_line(id);
        self.sync(host);
        new_id
    }

    pub fn shift_all(&mut self, offset_sec: TimeSec, host: &mut dyn RegionHost) {
        self.store.shift_all(offset_sec);
        self.sync(host);
    }

    /// Merges the current multi-selection.
    pub fn merge_selection(&mut self, host: &mut dyn RegionHost) {
        self.selection.merge_selection(&mut self.store);
        self.sync(host);
    }

    /// Groups the current multi-selection.
    pub fn group_selection(&mut self, host: &mut dyn RegionHost) {
        self.selection.group_selection(&mut self.store);
        self.sync(host);
    }

    pub fn ungroup(&mut self, group_id: &str, host: &mut dyn RegionHost) {
        self.store.ungroup(group_id);
        self.sync(host);
    }

    pub fn undo(&mut self, host: &mut dyn RegionHost) -> bool {
        let applied = self.store.undo();
        if applied {
            self.sync(host);
        }
        applied
    }

    pub fn redo(&mut self, host: &mut dyn RegionHost) -> bool {
        let applied = self.store.redo();
        if applied {
            self.sync(host);
        }
        applied
    }

    // =========================================================================
    // Playback & Artifacts
    // =========================================================================

    /// Playback-position callback: returns the line active at the given
    /// time, by range containment.
    pub fn playhead(&self, time: TimeSec) -> Option<LineId> {
        self.store.line_at(time).map(|l| l.id)
    }

    /// Builds a seek request toward the playback collaborator for a line's
    /// start. `None` if the line does not exist.
    pub fn seek_to_line(&self, id: LineId) -> Option<SeekRequest> {
        self.store.get(id).map(|l| SeekRequest {
            position_sec: l.start_time,
        })
    }

    /// Builds a flashcard creation request from a line snapshot. Only
    /// normal lines may become downstream artifacts.
    pub fn request_card(&self, id: LineId) -> Option<CardRequest> {
        let line = self.store.get(id)?;
        if line.status != LineStatus::Normal {
            debug!(line_id = id, status = ?line.status, "Card request refused by status");
            return None;
        }
        Some(CardRequest { line: line.clone() })
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::parse_subtitles;
    use crate::view::Region;

    #[derive(Default)]
    struct MockHost {
        regions: Vec<Region>,
        mutations: usize,
    }

    impl RegionHost for MockHost {
        fn regions(&self) -> Vec<Region> {
            self.regions.clone()
        }

        fn add_region(&mut self, region: Region) {
            self.regions.push(region);
            self.mutations += 1;
        }

        fn update_region(&mut self, region: Region) {
            if let Some(slot) = self.regions.iter_mut().find(|r| r.key == region.key) {
                *slot = region;
            }
            self.mutations += 1;
        }

        fn remove_region(&mut self, key: &str) {
            self.regions.retain(|r| r.key != key);
            self.mutations += 1;
        }
    }

    fn editor_with_lines() -> Editor {
        Editor::from_document(SubtitleDocument {
            lines: vec![
                SubtitleLine::new(1, 0.0, 2.0, "a"),
                SubtitleLine::new(2, 3.0, 5.0, "b"),
            ],
            style: Default::default(),
        })
    }

    #[test]
    fn drag_create_commit_adds_line_and_region() {
        let mut editor = editor_with_lines();
        let mut host = MockHost::default();
        editor.sync(&mut host);

        editor.drag_create(6.0, 6.5);
        assert_eq!(editor.gesture_state(), GestureState::TransientActive);
        // Transient line is not yet in the store or the host
        assert_eq!(editor.store().len(), 2);

        editor.drag_update(6.0, 8.0);
        let id = editor.drag_commit(&mut host).unwrap();

        assert_eq!(id, 3);
        assert_eq!(editor.store().len(), 3);
        assert_eq!(host.regions.len(), 3);
        assert_eq!(editor.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn click_flows_drive_selection() {
        let mut editor = editor_with_lines();

        editor.click_region(1, false);
        assert_eq!(editor.selection().selected(), &[1]);

        editor.click_region(2, true);
        assert_eq!(editor.selection().selected(), &[1, 2]);
        assert_eq!(editor.gesture_state(), GestureState::Selecting);

        editor.click_empty();
        assert_eq!(editor.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn region_drag_updates_store_and_resyncs() {
        let mut editor = editor_with_lines();
        let mut host = MockHost::default();
        editor.sync(&mut host);

        editor.region_moved(1, 0.5, 2.5, &mut host);

        assert_eq!(editor.store().get(1).unwrap().start_time, 0.5);
        let region = host.regions.iter().find(|r| r.key == "1").unwrap();
        assert_eq!(region.start_sec, 0.5);
        assert_eq!(region.end_sec, 2.5);
    }

    #[test]
    fn gestures_ignored_while_reconciling() {
        let mut editor = editor_with_lines();
        let mut host = MockHost::default();
        editor.sync(&mut host);

        // Raise the latch as a reconciliation pass would: region events in
        // this window are programmatic echoes, not user input
        editor.reconciler.reconciling = true;

        let revision = editor.store().revision();
        editor.drag_create(6.0, 7.0);
        editor.click_region(1, false);
        editor.region_moved(1, 0.5, 2.5, &mut host);

        assert_eq!(editor.gesture_state(), GestureState::Idle);
        assert!(editor.selection().selected().is_empty());
        assert_eq!(editor.store().revision(), revision);
        assert_eq!(editor.store().get(1).unwrap().start_time, 0.0);

        // Once released, the same gestures take effect
        editor.reconciler.reconciling = false;
        editor.drag_create(6.0, 7.0);
        assert_eq!(editor.gesture_state(), GestureState::TransientActive);
    }

    #[test]
    fn merge_selection_merges_and_clears() {
        let mut editor = editor_with_lines();
        let mut host = MockHost::default();
        editor.sync(&mut host);

        editor.click_region(1, false);
        editor.click_region(2, true);
        editor.merge_selection(&mut host);

        assert_eq!(editor.store().len(), 1);
        assert_eq!(host.regions.len(), 1);
        assert_eq!(editor.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn undo_redo_resync_regions() {
        let mut editor = editor_with_lines();
        let mut host = MockHost::default();
        editor.sync(&mut host);

        editor.remove_line(1, &mut host);
        assert_eq!(host.regions.len(), 1);

        assert!(editor.undo(&mut host));
        assert_eq!(host.regions.len(), 2);

        assert!(editor.redo(&mut host));
        assert_eq!(host.regions.len(), 1);

        // Past the end of history: no-op, no resync churn
        let mutations = host.mutations;
        assert!(!editor.redo(&mut host));
        assert_eq!(host.mutations, mutations);
    }

    #[test]
    fn playhead_and_seek() {
        let editor = editor_with_lines();
        assert_eq!(editor.playhead(1.0), Some(1));
        assert_eq!(editor.playhead(2.5), None);
        assert_eq!(editor.playhead(5.0), Some(2));

        assert_eq!(editor.seek_to_line(2).unwrap().position_sec, 3.0);
        assert!(editor.seek_to_line(42).is_none());
    }

    #[test]
    fn card_requests_only_for_normal_lines() {
        let mut editor = editor_with_lines();
        let mut host = MockHost::default();

        let card = editor.request_card(1).unwrap();
        assert_eq!(card.line.id, 1);
        assert_eq!(card.line.text, "a");

        editor.toggle_status(1, &mut host); // now locked
        assert!(editor.request_card(1).is_none());
        assert!(editor.request_card(42).is_none());
    }

    #[test]
    fn card_is_a_snapshot_not_a_reference() {
        let mut editor = editor_with_lines();
        let mut host = MockHost::default();

        let card = editor.request_card(1).unwrap();
        editor.update_text(1, "changed later", &mut host);
        assert_eq!(card.line.text, "a");
    }

    #[test]
    fn hide_all_clears_regions_until_reenabled() {
        let mut editor = editor_with_lines();
        let mut host = MockHost::default();
        editor.sync(&mut host);

        editor.set_hidden(true, &mut host);
        assert!(host.regions.is_empty());

        editor.set_hidden(false, &mut host);
        assert_eq!(host.regions.len(), 2);
    }

    #[test]
    fn import_merge_undo_end_to_end() {
        let srt = "1\n00:00:01.000 --> 00:00:04.000\nHello\n\n2\n00:00:05.000 --> 00:00:08.000\nWorld\n";

        let document = parse_subtitles(srt);
        let mut editor = Editor::from_document(document);
        let mut host = MockHost::default();
        editor.sync(&mut host);

        let lines = editor.store().lines().clone();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].id, 1);
        assert_eq!(lines[1].id, 2);
        assert!(lines.iter().all(|l| l.status == LineStatus::Normal));

        editor.click_region(1, false);
        editor.click_region(2, true);
        editor.merge_selection(&mut host);

        let merged = editor.store().lines();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start_time, 1.0);
        assert_eq!(merged[0].end_time, 8.0);
        assert_eq!(merged[0].text, "Hello\nWorld");
        assert_eq!(host.regions.len(), 1);

        assert!(editor.undo(&mut host));
        assert_eq!(editor.store().lines().as_ref(), lines.as_ref());
        assert_eq!(host.regions.len(), 2);
    }
}

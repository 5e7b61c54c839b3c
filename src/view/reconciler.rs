//! View Reconciler
//!
//! One-directional synchronization from the authoritative line collection to
//! the visual regions hosted by the timeline widget. Runs after every store
//! publish (including undo/redo) and applies the minimal set of region
//! inserts, updates, and removals.
//!
//! A boolean latch marks a reconciliation pass in progress. It is not a
//! lock: the engine is single-threaded and cooperative. Its only purpose is
//! to break logical recursion, so that region-change callbacks fired by a
//! programmatic update are distinguishable from user gestures and do not
//! re-enter the store mutators.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::subtitles::{LineStatus, SubtitleLine};
use crate::TimeSec;

// =============================================================================
// Region
// =============================================================================

/// Display color class of a region, derived from line state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionColor {
    Normal,
    Locked,
    Ignored,
    Grouped,
}

/// The visual, directly-manipulable representation of one line.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// Line id rendered as a string, the widget-side key
    pub key: String,
    pub start_sec: TimeSec,
    pub end_sec: TimeSec,
    pub text: String,
    pub color: RegionColor,
    /// Whether the user may drag the region along the time axis
    pub draggable: bool,
    /// Whether the user may resize the region's edges
    pub resizable: bool,
}

impl Region {
    /// Derives the region a line should currently be displayed as.
    /// Interaction flags are disabled for locked and ignored lines.
    pub fn from_line(line: &SubtitleLine) -> Self {
        let color = match line.status {
            LineStatus::Locked => RegionColor::Locked,
            LineStatus::Ignored => RegionColor::Ignored,
            LineStatus::Normal if line.group_id.is_some() => RegionColor::Grouped,
            LineStatus::Normal => RegionColor::Normal,
        };
        let interactive = line.status == LineStatus::Normal;

        Self {
            key: line.id.to_string(),
            start_sec: line.start_time,
            end_sec: line.end_time,
            text: line.text.clone(),
            color,
            draggable: interactive,
            resizable: interactive,
        }
    }
}

// =============================================================================
// Region Host
// =============================================================================

/// The widget boundary: whatever renders regions implements this.
///
/// The reconciler only reads a snapshot and issues minimal mutations; the
/// host never receives a writable reference to the line collection.
pub trait RegionHost {
    /// Snapshot of the currently displayed regions.
    fn regions(&self) -> Vec<Region>;
    fn add_region(&mut self, region: Region);
    fn update_region(&mut self, region: Region);
    fn remove_region(&mut self, key: &str);
}

// =============================================================================
// Reconciler
// =============================================================================

/// Diffs the authoritative collection against the hosted regions.
#[derive(Debug, Default)]
pub struct Reconciler {
    pub(crate) reconciling: bool,
    hide_all: bool,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a reconciliation pass is running. Gesture handlers must
    /// treat region-change events as programmatic while this is raised.
    pub fn is_reconciling(&self) -> bool {
        self.reconciling
    }

    pub fn hide_all(&self) -> bool {
        self.hide_all
    }

    /// Sets the global visibility toggle. Takes effect on the next pass.
    pub fn set_hide_all(&mut self, hide_all: bool) {
        self.hide_all = hide_all;
    }

    /// Makes the hosted regions match the collection.
    ///
    /// Existing regions are updated only when a field actually differs, so
    /// an unchanged collection produces zero host mutations. Returns false
    /// if the pass was refused because one was already in progress.
    pub fn reconcile(&mut self, lines: &[SubtitleLine], host: &mut dyn RegionHost) -> bool {
        if self.reconciling {
            warn!("Reconciliation already in progress, refusing re-entrant pass");
            return false;
        }
        self.reconciling = true;

        let mut existing: HashMap<String, Region> = host
            .regions()
            .into_iter()
            .map(|r| (r.key.clone(), r))
            .collect();

        if self.hide_all {
            for key in existing.keys() {
                host.remove_region(key);
            }
            self.reconciling = false;
            return true;
        }

        let mut created = 0usize;
        let mut updated = 0usize;

        for line in lines {
            let desired = Region::from_line(line);
            match existing.remove(&desired.key) {
                Some(current) => {
                    if current != desired {
                        host.update_region(desired);
                        updated += 1;
                    }
                }
                None => {
                    host.add_region(desired);
                    created += 1;
                }
            }
        }

        // Whatever was not visited no longer has a backing line
        let removed = existing.len();
        for key in existing.keys() {
            host.remove_region(key);
        }

        if created + updated + removed > 0 {
            debug!(created, updated, removed, "Reconciled regions");
        }

        self.reconciling = false;
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

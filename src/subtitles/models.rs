//! Subtitle Line Data Model
//!
//! Defines the unit of editing: a time-ranged text line with an edit status
//! and optional contextual-group membership.

use serde::{Deserialize, Serialize};

use crate::{GroupId, LineId, TimeSec};

// =============================================================================
// Line Status
// =============================================================================

/// Edit status of a subtitle line.
///
/// `Locked` and `Ignored` both forbid text and time mutation via direct
/// edit; only `Normal` lines may be merged, split, or turned into downstream
/// flashcard artifacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    #[default]
    Normal,
    Locked,
    Ignored,
}

impl LineStatus {
    /// Advances to the next status in the toggle cycle.
    pub fn cycled(self) -> Self {
        match self {
            Self::Normal => Self::Locked,
            Self::Locked => Self::Ignored,
            Self::Ignored => Self::Normal,
        }
    }
}

// =============================================================================
// Subtitle Line
// =============================================================================

/// A single subtitle line aligned against the media time axis.
///
/// The `prev_*`/`next_*` fields are populated only for grouped lines and
/// give each member a read-only view of its immediate neighbor within the
/// group, ordered by start time. They are recomputed by the store on every
/// commit, so they never go stale when a sibling is edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SubtitleLineWire")]
pub struct SubtitleLine {
    /// Unique identifier, monotonically allocated within a session
    pub id: LineId,
    /// Start time in seconds
    pub start_time: TimeSec,
    /// End time in seconds
    pub end_time: TimeSec,
    /// Dialogue text (may contain line breaks)
    pub text: String,
    /// Edit status
    #[serde(default)]
    pub status: LineStatus,
    /// Contextual group membership (present iff part of a ≥2 group)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    /// Reference to an externally extracted audio clip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Previous group neighbor's text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_text: Option<String>,
    /// Previous group neighbor's audio reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_audio: Option<String>,
    /// Next group neighbor's text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_text: Option<String>,
    /// Next group neighbor's audio reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_audio: Option<String>,
}

impl SubtitleLine {
    /// Creates a new line with the given id, timing, and text.
    pub fn new(id: LineId, start_time: TimeSec, end_time: TimeSec, text: &str) -> Self {
        Self {
            id,
            start_time,
            end_time,
            text: text.to_string(),
            status: LineStatus::Normal,
            group_id: None,
            audio: None,
            prev_text: None,
            prev_audio: None,
            next_text: None,
            next_audio: None,
        }
    }

    /// Sets the status
    pub fn with_status(mut self, status: LineStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the audio clip reference
    pub fn with_audio(mut self, audio: &str) -> Self {
        self.audio = Some(audio.to_string());
        self
    }

    /// Returns the duration of this line in seconds
    pub fn duration(&self) -> TimeSec {
        self.end_time - self.start_time
    }

    /// Returns true if the playback position falls within this line's range
    pub fn contains(&self, time: TimeSec) -> bool {
        time >= self.start_time && time <= self.end_time
    }

    /// Returns true if direct text/time edits are permitted
    pub fn is_editable(&self) -> bool {
        self.status == LineStatus::Normal
    }

    /// Clears group membership and all cached neighbor fields
    pub fn clear_group_fields(&mut self) {
        self.group_id = None;
        self.prev_text = None;
        self.prev_audio = None;
        self.next_text = None;
        self.next_audio = None;
    }
}

// =============================================================================
// Wire Migration
// =============================================================================

/// Deserialization shape accepting both the current `status` field and the
/// legacy boolean `locked` field (`locked=true` → `Locked`, else `Normal`).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubtitleLineWire {
    id: LineId,
    start_time: TimeSec,
    end_time: TimeSec,
    #[serde(default)]
    text: String,
    #[serde(default)]
    status: Option<LineStatus>,
    #[serde(default)]
    locked: Option<bool>,
    #[serde(default)]
    group_id: Option<GroupId>,
    #[serde(default)]
    audio: Option<String>,
    #[serde(default)]
    prev_text: Option<String>,
    #[serde(default)]
    prev_audio: Option<String>,
    #[serde(default)]
    next_text: Option<String>,
    #[serde(default)]
    next_audio: Option<String>,
}

impl From<SubtitleLineWire> for SubtitleLine {
    fn from(wire: SubtitleLineWire) -> Self {
        let status = match (wire.status, wire.locked) {
            (Some(status), _) => status,
            (None, Some(true)) => LineStatus::Locked,
            _ => LineStatus::Normal,
        };

        Self {
            id: wire.id,
            start_time: wire.start_time,
            end_time: wire.end_time,
            text: wire.text,
            status,
            group_id: wire.group_id,
            audio: wire.audio,
            prev_text: wire.prev_text,
            prev_audio: wire.prev_audio,
            next_text: wire.next_text,
            next_audio: wire.next_audio,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_creation() {
        let line = SubtitleLine::new(1, 0.5, 3.0, "Hello");
        assert_eq!(line.id, 1);
        assert_eq!(line.start_time, 0.5);
        assert_eq!(line.end_time, 3.0);
        assert_eq!(line.text, "Hello");
        assert_eq!(line.status, LineStatus::Normal);
        assert!(line.group_id.is_none());
    }

    #[test]
    fn line_duration_and_containment() {
        let line = SubtitleLine::new(1, 2.0, 5.0, "Test");
        assert_eq!(line.duration(), 3.0);
        assert!(!line.contains(1.99));
        assert!(line.contains(2.0));
        assert!(line.contains(3.5));
        assert!(line.contains(5.0));
        assert!(!line.contains(5.01));
    }

    #[test]
    fn status_cycle() {
        assert_eq!(LineStatus::Normal.cycled(), LineStatus::Locked);
        assert_eq!(LineStatus::Locked.cycled(), LineStatus::Ignored);
        assert_eq!(LineStatus::Ignored.cycled(), LineStatus::Normal);
    }

    #[test]
    fn serialization_uses_camel_case() {
        let line = SubtitleLine::new(3, 1.0, 4.0, "Hi");
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains("\"startTime\":1.0"));
        assert!(json.contains("\"endTime\":4.0"));
        assert!(json.contains("\"status\":\"normal\""));
        // Unset optionals are omitted entirely
        assert!(!json.contains("groupId"));
        assert!(!json.contains("prevText"));
    }

    #[test]
    fn deserialization_round_trip() {
        let mut line = SubtitleLine::new(7, 2.5, 6.0, "Line").with_audio("clip_7.mp3");
        line.status = LineStatus::Ignored;
        let json = serde_json::to_string(&line).unwrap();
        let parsed: SubtitleLine = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, line);
    }

    #[test]
    fn legacy_locked_true_maps_to_locked_status() {
        let json = r#"{"id":1,"startTime":0.0,"endTime":2.0,"text":"old","locked":true}"#;
        let line: SubtitleLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.status, LineStatus::Locked);
    }

    #[test]
    fn legacy_locked_false_maps_to_normal_status() {
        let json = r#"{"id":1,"startTime":0.0,"endTime":2.0,"text":"old","locked":false}"#;
        let line: SubtitleLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.status, LineStatus::Normal);
    }

    #[test]
    fn explicit_status_wins_over_legacy_flag() {
        let json =
            r#"{"id":1,"startTime":0.0,"endTime":2.0,"text":"x","status":"ignored","locked":true}"#;
        let line: SubtitleLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.status, LineStatus::Ignored);
    }
}

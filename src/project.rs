//! Project File Persistence
//!
//! Saves and loads the line collection as JSON. Loading accepts both the
//! current envelope (`{ version, lines }`) and the legacy format, a bare
//! array of line records carrying the old boolean `locked` field; the line
//! deserializer translates that field to the current status enum.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::subtitles::SubtitleLine;
use crate::{CoreError, CoreResult};

/// Current project file format version.
pub const PROJECT_VERSION: u32 = 2;

/// On-disk project shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub version: u32,
    pub lines: Vec<SubtitleLine>,
}

/// Serializes the collection to a project file.
pub fn save_project(path: &Path, lines: &[SubtitleLine]) -> CoreResult<()> {
    let project = ProjectFile {
        version: PROJECT_VERSION,
        lines: lines.to_vec(),
    };
    let json = serde_json::to_string_pretty(&project)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), count = lines.len(), "Saved project");
    Ok(())
}

/// Loads a project file, current or legacy format.
pub fn load_project(path: &Path) -> CoreResult<Vec<SubtitleLine>> {
    let content = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    let lines = if value.is_array() {
        // Legacy format: a bare array of line records
        serde_json::from_value::<Vec<SubtitleLine>>(value)?
    } else {
        serde_json::from_value::<ProjectFile>(value)
            .map_err(|e| CoreError::ProjectCorrupted(e.to_string()))?
            .lines
    };

    debug!(path = %path.display(), count = lines.len(), "Loaded project");
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::LineStatus;
    use tempfile::TempDir;

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.json");

        let lines = vec![
            SubtitleLine::new(1, 0.0, 2.0, "a").with_audio("clip_1.mp3"),
            SubtitleLine::new(2, 3.0, 5.0, "b").with_status(LineStatus::Locked),
        ];
        save_project(&path, &lines).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded, lines);
    }

    #[test]
    fn load_legacy_array_with_locked_flags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old_project.json");

        let legacy = r#"[
            {"id": 1, "startTime": 0.0, "endTime": 2.0, "text": "a", "locked": true},
            {"id": 2, "startTime": 3.0, "endTime": 5.0, "text": "b", "locked": false}
        ]"#;
        fs::write(&path, legacy).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].status, LineStatus::Locked);
        assert_eq!(loaded[1].status, LineStatus::Normal);
    }

    #[test]
    fn load_missing_file_reports_io_error() {
        let dir = TempDir::new().unwrap();
        let result = load_project(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(CoreError::IoError(_))));
    }

    #[test]
    fn load_corrupt_envelope_reports_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"unexpected": true}"#).unwrap();

        let result = load_project(&path);
        assert!(matches!(result, Err(CoreError::ProjectCorrupted(_))));
    }
}

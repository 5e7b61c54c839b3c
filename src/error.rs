//! Subcue Error Definitions
//!
//! Errors only occur at the file boundary (project load/save). The editing
//! mutators themselves are total over their input domain: an invalid target,
//! a status-forbidden edit, or an out-of-bounds undo are silent no-ops, so a
//! stale id raced by the UI never aborts a live editing session.

use thiserror::Error;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Project file corrupted: {0}")]
    ProjectCorrupted(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

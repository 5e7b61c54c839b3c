//! Subtitle Line Domain
//!
//! Data model for time-ranged subtitle lines and the plain-text dialogue
//! file format they are imported from and exported to.

pub mod formats;
pub mod models;

pub use formats::{export_subtitles, parse_subtitles, SubtitleDocument, TimestampStyle};
pub use models::{LineStatus, SubtitleLine};

//! Core Type Definitions
//!
//! Fundamental aliases used throughout the engine.

/// Subtitle line unique identifier.
///
/// Allocated as `max(existing ids) + 1`; never reused within a session.
pub type LineId = u32;

/// Contextual group identifier (ULID string).
pub type GroupId = String;

/// Time in seconds (floating point)
pub type TimeSec = f64;

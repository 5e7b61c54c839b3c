//! Subcue Editing Engine
//!
//! Core engine for an interactive subtitle timeline editor: an ordered,
//! time-ranged line collection with structural edit operations, a linear
//! undo/redo history, and a reconciliation protocol that keeps a visual
//! region representation synchronized with the authoritative collection.
//!
//! Media playback, audio extraction, and flashcard export live outside this
//! crate; the engine only speaks to them through small value types at the
//! boundary ([`editor::SeekRequest`], [`editor::CardRequest`]).

pub mod editor;
pub mod project;
pub mod store;
pub mod subtitles;
pub mod timecode;
pub mod view;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;

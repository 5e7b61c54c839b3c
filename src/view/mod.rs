//! View Layer
//!
//! The visual side of the engine: regions (the directly-manipulable
//! representation of lines on the timeline widget), the reconciler that
//! keeps them matching the authoritative collection, and the selection /
//! transient-line gesture state machine.

pub mod reconciler;
pub mod selection;

pub use reconciler::{Reconciler, Region, RegionColor, RegionHost};
pub use selection::{GestureState, SelectionState, TransientLine};

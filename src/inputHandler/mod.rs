// Input handler module for pointer-driven window dragging
// Tracks drag gestures and the host listeners/observers they need

pub mod draggable;
pub mod types;

pub use draggable::Draggable;
pub use types::*;

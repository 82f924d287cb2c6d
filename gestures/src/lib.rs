//! Airboard gestures - hand-landmark gesture recognition for air drawing.
//!
//! Turns per-frame hand landmarks from a MediaPipe-style tracker into pinch,
//! scissors, and dwell gestures.  The `ipc` module replays recorded landmark
//! streams as s-expression messages.

pub mod gesture;
pub mod ipc;

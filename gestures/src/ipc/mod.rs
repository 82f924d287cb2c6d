//! Replay IPC: s-expression messages driving a [`GestureEngine`] offline.
//!
//! [`GestureEngine`]: crate::gesture::GestureEngine

pub mod dispatch;

pub use dispatch::{handle_message, ReplaySession};

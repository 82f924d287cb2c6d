//! Hand-landmark gesture recognition.
//!
//! Provides:
//! - `landmarks`: the 21-point hand model, frame sizes, validated observations
//! - `geometry`: landmark distances and hand area
//! - `tip_distance`: pinch and scissors detectors
//! - `dwell`: hold-still detector with a fire-once callback
//! - `clock`: monotonic and manual time sources
//! - `engine`: runs all detectors per frame and emits events

pub mod clock;
pub mod dwell;
pub mod engine;
pub mod geometry;
pub mod landmarks;
pub mod tip_distance;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use dwell::{DwellConfig, DwellGestureDetector, DwellState, DwellTrigger};
pub use engine::{DrawPoint, GestureConfig, GestureEngine, GestureEvent, GestureType};
pub use geometry::{distance, hand_area, planar_distance};
pub use landmarks::{
    parse_landmark, FrameSize, HandLandmark, HandObservation, Landmark, LANDMARK_COUNT,
};
pub use tip_distance::{
    PinchGestureDetector, ScissorsGestureDetector, TipDistanceConfig, TipDistanceDetector,
    TipGesture, TipMeasurement,
};

//! Scale-invariant fingertip proximity gestures: pinch and scissors.
//!
//! Both gestures compare the distance between two fingertips against a
//! threshold proportional to a reference length on the same hand, so the
//! decision does not change with hand size or distance from the camera.
//! Detection is frame-local: nothing carries over between updates except
//! the last result.

use tracing::debug;

use super::landmarks::{FrameSize, HandLandmark, HandObservation, Landmark};

/// Default pinch threshold, as a fraction of wrist-to-thumb-tip length.
pub const DEFAULT_PINCH_THRESHOLD: f64 = 0.1;

/// Default scissors threshold, as a fraction of wrist-to-middle-tip length.
pub const DEFAULT_SCISSORS_THRESHOLD: f64 = 0.12;

// ── Result ─────────────────────────────────────────────────

/// Outcome of the most recent update.
///
/// The pixel position only exists while the gesture is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TipGesture {
    #[default]
    Inactive,
    /// Gesture held this frame, at the midpoint of the two fingertips.
    Active { x: i32, y: i32 },
}

impl TipGesture {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        match *self {
            Self::Active { x, y } => Some((x, y)),
            Self::Inactive => None,
        }
    }
}

/// The numbers behind one tip-distance decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TipMeasurement {
    /// Length of the scale reference pair.
    pub hand_length: f64,
    /// `hand_length * threshold`.
    pub threshold: f64,
    /// Distance between the two compared fingertips.
    pub tip_distance: f64,
}

impl TipMeasurement {
    /// Strictly closer than the threshold; equality does not count.
    pub fn is_active(&self) -> bool {
        self.tip_distance < self.threshold
    }
}

// ── Config ─────────────────────────────────────────────────

/// Which landmarks a tip-distance detector compares, and how strictly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TipDistanceConfig {
    pub tip_a: HandLandmark,
    pub tip_b: HandLandmark,
    /// Landmark pair whose distance sets the hand scale.
    pub scale_reference: (HandLandmark, HandLandmark),
    /// Dimensionless fraction of the scale reference length.
    pub threshold: f64,
}

impl TipDistanceConfig {
    /// Index tip against thumb tip, scaled by wrist to thumb tip.
    pub fn pinch(threshold: f64) -> Self {
        Self {
            tip_a: HandLandmark::IndexTip,
            tip_b: HandLandmark::ThumbTip,
            scale_reference: (HandLandmark::Wrist, HandLandmark::ThumbTip),
            threshold,
        }
    }

    /// Index tip against middle tip, scaled by wrist to middle tip.
    pub fn scissors(threshold: f64) -> Self {
        Self {
            tip_a: HandLandmark::IndexTip,
            tip_b: HandLandmark::MiddleTip,
            scale_reference: (HandLandmark::Wrist, HandLandmark::MiddleTip),
            threshold,
        }
    }
}

// ── Detector ───────────────────────────────────────────────

/// Generic scaled tip-distance detector.
#[derive(Debug, Clone)]
pub struct TipDistanceDetector {
    name: &'static str,
    config: TipDistanceConfig,
    state: TipGesture,
}

impl TipDistanceDetector {
    /// `name` only labels log output.
    pub fn new(name: &'static str, config: TipDistanceConfig) -> Self {
        Self {
            name,
            config,
            state: TipGesture::Inactive,
        }
    }

    pub fn config(&self) -> &TipDistanceConfig {
        &self.config
    }

    /// Result of the most recent update.
    pub fn state(&self) -> TipGesture {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        self.state.position()
    }

    /// Forget the last result.
    pub fn reset(&mut self) {
        self.state = TipGesture::Inactive;
    }

    /// Measure a hand against this detector's configuration.
    pub fn measure(&self, hand: &HandObservation<'_>) -> TipMeasurement {
        let (base, reference) = self.config.scale_reference;
        let hand_length = hand.distance(base, reference);
        TipMeasurement {
            hand_length,
            threshold: hand_length * self.config.threshold,
            tip_distance: hand.distance(self.config.tip_a, self.config.tip_b),
        }
    }

    /// Classify one frame.
    ///
    /// Empty or incomplete landmark sets deactivate the gesture.
    pub fn update(&mut self, landmarks: &[Landmark], frame: FrameSize) -> TipGesture {
        let next = match HandObservation::from_landmarks(landmarks) {
            Some(hand) if self.measure(&hand).is_active() => {
                let a = hand.get(self.config.tip_a);
                let b = hand.get(self.config.tip_b);
                TipGesture::Active {
                    x: frame.px_x((a.x + b.x) / 2.0),
                    y: frame.px_y((a.y + b.y) / 2.0),
                }
            }
            _ => TipGesture::Inactive,
        };

        match (self.state.is_active(), next) {
            (false, TipGesture::Active { x, y }) => {
                debug!("Gesture started: {} at ({}, {})", self.name, x, y);
            }
            (true, TipGesture::Inactive) => {
                debug!("Gesture released: {}", self.name);
            }
            _ => {}
        }

        self.state = next;
        next
    }
}

// ── Named detectors ────────────────────────────────────────

macro_rules! tip_detector {
    ($(#[$meta:meta])* $name:ident, $label:literal, $config:path, $default:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            inner: TipDistanceDetector,
        }

        impl $name {
            pub fn new(threshold: f64) -> Self {
                Self {
                    inner: TipDistanceDetector::new($label, $config(threshold)),
                }
            }

            /// Classify one frame.
            pub fn update(&mut self, landmarks: &[Landmark], frame: FrameSize) -> TipGesture {
                self.inner.update(landmarks, frame)
            }

            pub fn state(&self) -> TipGesture {
                self.inner.state()
            }

            pub fn is_active(&self) -> bool {
                self.inner.is_active()
            }

            /// Pixel position, only while active.
            pub fn position(&self) -> Option<(i32, i32)> {
                self.inner.position()
            }

            pub fn reset(&mut self) {
                self.inner.reset();
            }

            pub fn threshold(&self) -> f64 {
                self.inner.config().threshold
            }

            pub fn measure(&self, hand: &HandObservation<'_>) -> TipMeasurement {
                self.inner.measure(hand)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new($default)
            }
        }
    };
}

tip_detector!(
    /// Thumb tip and index tip pinched together.
    PinchGestureDetector,
    "pinch",
    TipDistanceConfig::pinch,
    DEFAULT_PINCH_THRESHOLD
);

tip_detector!(
    /// Index tip and middle tip held together.
    ScissorsGestureDetector,
    "scissors",
    TipDistanceConfig::scissors,
    DEFAULT_SCISSORS_THRESHOLD
);

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
fn pinch_hand(wrist: (f64, f64), thumb: (f64, f64), index: (f64, f64)) -> Vec<Landmark> {
    use super::landmarks::{make_hand, set_landmark};

    let mut hand = make_hand();
    set_landmark(&mut hand, HandLandmark::Wrist, wrist.0, wrist.1, 0.0);
    set_landmark(&mut hand, HandLandmark::ThumbTip, thumb.0, thumb.1, 0.0);
    set_landmark(&mut hand, HandLandmark::IndexTip, index.0, index.1, 0.0);
    // Keep the middle finger well away so scissors stays out of the way
    set_landmark(&mut hand, HandLandmark::MiddleTip, wrist.0, wrist.1 - 0.4, 0.0);
    hand
}

#[cfg(test)]
fn scissors_hand(wrist: (f64, f64), middle: (f64, f64), index: (f64, f64)) -> Vec<Landmark> {
    use super::landmarks::{make_hand, set_landmark};

    let mut hand = make_hand();
    set_landmark(&mut hand, HandLandmark::Wrist, wrist.0, wrist.1, 0.0);
    set_landmark(&mut hand, HandLandmark::MiddleTip, middle.0, middle.1, 0.0);
    set_landmark(&mut hand, HandLandmark::IndexTip, index.0, index.1, 0.0);
    hand
}

/// Scale every landmark about the wrist by `k`.
#[cfg(test)]
fn scale_about_wrist(hand: &[Landmark], k: f64) -> Vec<Landmark> {
    let w = hand[HandLandmark::Wrist.index()];
    hand.iter()
        .map(|p| Landmark::new(w.x + k * (p.x - w.x), w.y + k * (p.y - w.y), 0.0))
        .collect()
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmarks::{make_hand, set_landmark};

    const FRAME: FrameSize = FrameSize {
        width: 1000,
        height: 1000,
    };

    #[test]
    fn test_defaults() {
        assert_eq!(PinchGestureDetector::default().threshold(), 0.1);
        assert_eq!(ScissorsGestureDetector::default().threshold(), 0.12);
        assert!(!PinchGestureDetector::default().is_active());
        assert_eq!(ScissorsGestureDetector::default().state(), TipGesture::Inactive);
    }

    #[test]
    fn test_pinch_midpoint_truncated() {
        // handLength 0.1, dynamic threshold 0.02, tips 0.01 apart
        let mut pinch = PinchGestureDetector::new(0.2);
        let hand = pinch_hand((0.0, 0.0), (0.1, 0.0), (0.11, 0.0));

        let result = pinch.update(&hand, FRAME);
        assert_eq!(result, TipGesture::Active { x: 105, y: 0 });
        assert!(pinch.is_active());
        assert_eq!(pinch.position(), Some((105, 0)));
    }

    #[test]
    fn test_pinch_boundary_is_inactive() {
        // Dyadic values so equality is exact: 0.5 * 0.25 == 0.625 - 0.5
        let mut pinch = PinchGestureDetector::new(0.25);
        let hand = pinch_hand((0.0, 0.0), (0.5, 0.0), (0.625, 0.0));
        let obs = HandObservation::from_landmarks(&hand).unwrap();
        let m = pinch.measure(&obs);
        assert_eq!(m.hand_length, 0.5);
        assert_eq!(m.threshold, 0.125);
        assert_eq!(m.tip_distance, 0.125);

        assert_eq!(pinch.update(&hand, FRAME), TipGesture::Inactive);

        // Just inside the boundary
        let hand = pinch_hand((0.0, 0.0), (0.5, 0.0), (0.5625, 0.0));
        assert!(pinch.update(&hand, FRAME).is_active());
    }

    #[test]
    fn test_pinch_open_hand() {
        let mut pinch = PinchGestureDetector::default();
        let hand = pinch_hand((0.5, 0.9), (0.3, 0.6), (0.5, 0.4));
        assert_eq!(pinch.update(&hand, FRAME), TipGesture::Inactive);
        assert_eq!(pinch.position(), None);
    }

    #[test]
    fn test_pinch_scale_invariance() {
        let poses = [
            pinch_hand((0.5, 0.5), (0.6, 0.5), (0.605, 0.5)),
            pinch_hand((0.5, 0.5), (0.6, 0.5), (0.62, 0.5)),
            pinch_hand((0.4, 0.8), (0.3, 0.6), (0.31, 0.61)),
            pinch_hand((0.4, 0.8), (0.3, 0.6), (0.4, 0.5)),
        ];
        for pose in &poses {
            let mut base = PinchGestureDetector::default();
            let expected = base.update(pose, FRAME).is_active();
            for k in [0.25, 0.5, 1.5, 2.0, 3.0] {
                let mut scaled = PinchGestureDetector::default();
                let got = scaled.update(&scale_about_wrist(pose, k), FRAME).is_active();
                assert_eq!(got, expected, "scale {} changed the decision", k);
            }
        }
    }

    #[test]
    fn test_scissors_boundary_is_inactive() {
        // 0.5 * 0.125 == 0.5625 - 0.5, exactly
        let mut scissors = ScissorsGestureDetector::new(0.125);
        let hand = scissors_hand((0.0, 0.0), (0.5, 0.0), (0.5625, 0.0));
        let obs = HandObservation::from_landmarks(&hand).unwrap();
        let m = scissors.measure(&obs);
        assert_eq!(m.hand_length, 0.5);
        assert_eq!(m.threshold, 0.0625);
        assert_eq!(m.tip_distance, 0.0625);

        assert_eq!(scissors.update(&hand, FRAME), TipGesture::Inactive);

        let hand = scissors_hand((0.0, 0.0), (0.5, 0.0), (0.53125, 0.0));
        assert!(scissors.update(&hand, FRAME).is_active());
    }

    #[test]
    fn test_scissors_scale_invariance() {
        let poses = [
            scissors_hand((0.5, 0.9), (0.5, 0.5), (0.52, 0.5)),
            scissors_hand((0.5, 0.9), (0.5, 0.5), (0.6, 0.5)),
            scissors_hand((0.4, 0.8), (0.45, 0.4), (0.46, 0.41)),
            scissors_hand((0.4, 0.8), (0.45, 0.4), (0.3, 0.4)),
        ];
        for pose in &poses {
            let mut base = ScissorsGestureDetector::default();
            let expected = base.update(pose, FRAME).is_active();
            for k in [0.25, 0.5, 1.5, 2.0, 3.0] {
                let mut scaled = ScissorsGestureDetector::default();
                let got = scaled.update(&scale_about_wrist(pose, k), FRAME).is_active();
                assert_eq!(got, expected, "scale {} changed the decision", k);
            }
        }
    }

    #[test]
    fn test_empty_landmarks_deactivate() {
        let mut pinch = PinchGestureDetector::new(0.2);
        let hand = pinch_hand((0.0, 0.0), (0.1, 0.0), (0.11, 0.0));
        assert!(pinch.update(&hand, FRAME).is_active());

        assert_eq!(pinch.update(&[], FRAME), TipGesture::Inactive);
        assert!(!pinch.is_active());
        assert_eq!(pinch.position(), None);
    }

    #[test]
    fn test_partial_landmarks_deactivate() {
        let mut pinch = PinchGestureDetector::new(0.2);
        let hand = pinch_hand((0.0, 0.0), (0.1, 0.0), (0.11, 0.0));
        assert!(pinch.update(&hand, FRAME).is_active());

        assert_eq!(pinch.update(&hand[..10], FRAME), TipGesture::Inactive);
    }

    #[test]
    fn test_reset() {
        let mut pinch = PinchGestureDetector::new(0.2);
        let hand = pinch_hand((0.0, 0.0), (0.1, 0.0), (0.11, 0.0));
        pinch.update(&hand, FRAME);
        pinch.reset();
        assert_eq!(pinch.state(), TipGesture::Inactive);
        assert!(pinch.update(&hand, FRAME).is_active());
    }

    #[test]
    fn test_degenerate_hand() {
        // Every landmark identical: all distances zero, 0 < 0 is false
        let hand = make_hand();
        let mut pinch = PinchGestureDetector::default();
        let mut scissors = ScissorsGestureDetector::default();
        assert_eq!(pinch.update(&hand, FRAME), TipGesture::Inactive);
        assert_eq!(scissors.update(&hand, FRAME), TipGesture::Inactive);
    }

    #[test]
    fn test_missing_z() {
        let mut hand = pinch_hand((0.0, 0.0), (0.1, 0.0), (0.11, 0.0));
        hand[HandLandmark::IndexTip.index()] = Landmark::planar(0.11, 0.0);
        let mut pinch = PinchGestureDetector::new(0.2);
        assert_eq!(pinch.update(&hand, FRAME), TipGesture::Active { x: 105, y: 0 });
    }

    #[test]
    fn test_scissors_detection() {
        // handLength 0.4, threshold 0.048, tips 0.02 apart
        let mut hand = make_hand();
        set_landmark(&mut hand, HandLandmark::Wrist, 0.5, 0.9, 0.0);
        set_landmark(&mut hand, HandLandmark::MiddleTip, 0.5, 0.5, 0.0);
        set_landmark(&mut hand, HandLandmark::IndexTip, 0.52, 0.5, 0.0);
        set_landmark(&mut hand, HandLandmark::ThumbTip, 0.2, 0.7, 0.0);

        let mut scissors = ScissorsGestureDetector::default();
        let frame = FrameSize::new(640, 480);
        assert_eq!(scissors.update(&hand, frame), TipGesture::Active { x: 326, y: 240 });

        // Spread the fingers apart
        set_landmark(&mut hand, HandLandmark::IndexTip, 0.6, 0.5, 0.0);
        assert_eq!(scissors.update(&hand, frame), TipGesture::Inactive);
    }

    #[test]
    fn test_pinch_and_scissors_independent() {
        let hand = pinch_hand((0.0, 0.0), (0.1, 0.0), (0.11, 0.0));
        let mut pinch = PinchGestureDetector::new(0.2);
        let mut scissors = ScissorsGestureDetector::default();

        assert!(pinch.update(&hand, FRAME).is_active());
        assert_eq!(scissors.state(), TipGesture::Inactive);

        assert_eq!(scissors.update(&hand, FRAME), TipGesture::Inactive);
        assert!(pinch.is_active());
    }

    #[test]
    fn test_generic_detector_custom_pair() {
        // Thumb tip against pinky tip, scaled by wrist to index tip
        let config = TipDistanceConfig {
            tip_a: HandLandmark::ThumbTip,
            tip_b: HandLandmark::PinkyTip,
            scale_reference: (HandLandmark::Wrist, HandLandmark::IndexTip),
            threshold: 0.5,
        };
        let mut detector = TipDistanceDetector::new("thumb-pinky", config);
        let mut hand = make_hand();
        set_landmark(&mut hand, HandLandmark::IndexTip, 0.0, 0.5, 0.0);
        set_landmark(&mut hand, HandLandmark::ThumbTip, 0.25, 0.25, 0.0);
        set_landmark(&mut hand, HandLandmark::PinkyTip, 0.25, 0.375, 0.0);

        assert_eq!(
            detector.update(&hand, FrameSize::new(800, 800)),
            TipGesture::Active { x: 200, y: 250 }
        );
        assert_eq!(detector.config().tip_b, HandLandmark::PinkyTip);
    }
}

//! Hand landmark data structures.
//!
//! Models the 21 landmarks per hand emitted by MediaPipe-style hand trackers,
//! in coordinates normalized to the video frame.  Provides the landmark index
//! scheme, frame-size conversion, and a validated per-frame observation.

use tracing::debug;

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in provider index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

/// All landmarks in index order.
const ALL_LANDMARKS: [HandLandmark; LANDMARK_COUNT] = [
    HandLandmark::Wrist,
    HandLandmark::ThumbCmc,
    HandLandmark::ThumbMcp,
    HandLandmark::ThumbIp,
    HandLandmark::ThumbTip,
    HandLandmark::IndexMcp,
    HandLandmark::IndexPip,
    HandLandmark::IndexDip,
    HandLandmark::IndexTip,
    HandLandmark::MiddleMcp,
    HandLandmark::MiddlePip,
    HandLandmark::MiddleDip,
    HandLandmark::MiddleTip,
    HandLandmark::RingMcp,
    HandLandmark::RingPip,
    HandLandmark::RingDip,
    HandLandmark::RingTip,
    HandLandmark::PinkyMcp,
    HandLandmark::PinkyPip,
    HandLandmark::PinkyDip,
    HandLandmark::PinkyTip,
];

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation for IPC.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }
}

/// Parse a landmark name (as produced by [`HandLandmark::as_str`]).
pub fn parse_landmark(s: &str) -> Option<HandLandmark> {
    ALL_LANDMARKS.iter().copied().find(|lm| lm.as_str() == s)
}

// ── Points and frames ──────────────────────────────────────

/// A single landmark in normalized frame coordinates.
///
/// `x` and `y` are fractions of the frame width and height.  `z` is relative
/// depth and may be missing; distance math treats a missing `z` as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// A landmark without depth information.
    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// Whether every present coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.map_or(true, f64::is_finite)
    }
}

/// Pixel dimensions of the surface landmarks are projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale a normalized x coordinate to pixels, truncating toward zero.
    pub fn px_x(&self, x: f64) -> i32 {
        (x * self.width as f64) as i32
    }

    /// Scale a normalized y coordinate to pixels, truncating toward zero.
    pub fn px_y(&self, y: f64) -> i32 {
        (y * self.height as f64) as i32
    }
}

// ── Observation ────────────────────────────────────────────

/// One frame's landmarks for a single hand, validated for use by detectors.
///
/// Detectors only ever index into an observation, so all of the
/// incomplete-input checks live in [`HandObservation::from_landmarks`].
#[derive(Debug, Clone, Copy)]
pub struct HandObservation<'a> {
    landmarks: &'a [Landmark],
}

impl<'a> HandObservation<'a> {
    /// Validate a landmark slice.
    ///
    /// Returns `None` when fewer than 21 landmarks are present or any
    /// coordinate is non-finite.  Extra trailing landmarks are ignored.
    pub fn from_landmarks(landmarks: &'a [Landmark]) -> Option<Self> {
        if landmarks.is_empty() {
            return None;
        }
        if landmarks.len() < LANDMARK_COUNT {
            debug!(
                "Hand observation: expected {} landmarks, got {}",
                LANDMARK_COUNT,
                landmarks.len(),
            );
            return None;
        }
        let landmarks = &landmarks[..LANDMARK_COUNT];
        if let Some(i) = landmarks.iter().position(|lm| !lm.is_finite()) {
            debug!("Hand observation: non-finite coordinate at landmark {}", i);
            return None;
        }
        Some(Self { landmarks })
    }

    /// Get a landmark by anatomical name.
    pub fn get(&self, landmark: HandLandmark) -> &'a Landmark {
        &self.landmarks[landmark.index()]
    }

    /// All 21 landmarks in index order.
    pub fn landmarks(&self) -> &'a [Landmark] {
        self.landmarks
    }
}

// ── Test helpers ───────────────────────────────────────────

/// Build a full hand with every landmark at the origin.
#[cfg(test)]
pub(crate) fn make_hand() -> Vec<Landmark> {
    vec![Landmark::new(0.0, 0.0, 0.0); LANDMARK_COUNT]
}

#[cfg(test)]
pub(crate) fn set_landmark(hand: &mut [Landmark], landmark: HandLandmark, x: f64, y: f64, z: f64) {
    hand[landmark.index()] = Landmark::new(x, y, z);
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_count() {
        assert_eq!(HandLandmark::Wrist.index(), 0);
        assert_eq!(HandLandmark::ThumbTip.index(), 4);
        assert_eq!(HandLandmark::IndexTip.index(), 8);
        assert_eq!(HandLandmark::MiddleTip.index(), 12);
        assert_eq!(HandLandmark::PinkyTip.index(), 20);
        assert_eq!(ALL_LANDMARKS.len(), LANDMARK_COUNT);
    }

    #[test]
    fn test_all_landmarks_in_index_order() {
        for (i, lm) in ALL_LANDMARKS.iter().enumerate() {
            assert_eq!(lm.index(), i, "{:?} out of order", lm);
        }
    }

    #[test]
    fn test_landmark_as_str() {
        assert_eq!(HandLandmark::Wrist.as_str(), "wrist");
        assert_eq!(HandLandmark::ThumbTip.as_str(), "thumb-tip");
        assert_eq!(HandLandmark::IndexTip.as_str(), "index-tip");
        assert_eq!(HandLandmark::PinkyTip.as_str(), "pinky-tip");
    }

    #[test]
    fn test_parse_landmark() {
        assert_eq!(parse_landmark("middle-tip"), Some(HandLandmark::MiddleTip));
        assert_eq!(parse_landmark("wrist"), Some(HandLandmark::Wrist));
        assert_eq!(parse_landmark("palm"), None);
        for lm in ALL_LANDMARKS {
            assert_eq!(parse_landmark(lm.as_str()), Some(lm));
        }
    }

    #[test]
    fn test_frame_size_truncates() {
        let frame = FrameSize::new(1000, 500);
        assert_eq!(frame.px_x(0.1059), 105);
        assert_eq!(frame.px_y(0.999), 499);
        // Toward zero, not floor
        assert_eq!(frame.px_x(-0.0019), -1);
        assert_eq!(frame.px_x(-0.0001), 0);
    }

    #[test]
    fn test_landmark_is_finite() {
        assert!(Landmark::new(0.1, 0.2, 0.3).is_finite());
        assert!(Landmark::planar(0.1, 0.2).is_finite());
        assert!(!Landmark::planar(f64::NAN, 0.2).is_finite());
        assert!(!Landmark::new(0.1, 0.2, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_observation_empty() {
        assert!(HandObservation::from_landmarks(&[]).is_none());
    }

    #[test]
    fn test_observation_partial() {
        let hand = vec![Landmark::new(0.5, 0.5, 0.0); 9];
        assert!(HandObservation::from_landmarks(&hand).is_none());
    }

    #[test]
    fn test_observation_non_finite() {
        let mut hand = make_hand();
        hand[HandLandmark::RingDip.index()] = Landmark::planar(f64::NAN, 0.0);
        assert!(HandObservation::from_landmarks(&hand).is_none());
    }

    #[test]
    fn test_observation_valid() {
        let mut hand = make_hand();
        set_landmark(&mut hand, HandLandmark::IndexTip, 0.3, 0.4, 0.0);
        let obs = HandObservation::from_landmarks(&hand).unwrap();
        assert_eq!(obs.get(HandLandmark::IndexTip).x, 0.3);
        assert_eq!(obs.landmarks().len(), LANDMARK_COUNT);
    }

    #[test]
    fn test_observation_ignores_extra_landmarks() {
        let mut hand = make_hand();
        hand.push(Landmark::planar(f64::NAN, f64::NAN));
        let obs = HandObservation::from_landmarks(&hand).unwrap();
        assert_eq!(obs.landmarks().len(), LANDMARK_COUNT);
    }
}

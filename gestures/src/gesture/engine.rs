//! Per-frame gesture stage.
//!
//! Runs the pinch, scissors, and dwell detectors over each landmark set and
//! turns their state changes into [`GestureEvent`]s.  Also decides which
//! active gesture, if any, supplies the drawing position.

use std::fmt;
use std::time::Duration;

use tracing::info;

use super::clock::{Clock, MonotonicClock};
use super::dwell::{DwellConfig, DwellGestureDetector};
use super::landmarks::{FrameSize, Landmark};
use super::tip_distance::{
    PinchGestureDetector, ScissorsGestureDetector, TipGesture, DEFAULT_PINCH_THRESHOLD,
    DEFAULT_SCISSORS_THRESHOLD,
};

// ── Gesture types ──────────────────────────────────────────

/// Recognized gesture types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureType {
    /// Thumb and index fingertips close together.
    Pinch,
    /// Index and middle fingertips close together.
    Scissors,
    /// Index fingertip held still.
    Dwell,
}

impl GestureType {
    /// String representation for IPC.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pinch => "pinch",
            Self::Scissors => "scissors",
            Self::Dwell => "dwell",
        }
    }
}

// ── Events ─────────────────────────────────────────────────

/// Events emitted by [`GestureEngine::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    /// A tip-distance gesture became active, at pixel `(x, y)`.
    Started { gesture: GestureType, x: i32, y: i32 },
    /// A tip-distance gesture stopped being active.
    Released { gesture: GestureType },
    /// A dwell completed at the normalized anchor `(x, y)`.
    Dwell { x: f64, y: f64 },
}

impl GestureEvent {
    /// The gesture this event belongs to.
    pub fn gesture(&self) -> GestureType {
        match self {
            Self::Started { gesture, .. } | Self::Released { gesture } => *gesture,
            Self::Dwell { .. } => GestureType::Dwell,
        }
    }

    /// Render as an IPC event s-expression.
    pub fn to_sexp(&self) -> String {
        let name = self.gesture().as_str();
        match self {
            Self::Started { x, y, .. } => format!(
                "(:type :event :event :{}-started :x {} :y {})",
                name, x, y,
            ),
            Self::Released { .. } => format!("(:type :event :event :{}-released)", name),
            Self::Dwell { x, y } => {
                format!("(:type :event :event :{} :x {:.4} :y {:.4})", name, x, y)
            }
        }
    }
}

/// Where the pen is, and which gesture is holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawPoint {
    pub gesture: GestureType,
    pub x: i32,
    pub y: i32,
}

// ── Config ─────────────────────────────────────────────────

/// Thresholds for all three detectors.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Enable gesture recognition.
    pub enabled: bool,
    /// Pinch threshold as a fraction of wrist-to-thumb-tip length.
    pub pinch_threshold: f64,
    /// Scissors threshold as a fraction of wrist-to-middle-tip length.
    pub scissors_threshold: f64,
    /// Hold time before a dwell fires.
    pub dwell_time: Duration,
    /// Maximum drift from the anchor, in normalized units.
    pub dwell_radius: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        let dwell = DwellConfig::default();
        Self {
            enabled: true,
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            scissors_threshold: DEFAULT_SCISSORS_THRESHOLD,
            dwell_time: dwell.dwell_time,
            dwell_radius: dwell.dwell_radius,
        }
    }
}

impl GestureConfig {
    /// Looser pinch and a shorter, tighter dwell, tuned for freehand drawing.
    pub fn chalkboard() -> Self {
        Self {
            enabled: true,
            pinch_threshold: 0.20,
            scissors_threshold: 0.12,
            dwell_time: Duration::from_millis(600),
            dwell_radius: 0.02,
        }
    }

    pub fn dwell(&self) -> DwellConfig {
        DwellConfig {
            dwell_time: self.dwell_time,
            dwell_radius: self.dwell_radius,
        }
    }
}

// ── Engine ─────────────────────────────────────────────────

/// Owns one detector of each kind and tracks their edges.
pub struct GestureEngine<C: Clock + Clone = MonotonicClock> {
    config: GestureConfig,
    clock: C,
    pinch: PinchGestureDetector,
    scissors: ScissorsGestureDetector,
    dwell: DwellGestureDetector<C>,
    /// Frames processed while enabled.
    frames: u64,
}

impl GestureEngine<MonotonicClock> {
    pub fn new(config: GestureConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock + Clone> GestureEngine<C> {
    pub fn with_clock(config: GestureConfig, clock: C) -> Self {
        info!(
            "Gesture engine initialized (pinch {:.2}, scissors {:.2}, dwell {}ms/{:.3})",
            config.pinch_threshold,
            config.scissors_threshold,
            config.dwell_time.as_millis(),
            config.dwell_radius,
        );
        Self {
            pinch: PinchGestureDetector::new(config.pinch_threshold),
            scissors: ScissorsGestureDetector::new(config.scissors_threshold),
            dwell: DwellGestureDetector::with_clock(config.dwell(), clock.clone()),
            config,
            clock,
            frames: 0,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn pinch(&self) -> &PinchGestureDetector {
        &self.pinch
    }

    pub fn scissors(&self) -> &ScissorsGestureDetector {
        &self.scissors
    }

    pub fn dwell(&self) -> &DwellGestureDetector<C> {
        &self.dwell
    }

    /// Mutable access for registering the dwell callback.
    pub fn dwell_mut(&mut self) -> &mut DwellGestureDetector<C> {
        &mut self.dwell
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run every detector on one frame and collect the resulting events.
    ///
    /// Scissors is updated before pinch, and dwell last.  A disabled engine
    /// leaves its detectors untouched.
    pub fn update(&mut self, landmarks: &[Landmark], frame: FrameSize) -> Vec<GestureEvent> {
        if !self.config.enabled {
            return Vec::new();
        }
        self.frames += 1;

        let mut events = Vec::new();

        let before = self.scissors.state();
        let after = self.scissors.update(landmarks, frame);
        push_edge(&mut events, GestureType::Scissors, before, after);

        let before = self.pinch.state();
        let after = self.pinch.update(landmarks, frame);
        push_edge(&mut events, GestureType::Pinch, before, after);

        if let Some(trigger) = self.dwell.update(landmarks) {
            events.push(GestureEvent::Dwell {
                x: trigger.x,
                y: trigger.y,
            });
        }

        events
    }

    /// Current drawing position.  Scissors wins over pinch.
    pub fn draw_point(&self) -> Option<DrawPoint> {
        let candidates = [
            (GestureType::Scissors, self.scissors.position()),
            (GestureType::Pinch, self.pinch.position()),
        ];
        candidates
            .into_iter()
            .find_map(|(gesture, pos)| pos.map(|(x, y)| DrawPoint { gesture, x, y }))
    }

    /// Replace the configuration.
    ///
    /// Detector configs are fixed at construction, so every detector is
    /// rebuilt and in-progress state is lost.  A registered dwell callback
    /// is kept.
    pub fn set_config(&mut self, config: GestureConfig) {
        let callback = self.dwell.take_on_dwell_callback();
        self.pinch = PinchGestureDetector::new(config.pinch_threshold);
        self.scissors = ScissorsGestureDetector::new(config.scissors_threshold);
        self.dwell = DwellGestureDetector::with_clock(config.dwell(), self.clock.clone());
        self.dwell.restore_on_dwell_callback(callback);
        info!(
            "Gesture config updated (enabled {}, pinch {:.2}, scissors {:.2}, dwell {}ms/{:.3})",
            config.enabled,
            config.pinch_threshold,
            config.scissors_threshold,
            config.dwell_time.as_millis(),
            config.dwell_radius,
        );
        self.config = config;
    }

    /// Deactivate everything and cancel any dwell.
    pub fn reset(&mut self) {
        self.pinch.reset();
        self.scissors.reset();
        self.dwell.reset_dwell();
        self.frames = 0;
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        let draw = self
            .draw_point()
            .map(|p| format!("(:gesture :{} :x {} :y {})", p.gesture.as_str(), p.x, p.y))
            .unwrap_or_else(|| "nil".to_string());
        format!(
            "(:enabled {} :frames {} :pinch {} :scissors {} :dwell {} :draw {})",
            if self.config.enabled { "t" } else { "nil" },
            self.frames,
            tip_sexp(self.pinch.state()),
            tip_sexp(self.scissors.state()),
            self.dwell.status_sexp(),
            draw,
        )
    }

    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:enabled {} :pinch-threshold {:.3} :scissors-threshold {:.3} :dwell-ms {} :dwell-radius {:.3})",
            if self.config.enabled { "t" } else { "nil" },
            self.config.pinch_threshold,
            self.config.scissors_threshold,
            self.config.dwell_time.as_millis(),
            self.config.dwell_radius,
        )
    }
}

impl<C: Clock + Clone + fmt::Debug> fmt::Debug for GestureEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureEngine")
            .field("config", &self.config)
            .field("pinch", &self.pinch)
            .field("scissors", &self.scissors)
            .field("dwell", &self.dwell)
            .field("frames", &self.frames)
            .finish()
    }
}

fn push_edge(
    events: &mut Vec<GestureEvent>,
    gesture: GestureType,
    before: TipGesture,
    after: TipGesture,
) {
    match (before, after) {
        (TipGesture::Inactive, TipGesture::Active { x, y }) => {
            events.push(GestureEvent::Started { gesture, x, y });
        }
        (TipGesture::Active { .. }, TipGesture::Inactive) => {
            events.push(GestureEvent::Released { gesture });
        }
        _ => {}
    }
}

fn tip_sexp(state: TipGesture) -> String {
    match state {
        TipGesture::Active { x, y } => format!("(:active t :x {} :y {})", x, y),
        TipGesture::Inactive => "(:active nil)".to_string(),
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
use super::clock::ManualClock;
#[cfg(test)]
use super::landmarks::{make_hand, set_landmark, HandLandmark};

/// Wrist, thumb, index, and middle tips placed for a given pose.
#[cfg(test)]
fn pose(thumb: (f64, f64), index: (f64, f64), middle: (f64, f64)) -> Vec<Landmark> {
    let mut hand = make_hand();
    set_landmark(&mut hand, HandLandmark::Wrist, 0.5, 0.9, 0.0);
    set_landmark(&mut hand, HandLandmark::ThumbTip, thumb.0, thumb.1, 0.0);
    set_landmark(&mut hand, HandLandmark::IndexTip, index.0, index.1, 0.0);
    set_landmark(&mut hand, HandLandmark::MiddleTip, middle.0, middle.1, 0.0);
    hand
}

/// Thumb and index nearly touching, middle finger away.
#[cfg(test)]
fn pinch_pose() -> Vec<Landmark> {
    pose((0.5, 0.5), (0.51, 0.5), (0.7, 0.5))
}

/// Thumb, index, and middle all bunched together.
#[cfg(test)]
fn bunched_pose() -> Vec<Landmark> {
    pose((0.5, 0.5), (0.505, 0.5), (0.51, 0.5))
}

/// Fingers spread apart.
#[cfg(test)]
fn open_pose() -> Vec<Landmark> {
    pose((0.3, 0.5), (0.5, 0.3), (0.7, 0.5))
}

#[cfg(test)]
fn make_engine(config: GestureConfig) -> (GestureEngine<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    (GestureEngine::with_clock(config, clock.clone()), clock)
}

// ── Tests ──────────────────────────────────────────────────

//! Dwell detection: the index fingertip held still for a minimum time.
//!
//! A dwell starts on the first frame with a hand, anchored at the index
//! fingertip.  It completes once the tip has stayed within a fixed radius of
//! the anchor for the configured time, firing exactly once and returning to
//! idle.  Moving outside the radius or losing the hand for a single frame
//! aborts it.
//!
//! The radius is in normalized frame units and is not scaled by hand size,
//! unlike the pinch and scissors thresholds.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use super::clock::{Clock, MonotonicClock};
use super::geometry::planar_distance;
use super::landmarks::{HandLandmark, HandObservation, Landmark};

// ── Config ─────────────────────────────────────────────────

/// Configuration for dwell detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DwellConfig {
    /// Minimum hold time.
    pub dwell_time: Duration,
    /// Maximum drift from the anchor, in normalized units (2D).
    pub dwell_radius: f64,
}

impl Default for DwellConfig {
    fn default() -> Self {
        Self {
            dwell_time: Duration::from_millis(800),
            dwell_radius: 0.05,
        }
    }
}

// ── State ──────────────────────────────────────────────────

/// Dwell state machine.
///
/// Completion is not a state: it is reported as a one-update pulse and the
/// machine goes straight back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DwellState {
    /// No dwell in progress.
    Idle,
    /// Holding near the anchor since `started`.
    Dwelling {
        anchor_x: f64,
        anchor_y: f64,
        started: Duration,
    },
}

/// A completed dwell, located at its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DwellTrigger {
    pub x: f64,
    pub y: f64,
}

pub(crate) type DwellCallback = Box<dyn FnMut(f64, f64)>;

// ── Detector ───────────────────────────────────────────────

/// Debounced, single-fire dwell detector.
pub struct DwellGestureDetector<C: Clock = MonotonicClock> {
    config: DwellConfig,
    clock: C,
    state: DwellState,
    active: bool,
    on_dwell: Option<DwellCallback>,
}

impl DwellGestureDetector<MonotonicClock> {
    pub fn new(config: DwellConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl Default for DwellGestureDetector<MonotonicClock> {
    fn default() -> Self {
        Self::new(DwellConfig::default())
    }
}

impl<C: Clock> DwellGestureDetector<C> {
    pub fn with_clock(config: DwellConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            state: DwellState::Idle,
            active: false,
            on_dwell: None,
        }
    }

    pub fn config(&self) -> &DwellConfig {
        &self.config
    }

    pub fn state(&self) -> DwellState {
        self.state
    }

    /// True only for the update in which a dwell completed.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dwelling(&self) -> bool {
        matches!(self.state, DwellState::Dwelling { .. })
    }

    /// Anchor of the dwell in progress.
    pub fn anchor(&self) -> Option<(f64, f64)> {
        match self.state {
            DwellState::Dwelling {
                anchor_x, anchor_y, ..
            } => Some((anchor_x, anchor_y)),
            DwellState::Idle => None,
        }
    }

    /// Time spent in the dwell in progress.
    pub fn elapsed(&self) -> Option<Duration> {
        match self.state {
            DwellState::Dwelling { started, .. } => {
                Some(self.clock.now().saturating_sub(started))
            }
            DwellState::Idle => None,
        }
    }

    /// Register the completion callback, replacing any previous one.
    ///
    /// It is called synchronously from `update` with the normalized anchor
    /// coordinates.
    pub fn set_on_dwell_callback<F>(&mut self, callback: F)
    where
        F: FnMut(f64, f64) + 'static,
    {
        self.on_dwell = Some(Box::new(callback));
    }

    pub fn clear_on_dwell_callback(&mut self) {
        self.on_dwell = None;
    }

    pub(crate) fn take_on_dwell_callback(&mut self) -> Option<DwellCallback> {
        self.on_dwell.take()
    }

    pub(crate) fn restore_on_dwell_callback(&mut self, callback: Option<DwellCallback>) {
        self.on_dwell = callback;
    }

    /// Abandon any dwell in progress.
    pub fn reset_dwell(&mut self) {
        if self.is_dwelling() {
            debug!("Dwell reset");
        }
        self.state = DwellState::Idle;
    }

    /// Advance the state machine by one frame.
    ///
    /// Returns the trigger when this update completed a dwell.
    pub fn update(&mut self, landmarks: &[Landmark]) -> Option<DwellTrigger> {
        self.active = false;

        let Some(hand) = HandObservation::from_landmarks(landmarks) else {
            self.reset_dwell();
            return None;
        };
        let tip = hand.get(HandLandmark::IndexTip);
        let now = self.clock.now();

        let DwellState::Dwelling {
            anchor_x,
            anchor_y,
            started,
        } = self.state
        else {
            self.state = DwellState::Dwelling {
                anchor_x: tip.x,
                anchor_y: tip.y,
                started: now,
            };
            debug!("Dwell started at ({:.3}, {:.3})", tip.x, tip.y);
            return None;
        };

        let drift = planar_distance(anchor_x, anchor_y, tip.x, tip.y);
        if drift > self.config.dwell_radius {
            debug!("Dwell broken: drift {:.3} > radius {:.3}", drift, self.config.dwell_radius);
            self.reset_dwell();
            return None;
        }

        let elapsed = now.saturating_sub(started);
        if elapsed < self.config.dwell_time {
            return None;
        }

        self.state = DwellState::Idle;
        self.active = true;
        debug!(
            "Dwell completed at ({:.3}, {:.3}) after {}ms",
            anchor_x,
            anchor_y,
            elapsed.as_millis()
        );
        if let Some(callback) = self.on_dwell.as_mut() {
            callback(anchor_x, anchor_y);
        }
        Some(DwellTrigger {
            x: anchor_x,
            y: anchor_y,
        })
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        match self.state {
            DwellState::Idle => format!(
                "(:state :idle :active {})",
                if self.active { "t" } else { "nil" }
            ),
            DwellState::Dwelling {
                anchor_x, anchor_y, ..
            } => format!(
                "(:state :dwelling :anchor (:x {:.4} :y {:.4}) :elapsed-ms {} :active nil)",
                anchor_x,
                anchor_y,
                self.elapsed().unwrap_or_default().as_millis(),
            ),
        }
    }
}

impl<C: Clock + fmt::Debug> fmt::Debug for DwellGestureDetector<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DwellGestureDetector")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("state", &self.state)
            .field("active", &self.active)
            .field("has_callback", &self.on_dwell.is_some())
            .finish()
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
fn tip_at(x: f64, y: f64) -> Vec<Landmark> {
    use super::landmarks::{make_hand, set_landmark};

    let mut hand = make_hand();
    set_landmark(&mut hand, HandLandmark::IndexTip, x, y, 0.0);
    hand
}

#[cfg(test)]
use super::clock::ManualClock;

#[cfg(test)]
fn make_detector(dwell_ms: u64, radius: f64) -> (DwellGestureDetector<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let config = DwellConfig {
        dwell_time: Duration::from_millis(dwell_ms),
        dwell_radius: radius,
    };
    (DwellGestureDetector::with_clock(config, clock.clone()), clock)
}

// ── Tests ──────────────────────────────────────────────────

//! IPC message dispatch: parse s-expressions and route to handlers.
//!
//! A [`ReplaySession`] owns a gesture engine driven by a manual clock, so
//! recorded landmark streams replay deterministically: each `:frame`
//! message carries its own timestamp.

use std::time::Duration;

use lexpr::Value;
use tracing::{debug, warn};

use crate::gesture::{
    parse_landmark, Clock, FrameSize, GestureConfig, GestureEngine, HandObservation, Landmark,
    ManualClock,
};

/// Frame size assumed until a `:frame` message specifies one.
pub const DEFAULT_FRAME_SIZE: FrameSize = FrameSize {
    width: 1280,
    height: 720,
};

// ── Session ────────────────────────────────────────────────

/// Engine, clock, and frame size shared across the messages of one replay.
#[derive(Debug)]
pub struct ReplaySession {
    engine: GestureEngine<ManualClock>,
    clock: ManualClock,
    frame: FrameSize,
}

impl ReplaySession {
    pub fn new(config: GestureConfig) -> Self {
        let clock = ManualClock::new();
        Self {
            engine: GestureEngine::with_clock(config, clock.clone()),
            clock,
            frame: DEFAULT_FRAME_SIZE,
        }
    }

    pub fn engine(&self) -> &GestureEngine<ManualClock> {
        &self.engine
    }

    /// Frame size used for the most recent `:frame`.
    pub fn frame(&self) -> FrameSize {
        self.frame
    }

    /// Replay time of the most recent timestamped `:frame`.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }
}

impl Default for ReplaySession {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

// ── Dispatch ───────────────────────────────────────────────

/// Parse an s-expression message and dispatch to the appropriate handler.
/// Returns an optional response (one s-expression per line).
pub fn handle_message(session: &mut ReplaySession, raw: &str) -> Option<String> {
    let value = match lexpr::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("malformed s-expression: {}", e);
            return Some(error_response(0, &format!("malformed s-expression: {e}")));
        }
    };

    let msg_type = get_keyword(&value, "type");
    let msg_id = get_int(&value, "id").unwrap_or(0);

    match msg_type.as_deref() {
        Some("frame") => handle_frame(session, msg_id, &value),
        Some("gesture-status") => handle_gesture_status(session, msg_id),
        Some("gesture-config") => handle_gesture_config(session, msg_id, &value),
        Some("gesture-reset") => handle_gesture_reset(session, msg_id),
        Some("dwell-reset") => handle_dwell_reset(session, msg_id),
        Some("landmark-distance") => handle_landmark_distance(msg_id, &value),
        Some(other) => {
            warn!("unknown message type: {}", other);
            Some(error_response(
                msg_id,
                &format!("unknown message type: {other}"),
            ))
        }
        None => {
            warn!("message without :type");
            Some(error_response(msg_id, "missing :type"))
        }
    }
}

// ── Handlers ───────────────────────────────────────────────

fn handle_frame(session: &mut ReplaySession, msg_id: i64, value: &Value) -> Option<String> {
    let now = match get_keyword(value, "t").map(|t| t.parse().ok().and_then(millis_to_duration)) {
        Some(None) => return Some(error_response(msg_id, "invalid :t")),
        Some(Some(now)) => Some(now),
        None => None,
    };

    let mut frame = session.frame;
    if let Some(width) = get_keyword(value, "width") {
        match parse_dimension(&width) {
            Some(w) => frame.width = w,
            None => return Some(error_response(msg_id, "invalid :width")),
        }
    }
    if let Some(height) = get_keyword(value, "height") {
        match parse_dimension(&height) {
            Some(h) => frame.height = h,
            None => return Some(error_response(msg_id, "invalid :height")),
        }
    }
    if let Some(now) = now {
        session.clock.set(now);
    }
    session.frame = frame;

    let landmarks = get_value(value, "landmarks")
        .map(parse_landmarks)
        .unwrap_or_default();
    debug!(
        "frame at {}ms: {} landmarks, {}x{}",
        session.now().as_millis(),
        landmarks.len(),
        frame.width,
        frame.height,
    );

    let events = session.engine.update(&landmarks, frame);
    if events.is_empty() {
        return None;
    }
    Some(
        events
            .iter()
            .map(|e| e.to_sexp())
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

fn handle_gesture_status(session: &mut ReplaySession, msg_id: i64) -> Option<String> {
    let status = session.engine.status_sexp();
    Some(format!(
        "(:type :response :id {} :status :ok :gesture {})",
        msg_id, status
    ))
}

fn handle_gesture_config(
    session: &mut ReplaySession,
    msg_id: i64,
    value: &Value,
) -> Option<String> {
    let mut config = session.engine.config().clone();

    if let Some(enabled) = get_keyword(value, "enabled") {
        match parse_bool(&enabled) {
            Some(b) => config.enabled = b,
            None => return Some(error_response(msg_id, "invalid :enabled (expected t or nil)")),
        }
    }
    if let Some(pinch) = get_float(value, "pinch-threshold") {
        if !is_non_negative(pinch) {
            return Some(error_response(msg_id, "invalid :pinch-threshold"));
        }
        config.pinch_threshold = pinch;
    }
    if let Some(scissors) = get_float(value, "scissors-threshold") {
        if !is_non_negative(scissors) {
            return Some(error_response(msg_id, "invalid :scissors-threshold"));
        }
        config.scissors_threshold = scissors;
    }
    if let Some(ms) = get_float(value, "dwell-ms") {
        match millis_to_duration(ms) {
            Some(d) => config.dwell_time = d,
            None => return Some(error_response(msg_id, "invalid :dwell-ms")),
        }
    }
    if let Some(radius) = get_float(value, "dwell-radius") {
        if !is_non_negative(radius) {
            return Some(error_response(msg_id, "invalid :dwell-radius"));
        }
        config.dwell_radius = radius;
    }

    // Rebuilding discards detector state, so skip it when nothing changed
    if config != *session.engine.config() {
        session.engine.set_config(config);
    }

    let config = session.engine.config_sexp();
    Some(format!(
        "(:type :response :id {} :status :ok :config {})",
        msg_id, config
    ))
}

fn handle_gesture_reset(session: &mut ReplaySession, msg_id: i64) -> Option<String> {
    session.engine.reset();
    Some(ok_response(msg_id))
}

fn handle_dwell_reset(session: &mut ReplaySession, msg_id: i64) -> Option<String> {
    session.engine.dwell_mut().reset_dwell();
    Some(ok_response(msg_id))
}

fn handle_landmark_distance(msg_id: i64, value: &Value) -> Option<String> {
    let a = match get_keyword(value, "a").and_then(|s| parse_landmark(&s)) {
        Some(lm) => lm,
        None => return Some(error_response(msg_id, "missing or unknown :a")),
    };
    let b = match get_keyword(value, "b").and_then(|s| parse_landmark(&s)) {
        Some(lm) => lm,
        None => return Some(error_response(msg_id, "missing or unknown :b")),
    };

    let landmarks = get_value(value, "landmarks")
        .map(parse_landmarks)
        .unwrap_or_default();
    let hand = match HandObservation::from_landmarks(&landmarks) {
        Some(hand) => hand,
        None => return Some(error_response(msg_id, "incomplete landmark set")),
    };

    Some(format!(
        "(:type :response :id {} :status :ok :a :{} :b :{} :distance {:.6})",
        msg_id,
        a.as_str(),
        b.as_str(),
        hand.distance(a, b),
    ))
}

// ── Landmark parsing ───────────────────────────────────────

/// Parse `((x y [z]) ...)`.
///
/// Any malformed entry makes the whole set empty, which detectors treat as
/// a frame without a hand.
fn parse_landmarks(value: &Value) -> Vec<Landmark> {
    let Some(items) = list_items(value) else {
        warn!("landmarks are not a list: {}", value);
        return Vec::new();
    };
    let mut landmarks = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match parse_point(item) {
            Some(lm) => landmarks.push(lm),
            None => {
                warn!("malformed landmark {}: {}", i, item);
                return Vec::new();
            }
        }
    }
    landmarks
}

fn parse_point(value: &Value) -> Option<Landmark> {
    let coords = list_items(value)?
        .into_iter()
        .map(|v| match v {
            Value::Number(n) => n.as_f64(),
            _ => None,
        })
        .collect::<Option<Vec<f64>>>()?;
    match coords[..] {
        [x, y] => Some(Landmark::planar(x, y)),
        [x, y, z] => Some(Landmark::new(x, y, z)),
        _ => None,
    }
}

/// Elements of a proper list.  `nil` and `()` are empty lists.
fn list_items(value: &Value) -> Option<Vec<&Value>> {
    let mut items = Vec::new();
    let mut current = value;
    loop {
        match current {
            Value::Cons(pair) => {
                items.push(pair.car());
                current = pair.cdr();
            }
            Value::Null | Value::Nil => return Some(items),
            Value::Symbol(s) if items.is_empty() && s.as_ref() == "nil" => return Some(items),
            _ => return None,
        }
    }
}

// ── Helpers ────────────────────────────────────────────────

fn ok_response(id: i64) -> String {
    format!("(:type :response :id {} :status :ok)", id)
}

fn error_response(id: i64, reason: &str) -> String {
    format!(
        "(:type :response :id {} :status :error :reason \"{}\")",
        id,
        escape_string(reason)
    )
}

/// Escape a string for s-expression output.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn millis_to_duration(ms: f64) -> Option<Duration> {
    if !ms.is_finite() || ms < 0.0 {
        return None;
    }
    Some(Duration::from_micros((ms * 1000.0).round() as u64))
}

fn parse_dimension(s: &str) -> Option<u32> {
    s.parse::<u32>().ok().filter(|d| *d > 0)
}

fn is_non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

/// Find the value following `:key` in an s-expression plist.
/// Handles both `Value::Keyword("key")` (elisp parser) and
/// `Value::Symbol(":key")` (default parser) forms.
fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

/// Extract a plist value rendered as a string, with any leading `:` on
/// keyword values stripped.
fn get_keyword(value: &Value, key: &str) -> Option<String> {
    get_value(value, key).map(|val| match val {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => {
            let s = v.to_string();
            s.strip_prefix(':').unwrap_or(&s).to_string()
        }
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => (if *b { "t" } else { "nil" }).to_string(),
        Value::Null => "nil".to_string(),
        _ => val.to_string(),
    })
}

/// Extract an integer value from an s-expression plist.
fn get_int(value: &Value, key: &str) -> Option<i64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Extract a boolean value from an s-expression plist.
/// Only "t" and "nil" are booleans; anything else is `None`.
fn get_bool(value: &Value, key: &str) -> Option<bool> {
    get_keyword(value, key).and_then(|s| parse_bool(&s))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "t" => Some(true),
        "nil" => Some(false),
        _ => None,
    }
}

/// Extract a floating-point value from an s-expression plist.
fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

//! Distance and area math shared by the landmark gesture detectors.

use super::landmarks::{FrameSize, HandLandmark, HandObservation, Landmark};

/// Euclidean distance between two landmarks.
///
/// A missing `z` counts as `0` on each point independently.
pub fn distance(p1: &Landmark, p2: &Landmark) -> f64 {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    let dz = p1.z.unwrap_or(0.0) - p2.z.unwrap_or(0.0);
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Euclidean distance between two 2D points.
pub fn planar_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Approximate hand area: the pixel bounding box of all landmarks, divided
/// by 100.
///
/// Each landmark is scaled to pixels and truncated before the box is taken.
/// An empty slice has zero area.
pub fn hand_area(landmarks: &[Landmark], frame: FrameSize) -> f64 {
    let mut points = landmarks.iter().map(|lm| (frame.px_x(lm.x), frame.px_y(lm.y)));
    let Some((x0, y0)) = points.next() else {
        return 0.0;
    };
    let (mut xmin, mut xmax, mut ymin, mut ymax) = (x0, x0, y0, y0);
    for (x, y) in points {
        xmin = xmin.min(x);
        xmax = xmax.max(x);
        ymin = ymin.min(y);
        ymax = ymax.max(y);
    }
    let width = xmax as i64 - xmin as i64;
    let height = ymax as i64 - ymin as i64;
    (width * height) as f64 / 100.0
}

impl HandObservation<'_> {
    /// Distance between two landmarks of this hand.
    pub fn distance(&self, a: HandLandmark, b: HandLandmark) -> f64 {
        distance(self.get(a), self.get(b))
    }

    /// [`hand_area`] of this hand.
    pub fn area(&self, frame: FrameSize) -> f64 {
        hand_area(self.landmarks(), frame)
    }
}

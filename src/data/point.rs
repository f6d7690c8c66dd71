use chrono::NaiveDateTime;

use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{TrailError, TrailResult};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One observation of a moving object.
pub struct TrajectoryPoint {
    /// Numeric temporal axis used for ordering and animation.
    pub time: f64,
    /// Horizontal coordinate (longitude for geographic data).
    pub x: f64,
    /// Vertical coordinate (latitude for geographic data).
    pub y: f64,
    /// Optional scalar encoded by marker size/color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<f64>,
    /// Absolute timestamp when the time axis comes from calendar data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    /// Text shown by the labels layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TrajectoryPoint {
    /// Point without magnitude, timestamp or label.
    pub fn new(time: f64, x: f64, y: f64) -> Self {
        Self {
            time,
            x,
            y,
            magnitude: None,
            timestamp: None,
            label: None,
        }
    }

    /// Attach a magnitude.
    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = Some(magnitude);
        self
    }

    /// Attach an absolute timestamp.
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Attach a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Data-space position.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Ordered, validated sequence of [`TrajectoryPoint`]s.
///
/// Sequence order is the temporal axis: `time` never decreases from one point to the next.
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    /// Validate and wrap a point sequence.
    pub fn new(points: Vec<TrajectoryPoint>) -> TrailResult<Self> {
        if points.is_empty() {
            return Err(TrailError::validation("trajectory must have at least one point"));
        }
        for (i, p) in points.iter().enumerate() {
            if !(p.time.is_finite() && p.x.is_finite() && p.y.is_finite()) {
                return Err(TrailError::validation(format!(
                    "trajectory point {i} has a non-finite coordinate"
                )));
            }
            if p.magnitude.is_some_and(|m| !m.is_finite()) {
                return Err(TrailError::validation(format!(
                    "trajectory point {i} has a non-finite magnitude"
                )));
            }
        }
        if !points.windows(2).all(|w| w[0].time <= w[1].time) {
            return Err(TrailError::validation(
                "trajectory points must be ordered by time",
            ));
        }
        Ok(Self { points })
    }

    /// Borrow the points in sequence order.
    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    /// Number of points (always >= 1).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false` for a validated trajectory.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(first, last)` time values.
    pub fn time_span(&self) -> (f64, f64) {
        let first = self.points.first().map_or(0.0, |p| p.time);
        let last = self.points.last().map_or(0.0, |p| p.time);
        (first, last)
    }

    /// Axis-aligned extent of all positions.
    pub fn bounds(&self) -> Rect {
        let mut r = Rect::from_points(self.points[0].position(), self.points[0].position());
        for p in &self.points[1..] {
            r = r.union_pt(p.position());
        }
        r
    }

    /// `(min, max)` magnitude, or `None` when no point carries one.
    pub fn magnitude_span(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.magnitude)
            .fold(None, |acc, m| match acc {
                None => Some((m, m)),
                Some((lo, hi)) => Some((lo.min(m), hi.max(m))),
            })
    }

    /// `true` when every point carries a magnitude.
    pub fn has_magnitudes(&self) -> bool {
        self.points.iter().all(|p| p.magnitude.is_some())
    }

    /// Number of leading points with `time <= t`.
    pub fn count_at_or_before(&self, t: f64) -> usize {
        self.points.partition_point(|p| p.time <= t)
    }

    /// Position at time `t`, linearly interpolated between neighbouring points and clamped to
    /// the ends of the trajectory.
    pub fn position_at(&self, t: f64) -> Point {
        let idx = self.count_at_or_before(t);
        if idx == 0 {
            return self.points[0].position();
        }
        if idx >= self.points.len() {
            return self.points[self.points.len() - 1].position();
        }
        let a = &self.points[idx - 1];
        let b = &self.points[idx];
        let span = b.time - a.time;
        if span <= 0.0 {
            return a.position();
        }
        let u = ((t - a.time) / span).clamp(0.0, 1.0);
        a.position().lerp(b.position(), u)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/point.rs"]
mod tests;

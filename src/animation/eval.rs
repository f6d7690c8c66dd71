use crate::{
    animation::spec::{AnimationSpec, Policy},
    foundation::core::{FrameIndex, Point, Rgba8},
    foundation::error::TrailResult,
};

#[derive(Clone, Debug, PartialEq)]
/// Everything visible at one frame, in data space.
pub struct FrameState {
    /// Evaluated frame.
    pub frame: FrameIndex,
    /// Data time shown.
    pub time: f64,
    /// Human-readable `time` (date for calendar data).
    pub time_label: String,
    /// Visible markers, oldest first.
    pub points: Vec<VisiblePoint>,
    /// Visible path pieces, oldest first.
    pub segments: Vec<PathSegment>,
    /// Current, interpolated position.
    pub head: Head,
}

impl FrameState {
    /// Replace `{time}` in `template` with this frame's time label.
    pub fn fill_template(&self, template: &str) -> String {
        template.replace("{time}", &self.time_label)
    }

    /// `true` when both states draw the same picture, whatever their frame index.
    pub fn same_picture(&self, other: &FrameState) -> bool {
        self.time_label == other.time_label
            && self.head == other.head
            && self.points == other.points
            && self.segments == other.segments
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// A visible data point.
pub struct VisiblePoint {
    /// Index into the trajectory.
    pub index: usize,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Multiplier on the encoded radius.
    pub size_factor: f64,
    /// Color override (trail color).
    pub tint: Option<Rgba8>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// One straight piece of the path.
pub struct PathSegment {
    /// Start, data space.
    pub from: Point,
    /// End, data space.
    pub to: Point,
    /// Trajectory index whose encoding colors the segment.
    pub index: usize,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Color override (trail color).
    pub tint: Option<Rgba8>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Interpolated current position.
pub struct Head {
    /// Position in data space.
    pub position: Point,
    /// Latest trajectory index with `time <= t`.
    pub index: usize,
}

/// Stateless frame evaluator.
pub struct Evaluator;

impl Evaluator {
    /// Resolve the visible points, path pieces and head at `frame`.
    #[tracing::instrument(skip(spec), fields(frame = frame.0))]
    pub fn eval_frame(spec: &AnimationSpec, frame: FrameIndex) -> TrailResult<FrameState> {
        let t = spec.frame_time(frame)?;
        let traj = &spec.plot.trajectory;
        let pts = traj.points();

        // t never precedes the first point, so at least one point is revealed.
        let revealed = traj.count_at_or_before(t).max(1);
        let head = Head {
            position: traj.position_at(t),
            index: revealed - 1,
        };

        let mut points = Vec::new();
        let mut segments = Vec::new();
        match spec.policy {
            Policy::CumulativeReveal => {
                points.extend((0..revealed).map(|index| VisiblePoint {
                    index,
                    opacity: 1.0,
                    size_factor: 1.0,
                    tint: None,
                }));
                segments.extend((1..revealed).map(|i| PathSegment {
                    from: pts[i - 1].position(),
                    to: pts[i].position(),
                    index: i,
                    opacity: 1.0,
                    tint: None,
                }));
                let last = pts[revealed - 1].position();
                if revealed < pts.len() && last != head.position {
                    segments.push(PathSegment {
                        from: last,
                        to: head.position,
                        index: revealed,
                        opacity: 1.0,
                        tint: None,
                    });
                }
            }
            Policy::TimeIndexed { trail: None } => {}
            Policy::TimeIndexed { trail: Some(trail) } => {
                // Walk back from the head until points age out of the window.
                let start = pts[..revealed]
                    .iter()
                    .rposition(|p| trail.opacity_at(t - p.time).is_none())
                    .map_or(0, |i| i + 1);
                for (index, p) in pts.iter().enumerate().take(revealed).skip(start) {
                    let age = t - p.time;
                    let Some(opacity) = trail.opacity_at(age) else {
                        continue;
                    };
                    points.push(VisiblePoint {
                        index,
                        opacity,
                        size_factor: trail.size_factor_at(age),
                        tint: trail.color,
                    });
                }
                for w in points.windows(2) {
                    segments.push(PathSegment {
                        from: pts[w[0].index].position(),
                        to: pts[w[1].index].position(),
                        index: w[1].index,
                        opacity: w[0].opacity,
                        tint: trail.color,
                    });
                }
                if let Some(newest) = points.last()
                    && pts[newest.index].position() != head.position
                {
                    segments.push(PathSegment {
                        from: pts[newest.index].position(),
                        to: head.position,
                        index: newest.index,
                        opacity: newest.opacity,
                        tint: trail.color,
                    });
                }
            }
        }

        Ok(FrameState {
            frame,
            time: t,
            time_label: time_label(spec, t),
            points,
            segments,
            head,
        })
    }
}

/// Calendar data carries hours since the epoch; everything else prints the raw value.
fn time_label(spec: &AnimationSpec, t: f64) -> String {
    let calendar = spec
        .plot
        .trajectory
        .points()
        .first()
        .is_some_and(|p| p.timestamp.is_some());
    if calendar {
        let secs = (t * 3600.0).round() as i64;
        if let Some(dt) = chrono::DateTime::from_timestamp(secs, 0) {
            return dt.naive_utc().format("%Y-%m-%d %H:%M").to_string();
        }
    }
    if (t - t.round()).abs() < 1e-9 {
        format!("{t:.0}")
    } else {
        format!("{t:.1}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/eval.rs"]
mod tests;

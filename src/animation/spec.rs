use crate::{
    animation::anim::TimeTrack,
    animation::ease::Ease,
    animation::eval::{Evaluator, FrameState},
    foundation::core::{Fps, FrameIndex, FrameRange, Rgba8},
    foundation::error::{TrailError, TrailResult},
    plot::spec::PlotSpec,
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Fading wake of past positions behind the current one.
pub struct Trail {
    /// Age (in data-time units) at which points disappear; must be > 0.
    pub window: f64,
    /// Opacity of a point of age 0, in `(0, 1]`.
    pub alpha: f64,
    /// Override color for trail marks; `None` keeps the encoded colors.
    pub color: Option<Rgba8>,
    /// Shrink older marks down to half size.
    pub shrink: bool,
    /// Shape of the decay over the window.
    pub falloff: Ease,
}

impl Trail {
    /// Trail of `window` time units with default styling.
    pub fn new(window: f64) -> Self {
        Self {
            window,
            alpha: 0.5,
            color: None,
            shrink: true,
            falloff: Ease::Linear,
        }
    }

    /// Reject non-positive windows and out-of-range alpha.
    pub fn validate(&self) -> TrailResult<()> {
        if !self.window.is_finite() || self.window <= 0.0 {
            return Err(TrailError::validation("trail window must be finite and > 0"));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(TrailError::validation("trail alpha must be in (0, 1]"));
        }
        Ok(())
    }

    /// Opacity of a mark of the given age, or `None` once it has aged out of the window.
    ///
    /// Strictly decreasing in `age` over `[0, window)`.
    pub fn opacity_at(&self, age: f64) -> Option<f64> {
        if !(0.0..self.window).contains(&age) {
            return None;
        }
        Some(self.alpha * (1.0 - self.falloff.apply(age / self.window)))
    }

    /// Size multiplier of a mark of the given age.
    pub fn size_factor_at(&self, age: f64) -> f64 {
        if !self.shrink {
            return 1.0;
        }
        1.0 - 0.5 * self.falloff.apply(age / self.window)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// What is visible at a given frame time `t`.
///
/// The two policies are exclusive. Cumulative reveal already keeps every past point on screen,
/// so a trail on top of it would be invisible; [`AnimationBuilder`] drops such a trail with a
/// warning instead of failing.
pub enum Policy {
    /// Every point with `time <= t`; the path grows monotonically.
    CumulativeReveal,
    /// Only the interpolated current position, plus an optional fading trail.
    TimeIndexed {
        /// Optional wake of recent points.
        trail: Option<Trail>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Output frame rate and length.
pub struct Timing {
    /// Output frame rate.
    pub fps: Fps,
    /// Frames spent moving through the data (>= 1).
    pub frames: u64,
    /// Extra frames holding the final state.
    pub end_pause: u64,
}

impl Timing {
    /// Timing from a frame rate and durations in seconds.
    pub fn from_duration(fps: Fps, secs: f64, end_pause_secs: f64) -> TrailResult<Self> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(TrailError::validation("animation duration must be > 0 seconds"));
        }
        if !end_pause_secs.is_finite() || end_pause_secs < 0.0 {
            return Err(TrailError::validation("end pause must be >= 0 seconds"));
        }
        let timing = Self {
            fps,
            frames: fps.secs_to_frames_round(secs),
            end_pause: fps.secs_to_frames_round(end_pause_secs),
        };
        timing.validate()?;
        Ok(timing)
    }

    /// Reject zero frame counts and zero rates.
    pub fn validate(&self) -> TrailResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(TrailError::validation("fps must have num>0 and den>0"));
        }
        if self.frames == 0 {
            return Err(TrailError::validation("animation needs at least one frame"));
        }
        Ok(())
    }

    /// Animated frames plus the end pause.
    pub fn total_frames(&self) -> u64 {
        self.frames.saturating_add(self.end_pause)
    }

    /// Same wall-clock length with `factor` times as many frames, at `factor` times the rate.
    pub fn upsampled(self, factor: u32) -> TrailResult<Self> {
        if factor == 0 {
            return Err(TrailError::validation("upsampling factor must be >= 1"));
        }
        let num = self
            .fps
            .num
            .checked_mul(factor)
            .ok_or_else(|| TrailError::validation("upsampled fps overflows"))?;
        let timing = Self {
            fps: Fps::new(num, self.fps.den)?,
            frames: self.frames.saturating_mul(u64::from(factor)),
            end_pause: self.end_pause.saturating_mul(u64::from(factor)),
        };
        timing.validate()?;
        Ok(timing)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            fps: Fps { num: 10, den: 1 },
            frames: 100,
            end_pause: 0,
        }
    }
}

#[derive(Clone, Debug)]
/// A plot plus everything needed to turn it into frames.
pub struct AnimationSpec {
    /// Static plot.
    pub plot: PlotSpec,
    /// Visibility policy.
    pub policy: Policy,
    /// Frame rate and length.
    pub timing: Timing,
    /// Ease between consecutive data times.
    pub ease: Ease,
    time_track: TimeTrack,
}

impl AnimationSpec {
    /// Total output frames.
    pub fn total_frames(&self) -> u64 {
        self.timing.total_frames()
    }

    /// `[0, total_frames)`.
    pub fn frame_range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.total_frames()),
        }
    }

    /// Data time shown at `frame`.
    pub fn frame_time(&self, frame: FrameIndex) -> TrailResult<f64> {
        if frame.0 >= self.total_frames() {
            return Err(TrailError::validation(format!(
                "frame {} is out of bounds ({} frames)",
                frame.0,
                self.total_frames()
            )));
        }
        Ok(self.time_track.sample(frame))
    }

    /// Visible state at `frame`.
    pub fn evaluate(&self, frame: FrameIndex) -> TrailResult<FrameState> {
        Evaluator::eval_frame(self, frame)
    }
}

/// Builder for [`AnimationSpec`](crate::AnimationSpec).
pub struct AnimationBuilder {
    plot: PlotSpec,
    policy: Policy,
    trail: Option<Trail>,
    timing: Timing,
    ease: Ease,
}

impl AnimationBuilder {
    /// Cumulative reveal at 10 fps over 100 frames, linear.
    pub fn new(plot: PlotSpec) -> Self {
        Self {
            plot,
            policy: Policy::CumulativeReveal,
            trail: None,
            timing: Timing::default(),
            ease: Ease::Linear,
        }
    }

    /// Reveal points cumulatively.
    pub fn cumulative_reveal(mut self) -> Self {
        self.policy = Policy::CumulativeReveal;
        self
    }

    /// Show only the current position (plus trail, if set).
    pub fn time_indexed(mut self) -> Self {
        self.policy = Policy::TimeIndexed { trail: None };
        self
    }

    /// Attach a fading trail. Ignored, with a warning, under cumulative reveal.
    pub fn trail(mut self, trail: Trail) -> Self {
        self.trail = Some(trail);
        self
    }

    /// Replace timing.
    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Ease between consecutive data times.
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Validate and build the frame → time mapping.
    pub fn build(self) -> TrailResult<AnimationSpec> {
        self.timing.validate()?;
        if let Some(trail) = &self.trail {
            trail.validate()?;
        }

        let policy = match (self.policy, self.trail) {
            (Policy::CumulativeReveal, Some(_)) => {
                tracing::warn!(
                    "trail has no visible effect under cumulative reveal; dropping it"
                );
                Policy::CumulativeReveal
            }
            (Policy::CumulativeReveal, None) => Policy::CumulativeReveal,
            (Policy::TimeIndexed { .. }, trail) => Policy::TimeIndexed { trail },
        };

        let time_track = build_time_track(&self.plot, self.timing.frames, self.ease)?;
        tracing::debug!(
            frames = self.timing.total_frames(),
            ?policy,
            "built animation spec"
        );

        Ok(AnimationSpec {
            plot: self.plot,
            policy,
            timing: self.timing,
            ease: self.ease,
            time_track,
        })
    }
}

fn build_time_track(plot: &PlotSpec, frames: u64, ease: Ease) -> TrailResult<TimeTrack> {
    let times = plot.trajectory.points().iter().map(|p| p.time).collect();
    TimeTrack::new(times, frames, ease)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spec.rs"]
mod tests;

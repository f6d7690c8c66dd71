use crate::{
    animation::ease::Ease,
    foundation::core::FrameIndex,
    foundation::error::{TrailError, TrailResult},
};

/// Frame → data-time mapping of an animation.
///
/// Animated frames are spread evenly over `[t0, t1]`: frame 0 shows the first data time and the
/// last animated frame the last one. Between two consecutive data times the progress is shaped
/// by `ease`, so every data time is still reached at the frame where linear timing would reach
/// it. Frames past the animated range hold `t1`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeTrack {
    times: Vec<f64>,
    frames: u64,
    ease: Ease,
}

impl TimeTrack {
    /// Track over the distinct, sorted data `times` for `frames` animated frames.
    pub fn new(mut times: Vec<f64>, frames: u64, ease: Ease) -> TrailResult<Self> {
        if times.is_empty() {
            return Err(TrailError::validation("time track needs at least one data time"));
        }
        if times.iter().any(|t| !t.is_finite()) {
            return Err(TrailError::validation("time track data times must be finite"));
        }
        if !times.windows(2).all(|w| w[0] <= w[1]) {
            return Err(TrailError::validation(
                "time track data times must be sorted",
            ));
        }
        if frames == 0 {
            return Err(TrailError::validation("time track needs at least one frame"));
        }
        times.dedup();
        Ok(Self {
            times,
            frames,
            ease,
        })
    }

    /// `(first, last)` data time.
    pub fn span(&self) -> (f64, f64) {
        (self.times[0], self.times[self.times.len() - 1])
    }

    /// Data time at `frame`.
    pub fn sample(&self, frame: FrameIndex) -> f64 {
        let (t0, t1) = self.span();
        if self.times.len() < 2 || self.frames < 2 {
            return t1;
        }
        let last = self.frames - 1;
        if frame.0 >= last {
            return t1;
        }

        let x = t0 + (frame.0 as f64) * (t1 - t0) / (last as f64);
        let i = self
            .times
            .partition_point(|t| *t <= x)
            .saturating_sub(1)
            .min(self.times.len() - 2);
        let (a, b) = (self.times[i], self.times[i + 1]);
        let u = ((x - a) / (b - a)).clamp(0.0, 1.0);
        a + (b - a) * self.ease.apply(u)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;

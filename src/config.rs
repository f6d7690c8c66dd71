use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    animation::ease::Ease,
    animation::spec::{Timing, Trail},
    data::random_walk::RandomWalkParams,
    data::storms::Magnitude,
    foundation::core::{Fps, Rgba8},
    foundation::error::{TrailError, TrailResult},
    render::pipeline::RenderThreading,
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Every knob of the tutorial pipelines.
///
/// Missing JSON fields keep their defaults, so a config file only lists overrides.
pub struct TutorialConfig {
    /// Synthetic trajectory parameters.
    pub walk: RandomWalkParams,
    /// Output size and timing.
    pub render: RenderOpts,
    /// Wake shown by the shadow and storm animations.
    pub trail: TrailOpts,
    /// Historical pipeline input.
    pub storm: StormOpts,
}

impl TutorialConfig {
    /// Parse a JSON config.
    pub fn from_json_str(s: &str) -> TrailResult<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse tutorial config json")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> TrailResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Check every section.
    pub fn validate(&self) -> TrailResult<()> {
        self.walk.validate()?;
        self.render.timing()?;
        self.render.threading_checked()?;
        self.trail.validate()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Output size and timing.
pub struct RenderOpts {
    /// Frames per second.
    pub fps: u32,
    /// Animated length in seconds.
    pub duration_secs: f64,
    /// Extra seconds holding the final frame.
    pub end_pause_secs: f64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Canvas background; also the GIF flattening color.
    pub background: Rgba8,
    /// Render frames on a rayon pool.
    pub parallel: bool,
    /// Pool size when `parallel` is set.
    pub threads: Option<usize>,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            fps: 10,
            duration_secs: 10.0,
            end_pause_secs: 0.0,
            width: 480,
            height: 480,
            background: Rgba8::WHITE,
            parallel: false,
            threads: None,
        }
    }
}

impl RenderOpts {
    /// Frame rate as a rational.
    pub fn fps(&self) -> TrailResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Frame count from fps and durations.
    pub fn timing(&self) -> TrailResult<Timing> {
        Timing::from_duration(self.fps()?, self.duration_secs, self.end_pause_secs)
    }

    /// Threading options for range renders.
    pub fn threading(&self) -> RenderThreading {
        RenderThreading {
            parallel: self.parallel,
            threads: self.threads,
            ..RenderThreading::default()
        }
    }

    fn threading_checked(&self) -> TrailResult<RenderThreading> {
        if self.threads == Some(0) {
            return Err(TrailError::validation("render threads must be >= 1 when set"));
        }
        Ok(self.threading())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Trail settings relative to the data's time span.
pub struct TrailOpts {
    /// Window as a fraction of the full time span, in `(0, 1]`.
    pub wake_length: f64,
    /// Opacity of the newest trail mark.
    pub alpha: f64,
    /// Trail color; `None` keeps the encoded colors.
    pub color: Option<Rgba8>,
    /// Shrink older marks.
    pub shrink: bool,
    /// Decay curve.
    pub falloff: Ease,
}

impl Default for TrailOpts {
    fn default() -> Self {
        Self {
            wake_length: 0.1,
            alpha: 0.5,
            color: None,
            shrink: true,
            falloff: Ease::Linear,
        }
    }
}

impl TrailOpts {
    /// Reject out-of-range fractions and opacities.
    pub fn validate(&self) -> TrailResult<()> {
        if !(self.wake_length > 0.0 && self.wake_length <= 1.0) {
            return Err(TrailError::validation("trail wake_length must be in (0, 1]"));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(TrailError::validation("trail alpha must be in (0, 1]"));
        }
        Ok(())
    }

    /// Concrete trail for data spanning `(t0, t1)`.
    ///
    /// A zero-length span gets a window of one time unit.
    pub fn to_trail(&self, (t0, t1): (f64, f64)) -> TrailResult<Trail> {
        self.validate()?;
        let span = t1 - t0;
        let window = if span > 0.0 {
            span * self.wake_length
        } else {
            1.0
        };
        let trail = Trail {
            window,
            alpha: self.alpha,
            color: self.color,
            shrink: self.shrink,
            falloff: self.falloff,
        };
        trail.validate()?;
        Ok(trail)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Historical pipeline input.
pub struct StormOpts {
    /// Storms CSV.
    pub data_path: PathBuf,
    /// Optional GeoJSON borders; a frame around the track is drawn otherwise.
    pub borders_path: Option<PathBuf>,
    /// Storm name filter.
    pub name: String,
    /// Season year filter.
    pub year: i32,
    /// Field encoded by marker color and size.
    pub magnitude: Magnitude,
}

impl Default for StormOpts {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("storms.csv"),
            borders_path: None,
            name: "Katrina".to_owned(),
            year: 2005,
            magnitude: Magnitude::Wind,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

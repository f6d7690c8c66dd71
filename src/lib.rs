//! trailplot renders static and animated 2D trajectory plots and writes them as animated GIFs.
//!
//! Every animation goes through the same four stages:
//!
//! - Produce a [`Trajectory`] (seeded [`random walk`](generate) or a [`StormTable`] subset)
//! - Describe the static plot with a [`PlotBuilder`]
//! - Describe what is visible over time with an [`AnimationBuilder`]
//! - Render frames with a [`RenderBackend`] into a [`FrameSink`], e.g. [`render_to_gif`]
//!
//! The [`tutorial`] module chains these stages into the ready-made synthetic and storm recipes.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod config;
pub(crate) mod data;
pub(crate) mod encode;
pub(crate) mod plot;
pub(crate) mod render;
pub mod tutorial;

pub use crate::foundation::core::{
    Canvas, Fps, FrameIndex, FrameRange, MAX_CANVAS_DIM, Point, Rect, Rgba8, Vec2,
};
pub use crate::foundation::error::{TrailError, TrailResult};

pub use crate::data::basemap::Basemap;
pub use crate::data::point::{Trajectory, TrajectoryPoint};
pub use crate::data::random_walk::{Drift, RandomWalkParams, Rng64, generate};
pub use crate::data::storms::{
    Magnitude, StormObservation, StormTable, StormTrack, TrackRow, reconstruct_timestamp,
};

pub use crate::plot::builder::PlotBuilder;
pub use crate::plot::scale::{ColorScale, LinearScale, SizeScale, nice_ticks, padded};
pub use crate::plot::spec::{
    Annotations, BasemapStyle, ColorEncoding, LabelMode, LabelStyle, Layer, PathStyle, PlotSpec,
    PointStyle, ScalarField, SizeEncoding, Theme,
};

pub use crate::animation::anim::TimeTrack;
pub use crate::animation::ease::Ease;
pub use crate::animation::eval::{Evaluator, FrameState, Head, PathSegment, VisiblePoint};
pub use crate::animation::spec::{AnimationBuilder, AnimationSpec, Policy, Timing, Trail};

pub use crate::encode::gif::{GifSink, GifSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::backend::{
    BackendKind, FrameRGBA, RenderBackend, RenderSettings, create_backend,
};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::pipeline::{
    RenderStats, RenderThreading, RenderToGifOpts, render_frame, render_frames,
    render_frames_with_stats, render_to_gif, render_to_sink, write_png,
};

pub use crate::config::{RenderOpts, StormOpts, TrailOpts, TutorialConfig};

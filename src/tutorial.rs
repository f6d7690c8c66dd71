//! Ready-made recipes for the synthetic random-walk and historical storm animations.

use std::path::{Path, PathBuf};

use crate::{
    animation::ease::Ease,
    animation::spec::{AnimationBuilder, AnimationSpec, Timing},
    config::TutorialConfig,
    data::basemap::Basemap,
    data::point::Trajectory,
    data::random_walk::generate,
    data::storms::{Magnitude, StormTable},
    foundation::core::Rect,
    foundation::error::{TrailError, TrailResult},
    plot::builder::PlotBuilder,
    plot::scale::{ColorScale, SizeScale},
    plot::spec::{
        BasemapStyle, LabelMode, LabelStyle, PathStyle, PlotSpec, PointStyle, ScalarField, Theme,
    },
    render::backend::{BackendKind, RenderSettings, create_backend},
    render::pipeline::{RenderToGifOpts, render_to_gif},
};

/// Cumulative reveal of the random walk.
pub const BASIC_GIF: &str = "trajectory_animation.gif";
/// Eased cumulative reveal.
pub const SMOOTH_GIF: &str = "trajectory_animation_smooth.gif";
/// Cumulative reveal with time labels.
pub const LABELS_GIF: &str = "trajectory_animation_labels.gif";
/// Moving head with a fading wake.
pub const SHADOW_GIF: &str = "trajectory_animation_shadow.gif";
/// Historical storm track.
pub const KATRINA_GIF: &str = "katrina_trajectory_animation.gif";

/// Degrees of margin around a storm track when no borders file is given.
const FRAME_MARGIN_DEG: f64 = 2.0;

/// Minimum frames between consecutive points in the eased variant.
const SMOOTH_FRAMES_PER_STEP: u64 = 3;

fn walk_plot(trajectory: Trajectory, cfg: &TutorialConfig, labels: bool) -> TrailResult<PlotSpec> {
    let mut builder = PlotBuilder::new(trajectory)
        .canvas(cfg.render.width, cfg.render.height)
        .path(PathStyle::default())
        .points(PointStyle::default())
        .color_by(ScalarField::Time, ColorScale::viridis())
        .title("Random walk")
        .subtitle("time: {time}")
        .axis_labels("x", "y")
        .theme(Theme {
            background: cfg.render.background,
            ..Theme::default()
        });
    if labels {
        builder = builder.labels(LabelStyle {
            mode: LabelMode::All,
            font_size: 9.0,
            ..LabelStyle::default()
        });
    }
    builder.build()
}

fn walk_animation(
    cfg: &TutorialConfig,
    labels: bool,
    configure: impl FnOnce(AnimationBuilder, &PlotSpec) -> TrailResult<AnimationBuilder>,
) -> TrailResult<AnimationSpec> {
    let trajectory = generate(&cfg.walk)?;
    let plot = walk_plot(trajectory, cfg, labels)?;
    let builder = AnimationBuilder::new(plot.clone()).timing(cfg.render.timing()?);
    configure(builder, &plot)?.build()
}

/// The path and points revealed cumulatively along time.
pub fn synthetic_basic(cfg: &TutorialConfig) -> TrailResult<AnimationSpec> {
    walk_animation(cfg, false, |b, _| Ok(b.cumulative_reveal()))
}

/// As [`synthetic_basic`], eased between consecutive points.
///
/// The frame rate is raised so every step between two points spans several frames; the
/// animation keeps the configured length in seconds.
pub fn synthetic_smooth(cfg: &TutorialConfig) -> TrailResult<AnimationSpec> {
    walk_animation(cfg, false, |b, plot| {
        let timing = smooth_timing(cfg.render.timing()?, plot.trajectory.len())?;
        Ok(b.cumulative_reveal().ease(Ease::InOutCubic).timing(timing))
    })
}

fn smooth_timing(timing: Timing, points: usize) -> TrailResult<Timing> {
    let steps = (points as u64).saturating_sub(1);
    let needed = steps * SMOOTH_FRAMES_PER_STEP + 1;
    let factor = needed.div_ceil(timing.frames).max(1);
    let factor = u32::try_from(factor)
        .map_err(|_| TrailError::validation("too many points for the eased variant"))?;
    timing.upsampled(factor)
}

/// As [`synthetic_basic`], with every revealed point labelled by its time.
pub fn synthetic_labels(cfg: &TutorialConfig) -> TrailResult<AnimationSpec> {
    walk_animation(cfg, true, |b, _| Ok(b.cumulative_reveal()))
}

/// Only the current position, followed by a fading wake.
pub fn synthetic_shadow(cfg: &TutorialConfig) -> TrailResult<AnimationSpec> {
    walk_animation(cfg, false, |b, plot| {
        let trail = cfg.trail.to_trail(plot.trajectory.time_span())?;
        Ok(b.time_indexed().trail(trail))
    })
}

/// The configured storm over map borders, sized and colored by its magnitude, with a wake.
///
/// Fails with `NoMatchingData` before any plot is built when the table has no such storm.
#[tracing::instrument(skip_all, fields(name = %cfg.storm.name, year = cfg.storm.year))]
pub fn katrina(
    cfg: &TutorialConfig,
    table: &StormTable,
    borders: Option<Basemap>,
) -> TrailResult<AnimationSpec> {
    let track = table.select(&cfg.storm.name, cfg.storm.year)?;
    let trajectory = track.to_trajectory(cfg.storm.magnitude)?;

    let borders = borders.unwrap_or_else(|| {
        let b = trajectory.bounds();
        Basemap::frame(Rect::new(
            b.x0 - FRAME_MARGIN_DEG,
            b.y0 - FRAME_MARGIN_DEG,
            b.x1 + FRAME_MARGIN_DEG,
            b.y1 + FRAME_MARGIN_DEG,
        ))
    });
    let magnitude = match cfg.storm.magnitude {
        Magnitude::Wind => "wind (kt)",
        Magnitude::Pressure => "pressure (mb)",
        Magnitude::Category => "category",
    };
    let trail = cfg.trail.to_trail(trajectory.time_span())?;

    let plot = PlotBuilder::new(trajectory)
        .canvas(cfg.render.width, cfg.render.height)
        .basemap(borders, BasemapStyle::default())
        .path(PathStyle::default())
        .points(PointStyle::default())
        .color_by(ScalarField::Magnitude, ColorScale::heat())
        .size_by(ScalarField::Magnitude, SizeScale::new(2.0, 9.0))
        .equal_aspect(true)
        .title(format!("Hurricane {} ({})", track.name, track.year))
        .subtitle(format!("{{time}} | color and size: {magnitude}"))
        .axis_labels("Longitude", "Latitude")
        .theme(Theme {
            background: cfg.render.background,
            ..Theme::default()
        })
        .build()?;

    AnimationBuilder::new(plot)
        .time_indexed()
        .trail(trail)
        .timing(cfg.render.timing()?)
        .build()
}

fn write_gif(cfg: &TutorialConfig, spec: &AnimationSpec, out: &Path) -> TrailResult<()> {
    let mut backend = create_backend(BackendKind::Cpu, &RenderSettings::default())?;
    let opts = RenderToGifOpts {
        threading: cfg.render.threading(),
        ..RenderToGifOpts::default()
    };
    render_to_gif(spec, out, opts, backend.as_mut())?;
    Ok(())
}

/// Write the four synthetic GIFs into `out_dir`; returns their paths.
#[tracing::instrument(skip(cfg, out_dir), fields(out_dir = %out_dir.as_ref().display()))]
pub fn render_all_synthetic(
    cfg: &TutorialConfig,
    out_dir: impl AsRef<Path>,
) -> TrailResult<Vec<PathBuf>> {
    type Recipe = fn(&TutorialConfig) -> TrailResult<AnimationSpec>;
    let recipes: [(Recipe, &str); 4] = [
        (synthetic_basic, BASIC_GIF),
        (synthetic_smooth, SMOOTH_GIF),
        (synthetic_labels, LABELS_GIF),
        (synthetic_shadow, SHADOW_GIF),
    ];

    let mut written = Vec::with_capacity(recipes.len());
    for (recipe, file) in recipes {
        let spec = recipe(cfg)?;
        let out = out_dir.as_ref().join(file);
        write_gif(cfg, &spec, &out)?;
        written.push(out);
    }
    Ok(written)
}

/// Load the storms table (and borders, if configured) and write the storm GIF into `out_dir`.
#[tracing::instrument(skip(cfg, out_dir), fields(out_dir = %out_dir.as_ref().display()))]
pub fn render_storm(cfg: &TutorialConfig, out_dir: impl AsRef<Path>) -> TrailResult<PathBuf> {
    let table = StormTable::from_path(&cfg.storm.data_path)?;
    let borders = cfg
        .storm
        .borders_path
        .as_ref()
        .map(Basemap::from_path)
        .transpose()?;
    let spec = katrina(cfg, &table, borders)?;
    let out = out_dir.as_ref().join(KATRINA_GIF);
    write_gif(cfg, &spec, &out)?;
    Ok(out)
}

#[cfg(test)]
#[path = "../tests/unit/tutorial.rs"]
mod tests;

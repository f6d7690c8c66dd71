use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::{
    animation::eval::FrameState,
    animation::spec::AnimationSpec,
    encode::gif::{GifSink, GifSinkOpts, ensure_parent_dir},
    encode::sink::{FrameSink, SinkConfig},
    foundation::core::{FrameIndex, FrameRange},
    foundation::error::{TrailError, TrailResult},
    render::backend::{FrameRGBA, RenderBackend, RenderSettings},
    render::cpu::CpuBackend,
};

/// Evaluate + render a single frame.
///
/// Returns a [`FrameRGBA`] containing **premultiplied** RGBA8 pixels.
pub fn render_frame(
    spec: &AnimationSpec,
    frame: FrameIndex,
    backend: &mut dyn RenderBackend,
) -> TrailResult<FrameRGBA> {
    let state = spec.evaluate(frame)?;
    backend.render_state(&spec.plot, &state)
}

/// Render a range of frames (inclusive start, exclusive end) sequentially.
pub fn render_frames(
    spec: &AnimationSpec,
    range: FrameRange,
    backend: &mut dyn RenderBackend,
) -> TrailResult<Vec<FrameRGBA>> {
    render_frames_with_stats(spec, range, backend, &RenderThreading::default())
        .map(|(frames, _)| frames)
}

/// Threading and chunking options for range renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderThreading {
    /// Render each chunk on a rayon pool with one backend per worker.
    pub parallel: bool,
    /// Frames evaluated and rendered per chunk; `0` is treated as `1`.
    pub chunk_size: usize,
    /// Pool size; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Render runs of identical consecutive frame states once and clone the pixels.
    pub static_frame_elision: bool,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            static_frame_elision: false,
        }
    }
}

/// Counters reported by range renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames produced.
    pub frames_total: u64,
    /// Frames actually rasterized.
    pub frames_rendered: u64,
    /// Frames copied from an identical predecessor.
    pub frames_elided: u64,
}

impl RenderStats {
    fn add(&mut self, other: RenderStats) {
        self.frames_total += other.frames_total;
        self.frames_rendered += other.frames_rendered;
        self.frames_elided += other.frames_elided;
    }
}

/// Render a range and collect the frames in order, with stats.
pub fn render_frames_with_stats(
    spec: &AnimationSpec,
    range: FrameRange,
    backend: &mut dyn RenderBackend,
    threading: &RenderThreading,
) -> TrailResult<(Vec<FrameRGBA>, RenderStats)> {
    let mut sink = crate::encode::sink::InMemorySink::new();
    let stats = render_to_sink(spec, range, backend, threading, &mut sink)?;
    let frames = sink.frames().iter().map(|(_, f)| f.clone()).collect();
    Ok((frames, stats))
}

/// Render a range chunk by chunk into `sink`, preserving frame order.
#[tracing::instrument(skip_all, fields(start = range.start.0, end = range.end.0))]
pub fn render_to_sink(
    spec: &AnimationSpec,
    range: FrameRange,
    backend: &mut dyn RenderBackend,
    threading: &RenderThreading,
    sink: &mut dyn FrameSink,
) -> TrailResult<RenderStats> {
    if range.is_empty() {
        return Err(TrailError::validation("render range must be non-empty"));
    }
    if range.end.0 > spec.total_frames() {
        return Err(TrailError::validation(
            "render range must be within the animation length",
        ));
    }
    spec.plot.canvas.validate()?;

    let mut maybe_pool = None;
    let mut maybe_worker_settings = None;
    if threading.parallel {
        maybe_pool = Some(build_thread_pool(threading.threads)?);
        maybe_worker_settings = Some(backend.worker_render_settings().ok_or_else(|| {
            TrailError::render("parallel render requires backend worker settings support")
        })?);
    }

    sink.begin(SinkConfig {
        width: spec.plot.canvas.width,
        height: spec.plot.canvas.height,
        fps: spec.timing.fps,
    })?;

    let chunk_size = normalized_chunk_size(threading.chunk_size);
    let mut stats = RenderStats::default();
    let mut chunk_start = range.start.0;
    while chunk_start < range.end.0 {
        let chunk_end = (chunk_start + chunk_size).min(range.end.0);
        let chunk = FrameRange::new(FrameIndex(chunk_start), FrameIndex(chunk_end))?;

        let (frames, chunk_stats) = match (&maybe_pool, &maybe_worker_settings) {
            (Some(pool), Some(settings)) => {
                render_chunk_parallel_cpu(spec, chunk, settings, threading, pool)?
            }
            _ => render_chunk_sequential(spec, chunk, backend, threading)?,
        };
        for (offset, frame) in frames.iter().enumerate() {
            sink.push_frame(FrameIndex(chunk_start + offset as u64), frame)?;
        }

        stats.add(chunk_stats);
        chunk_start = chunk_end;
    }

    sink.end()?;
    tracing::debug!(
        frames = stats.frames_total,
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        "range rendered"
    );
    Ok(stats)
}

/// Options for [`render_to_gif`].
#[derive(Clone, Debug)]
pub struct RenderToGifOpts {
    /// Frame range to render; `None` renders the whole animation.
    pub range: Option<FrameRange>,
    /// Background to flatten alpha over; `None` uses the plot theme background.
    pub bg_rgba: Option<[u8; 4]>,
    /// Whether to overwrite `out_path` if it already exists.
    pub overwrite: bool,
    /// Palette quantization speed, 1 (best) to 30 (fastest).
    pub speed: i32,
    /// Merge runs of identical frames into one longer GIF frame.
    pub merge_identical: bool,
    /// Render threading/chunking configuration.
    pub threading: RenderThreading,
}

impl Default for RenderToGifOpts {
    fn default() -> Self {
        Self {
            range: None,
            bg_rgba: None,
            overwrite: true,
            speed: 10,
            merge_identical: false,
            threading: RenderThreading::default(),
        }
    }
}

/// Render an animation to an infinitely looping GIF at `out_path`.
#[tracing::instrument(skip(spec, out_path, opts, backend), fields(out = %out_path.as_ref().display()))]
pub fn render_to_gif(
    spec: &AnimationSpec,
    out_path: impl AsRef<Path>,
    opts: RenderToGifOpts,
    backend: &mut dyn RenderBackend,
) -> TrailResult<RenderStats> {
    let range = opts.range.unwrap_or_else(|| spec.frame_range());
    let bg = spec.plot.theme.background;
    let mut sink = GifSink::new(GifSinkOpts {
        out_path: PathBuf::from(out_path.as_ref()),
        overwrite: opts.overwrite,
        bg_rgba: opts.bg_rgba.unwrap_or([bg.r, bg.g, bg.b, 255]),
        speed: opts.speed,
        merge_identical: opts.merge_identical,
    });
    let stats = render_to_sink(spec, range, backend, &opts.threading, &mut sink)?;
    tracing::info!(
        path = %out_path.as_ref().display(),
        frames = stats.frames_total,
        gif_frames = sink.frames_written(),
        "wrote gif"
    );
    Ok(stats)
}

/// Write one frame as a straight-alpha PNG.
pub fn write_png(frame: &FrameRGBA, path: impl AsRef<Path>) -> TrailResult<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let straight = frame.to_straight_rgba8();
    image::save_buffer_with_format(
        path,
        &straight,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn eval_chunk(spec: &AnimationSpec, range: FrameRange) -> TrailResult<Vec<FrameState>> {
    (range.start.0..range.end.0)
        .map(|f| spec.evaluate(FrameIndex(f)))
        .collect()
}

/// Map each frame to the slot of the state that will be rasterized for it.
fn unique_slots(states: &[FrameState], elide: bool) -> (Vec<usize>, Vec<usize>) {
    let mut unique = Vec::with_capacity(states.len());
    let mut frame_to_unique = Vec::with_capacity(states.len());
    for (idx, state) in states.iter().enumerate() {
        let same_as_prev = elide
            && unique
                .last()
                .is_some_and(|&u: &usize| states[u].same_picture(state));
        if !same_as_prev {
            unique.push(idx);
        }
        frame_to_unique.push(unique.len() - 1);
    }
    (unique, frame_to_unique)
}

fn expand(
    rendered: Vec<FrameRGBA>,
    frame_to_unique: &[usize],
) -> (Vec<FrameRGBA>, RenderStats) {
    let total = frame_to_unique.len() as u64;
    let rendered_count = rendered.len() as u64;
    let out = frame_to_unique
        .iter()
        .map(|&u| rendered[u].clone())
        .collect();
    (
        out,
        RenderStats {
            frames_total: total,
            frames_rendered: rendered_count,
            frames_elided: total.saturating_sub(rendered_count),
        },
    )
}

fn render_chunk_sequential(
    spec: &AnimationSpec,
    range: FrameRange,
    backend: &mut dyn RenderBackend,
    threading: &RenderThreading,
) -> TrailResult<(Vec<FrameRGBA>, RenderStats)> {
    let states = eval_chunk(spec, range)?;
    let (unique, frame_to_unique) = unique_slots(&states, threading.static_frame_elision);
    let mut rendered = Vec::with_capacity(unique.len());
    for idx in unique {
        rendered.push(backend.render_state(&spec.plot, &states[idx])?);
    }
    Ok(expand(rendered, &frame_to_unique))
}

fn render_chunk_parallel_cpu(
    spec: &AnimationSpec,
    range: FrameRange,
    settings: &RenderSettings,
    threading: &RenderThreading,
    pool: &rayon::ThreadPool,
) -> TrailResult<(Vec<FrameRGBA>, RenderStats)> {
    let states = eval_chunk(spec, range)?;
    let (unique, frame_to_unique) = unique_slots(&states, threading.static_frame_elision);

    let rendered = pool.install(|| {
        unique
            .par_iter()
            .map_init(
                || CpuBackend::new(settings.clone()),
                |worker_backend, idx| worker_backend.render_state(&spec.plot, &states[*idx]),
            )
            .collect::<TrailResult<Vec<_>>>()
    })?;
    Ok(expand(rendered, &frame_to_unique))
}

fn build_thread_pool(threads: Option<usize>) -> TrailResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TrailError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TrailError::render(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{TrailError, TrailResult};
use crate::render::backend::FrameRGBA;

/// Options for [`GifSink`] output.
#[derive(Clone, Debug)]
pub struct GifSinkOpts {
    /// Output GIF file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha; alpha is ignored).
    pub bg_rgba: [u8; 4],
    /// Palette quantization speed, 1 (best) to 30 (fastest).
    pub speed: i32,
    /// Merge runs of identical frames into one longer frame.
    pub merge_identical: bool,
}

impl GifSinkOpts {
    /// Create options for writing a GIF to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [255, 255, 255, 255],
            speed: 10,
            merge_identical: false,
        }
    }
}

/// Encoded bytes, still reachable after the encoder that writes into them is dropped.
#[derive(Clone, Default)]
struct GifBuffer(Arc<Mutex<Vec<u8>>>);

impl GifBuffer {
    fn take(&self) -> TrailResult<Vec<u8>> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| TrailError::encode("gif buffer lock poisoned"))?;
        Ok(std::mem::take(&mut *bytes))
    }
}

impl Write for GifBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("gif buffer lock poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Sink that writes an infinitely looping animated GIF.
///
/// Frames are flattened over `bg_rgba` since GIF has no partial transparency. The per-frame
/// delay comes from the sink's fps. The file is written in one go by `end`, so IO failures
/// surface there instead of leaving a truncated GIF behind.
pub struct GifSink {
    opts: GifSinkOpts,
    encoder: Option<GifEncoder<GifBuffer>>,
    buffer: GifBuffer,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    // Flattened frame waiting to be written, and how many frames it spans.
    pending: Option<(Vec<u8>, u32)>,
    written: u64,
}

impl GifSink {
    /// Create a new sink; nothing is opened until `begin`.
    pub fn new(opts: GifSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
            buffer: GifBuffer::default(),
            cfg: None,
            last_idx: None,
            pending: None,
            written: 0,
        }
    }

    /// GIF frames written so far (merged runs count once).
    pub fn frames_written(&self) -> u64 {
        self.written
    }

    fn flush_pending(&mut self) -> TrailResult<()> {
        let Some((rgba, span)) = self.pending.take() else {
            return Ok(());
        };
        let cfg = self
            .cfg
            .ok_or_else(|| TrailError::encode("gif sink not started"))?;
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| TrailError::encode("gif sink is already finalized"))?;

        let buffer = image::RgbaImage::from_raw(cfg.width, cfg.height, rgba)
            .ok_or_else(|| TrailError::encode("frame buffer does not match sink size"))?;
        let numer_ms = 1000u32
            .saturating_mul(cfg.fps.den)
            .saturating_mul(span);
        let delay = image::Delay::from_numer_denom_ms(numer_ms, cfg.fps.num);
        encoder
            .encode_frame(image::Frame::from_parts(buffer, 0, 0, delay))
            .map_err(|e| TrailError::encode(format!("failed to encode gif frame: {e}")))?;
        self.written += 1;
        Ok(())
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> TrailResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(TrailError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(TrailError::validation(
                "gif sink width/height must be non-zero",
            ));
        }
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(TrailError::validation("gif dimensions must fit in u16"));
        }
        if !(1..=30).contains(&self.opts.speed) {
            return Err(TrailError::validation("gif speed must be in 1..=30"));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(TrailError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        self.buffer = GifBuffer::default();
        let mut encoder = GifEncoder::new_with_speed(self.buffer.clone(), self.opts.speed);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| TrailError::encode(format!("failed to set gif loop mode: {e}")))?;

        tracing::debug!(
            path = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.as_f64(),
            "gif sink started"
        );
        self.encoder = Some(encoder);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.pending = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TrailResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| TrailError::encode("gif sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(TrailError::encode(
                "gif sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(TrailError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != (cfg.width as usize) * (cfg.height as usize) * 4 {
            return Err(TrailError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        let rgba = frame.to_opaque_rgba8(self.opts.bg_rgba);

        if self.opts.merge_identical
            && let Some((prev, span)) = self.pending.as_mut()
            && *prev == rgba
        {
            *span = span.saturating_add(1);
            return Ok(());
        }
        self.flush_pending()?;
        self.pending = Some((rgba, 1));
        Ok(())
    }

    fn end(&mut self) -> TrailResult<()> {
        self.flush_pending()?;
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| TrailError::encode("gif sink not started"))?;
        // The trailer is written when the encoder is dropped.
        drop(encoder);
        let bytes = self.buffer.take()?;
        std::fs::write(&self.opts.out_path, &bytes).with_context(|| {
            format!("failed to write '{}'", self.opts.out_path.display())
        })?;
        tracing::debug!(
            bytes = bytes.len(),
            path = %self.opts.out_path.display(),
            frames = self.written,
            "gif sink finished"
        );
        self.cfg = None;
        Ok(())
    }
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> TrailResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create output directory '{}'", parent.display())
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;

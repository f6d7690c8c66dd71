use crate::{
    animation::eval::FrameState,
    foundation::error::TrailResult,
    foundation::math::{flatten_premul_over_bg, mul_div255_u8},
    plot::spec::PlotSpec,
};

/// A rendered frame as RGBA8 pixels.
///
/// Backends produce **premultiplied alpha**; the `premultiplied` flag keeps that explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, as stored.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixels, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    /// Opaque copy of the pixels with alpha flattened over `bg_rgba` (straight alpha; the
    /// background's own alpha is ignored).
    pub fn to_opaque_rgba8(&self, bg_rgba: [u8; 4]) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            for px in out.chunks_exact_mut(4) {
                let a = u16::from(px[3]);
                for c in 0..3 {
                    px[c] = mul_div255_u8(u16::from(px[c]), a);
                }
            }
        }
        let [r, g, b, _] = bg_rgba;
        flatten_premul_over_bg(&mut out, [r, g, b]);
        out
    }
}

/// A renderer that draws one evaluated [`FrameState`] of a plot into a [`FrameRGBA`].
///
/// Most users do not call [`RenderBackend::render_state`] directly; prefer
/// [`crate::render_frame`] and friends, which handle evaluation.
pub trait RenderBackend: Send {
    /// Draw `state` on top of the static parts of `plot`.
    fn render_state(&mut self, plot: &PlotSpec, state: &FrameState) -> TrailResult<FrameRGBA>;

    /// Return backend settings required to construct equivalent worker backends.
    ///
    /// This is used by parallel rendering paths.
    fn worker_render_settings(&self) -> Option<RenderSettings> {
        None
    }
}

/// Available backend kinds.
///
/// - `Cpu` is always available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    #[default]
    Cpu,
}

/// Backend-agnostic settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderSettings {
    /// Draw titles, tick labels and point labels.
    pub draw_text: bool,
    /// Font family used for all text.
    pub font_family: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            draw_text: true,
            font_family: "sans-serif".to_owned(),
        }
    }
}

/// Create a rendering backend implementation.
pub fn create_backend(
    kind: BackendKind,
    settings: &RenderSettings,
) -> TrailResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new(
            settings.clone(),
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{TrailError, TrailResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// One run of text, positioned by its baseline anchor point in pixels.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TextItem {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) text: String,
    pub(crate) size: f64,
    pub(crate) color: Rgba8,
    pub(crate) anchor: Anchor,
    pub(crate) bold: bool,
    /// Rotate -90 degrees around the anchor (y axis caption).
    pub(crate) vertical: bool,
}

impl TextItem {
    pub(crate) fn new(x: f64, y: f64, text: impl Into<String>, size: f64, color: Rgba8) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            size,
            color,
            anchor: Anchor::Start,
            bold: false,
            vertical: false,
        }
    }

    pub(crate) fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub(crate) fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub(crate) fn vertical(mut self) -> Self {
        self.vertical = true;
        self
    }
}

/// All text of one frame, rasterized in a single resvg pass.
#[derive(Clone, Debug, Default)]
pub(crate) struct TextOverlay {
    items: Vec<TextItem>,
}

impl TextOverlay {
    pub(crate) fn push(&mut self, item: TextItem) {
        if !item.text.trim().is_empty() && item.color.a > 0 {
            self.items.push(item);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn to_svg(&self, width: u32, height: u32, family: &str) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        for item in &self.items {
            let _ = write!(
                svg,
                r#"<text x="{x:.2}" y="{y:.2}" font-family="{family}" font-size="{size:.2}" fill="{fill}" fill-opacity="{opacity:.3}" text-anchor="{anchor}""#,
                x = item.x,
                y = item.y,
                family = escape_xml(family),
                size = item.size,
                fill = item.color.to_hex_rgb(),
                opacity = f64::from(item.color.a) / 255.0,
                anchor = item.anchor.as_svg(),
            );
            if item.bold {
                svg.push_str(r#" font-weight="bold""#);
            }
            if item.vertical {
                let _ = write!(
                    svg,
                    r#" transform="rotate(-90 {x:.2} {y:.2})""#,
                    x = item.x,
                    y = item.y
                );
            }
            let _ = write!(svg, ">{}</text>", escape_xml(&item.text));
        }
        svg.push_str("</svg>");
        svg
    }

    /// Rasterize into a premultiplied RGBA8 buffer of `width * height * 4` bytes.
    pub(crate) fn rasterize(
        &self,
        width: u32,
        height: u32,
        family: &str,
        fontdb: Arc<usvg::fontdb::Database>,
    ) -> TrailResult<Vec<u8>> {
        let svg = self.to_svg(width, height, family);
        let opts = usvg::Options {
            fontdb,
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts).context("parse text overlay svg")?;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| TrailError::render("failed to allocate text overlay pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );
        Ok(pixmap.take())
    }
}

pub(crate) fn system_fontdb() -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    tracing::debug!(faces = db.len(), "loaded system fonts");
    Arc::new(db)
}

/// Tick label with just enough decimals for `step`.
pub(crate) fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step.is_finite() {
        (-step.log10().floor()).max(0.0) as usize
    } else {
        0
    };
    // Avoid "-0".
    let value = if value.abs() < step.abs() * 1e-9 { 0.0 } else { value };
    format!("{value:.decimals$}")
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;

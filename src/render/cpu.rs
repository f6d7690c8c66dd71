use std::sync::Arc;

use vello_cpu::kurbo::Shape as _;

use crate::animation::eval::FrameState;
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{TrailError, TrailResult};
use crate::foundation::math::premul_over_in_place;
use crate::plot::scale::nice_ticks;
use crate::plot::spec::{LabelMode, LabelStyle, Layer, PlotSpec};
use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};
use crate::render::text::{Anchor, TextItem, TextOverlay, format_tick, system_fontdb};

/// Approximate tick count per axis.
const TICK_TARGET: usize = 5;

/// CPU backend powered by `vello_cpu` for vector rasterization and `resvg` for text.
pub struct CpuBackend {
    settings: RenderSettings,
    fontdb: Option<Arc<usvg::fontdb::Database>>,
}

impl CpuBackend {
    /// Create a backend; the font database is loaded on first use.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            fontdb: None,
        }
    }

    fn fontdb(&mut self) -> Arc<usvg::fontdb::Database> {
        self.fontdb.get_or_insert_with(system_fontdb).clone()
    }
}

impl RenderBackend for CpuBackend {
    fn render_state(&mut self, plot: &PlotSpec, state: &FrameState) -> TrailResult<FrameRGBA> {
        plot.canvas.validate()?;
        let width: u16 = plot
            .canvas
            .width
            .try_into()
            .map_err(|_| TrailError::render("canvas width exceeds u16"))?;
        let height: u16 = plot
            .canvas
            .height
            .try_into()
            .map_err(|_| TrailError::render("canvas height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);

        draw_frame(&mut ctx, plot, state);
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);

        let mut data = pixmap.data_as_u8_slice().to_vec();
        if self.settings.draw_text {
            let overlay = build_text(plot, state);
            if !overlay.is_empty() {
                let fontdb = self.fontdb();
                let text = overlay.rasterize(
                    plot.canvas.width,
                    plot.canvas.height,
                    &self.settings.font_family,
                    fontdb,
                )?;
                if !premul_over_in_place(&mut data, &text) {
                    return Err(TrailError::render("text overlay size mismatch"));
                }
            }
        }

        Ok(FrameRGBA {
            width: plot.canvas.width,
            height: plot.canvas.height,
            data,
            premultiplied: true,
        })
    }

    fn worker_render_settings(&self) -> Option<RenderSettings> {
        Some(self.settings.clone())
    }
}

fn draw_frame(ctx: &mut vello_cpu::RenderContext, plot: &PlotSpec, state: &FrameState) {
    let canvas = Rect::new(
        0.0,
        0.0,
        f64::from(plot.canvas.width),
        f64::from(plot.canvas.height),
    );
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    fill_rect(ctx, canvas, plot.theme.background);
    fill_rect(ctx, plot.panel, plot.theme.panel);
    if let Some(grid) = plot.theme.grid {
        draw_grid(ctx, plot, grid);
    }

    let pts = plot.trajectory.points();
    for layer in &plot.layers {
        match layer {
            Layer::Basemap(map, style) => {
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(style.width));
                set_color(ctx, style.color);
                for line in map.lines() {
                    let screen: Vec<Point> = line.iter().map(|p| plot.to_screen(*p)).collect();
                    ctx.stroke_path(&polyline(&screen));
                }
            }
            Layer::Path(style) => {
                ctx.set_stroke(
                    vello_cpu::kurbo::Stroke::new(style.width)
                        .with_caps(vello_cpu::kurbo::Cap::Round)
                        .with_join(vello_cpu::kurbo::Join::Round),
                );
                for seg in &state.segments {
                    let base = if style.follow_color {
                        plot.color_of(&pts[seg.index], style.color)
                    } else {
                        style.color
                    };
                    set_color(ctx, seg.tint.unwrap_or(base).with_opacity(seg.opacity));
                    let a = plot.to_screen(seg.from);
                    let b = plot.to_screen(seg.to);
                    ctx.stroke_path(&polyline(&[a, b]));
                }
            }
            Layer::Points(style) => {
                for vp in &state.points {
                    let p = &pts[vp.index];
                    let color = vp
                        .tint
                        .unwrap_or_else(|| plot.color_of(p, style.color))
                        .with_opacity(vp.opacity);
                    let r = plot.radius_of(p, style.radius) * vp.size_factor;
                    fill_circle(ctx, plot.to_screen(p.position()), r, color);
                }
                let head = &pts[state.head.index];
                fill_circle(
                    ctx,
                    plot.to_screen(state.head.position),
                    plot.radius_of(head, style.radius),
                    plot.color_of(head, style.color),
                );
            }
            // Text goes through the overlay.
            Layer::Labels(_) => {}
        }
    }

    // Cover whatever the data layers drew outside the panel.
    let bg = plot.theme.background;
    let panel = plot.panel;
    fill_rect(ctx, Rect::new(0.0, 0.0, canvas.x1, panel.y0), bg);
    fill_rect(ctx, Rect::new(0.0, panel.y1, canvas.x1, canvas.y1), bg);
    fill_rect(ctx, Rect::new(0.0, panel.y0, panel.x0, panel.y1), bg);
    fill_rect(ctx, Rect::new(panel.x1, panel.y0, canvas.x1, panel.y1), bg);
}

fn draw_grid(ctx: &mut vello_cpu::RenderContext, plot: &PlotSpec, color: Rgba8) {
    let panel = plot.panel;
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(1.0));
    set_color(ctx, color);
    let (x0, x1) = plot.x_scale.domain;
    for x in nice_ticks(x0, x1, TICK_TARGET) {
        let sx = plot.x_scale.map(x);
        ctx.stroke_path(&polyline(&[
            Point::new(sx, panel.y0),
            Point::new(sx, panel.y1),
        ]));
    }
    let (y0, y1) = plot.y_scale.domain;
    for y in nice_ticks(y0, y1, TICK_TARGET) {
        let sy = plot.y_scale.map(y);
        ctx.stroke_path(&polyline(&[
            Point::new(panel.x0, sy),
            Point::new(panel.x1, sy),
        ]));
    }
}

fn build_text(plot: &PlotSpec, state: &FrameState) -> TextOverlay {
    let mut overlay = TextOverlay::default();
    let s = f64::from(plot.canvas.width.min(plot.canvas.height)) / 480.0;
    let panel = plot.panel;
    let theme = plot.theme;
    let notes = &plot.annotations;
    let cx = f64::from(plot.canvas.width) * 0.5;

    let mut y = 14.0 * s;
    if let Some(title) = &notes.title {
        y += 18.0 * s;
        overlay.push(
            TextItem::new(cx, y, state.fill_template(title), 16.0 * s, theme.text)
                .anchor(Anchor::Middle)
                .bold(),
        );
    }
    if let Some(subtitle) = &notes.subtitle {
        y += 17.0 * s;
        overlay.push(
            TextItem::new(cx, y, state.fill_template(subtitle), 12.0 * s, theme.text)
                .anchor(Anchor::Middle),
        );
    }

    let tick_size = 9.5 * s;
    let (x0, x1) = plot.x_scale.domain;
    let x_ticks = nice_ticks(x0, x1, TICK_TARGET);
    let x_step = tick_step(&x_ticks);
    for x in &x_ticks {
        overlay.push(
            TextItem::new(
                plot.x_scale.map(*x),
                panel.y1 + 14.0 * s,
                format_tick(*x, x_step),
                tick_size,
                theme.text,
            )
            .anchor(Anchor::Middle),
        );
    }
    let (y0, y1) = plot.y_scale.domain;
    let y_ticks = nice_ticks(y0, y1, TICK_TARGET);
    let y_step = tick_step(&y_ticks);
    for v in &y_ticks {
        overlay.push(
            TextItem::new(
                panel.x0 - 4.0 * s,
                plot.y_scale.map(*v) + tick_size * 0.35,
                format_tick(*v, y_step),
                tick_size,
                theme.text,
            )
            .anchor(Anchor::End),
        );
    }
    if let Some(x_label) = &notes.x_label {
        overlay.push(
            TextItem::new(
                (panel.x0 + panel.x1) * 0.5,
                f64::from(plot.canvas.height) - 10.0 * s,
                x_label.clone(),
                12.0 * s,
                theme.text,
            )
            .anchor(Anchor::Middle),
        );
    }
    if let Some(y_label) = &notes.y_label {
        overlay.push(
            TextItem::new(
                16.0 * s,
                (panel.y0 + panel.y1) * 0.5,
                y_label.clone(),
                12.0 * s,
                theme.text,
            )
            .anchor(Anchor::Middle)
            .vertical(),
        );
    }

    for layer in &plot.layers {
        if let Layer::Labels(style) = layer {
            push_point_labels(&mut overlay, plot, state, style);
        }
    }
    overlay
}

fn push_point_labels(
    overlay: &mut TextOverlay,
    plot: &PlotSpec,
    state: &FrameState,
    style: &LabelStyle,
) {
    let pts = plot.trajectory.points();
    let mut place = |at: Point, index: usize, opacity: f64| {
        let Some(text) = &pts[index].label else {
            return;
        };
        // Labels sitting outside the panel would land on the axis area.
        if !plot.panel.contains(at) {
            return;
        }
        let at = at + style.offset;
        overlay.push(
            TextItem::new(
                at.x,
                at.y,
                text.clone(),
                style.font_size,
                style.color.with_opacity(opacity),
            )
            .anchor(Anchor::Middle),
        );
    };

    match style.mode {
        LabelMode::Head => {
            place(
                plot.to_screen(state.head.position),
                state.head.index,
                1.0,
            );
        }
        LabelMode::All => {
            for vp in &state.points {
                place(
                    plot.to_screen(pts[vp.index].position()),
                    vp.index,
                    vp.opacity,
                );
            }
        }
    }
}

fn tick_step(ticks: &[f64]) -> f64 {
    match ticks {
        [a, b, ..] => b - a,
        _ => 1.0,
    }
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, r: Rect, color: Rgba8) {
    if r.width() <= 0.0 || r.height() <= 0.0 {
        return;
    }
    set_color(ctx, color);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1));
}

fn fill_circle(ctx: &mut vello_cpu::RenderContext, center: Point, radius: f64, color: Rgba8) {
    if radius <= 0.0 || color.a == 0 {
        return;
    }
    set_color(ctx, color);
    let circle = vello_cpu::kurbo::Circle::new((center.x, center.y), radius);
    ctx.fill_path(&circle.to_path(0.1));
}

fn polyline(points: &[Point]) -> vello_cpu::kurbo::BezPath {
    let mut path = vello_cpu::kurbo::BezPath::new();
    for (i, p) in points.iter().enumerate() {
        let p = vello_cpu::kurbo::Point::new(p.x, p.y);
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

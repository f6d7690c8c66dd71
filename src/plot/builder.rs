use crate::data::basemap::Basemap;
use crate::data::point::Trajectory;
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{TrailError, TrailResult};
use crate::plot::scale::{ColorScale, LinearScale, SizeScale, padded};
use crate::plot::spec::{
    Annotations, BasemapStyle, ColorEncoding, LabelStyle, Layer, PathStyle, PlotSpec, PointStyle,
    ScalarField, SizeEncoding, Theme,
};

/// Builder for [`PlotSpec`](crate::PlotSpec).
///
/// Layers paint in the order they are added. `build` fits the scales to the data and validates
/// encodings; nothing is rendered.
pub struct PlotBuilder {
    trajectory: Trajectory,
    canvas: Canvas,
    layers: Vec<Layer>,
    color: Option<(ScalarField, ColorScale)>,
    size: Option<(ScalarField, SizeScale)>,
    padding: f64,
    equal_aspect: bool,
    annotations: Annotations,
    theme: Theme,
}

impl PlotBuilder {
    /// Start a plot of `trajectory` on a 480x480 canvas.
    pub fn new(trajectory: Trajectory) -> Self {
        Self {
            trajectory,
            canvas: Canvas {
                width: 480,
                height: 480,
            },
            layers: Vec::new(),
            color: None,
            size: None,
            padding: 0.05,
            equal_aspect: false,
            annotations: Annotations::default(),
            theme: Theme::default(),
        }
    }

    /// Set output dimensions.
    pub fn canvas(mut self, width: u32, height: u32) -> Self {
        self.canvas = Canvas { width, height };
        self
    }

    /// Add map borders.
    pub fn basemap(mut self, map: Basemap, style: BasemapStyle) -> Self {
        self.layers.push(Layer::Basemap(map, style));
        self
    }

    /// Add the connecting path.
    pub fn path(mut self, style: PathStyle) -> Self {
        self.layers.push(Layer::Path(style));
        self
    }

    /// Add one marker per point.
    pub fn points(mut self, style: PointStyle) -> Self {
        self.layers.push(Layer::Points(style));
        self
    }

    /// Add text labels.
    pub fn labels(mut self, style: LabelStyle) -> Self {
        self.layers.push(Layer::Labels(style));
        self
    }

    /// Encode `field` as marker/path color.
    pub fn color_by(mut self, field: ScalarField, scale: ColorScale) -> Self {
        self.color = Some((field, scale));
        self
    }

    /// Encode `field` as marker radius.
    pub fn size_by(mut self, field: ScalarField, scale: SizeScale) -> Self {
        self.size = Some((field, scale));
        self
    }

    /// Fraction of the data span added around the data on each side.
    pub fn padding(mut self, frac: f64) -> Self {
        self.padding = frac;
        self
    }

    /// Use the same pixels-per-unit on both axes.
    pub fn equal_aspect(mut self, on: bool) -> Self {
        self.equal_aspect = on;
        self
    }

    /// Set the title; `{time}` is replaced per frame.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.annotations.title = Some(title.into());
        self
    }

    /// Set the subtitle; `{time}` is replaced per frame.
    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.annotations.subtitle = Some(subtitle.into());
        self
    }

    /// Set axis captions.
    pub fn axis_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.annotations.x_label = Some(x.into());
        self.annotations.y_label = Some(y.into());
        self
    }

    /// Replace the theme.
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Validate and fit scales.
    pub fn build(self) -> TrailResult<PlotSpec> {
        self.canvas.validate()?;
        if self.layers.is_empty() {
            return Err(TrailError::validation("plot needs at least one layer"));
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(TrailError::validation("plot padding must be finite and >= 0"));
        }
        for layer in &self.layers {
            let width = match layer {
                Layer::Path(s) => s.width,
                Layer::Points(s) => s.radius,
                Layer::Labels(s) => s.font_size,
                Layer::Basemap(_, s) => s.width,
            };
            if !width.is_finite() || width <= 0.0 {
                return Err(TrailError::validation(
                    "layer widths, radii and font sizes must be > 0",
                ));
            }
        }

        let color = self
            .color
            .map(|(field, scale)| {
                Ok::<_, TrailError>(ColorEncoding {
                    field,
                    domain: field_domain(&self.trajectory, field)?,
                    scale,
                })
            })
            .transpose()?;
        let size = self
            .size
            .map(|(field, scale)| {
                if !(scale.min_radius > 0.0 && scale.max_radius >= scale.min_radius) {
                    return Err(TrailError::validation(
                        "size scale needs 0 < min_radius <= max_radius",
                    ));
                }
                Ok(SizeEncoding {
                    field,
                    domain: field_domain(&self.trajectory, field)?,
                    scale,
                })
            })
            .transpose()?;

        let panel = panel_rect(self.canvas, &self.annotations);
        let bounds = self.trajectory.bounds();
        let mut x_dom = padded(bounds.x0, bounds.x1, self.padding);
        let mut y_dom = padded(bounds.y0, bounds.y1, self.padding);
        if self.equal_aspect {
            (x_dom, y_dom) = equalize(x_dom, y_dom, panel);
        }

        tracing::debug!(
            layers = self.layers.len(),
            x0 = x_dom.0,
            x1 = x_dom.1,
            y0 = y_dom.0,
            y1 = y_dom.1,
            "built plot spec"
        );

        Ok(PlotSpec {
            x_scale: LinearScale::new(x_dom, (panel.x0, panel.x1)),
            y_scale: LinearScale::new(y_dom, (panel.y1, panel.y0)),
            trajectory: self.trajectory,
            canvas: self.canvas,
            layers: self.layers,
            color,
            size,
            panel,
            annotations: self.annotations,
            theme: self.theme,
        })
    }
}

fn field_domain(trajectory: &Trajectory, field: ScalarField) -> TrailResult<(f64, f64)> {
    match field {
        ScalarField::Time => Ok(trajectory.time_span()),
        ScalarField::Magnitude => {
            if !trajectory.has_magnitudes() {
                return Err(TrailError::validation(
                    "magnitude encoding requires every point to carry a magnitude",
                ));
            }
            trajectory
                .magnitude_span()
                .ok_or_else(|| TrailError::validation("trajectory has no magnitudes"))
        }
    }
}

/// Panel rectangle leaving room for titles and axis text.
fn panel_rect(canvas: Canvas, annotations: &Annotations) -> Rect {
    let s = f64::from(canvas.width.min(canvas.height)) / 480.0;
    let mut top = 14.0;
    if annotations.title.is_some() {
        top += 24.0;
    }
    if annotations.subtitle.is_some() {
        top += 18.0;
    }
    let left = if annotations.y_label.is_some() { 58.0 } else { 42.0 };
    let bottom = if annotations.x_label.is_some() { 46.0 } else { 28.0 };
    Rect::new(
        left * s,
        top * s,
        f64::from(canvas.width) - 14.0 * s,
        f64::from(canvas.height) - bottom * s,
    )
}

/// Grow the narrower domain so both axes share one pixels-per-unit ratio.
fn equalize(x: (f64, f64), y: (f64, f64), panel: Rect) -> ((f64, f64), (f64, f64)) {
    let ux = panel.width() / (x.1 - x.0);
    let uy = panel.height() / (y.1 - y.0);
    let u = ux.min(uy);
    let grow = |(lo, hi): (f64, f64), px: f64| {
        let mid = (lo + hi) * 0.5;
        let half = px / u * 0.5;
        (mid - half, mid + half)
    };
    (grow(x, panel.width()), grow(y, panel.height()))
}

#[cfg(test)]
#[path = "../../tests/unit/plot/builder.rs"]
mod tests;

use crate::data::basemap::Basemap;
use crate::data::point::{Trajectory, TrajectoryPoint};
use crate::foundation::core::{Canvas, Point, Rect, Rgba8, Vec2};
use crate::plot::scale::{ColorScale, LinearScale, SizeScale};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Scalar attribute of a point that an encoding can read.
pub enum ScalarField {
    /// The point's time value.
    Time,
    /// The point's magnitude.
    Magnitude,
}

impl ScalarField {
    /// Read the field from `p`; a missing magnitude reads as `None`.
    pub fn read(self, p: &TrajectoryPoint) -> Option<f64> {
        match self {
            Self::Time => Some(p.time),
            Self::Magnitude => p.magnitude,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Color encoding of a scalar field.
pub struct ColorEncoding {
    /// Source field.
    pub field: ScalarField,
    /// Gradient.
    pub scale: ColorScale,
    /// Field extent used for normalization.
    pub domain: (f64, f64),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Marker-size encoding of a scalar field.
pub struct SizeEncoding {
    /// Source field.
    pub field: ScalarField,
    /// Radius range.
    pub scale: SizeScale,
    /// Field extent used for normalization.
    pub domain: (f64, f64),
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Connecting line through the points in sequence order.
pub struct PathStyle {
    /// Line color when the path is not color-encoded.
    pub color: Rgba8,
    /// Stroke width in pixels.
    pub width: f64,
    /// Color each segment by the encoding of its end point.
    pub follow_color: bool,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            color: Rgba8::rgb(0x55, 0x55, 0x55),
            width: 1.5,
            follow_color: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One marker per point.
pub struct PointStyle {
    /// Fill color when no color encoding is set.
    pub color: Rgba8,
    /// Radius in pixels when no size encoding is set.
    pub radius: f64,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            color: Rgba8::rgb(0x1f, 0x77, 0xb4),
            radius: 3.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Which visible points get a text label.
pub enum LabelMode {
    /// Only the most recent point.
    #[default]
    Head,
    /// Every visible point.
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Per-point text labels.
pub struct LabelStyle {
    /// Text color.
    pub color: Rgba8,
    /// Font size in pixels.
    pub font_size: f64,
    /// Pixel offset from the marker center (screen space, y down).
    pub offset: Vec2,
    /// Which points are labelled.
    pub mode: LabelMode,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            color: Rgba8::rgb(0x22, 0x22, 0x22),
            font_size: 11.0,
            offset: Vec2::new(0.0, -9.0),
            mode: LabelMode::Head,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Border line styling.
pub struct BasemapStyle {
    /// Line color.
    pub color: Rgba8,
    /// Stroke width in pixels.
    pub width: f64,
}

impl Default for BasemapStyle {
    fn default() -> Self {
        Self {
            color: Rgba8::rgb(0x9e, 0x9e, 0x9e),
            width: 0.8,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A drawable layer, painted in declaration order.
pub enum Layer {
    /// Map borders.
    Basemap(Basemap, BasemapStyle),
    /// Connecting path.
    Path(PathStyle),
    /// Point markers.
    Points(PointStyle),
    /// Text labels.
    Labels(LabelStyle),
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Non-data colors.
pub struct Theme {
    /// Canvas background.
    pub background: Rgba8,
    /// Plot panel fill.
    pub panel: Rgba8,
    /// Grid line color; `None` disables the grid.
    pub grid: Option<Rgba8>,
    /// Title/axis text color.
    pub text: Rgba8,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgba8::WHITE,
            panel: Rgba8::rgb(0xeb, 0xeb, 0xeb),
            grid: Some(Rgba8::WHITE),
            text: Rgba8::rgb(0x22, 0x22, 0x22),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Plot annotations. `{time}` in the title or subtitle is replaced per frame.
pub struct Annotations {
    /// Title text.
    pub title: Option<String>,
    /// Subtitle text.
    pub subtitle: Option<String>,
    /// X axis caption.
    pub x_label: Option<String>,
    /// Y axis caption.
    pub y_label: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
/// Complete, render-ready description of a static trajectory plot.
///
/// Built by [`PlotBuilder`](crate::PlotBuilder); holds no pixels.
pub struct PlotSpec {
    /// Source data.
    pub trajectory: Trajectory,
    /// Output size.
    pub canvas: Canvas,
    /// Layers in paint order.
    pub layers: Vec<Layer>,
    /// Optional color encoding.
    pub color: Option<ColorEncoding>,
    /// Optional size encoding.
    pub size: Option<SizeEncoding>,
    /// Data x → pixel x.
    pub x_scale: LinearScale,
    /// Data y → pixel y (reversed).
    pub y_scale: LinearScale,
    /// Panel rectangle in pixels.
    pub panel: Rect,
    /// Text annotations.
    pub annotations: Annotations,
    /// Non-data colors.
    pub theme: Theme,
}

impl PlotSpec {
    /// Map a data-space position to pixels.
    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(self.x_scale.map(p.x), self.y_scale.map(p.y))
    }

    /// Fill color of `p` under the color encoding, or `fallback`.
    pub fn color_of(&self, p: &TrajectoryPoint, fallback: Rgba8) -> Rgba8 {
        let Some(enc) = &self.color else {
            return fallback;
        };
        match enc.field.read(p) {
            Some(v) => {
                let t = LinearScale::new(enc.domain, (0.0, 1.0)).normalize(v);
                enc.scale.sample(t)
            }
            None => fallback,
        }
    }

    /// Marker radius of `p` under the size encoding, or `fallback`.
    pub fn radius_of(&self, p: &TrajectoryPoint, fallback: f64) -> f64 {
        let Some(enc) = &self.size else {
            return fallback;
        };
        match enc.field.read(p) {
            Some(v) => {
                let t = LinearScale::new(enc.domain, (0.0, 1.0)).normalize(v);
                enc.scale.sample(t)
            }
            None => fallback,
        }
    }
}

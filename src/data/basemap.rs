use std::path::Path;

use anyhow::Context;

use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{TrailError, TrailResult};

/// Border polylines in data coordinates (longitude/latitude for maps).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Basemap {
    lines: Vec<Vec<Point>>,
}

impl Basemap {
    /// Wrap pre-built polylines. Lines with fewer than two vertices are dropped.
    pub fn from_lines(lines: Vec<Vec<Point>>) -> Self {
        Self {
            lines: lines.into_iter().filter(|l| l.len() >= 2).collect(),
        }
    }

    /// Collect every line and polygon ring from a GeoJSON document.
    pub fn from_geojson_str(s: &str) -> TrailResult<Self> {
        let gj: geojson::GeoJson = s.parse().context("parse geojson")?;
        let mut lines = Vec::new();
        match gj {
            geojson::GeoJson::Geometry(g) => collect_geometry(&g.value, &mut lines)?,
            geojson::GeoJson::Feature(f) => {
                if let Some(g) = f.geometry {
                    collect_geometry(&g.value, &mut lines)?;
                }
            }
            geojson::GeoJson::FeatureCollection(fc) => {
                for f in fc.features {
                    if let Some(g) = f.geometry {
                        collect_geometry(&g.value, &mut lines)?;
                    }
                }
            }
        }
        tracing::debug!(lines = lines.len(), "loaded basemap");
        Ok(Self::from_lines(lines))
    }

    /// Read and parse a GeoJSON file.
    pub fn from_path(path: impl AsRef<Path>) -> TrailResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read geojson '{}'", path.display()))?;
        Self::from_geojson_str(&s)
    }

    /// Closed outline of `bounds`, used when no border data is available.
    pub fn frame(bounds: Rect) -> Self {
        Self::from_lines(vec![vec![
            Point::new(bounds.x0, bounds.y0),
            Point::new(bounds.x1, bounds.y0),
            Point::new(bounds.x1, bounds.y1),
            Point::new(bounds.x0, bounds.y1),
            Point::new(bounds.x0, bounds.y0),
        ]])
    }

    /// Borrow the polylines.
    pub fn lines(&self) -> &[Vec<Point>] {
        &self.lines
    }

    /// `true` when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Extent of all vertices, if any.
    pub fn bounds(&self) -> Option<Rect> {
        let mut iter = self.lines.iter().flatten();
        let first = *iter.next()?;
        Some(iter.fold(Rect::from_points(first, first), |r, p| r.union_pt(*p)))
    }
}

fn to_line(positions: &[geojson::Position]) -> TrailResult<Vec<Point>> {
    positions
        .iter()
        .map(|pos| match pos.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Point::new(*x, *y)),
            _ => Err(TrailError::parse("geojson position needs two finite numbers")),
        })
        .collect()
}

fn collect_geometry(value: &geojson::Value, out: &mut Vec<Vec<Point>>) -> TrailResult<()> {
    use geojson::Value;

    match value {
        Value::Point(_) | Value::MultiPoint(_) => {}
        Value::LineString(ls) => out.push(to_line(ls)?),
        Value::MultiLineString(mls) | Value::Polygon(mls) => {
            for ls in mls {
                out.push(to_line(ls)?);
            }
        }
        Value::MultiPolygon(mp) => {
            for poly in mp {
                for ring in poly {
                    out.push(to_line(ring)?);
                }
            }
        }
        Value::GeometryCollection(gs) => {
            for g in gs {
                collect_geometry(&g.value, out)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/data/basemap.rs"]
mod tests;

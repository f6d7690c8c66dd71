use crate::foundation::core::Rgba8;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Affine map from a data domain onto an output range.
pub struct LinearScale {
    /// Data extent `(lo, hi)`.
    pub domain: (f64, f64),
    /// Output extent; may be reversed (e.g. screen y).
    pub range: (f64, f64),
}

impl LinearScale {
    /// Build a scale.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Position of `v` within the domain, clamped to `[0, 1]`.
    ///
    /// A degenerate domain maps everything to `0.5`.
    pub fn normalize(&self, v: f64) -> f64 {
        let (lo, hi) = self.domain;
        let span = hi - lo;
        if span.abs() <= f64::EPSILON * lo.abs().max(1.0) {
            return 0.5;
        }
        ((v - lo) / span).clamp(0.0, 1.0)
    }

    /// Map `v` onto the range without clamping.
    pub fn map(&self, v: f64) -> f64 {
        let (lo, hi) = self.domain;
        let (r0, r1) = self.range;
        let span = hi - lo;
        if span.abs() <= f64::EPSILON * lo.abs().max(1.0) {
            return (r0 + r1) * 0.5;
        }
        r0 + (v - lo) / span * (r1 - r0)
    }
}

/// Expand `(lo, hi)` by `frac` of its span on both sides; a zero span grows by one unit.
pub fn padded(lo: f64, hi: f64, frac: f64) -> (f64, f64) {
    let span = hi - lo;
    if span <= 0.0 {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - span * frac, hi + span * frac)
}

/// "Nice" tick positions covering `[lo, hi]` with roughly `target` intervals.
pub fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    fn nice_step(raw: f64) -> f64 {
        let exp = raw.log10().floor();
        let base = 10f64.powf(exp);
        let f = raw / base;
        let nice = if f < 1.5 {
            1.0
        } else if f < 3.0 {
            2.0
        } else if f < 7.0 {
            5.0
        } else {
            10.0
        };
        nice * base
    }

    if !(lo.is_finite() && hi.is_finite()) || hi <= lo || target == 0 {
        return Vec::new();
    }
    let step = nice_step((hi - lo) / target as f64);
    let first = (lo / step).ceil() * step;
    let mut ticks = Vec::new();
    let mut i = 0u32;
    loop {
        let v = first + f64::from(i) * step;
        if v > hi + step * 1e-9 {
            break;
        }
        // Snap values like 0.30000000000000004.
        ticks.push((v / step).round() * step);
        i += 1;
    }
    ticks
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Evenly spaced color gradient.
pub struct ColorScale {
    stops: Vec<Rgba8>,
}

impl ColorScale {
    /// Gradient through `stops`; an empty list falls back to black.
    pub fn new(stops: Vec<Rgba8>) -> Self {
        if stops.is_empty() {
            return Self {
                stops: vec![Rgba8::BLACK],
            };
        }
        Self { stops }
    }

    /// Two-color gradient.
    pub fn two_tone(low: Rgba8, high: Rgba8) -> Self {
        Self::new(vec![low, high])
    }

    /// Perceptually ordered purple → yellow ramp.
    pub fn viridis() -> Self {
        Self::new(vec![
            Rgba8::rgb(0x44, 0x01, 0x54),
            Rgba8::rgb(0x3b, 0x52, 0x8b),
            Rgba8::rgb(0x21, 0x91, 0x8c),
            Rgba8::rgb(0x5e, 0xc9, 0x62),
            Rgba8::rgb(0xfd, 0xe7, 0x25),
        ])
    }

    /// Yellow → dark red ramp suited to intensities.
    pub fn heat() -> Self {
        Self::new(vec![
            Rgba8::rgb(0xff, 0xe0, 0x66),
            Rgba8::rgb(0xf4, 0x8c, 0x06),
            Rgba8::rgb(0xd0, 0x00, 0x00),
            Rgba8::rgb(0x6a, 0x04, 0x0f),
        ])
    }

    /// Color at `t` in `[0, 1]`.
    pub fn sample(&self, t: f64) -> Rgba8 {
        let n = self.stops.len();
        if n == 1 {
            return self.stops[0];
        }
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let pos = t * (n - 1) as f64;
        let i = (pos.floor() as usize).min(n - 2);
        self.stops[i].lerp(self.stops[i + 1], pos - i as f64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Marker radius range in pixels.
pub struct SizeScale {
    /// Radius at the low end of the domain.
    pub min_radius: f64,
    /// Radius at the high end of the domain.
    pub max_radius: f64,
}

impl SizeScale {
    /// Build a size scale.
    pub const fn new(min_radius: f64, max_radius: f64) -> Self {
        Self {
            min_radius,
            max_radius,
        }
    }

    /// Radius at `t` in `[0, 1]`.
    pub fn sample(&self, t: f64) -> f64 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        self.min_radius + (self.max_radius - self.min_radius) * t
    }
}

impl Default for SizeScale {
    fn default() -> Self {
        Self::new(2.0, 8.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plot/scale.rs"]
mod tests;

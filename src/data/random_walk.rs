use crate::data::point::{Trajectory, TrajectoryPoint};
use crate::foundation::error::{TrailError, TrailResult};

/// Deterministic pseudorandom stream (SplitMix64).
///
/// Each generator call owns its handle; there is no process-wide seed.
#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    /// Seed a new stream.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform sample in `[0, 1)`.
    pub fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    /// Standard normal sample (Box-Muller, one value per pair of uniforms).
    pub fn next_standard_normal(&mut self) -> f64 {
        // 1 - u keeps the log argument in (0, 1].
        let u1 = 1.0 - self.next_f64_01();
        let u2 = self.next_f64_01();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    /// Normal sample with the given mean and standard deviation.
    pub fn next_normal(&mut self, mean: f64, sd: f64) -> f64 {
        mean + sd * self.next_standard_normal()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Per-axis step distribution.
pub struct Drift {
    /// Mean step.
    pub mean: f64,
    /// Step standard deviation (>= 0).
    pub sd: f64,
}

impl Drift {
    /// Build a drift.
    pub const fn new(mean: f64, sd: f64) -> Self {
        Self { mean, sd }
    }

    fn validate(self, axis: &str) -> TrailResult<()> {
        if !self.mean.is_finite() {
            return Err(TrailError::validation(format!(
                "{axis} drift mean must be finite"
            )));
        }
        if !self.sd.is_finite() || self.sd < 0.0 {
            return Err(TrailError::validation(format!(
                "{axis} drift sd must be finite and >= 0"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Parameters of a seeded 2D random walk.
pub struct RandomWalkParams {
    /// Seed of the pseudorandom stream.
    pub seed: u64,
    /// Number of points to generate (> 0).
    pub count: usize,
    /// Horizontal step distribution.
    pub x: Drift,
    /// Vertical step distribution.
    pub y: Drift,
}

impl Default for RandomWalkParams {
    fn default() -> Self {
        Self {
            seed: 123,
            count: 100,
            x: Drift::new(0.5, 0.3),
            y: Drift::new(0.3, 0.2),
        }
    }
}

impl RandomWalkParams {
    /// Reject non-positive counts and malformed drifts.
    pub fn validate(&self) -> TrailResult<()> {
        if self.count == 0 {
            return Err(TrailError::validation("random walk count must be > 0"));
        }
        self.x.validate("x")?;
        self.y.validate("y")
    }
}

/// Generate a random-walk trajectory.
///
/// All `count` x steps are drawn first, then all y steps, from one stream seeded with
/// `params.seed`. Coordinates are running sums of the steps; times run `1..=count` and each
/// point is labelled with its time.
#[tracing::instrument(skip(params), fields(seed = params.seed, count = params.count))]
pub fn generate(params: &RandomWalkParams) -> TrailResult<Trajectory> {
    params.validate()?;
    let mut rng = Rng64::new(params.seed);
    let xs = cumulative_draws(&mut rng, params.count, params.x);
    let ys = cumulative_draws(&mut rng, params.count, params.y);

    let points = xs
        .into_iter()
        .zip(ys)
        .enumerate()
        .map(|(i, (x, y))| {
            let time = (i + 1) as f64;
            TrajectoryPoint::new(time, x, y).with_label(format!("{}", i + 1))
        })
        .collect();
    let trajectory = Trajectory::new(points)?;
    tracing::debug!(points = trajectory.len(), "generated random walk");
    Ok(trajectory)
}

fn cumulative_draws(rng: &mut Rng64, count: usize, drift: Drift) -> Vec<f64> {
    let mut acc = 0.0;
    (0..count)
        .map(|_| {
            acc += rng.next_normal(drift.mean, drift.sd);
            acc
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/data/random_walk.rs"]
mod tests;

use crate::error::{GwoResult, OptimizerError};
use crate::geometry::Point;

/// Source of uniform real numbers for the optimizer.
///
/// Implementations must be deterministic for a given seed. A sampler is
/// borrowed mutably by exactly one run at a time.
pub trait UniformSampler {
    /// Returns a value in `[low, high)`, or `low` when `low == high`.
    fn next_uniform_real(&mut self, low: f32, high: f32) -> GwoResult<f32>;

    /// Unit draw in `[0, 1)`.
    fn next_unit(&mut self) -> GwoResult<f32> {
        self.next_uniform_real(0.0, 1.0)
    }

    /// Two independent unit draws, `x` first.
    fn next_unit_point(&mut self) -> GwoResult<Point> {
        let x = self.next_unit()?;
        let y = self.next_unit()?;
        Ok(Point::new(x, y))
    }
}

impl<S: UniformSampler + ?Sized> UniformSampler for &mut S {
    fn next_uniform_real(&mut self, low: f32, high: f32) -> GwoResult<f32> {
        (**self).next_uniform_real(low, high)
    }
}

impl<S: UniformSampler + ?Sized> UniformSampler for Box<S> {
    fn next_uniform_real(&mut self, low: f32, high: f32) -> GwoResult<f32> {
        (**self).next_uniform_real(low, high)
    }
}

fn check_range(low: f32, high: f32) -> GwoResult<()> {
    if !low.is_finite() || !high.is_finite() {
        return Err(OptimizerError::SamplingFailure(format!(
            "non-finite range [{}, {})",
            low, high
        )));
    }
    if low > high {
        return Err(OptimizerError::SamplingFailure(format!(
            "inverted range [{}, {})",
            low, high
        )));
    }
    Ok(())
}

/// Maps `u` in `[0, 1)` onto `[low, high)`. The span is taken in f64 so finite
/// bounds wider than `f32::MAX` stay finite.
#[inline(always)]
fn scale_unit(u: f32, low: f32, high: f32) -> f32 {
    let (lo, hi) = (f64::from(low), f64::from(high));
    let v = (lo + (hi - lo) * f64::from(u)) as f32;
    // Narrowing back to f32 can round onto `high`.
    if v >= high && high > low {
        low.max(high - (high.abs() * f32::EPSILON).max(f32::MIN_POSITIVE))
    } else {
        v
    }
}

/// `fastrand`-backed sampler. Seeded instances are fully reproducible.
#[derive(Debug, Clone)]
pub struct FastRandSampler {
    rng: fastrand::Rng,
}

impl FastRandSampler {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Seeded when `seed` is given, entropy-backed otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::with_seed(s),
            None => Self::from_entropy(),
        }
    }
}

impl UniformSampler for FastRandSampler {
    #[inline(always)]
    fn next_uniform_real(&mut self, low: f32, high: f32) -> GwoResult<f32> {
        check_range(low, high)?;
        if low == high {
            return Ok(low);
        }
        Ok(scale_unit(self.rng.f32(), low, high))
    }
}

/// Replays a fixed list of unit draws, mapping each onto the requested range.
///
/// Fails with `SamplingFailure` once the list is exhausted. Useful for
/// reproducing a captured run draw by draw.
#[derive(Debug, Clone)]
pub struct SequenceSampler {
    draws: Vec<f32>,
    cursor: usize,
}

impl SequenceSampler {
    pub fn new(draws: Vec<f32>) -> GwoResult<Self> {
        if let Some(bad) = draws.iter().find(|u| !(0.0..1.0).contains(*u)) {
            return Err(OptimizerError::SamplingFailure(format!(
                "replayed draw {} is outside [0, 1)",
                bad
            )));
        }
        Ok(Self { draws, cursor: 0 })
    }

    pub fn consumed(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.draws.len() - self.cursor
    }
}

impl UniformSampler for SequenceSampler {
    fn next_uniform_real(&mut self, low: f32, high: f32) -> GwoResult<f32> {
        check_range(low, high)?;
        let u = *self.draws.get(self.cursor).ok_or_else(|| {
            OptimizerError::SamplingFailure(format!(
                "sequence exhausted after {} draws",
                self.draws.len()
            ))
        })?;
        self.cursor += 1;
        if low == high {
            return Ok(low);
        }
        Ok(scale_unit(u, low, high))
    }
}

/// Draws a point uniformly inside the rectangle spanned by `min` and `max`.
pub fn random_point<S: UniformSampler>(sampler: &mut S, min: Point, max: Point) -> GwoResult<Point> {
    let x = sampler.next_uniform_real(min.x, max.x)?;
    let y = sampler.next_uniform_real(min.y, max.y)?;
    Ok(Point::new(x, y))
}

/// Picks a fresh target point inside the search region.
pub fn random_target<S: UniformSampler>(sampler: &mut S, min: Point, max: Point) -> GwoResult<Point> {
    random_point(sampler, min, max)
}

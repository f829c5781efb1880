pub mod params;
pub mod result;
pub mod runner;

pub use self::params::{RunParameters, UpdatePolicy, MIN_WOLVES};
pub use self::result::{OptimizationResult, Snapshot};
pub use self::runner::{CancelToken, Engine, ProgressCallback, RunHandle, SilentProgress};

use crate::error::{GwoResult, OptimizerError};
use crate::geometry::Point;
use crate::sampling::{random_point, UniformSampler};
use rayon::prelude::*;
use tracing::{debug, info};

/// Fitness of a wolf: distance to the target, lower is better.
#[inline(always)]
pub fn fitness(wolf: Point, target: Point) -> f32 {
    wolf.distance(target)
}

/// Stable ascending sort by fitness. `total_cmp` keeps the order defined even
/// for NaN positions.
pub fn rank_by_fitness(pack: &mut [Point], target: Point) {
    pack.sort_by(|a, b| fitness(*a, target).total_cmp(&fitness(*b, target)));
}

/// Mean position of alpha, beta and delta.
#[inline(always)]
pub fn leader_estimate(pack: &[Point]) -> Point {
    (pack[0] + pack[1] + pack[2]) / 3.0
}

/// Convergence coefficient `a(t) = 2 - 2t/N`, decaying linearly from 2 toward 0.
#[inline(always)]
pub fn convergence_coefficient(t: usize, num_iterations: usize) -> f32 {
    if num_iterations == 0 {
        return 2.0;
    }
    2.0 - 2.0 * t as f32 / num_iterations as f32
}

/// Per-leader coefficient pair `A = 2a*r1 - a`, `C = 2*r2`, shared by every
/// wolf in one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub a: Point,
    pub c: Point,
}

impl Coefficients {
    #[inline(always)]
    pub fn from_draws(conv: f32, r1: Point, r2: Point) -> Self {
        Self {
            a: Point::new(2.0 * conv * r1.x - conv, 2.0 * conv * r1.y - conv),
            c: Point::new(2.0 * r2.x, 2.0 * r2.y),
        }
    }

    /// Draws `r1.x, r1.y, r2.x, r2.y` in that order.
    pub fn sample<S: UniformSampler>(sampler: &mut S, conv: f32) -> GwoResult<Self> {
        let r1 = sampler.next_unit_point()?;
        let r2 = sampler.next_unit_point()?;
        Ok(Self::from_draws(conv, r1, r2))
    }

    /// Candidate position `X = L - A * |C * L - w|` for a wolf pulled by leader `L`.
    #[inline(always)]
    pub fn pull(&self, leader: Point, wolf: Point) -> Point {
        let dist = (self.c.hadamard(leader) - wolf).abs();
        leader - self.a.hadamard(dist)
    }
}

/// Alpha, beta and delta as they stood at the start of an iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leaders {
    pub positions: [Point; 3],
    pub coefficients: [Coefficients; 3],
}

impl Leaders {
    pub fn sample<S: UniformSampler>(pack: &[Point], sampler: &mut S, conv: f32) -> GwoResult<Self> {
        if pack.len() < MIN_WOLVES {
            return Err(OptimizerError::invalid(format!(
                "pack of {} cannot provide three leaders",
                pack.len()
            )));
        }
        Ok(Self {
            positions: [pack[0], pack[1], pack[2]],
            coefficients: [
                Coefficients::sample(sampler, conv)?,
                Coefficients::sample(sampler, conv)?,
                Coefficients::sample(sampler, conv)?,
            ],
        })
    }

    /// New position of `wolf`: the mean of the three leader pulls.
    #[inline(always)]
    pub fn reposition(&self, wolf: Point) -> Point {
        let x1 = self.coefficients[0].pull(self.positions[0], wolf);
        let x2 = self.coefficients[1].pull(self.positions[1], wolf);
        let x3 = self.coefficients[2].pull(self.positions[2], wolf);
        (x1 + x2 + x3) / 3.0
    }
}

/// Hooks the run loop calls between steps. Returning an error aborts the run.
pub(crate) trait RunObserver {
    fn before_iteration(&mut self, _t: usize) -> GwoResult<()> {
        Ok(())
    }

    fn on_snapshot(&mut self, _iteration: usize, _pack: &[Point], _leader: Point) -> GwoResult<()> {
        Ok(())
    }
}

struct Unobserved;
impl RunObserver for Unobserved {}

/// Runs the Grey Wolf Optimizer to completion and returns every snapshot.
///
/// Validation happens before the sampler is touched. With the same parameters
/// and an identically seeded sampler the result is identical.
pub fn optimize<S: UniformSampler>(
    params: &RunParameters,
    sampler: &mut S,
) -> GwoResult<OptimizationResult> {
    drive(params, sampler, &mut Unobserved)
}

pub(crate) fn drive<S, O>(
    params: &RunParameters,
    sampler: &mut S,
    observer: &mut O,
) -> GwoResult<OptimizationResult>
where
    S: UniformSampler,
    O: RunObserver,
{
    params.validate()?;

    let n_iter = params.num_iterations;
    let target = params.target_point;
    let first_moving = params.update_policy.first_updated_rank();

    info!(
        "🐺 GWO run: {} wolves, {} iterations, policy {}",
        params.num_wolves, n_iter, params.update_policy
    );

    // 1. Initial population
    let mut pack: Vec<Point> = Vec::with_capacity(params.num_wolves);
    for _ in 0..params.num_wolves {
        pack.push(random_point(sampler, params.min_bound, params.max_bound)?);
    }
    rank_by_fitness(&mut pack, target);

    let mut result = OptimizationResult::with_capacity(target, n_iter + 1);
    let estimate = leader_estimate(&pack);
    result.record(&pack, estimate);
    observer.on_snapshot(0, &pack, estimate)?;

    // 2. Refinement
    for t in 0..n_iter {
        observer.before_iteration(t)?;

        let conv = convergence_coefficient(t, n_iter);
        let leaders = Leaders::sample(&pack, sampler, conv)?;

        pack[first_moving..]
            .par_iter_mut()
            .for_each(|wolf| *wolf = leaders.reposition(*wolf));

        rank_by_fitness(&mut pack, target);

        let estimate = leader_estimate(&pack);
        result.record(&pack, estimate);
        result.mark_iteration();

        debug!(
            "iter {:4} | a={:.3} | alpha {:.3} | fitness {:.4}",
            t + 1,
            conv,
            pack[0],
            fitness(pack[0], target)
        );

        observer.on_snapshot(t + 1, &pack, estimate)?;
    }

    info!(
        "🏁 GWO finished: best {:.3} at distance {:.4}",
        pack[0],
        fitness(pack[0], target)
    );

    Ok(result)
}

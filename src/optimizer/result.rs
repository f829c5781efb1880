use crate::geometry::Point;
use crate::optimizer::fitness;
use serde::Serialize;

/// A ranked pack captured at one iteration. Index 0 is the alpha.
pub type Snapshot = Vec<Point>;

/// Full history of a run, one snapshot and one leader estimate per iteration
/// (the initial population included). Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    solutions: Vec<Snapshot>,
    leader_estimates: Vec<Point>,
    iterations_performed: usize,
    target: Point,
}

impl OptimizationResult {
    pub(crate) fn with_capacity(target: Point, snapshots: usize) -> Self {
        Self {
            solutions: Vec::with_capacity(snapshots),
            leader_estimates: Vec::with_capacity(snapshots),
            iterations_performed: 0,
            target,
        }
    }

    pub(crate) fn record(&mut self, pack: &[Point], leader_estimate: Point) {
        self.solutions.push(pack.to_vec());
        self.leader_estimates.push(leader_estimate);
    }

    pub(crate) fn mark_iteration(&mut self) {
        self.iterations_performed += 1;
    }

    pub fn solutions(&self) -> &[Snapshot] {
        &self.solutions
    }

    pub fn leader_estimates(&self) -> &[Point] {
        &self.leader_estimates
    }

    pub fn iterations_performed(&self) -> usize {
        self.iterations_performed
    }

    pub fn target(&self) -> Point {
        self.target
    }

    /// Number of recorded snapshots (`iterations_performed + 1`).
    pub fn snapshot_count(&self) -> usize {
        self.solutions.len()
    }

    /// Clamps a requested iteration into the recorded range.
    #[inline(always)]
    pub fn clamp_index(&self, iteration: usize) -> usize {
        iteration.min(self.solutions.len().saturating_sub(1))
    }

    /// Snapshot at `iteration`, clamped to the last one.
    pub fn snapshot(&self, iteration: usize) -> &[Point] {
        &self.solutions[self.clamp_index(iteration)]
    }

    /// Leader estimate at `iteration`, clamped to the last one.
    pub fn leader_estimate(&self, iteration: usize) -> Point {
        self.leader_estimates[self.clamp_index(iteration)]
    }

    pub fn fitness(&self, wolf: Point) -> f32 {
        fitness(wolf, self.target)
    }

    /// Alpha of the final snapshot.
    pub fn best(&self) -> Point {
        self.snapshot(self.iterations_performed)[0]
    }

    pub fn best_fitness(&self, iteration: usize) -> f32 {
        self.fitness(self.snapshot(iteration)[0])
    }

    pub fn mean_fitness(&self, iteration: usize) -> f32 {
        let snap = self.snapshot(iteration);
        snap.iter().map(|&w| self.fitness(w)).sum::<f32>() / snap.len() as f32
    }

    /// Alpha fitness per iteration.
    pub fn fitness_trace(&self) -> Vec<f32> {
        self.solutions
            .iter()
            .map(|snap| self.fitness(snap[0]))
            .collect()
    }
}

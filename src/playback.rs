use crate::geometry::Point;
use crate::optimizer::OptimizationResult;
use serde::Serialize;
use std::sync::Arc;
use strum_macros::Display;

/// Rank-derived role of a wolf, used to pick its marker style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Alpha,
    Beta,
    Delta,
    Follower,
}

impl Role {
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            0 => Self::Alpha,
            1 => Self::Beta,
            2 => Self::Delta,
            _ => Self::Follower,
        }
    }

    pub fn is_leader(self) -> bool {
        self != Self::Follower
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub position: Point,
    pub role: Role,
    pub fitness: f32,
}

/// Everything a renderer needs to draw one iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub iteration: usize,
    pub target: Point,
    pub leader_estimate: Point,
    pub markers: Vec<Marker>,
}

impl Frame {
    /// Builds the frame for `iteration`, clamped into the recorded range.
    pub fn from_result(result: &OptimizationResult, iteration: usize) -> Self {
        let iteration = result.clamp_index(iteration);
        let markers = result
            .snapshot(iteration)
            .iter()
            .enumerate()
            .map(|(rank, &position)| Marker {
                position,
                role: Role::from_rank(rank),
                fitness: result.fitness(position),
            })
            .collect();

        Self {
            iteration,
            target: result.target(),
            leader_estimate: result.leader_estimate(iteration),
            markers,
        }
    }

    pub fn leaders(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(|m| m.role.is_leader())
    }
}

/// Scrub cursor over a finished run.
#[derive(Debug, Clone)]
pub struct Playback {
    result: Arc<OptimizationResult>,
    current: usize,
}

impl Playback {
    pub fn new(result: Arc<OptimizationResult>) -> Self {
        Self { result, current: 0 }
    }

    pub fn result(&self) -> &OptimizationResult {
        &self.result
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn last_index(&self) -> usize {
        self.result.snapshot_count() - 1
    }

    /// Jumps to `iteration`, clamped to `[0, last]`.
    pub fn seek(&mut self, iteration: usize) -> usize {
        self.current = self.result.clamp_index(iteration);
        self.current
    }

    /// Advances one snapshot, wrapping from the last back to the first.
    pub fn step_forward(&mut self) -> usize {
        self.current = (self.current + 1) % self.result.snapshot_count();
        self.current
    }

    /// Moves back one snapshot, wrapping from the first to the last.
    pub fn step_backward(&mut self) -> usize {
        let count = self.result.snapshot_count();
        self.current = (self.current + count - 1) % count;
        self.current
    }

    pub fn current(&self) -> Frame {
        Frame::from_result(&self.result, self.current)
    }
}

/// Two-colour blink of the target marker. Owned by whoever draws the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkState {
    accumulated: f32,
    primary: bool,
    period: f32,
}

impl Default for BlinkState {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl BlinkState {
    pub fn new(period: f32) -> Self {
        Self {
            accumulated: 0.0,
            primary: false,
            period,
        }
    }

    /// Accumulates frame time; flips colour once the period is exceeded.
    /// Returns whether the primary colour is showing.
    pub fn tick(&mut self, time_delta: f32) -> bool {
        self.accumulated += time_delta;
        if self.accumulated > self.period {
            self.primary = !self.primary;
            self.accumulated = 0.0;
        }
        self.primary
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::{optimize, RunParameters};
    use crate::sampling::FastRandSampler;

    fn result(iters: usize) -> Arc<OptimizationResult> {
        let params = RunParameters::new(
            iters,
            5,
            Point::new(5.0, 5.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
        )
        .unwrap();
        Arc::new(optimize(&params, &mut FastRandSampler::with_seed(5)).unwrap())
    }

    #[test]
    fn test_roles_from_rank() {
        assert_eq!(Role::from_rank(0), Role::Alpha);
        assert_eq!(Role::from_rank(2), Role::Delta);
        assert_eq!(Role::from_rank(7), Role::Follower);
        assert_eq!(Role::Beta.to_string(), "beta");
    }

    #[test]
    fn test_seek_clamps() {
        let mut pb = Playback::new(result(4));
        assert_eq!(pb.seek(2), 2);
        assert_eq!(pb.seek(99), 4);
        assert_eq!(pb.current().iteration, 4);
    }

    #[test]
    fn test_steps_wrap() {
        let mut pb = Playback::new(result(2));
        assert_eq!(pb.step_backward(), 2);
        assert_eq!(pb.step_forward(), 0);
        assert_eq!(pb.step_forward(), 1);
    }

    #[test]
    fn test_single_snapshot_steps_stay_put() {
        let mut pb = Playback::new(result(0));
        assert_eq!(pb.step_forward(), 0);
        assert_eq!(pb.step_backward(), 0);
    }

    #[test]
    fn test_frame_marks_three_leaders() {
        let frame = Playback::new(result(3)).current();
        assert_eq!(frame.markers.len(), 5);
        assert_eq!(frame.leaders().count(), 3);
        assert!(frame.markers.windows(2).all(|w| w[0].fitness <= w[1].fitness));
    }

    #[test]
    fn test_blink_toggles_after_period() {
        let mut blink = BlinkState::default();
        assert!(!blink.tick(0.3));
        assert!(blink.tick(0.3));
        assert!(blink.tick(0.1));
        assert!(!blink.tick(0.6));
    }
}

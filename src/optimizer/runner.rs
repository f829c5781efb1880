use crate::error::{GwoResult, OptimizerError};
use crate::geometry::Point;
use crate::optimizer::{drive, fitness, OptimizationResult, RunObserver, RunParameters};
use crate::sampling::UniformSampler;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// A trait for receiving updates during optimization.
/// Boolean return value indicates if the run should continue (true) or abort (false).
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, iteration: usize, total: usize, leader: Point, best_fitness: f32) -> bool;
}

/// Ignores every update.
pub struct SilentProgress;
impl ProgressCallback for SilentProgress {
    fn on_progress(&self, _: usize, _: usize, _: Point, _: f32) -> bool {
        true
    }
}

impl<F> ProgressCallback for F
where
    F: Fn(usize, usize, Point, f32) -> bool + Send + Sync,
{
    fn on_progress(&self, iteration: usize, total: usize, leader: Point, best_fitness: f32) -> bool {
        self(iteration, total, leader, best_fitness)
    }
}

/// Cooperative cancellation flag, checked once per iteration.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Default)]
struct Shared {
    running: AtomicBool,
    performed: AtomicUsize,
    total: AtomicUsize,
}

/// Runs the optimizer with at most one run in flight.
///
/// Clones share the same run slot and progress counters, so a UI thread can
/// poll progress while a worker owns the run.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    shared: Arc<Shared>,
}

/// Holds the run slot; released on drop, panics included.
struct RunSlot {
    shared: Arc<Shared>,
}

impl Drop for RunSlot {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
    }
}

struct EngineObserver<'a, CB: ProgressCallback> {
    shared: &'a Shared,
    cancel: &'a CancelToken,
    callback: &'a CB,
    target: Point,
    total: usize,
}

impl<CB: ProgressCallback> RunObserver for EngineObserver<'_, CB> {
    fn before_iteration(&mut self, t: usize) -> GwoResult<()> {
        if self.cancel.is_cancelled() {
            warn!("⛔ Run cancelled before iteration {}", t + 1);
            return Err(OptimizerError::Cancelled { completed: t });
        }
        Ok(())
    }

    fn on_snapshot(&mut self, iteration: usize, pack: &[Point], leader: Point) -> GwoResult<()> {
        self.shared.performed.store(iteration, Ordering::Release);
        let best = fitness(pack[0], self.target);
        if !self.callback.on_progress(iteration, self.total, leader, best) {
            warn!("⛔ Run aborted by progress callback at iteration {}", iteration);
            return Err(OptimizerError::Cancelled {
                completed: iteration,
            });
        }
        Ok(())
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Iterations completed by the current (or last) run.
    pub fn iterations_performed(&self) -> usize {
        self.shared.performed.load(Ordering::Acquire)
    }

    /// Iteration count of the current (or last) run.
    pub fn total_iterations(&self) -> usize {
        self.shared.total.load(Ordering::Acquire)
    }

    fn claim(&self, params: &RunParameters) -> GwoResult<RunSlot> {
        if self
            .shared
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(OptimizerError::RunAlreadyInProgress);
        }
        let slot = RunSlot {
            shared: self.shared.clone(),
        };
        self.shared.performed.store(0, Ordering::Release);
        self.shared
            .total
            .store(params.num_iterations, Ordering::Release);
        Ok(slot)
    }

    fn execute<S, CB>(
        &self,
        params: &RunParameters,
        sampler: &mut S,
        cancel: &CancelToken,
        callback: &CB,
    ) -> GwoResult<OptimizationResult>
    where
        S: UniformSampler,
        CB: ProgressCallback,
    {
        let mut observer = EngineObserver {
            shared: &self.shared,
            cancel,
            callback,
            target: params.target_point,
            total: params.num_iterations,
        };
        drive(params, sampler, &mut observer)
    }

    /// Runs to completion on the calling thread.
    pub fn run<S, CB>(
        &self,
        params: &RunParameters,
        sampler: &mut S,
        cancel: &CancelToken,
        callback: &CB,
    ) -> GwoResult<OptimizationResult>
    where
        S: UniformSampler,
        CB: ProgressCallback,
    {
        params.validate()?;
        let _slot = self.claim(params)?;
        self.execute(params, sampler, cancel, callback)
    }

    /// Claims the run slot now and runs on a background thread.
    ///
    /// A concurrent `run`/`spawn` fails with `RunAlreadyInProgress` as soon as
    /// this returns `Ok`. The returned handle is the only way to get the result.
    pub fn spawn<S, CB>(&self, params: RunParameters, mut sampler: S, callback: CB) -> GwoResult<RunHandle>
    where
        S: UniformSampler + Send + 'static,
        CB: ProgressCallback + 'static,
    {
        params.validate()?;
        let slot = self.claim(&params)?;
        let cancel = CancelToken::new();

        let engine = self.clone();
        let worker_cancel = cancel.clone();
        let join = thread::Builder::new()
            .name("gwo-worker".to_string())
            .spawn(move || {
                let _slot = slot;
                engine.execute(&params, &mut sampler, &worker_cancel, &callback)
            })?;

        info!("🧵 Spawned GWO worker for {} iterations", params.num_iterations);

        Ok(RunHandle {
            join,
            cancel,
            engine: self.clone(),
        })
    }
}

/// Owner of a background run.
pub struct RunHandle {
    join: JoinHandle<GwoResult<OptimizationResult>>,
    cancel: CancelToken,
    engine: Engine,
}

impl RunHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub fn iterations_performed(&self) -> usize {
        self.engine.iterations_performed()
    }

    pub fn total_iterations(&self) -> usize {
        self.engine.total_iterations()
    }

    /// Blocks until the worker finishes and hands over its result.
    pub fn join(self) -> GwoResult<OptimizationResult> {
        self.join
            .join()
            .map_err(|_| OptimizerError::WorkerPanicked)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::FastRandSampler;
    use std::sync::mpsc;
    use std::sync::Mutex;

    fn params(iters: usize) -> RunParameters {
        RunParameters::new(
            iters,
            5,
            Point::new(1.0, 1.0),
            Point::new(-4.0, -4.0),
            Point::new(4.0, 4.0),
        )
        .unwrap()
    }

    #[test]
    fn test_run_releases_slot() {
        let engine = Engine::new();
        let mut s = FastRandSampler::with_seed(1);
        let r = engine
            .run(&params(10), &mut s, &CancelToken::new(), &SilentProgress)
            .unwrap();
        assert_eq!(r.iterations_performed(), 10);
        assert!(!engine.is_running());
        assert_eq!(engine.iterations_performed(), 10);
        assert_eq!(engine.total_iterations(), 10);
    }

    #[test]
    fn test_cancelled_token_stops_before_first_iteration() {
        let engine = Engine::new();
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut s = FastRandSampler::with_seed(1);
        let err = engine
            .run(&params(10), &mut s, &cancel, &SilentProgress)
            .unwrap_err();
        assert!(matches!(err, OptimizerError::Cancelled { completed: 0 }));
        assert!(!engine.is_running());
    }

    #[test]
    fn test_callback_abort_cancels() {
        let engine = Engine::new();
        let mut s = FastRandSampler::with_seed(1);
        let stop_at_three = |it: usize, _: usize, _: Point, _: f32| it < 3;
        let err = engine
            .run(&params(10), &mut s, &CancelToken::new(), &stop_at_three)
            .unwrap_err();
        assert!(matches!(err, OptimizerError::Cancelled { completed: 3 }));
    }

    #[test]
    fn test_progress_is_monotonic() {
        let engine = Engine::new();
        let seen = Mutex::new(Vec::new());
        let record = |it: usize, total: usize, _: Point, _: f32| {
            assert_eq!(total, 8);
            seen.lock().unwrap().push(it);
            true
        };
        let mut s = FastRandSampler::with_seed(3);
        engine
            .run(&params(8), &mut s, &CancelToken::new(), &record)
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), (0..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_second_run_rejected_while_spawned_run_blocks() {
        let engine = Engine::new();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let gate = move |it: usize, _: usize, _: Point, _: f32| {
            if it == 1 {
                let _ = release_rx.lock().unwrap().recv();
            }
            true
        };

        let handle = engine
            .spawn(params(5), FastRandSampler::with_seed(9), gate)
            .unwrap();
        assert!(engine.is_running());

        let mut s = FastRandSampler::with_seed(9);
        let err = engine
            .run(&params(5), &mut s, &CancelToken::new(), &SilentProgress)
            .unwrap_err();
        assert!(matches!(err, OptimizerError::RunAlreadyInProgress));

        release_tx.send(()).unwrap();
        let result = handle.join().unwrap();
        assert_eq!(result.iterations_performed(), 5);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_invalid_params_do_not_claim_slot() {
        let engine = Engine::new();
        let mut p = params(5);
        p.num_wolves = 1;
        let mut s = FastRandSampler::with_seed(9);
        assert!(matches!(
            engine.run(&p, &mut s, &CancelToken::new(), &SilentProgress),
            Err(OptimizerError::InvalidParameter(_))
        ));
        assert!(!engine.is_running());
    }
}

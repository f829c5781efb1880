use crate::config::Config;
use crate::error::{GwoResult, OptimizerError};
use crate::optimizer::{
    CancelToken, Engine, OptimizationResult, ProgressCallback, RunHandle, RunParameters,
    SilentProgress,
};
use crate::playback::Frame;
use crate::sampling::{random_target, FastRandSampler};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{info, warn};

/// State a control panel keeps between frames.
///
/// A failed, rejected or cancelled run never replaces the current result.
#[derive(Default)]
pub struct VizState {
    pub engine: Engine,
    current: RwLock<Option<Arc<OptimizationResult>>>,
    pending: Mutex<Option<RunHandle>>,
}

/// Status of a background run as seen from the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Running { performed: usize, total: usize },
    Finished,
}

/// Resolves a config into parameters and a sampler, drawing a random target
/// first when asked to.
pub fn prepare(config: &Config) -> GwoResult<(RunParameters, FastRandSampler)> {
    let mut params = RunParameters::try_from(config)?;
    let mut sampler = FastRandSampler::from_seed(config.sampling.seed);
    if config.sampling.random_target {
        params.target_point = random_target(&mut sampler, params.min_bound, params.max_bound)?;
        info!("🎯 Random target: {:.2}", params.target_point);
    }
    Ok((params, sampler))
}

fn lock_err<T>(_: T) -> OptimizerError {
    OptimizerError::Config("viz state lock poisoned".to_string())
}

impl VizState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<OptimizationResult>> {
        self.current.read().ok().and_then(|g| g.clone())
    }

    fn store(&self, result: OptimizationResult) -> GwoResult<Arc<OptimizationResult>> {
        let result = Arc::new(result);
        *self.current.write().map_err(lock_err)? = Some(result.clone());
        Ok(result)
    }

    /// Runs synchronously and stores the result.
    pub fn generate(&self, config: &Config) -> GwoResult<Arc<OptimizationResult>> {
        let (params, mut sampler) = prepare(config)?;
        let result = self
            .engine
            .run(&params, &mut sampler, &CancelToken::new(), &SilentProgress)?;
        self.store(result)
    }

    /// Starts a background run. Fails with `RunAlreadyInProgress` while one is
    /// still running. A finished run nobody polled yet is collected first.
    pub fn launch<CB: ProgressCallback + 'static>(&self, config: &Config, callback: CB) -> GwoResult<()> {
        let mut pending = self.pending.lock().map_err(lock_err)?;
        if pending.as_ref().is_some_and(|h| !h.is_finished()) {
            return Err(OptimizerError::RunAlreadyInProgress);
        }
        if let Err(e) = self.collect(&mut pending) {
            warn!("Discarding failed background run: {}", e);
        }
        let (params, sampler) = prepare(config)?;
        *pending = Some(self.engine.spawn(params, sampler, callback)?);
        Ok(())
    }

    /// Joins the pending handle and stores its result.
    fn collect(&self, pending: &mut Option<RunHandle>) -> GwoResult<Option<Arc<OptimizationResult>>> {
        let handle = match pending.take() {
            Some(h) => h,
            None => return Ok(None),
        };
        match handle.join() {
            Ok(result) => self.store(result).map(Some),
            Err(e) => {
                warn!("Background run failed: {}", e);
                Err(e)
            }
        }
    }

    /// Collects a finished background run, if any.
    ///
    /// Returns `Ok(None)` while nothing has finished. Errors from the run are
    /// returned once and the previous result stays current.
    pub fn poll(&self) -> GwoResult<Option<Arc<OptimizationResult>>> {
        let mut pending = self.pending.lock().map_err(lock_err)?;
        if !pending.as_ref().is_some_and(|h| h.is_finished()) {
            return Ok(None);
        }
        self.collect(&mut pending)
    }

    /// Blocks until the pending run (if any) finishes, then collects it.
    pub fn wait(&self) -> GwoResult<Option<Arc<OptimizationResult>>> {
        let mut handle = self.pending.lock().map_err(lock_err)?.take();
        self.collect(&mut handle)
    }

    pub fn cancel(&self) -> GwoResult<()> {
        if let Some(h) = self.pending.lock().map_err(lock_err)?.as_ref() {
            h.cancel();
        }
        Ok(())
    }

    pub fn status(&self) -> GwoResult<RunStatus> {
        let pending = self.pending.lock().map_err(lock_err)?;
        Ok(match pending.as_ref() {
            None => RunStatus::Idle,
            Some(h) if h.is_finished() => RunStatus::Finished,
            Some(h) => RunStatus::Running {
                performed: h.iterations_performed(),
                total: h.total_iterations(),
            },
        })
    }

    /// Frame of the current result at `iteration` (clamped).
    pub fn frame(&self, iteration: usize) -> Option<Frame> {
        self.current()
            .map(|result| Frame::from_result(&result, iteration))
    }
}

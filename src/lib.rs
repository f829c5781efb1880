pub mod api;
pub mod config;
pub mod error;
pub mod geometry;
pub mod optimizer;
pub mod playback;
pub mod sampling;
// cmd and reports are binary modules (declared in main.rs).

pub use error::{GwoResult, OptimizerError};
pub use geometry::Point;
pub use optimizer::{optimize, Engine, OptimizationResult, RunParameters, UpdatePolicy};
pub use sampling::{FastRandSampler, SequenceSampler, UniformSampler};

use crate::error::{GwoResult, OptimizerError};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Leader selection needs alpha, beta and delta.
pub const MIN_WOLVES: usize = 3;

/// Which wolves move during a refinement step.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum UpdatePolicy {
    /// Every wolf is pulled toward the leaders, the leaders included.
    #[default]
    All,
    /// Alpha, beta and delta hold position; only ranks 3.. move.
    FollowersOnly,
}

impl UpdatePolicy {
    /// First pack index that gets repositioned.
    #[inline(always)]
    pub fn first_updated_rank(self) -> usize {
        match self {
            Self::All => 0,
            Self::FollowersOnly => MIN_WOLVES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    pub num_iterations: usize,
    pub num_wolves: usize,
    pub target_point: Point,
    pub min_bound: Point,
    pub max_bound: Point,
    #[serde(default)]
    pub update_policy: UpdatePolicy,
}

impl RunParameters {
    pub fn new(
        num_iterations: usize,
        num_wolves: usize,
        target_point: Point,
        min_bound: Point,
        max_bound: Point,
    ) -> GwoResult<Self> {
        let params = Self {
            num_iterations,
            num_wolves,
            target_point,
            min_bound,
            max_bound,
            update_policy: UpdatePolicy::default(),
        };
        params.validate()?;
        Ok(params)
    }

    /// Builds parameters from signed user input, rejecting negative counts.
    pub fn from_raw(
        num_iterations: i64,
        num_wolves: i64,
        target_point: Point,
        min_bound: Point,
        max_bound: Point,
    ) -> GwoResult<Self> {
        let num_iterations = usize::try_from(num_iterations).map_err(|_| {
            OptimizerError::invalid(format!(
                "number of iterations must be >= 0, got {}",
                num_iterations
            ))
        })?;
        let num_wolves = usize::try_from(num_wolves).map_err(|_| {
            OptimizerError::invalid(format!(
                "number of wolves must be >= {}, got {}",
                MIN_WOLVES, num_wolves
            ))
        })?;
        Self::new(num_iterations, num_wolves, target_point, min_bound, max_bound)
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    pub fn validate(&self) -> GwoResult<()> {
        if self.num_wolves < MIN_WOLVES {
            return Err(OptimizerError::invalid(format!(
                "number of wolves must be >= {}, got {}",
                MIN_WOLVES, self.num_wolves
            )));
        }
        if !self.target_point.is_finite() {
            return Err(OptimizerError::invalid(format!(
                "target point {} is not finite",
                self.target_point
            )));
        }
        if !self.min_bound.is_finite() || !self.max_bound.is_finite() {
            return Err(OptimizerError::invalid(format!(
                "bounds {} .. {} are not finite",
                self.min_bound, self.max_bound
            )));
        }
        if self.min_bound.x > self.max_bound.x || self.min_bound.y > self.max_bound.y {
            return Err(OptimizerError::invalid(format!(
                "inverted bounds: min {} exceeds max {}",
                self.min_bound, self.max_bound
            )));
        }
        Ok(())
    }
}

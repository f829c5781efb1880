use crate::error::{GwoResult, OptimizerError};
use crate::geometry::Point;
use crate::optimizer::{RunParameters, UpdatePolicy};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(flatten)]
    pub sampling: SamplingArgs,
}

/// Raw run parameters as typed by a user. Counts are signed so that a negative
/// entry reaches validation instead of failing inside the parser.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunArgs {
    #[arg(long, default_value_t = 50, allow_negative_numbers = true)]
    pub iterations: i64,
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    pub wolves: i64,

    // === TARGET ===
    #[arg(long, default_value_t = 382.5, allow_negative_numbers = true)]
    pub target_x: f32,
    #[arg(long, default_value_t = 282.5, allow_negative_numbers = true)]
    pub target_y: f32,

    // === REGION ===
    #[arg(long, default_value_t = 15.0, allow_negative_numbers = true)]
    pub min_x: f32,
    #[arg(long, default_value_t = 15.0, allow_negative_numbers = true)]
    pub min_y: f32,
    #[arg(long, default_value_t = 750.0, allow_negative_numbers = true)]
    pub max_x: f32,
    #[arg(long, default_value_t = 550.0, allow_negative_numbers = true)]
    pub max_y: f32,

    #[arg(long, value_enum, default_value_t = UpdatePolicy::All)]
    pub policy: UpdatePolicy,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            iterations: 50,
            wolves: 10,
            target_x: 382.5,
            target_y: 282.5,
            min_x: 15.0,
            min_y: 15.0,
            max_x: 750.0,
            max_y: 550.0,
            policy: UpdatePolicy::All,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SamplingArgs {
    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Replace the target with a point drawn uniformly inside the region.
    #[arg(long, default_value_t = false)]
    pub random_target: bool,
}

impl RunArgs {
    pub fn target(&self) -> Point {
        Point::new(self.target_x, self.target_y)
    }

    pub fn min_bound(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn max_bound(&self) -> Point {
        Point::new(self.max_x, self.max_y)
    }
}

impl TryFrom<&RunArgs> for RunParameters {
    type Error = OptimizerError;

    fn try_from(args: &RunArgs) -> GwoResult<Self> {
        RunParameters::from_raw(
            args.iterations,
            args.wolves,
            args.target(),
            args.min_bound(),
            args.max_bound(),
        )
        .map(|p| p.with_policy(args.policy))
    }
}

impl TryFrom<&Config> for RunParameters {
    type Error = OptimizerError;

    fn try_from(cfg: &Config) -> GwoResult<Self> {
        RunParameters::try_from(&cfg.run)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> GwoResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            OptimizerError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Copies every argument the user typed on the command line onto `self`,
    /// leaving file-provided values alone where the CLI only had defaults.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(run.iterations);
        update_if_present!(run.wolves);
        update_if_present!(run.target_x);
        update_if_present!(run.target_y);
        update_if_present!(run.min_x);
        update_if_present!(run.min_y);
        update_if_present!(run.max_x);
        update_if_present!(run.max_y);
        update_if_present!(run.policy);

        update_if_present!(sampling.seed);
        update_if_present!(sampling.random_target);
    }
}

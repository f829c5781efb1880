use crate::reports;
use clap::Args;
use greywolf::api;
use greywolf::config::Config;
use greywolf::optimizer::{Engine, ProgressCallback};
use greywolf::{GwoResult, Point};
use std::io;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct RunCommand {
    #[command(flatten)]
    pub config: Config,

    /// Report every N iterations.
    #[arg(long, default_value_t = 10)]
    pub every: usize,

    /// Print the per-iteration trace as CSV instead of tables.
    #[arg(long, default_value_t = false, conflicts_with = "json")]
    pub csv: bool,

    /// Print the full result as JSON for an external renderer.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

struct CliLogger {
    every: usize,
}

impl ProgressCallback for CliLogger {
    fn on_progress(&self, iteration: usize, total: usize, leader: Point, best: f32) -> bool {
        if iteration % self.every == 0 || iteration == total {
            info!(
                "Iter {:5} of {} | Leader {:.3} | Best: {:.4}",
                iteration, total, leader, best
            );
        }
        true
    }
}

pub fn run(args: RunCommand, config: Config) -> GwoResult<()> {
    let (params, sampler) = api::prepare(&config)?;
    let quiet = args.csv || args.json;

    if !quiet {
        reports::print_run_header(&params);
    }

    let engine = Engine::new();
    let handle = engine.spawn(
        params,
        sampler,
        CliLogger {
            every: args.every.max(1),
        },
    )?;
    let result = handle.join()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if args.csv {
        reports::write_trace_csv(io::stdout().lock(), &result)?;
    } else {
        reports::print_convergence(&result, args.every);

        println!("\n=== 🏆 FINAL RESULT ===");
        println!(
            "Best: {:.4} | Distance: {:.6}",
            result.best(),
            result.best_fitness(result.iterations_performed())
        );
    }

    Ok(())
}

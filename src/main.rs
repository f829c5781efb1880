use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use greywolf::config::Config;
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about = "Grey Wolf Optimizer runs with per-iteration history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file; explicit command-line flags override it.
    #[arg(global = true, long)]
    config: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Run(cmd::run::RunCommand),
    Scrub(cmd::scrub::ScrubArgs),
}

fn main() {
    // 1. Parse raw matches (to distinguish user input from defaults)
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    info!("🚀 Initializing GWO...");

    // 2. Config from the subcommand flags, overlaid on a file when given
    let cli_config = match &cli.command {
        Commands::Run(args) => &args.config,
        Commands::Scrub(args) => &args.config,
    };
    let sub_matches = matches.subcommand().map(|(_, m)| m).unwrap_or(&matches);

    let config = match &cli.config {
        Some(path) => {
            info!("📂 Loading Config: {}", path);
            match Config::load_from_file(path) {
                Ok(mut file_config) => {
                    file_config.merge_from_cli(cli_config, sub_matches);
                    file_config
                }
                Err(e) => {
                    error!("❌ {}", e);
                    process::exit(1);
                }
            }
        }
        None => {
            info!("No config file given. Using command-line values.");
            cli_config.clone()
        }
    };

    // 3. Execute
    let outcome = match cli.command {
        Commands::Run(args) => cmd::run::run(args, config),
        Commands::Scrub(args) => cmd::scrub::run(args, config),
    };

    if let Err(e) = outcome {
        error!("❌ FATAL: {}", e);
        process::exit(1);
    }
}

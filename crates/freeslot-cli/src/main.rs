use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "freeslot",
    version,
    about = "Recommend coursework for the free periods of a weekly timetable"
)]
struct Cli {
    /// Config file (default: ~/.config/freeslot/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show free intervals per weekday
    FreeTime(commands::free_time::FreeTimeArgs),
    /// Regenerate recommendations for a snapshot
    Recommend(commands::recommend::RecommendArgs),
    /// Record progress on a task and show its updated display fields
    Progress(commands::progress::ProgressArgs),
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = if verbose {
        EnvFilter::new(fallback)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::FreeTime(args) => commands::free_time::run(args, config),
        Commands::Recommend(args) => commands::recommend::run(args, config),
        Commands::Progress(args) => commands::progress::run(args, config),
        Commands::Task { action } => commands::task::run(action),
        Commands::Config { action } => commands::config::run(action, config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

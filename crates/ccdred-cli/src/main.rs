mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ccdred", about = "CCD image calibration tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calibrate a raw image with master bias, dark and flat frames
    Reduce(commands::reduce::ReduceArgs),
    /// Show FITS image metadata
    Info(commands::info::InfoArgs),
    /// Print or save a default calibration config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Reduce(args) => commands::reduce::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}

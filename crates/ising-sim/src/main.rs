use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    exact::{self, ExactArgs, ScanArgs},
    mcmc::{self, McmcArgs, ResumeArgs},
    version,
};
use tracing_subscriber::filter::LevelFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "ising-sim", about = "1D Ising chain: exact averages and Metropolis runs")]
struct Cli {
    /// Log level (off, trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exact thermal averages at one temperature.
    Exact(ExactArgs),
    /// Exact thermal averages over an evenly spaced temperature grid.
    Scan(ScanArgs),
    /// Execute a sampler run from a YAML configuration.
    Mcmc(McmcArgs),
    /// Continue a sampler run from a checkpoint file.
    Resume(ResumeArgs),
    /// Print the crate version.
    Version,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Exact(args) => exact::run(&args),
        Command::Scan(args) => exact::scan(&args),
        Command::Mcmc(args) => mcmc::run(&args),
        Command::Resume(args) => mcmc::resume(&args),
        Command::Version => version::run(),
    }
}

use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use ising_mcmc::{RunConfig, RunSummary};
use serde_json::json;
use tracing::info;

use super::print_json;

#[derive(Args, Debug)]
pub struct McmcArgs {
    /// YAML configuration describing the sampler run.
    #[arg(long)]
    pub config: PathBuf,
    /// Output directory for run artefacts, overriding the configuration.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Master seed, overriding the configured seed policy.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ResumeArgs {
    /// Checkpoint file written by an earlier run.
    #[arg(long)]
    pub checkpoint: PathBuf,
}

pub fn run(args: &McmcArgs) -> Result<(), Box<dyn Error>> {
    let mut config = RunConfig::load(&args.config)?;
    if let Some(out) = &args.out {
        config.output.run_directory = Some(out.clone());
    }
    if let Some(seed) = args.seed {
        config.seed_policy.master_seed = seed;
    }
    info!(config = %args.config.display(), seed = config.seed_policy.master_seed, "starting run");
    let summary = ising_mcmc::run(&config, config.seed_policy.master_seed)?;
    print_summary(&summary)
}

pub fn resume(args: &ResumeArgs) -> Result<(), Box<dyn Error>> {
    let summary = ising_mcmc::resume(&args.checkpoint)?;
    print_summary(&summary)
}

fn print_summary(summary: &RunSummary) -> Result<(), Box<dyn Error>> {
    print_json(&json!({
        "sweeps": summary.sweeps,
        "acceptance_rate": summary.acceptance_rate,
        "final_state": summary.final_state.to_string(),
        "final_energy": summary.final_energy,
        "final_magnetization": summary.final_magnetization,
        "estimates": summary.estimates,
        "metrics_path": summary.metrics_path,
        "manifest_path": summary.manifest_path,
        "checkpoints": summary.checkpoints,
    }))
}

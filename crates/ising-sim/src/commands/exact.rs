use std::error::Error;

use clap::Args;
use ising_core::IsingHamiltonian1D;
use ising_mcmc::{compute_average_values_with, scan_temperatures, ExactOptions};

use super::print_json;

/// Chain and Hamiltonian parameters shared by the exact commands.
#[derive(Args, Debug)]
pub struct ChainArgs {
    /// Number of sites.
    #[arg(long, default_value_t = 10)]
    pub sites: usize,
    /// Nearest-neighbour coupling `J`.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub coupling: f64,
    /// Field coupling scale.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub mu: f64,
    /// Uniform field applied to every site.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub field: f64,
    /// Use open instead of periodic boundaries.
    #[arg(long)]
    pub open: bool,
    /// Largest chain length the enumeration may visit.
    #[arg(long, default_value_t = 24)]
    pub max_sites: usize,
}

impl ChainArgs {
    fn hamiltonian(&self) -> IsingHamiltonian1D {
        IsingHamiltonian1D::uniform(self.coupling, self.field, self.mu, !self.open)
    }

    fn options(&self) -> ExactOptions {
        ExactOptions {
            max_sites: self.max_sites,
            ..ExactOptions::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct ExactArgs {
    #[command(flatten)]
    pub chain: ChainArgs,
    /// Temperature to evaluate at.
    #[arg(long, default_value_t = 1.0)]
    pub temperature: f64,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub chain: ChainArgs,
    /// Lowest temperature in the grid.
    #[arg(long, default_value_t = 0.1)]
    pub t_min: f64,
    /// Highest temperature in the grid.
    #[arg(long, default_value_t = 5.0)]
    pub t_max: f64,
    /// Number of grid points, endpoints included.
    #[arg(long, default_value_t = 50)]
    pub steps: usize,
}

pub fn run(args: &ExactArgs) -> Result<(), Box<dyn Error>> {
    let stats = compute_average_values_with(
        args.chain.sites,
        &args.chain.hamiltonian(),
        args.temperature,
        &args.chain.options(),
    )?;
    print_json(&stats)
}

pub fn scan(args: &ScanArgs) -> Result<(), Box<dyn Error>> {
    let temperatures = temperature_grid(args.t_min, args.t_max, args.steps);
    let scan = scan_temperatures(
        args.chain.sites,
        &args.chain.hamiltonian(),
        &temperatures,
        &args.chain.options(),
    )?;
    print_json(&scan)
}

fn temperature_grid(t_min: f64, t_max: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![t_min],
        _ => {
            let step = (t_max - t_min) / (steps - 1) as f64;
            (0..steps).map(|i| t_min + step * i as f64).collect()
        }
    }
}

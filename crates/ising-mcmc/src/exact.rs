use ising_core::errors::ErrorInfo;
use ising_core::{check_temperature, IsingError, IsingHamiltonian1D, SpinConfig1D};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hard ceiling on enumerable chain lengths regardless of the configured budget.
pub const ENUMERATION_CEILING: usize = 40;

/// Budget and decomposition settings for exact enumeration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExactOptions {
    /// Largest chain length that may be enumerated (`2^max_sites` states).
    #[serde(default = "default_max_sites")]
    pub max_sites: usize,
    /// Number of consecutive encodings summed by one work item.
    ///
    /// The result depends on this value (summation order) but never on the
    /// number of worker threads.
    #[serde(default = "default_block_size")]
    pub block_size: u64,
}

fn default_max_sites() -> usize {
    24
}

fn default_block_size() -> u64 {
    1 << 12
}

impl Default for ExactOptions {
    fn default() -> Self {
        Self {
            max_sites: default_max_sites(),
            block_size: default_block_size(),
        }
    }
}

/// Boltzmann averages at a single temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalAverages {
    /// Temperature the averages were evaluated at.
    pub temperature: f64,
    /// Mean energy `<E>`.
    pub energy: f64,
    /// Mean magnetization `<M>` with `M = #up - #down`.
    pub magnetization: f64,
    /// `(<E^2> - <E>^2) / T^2`.
    pub heat_capacity: f64,
    /// `(<M^2> - <M>^2) / T`.
    pub susceptibility: f64,
    /// Natural logarithm of the partition function.
    pub ln_partition_function: f64,
    /// Number of microstates enumerated.
    pub states: u64,
}

impl ThermalAverages {
    /// Returns `(E, M, HC, MS)`.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (
            self.energy,
            self.magnetization,
            self.heat_capacity,
            self.susceptibility,
        )
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Moments {
    z: f64,
    e: f64,
    e2: f64,
    m: f64,
    m2: f64,
}

impl Moments {
    fn merge(self, other: Moments) -> Moments {
        Moments {
            z: self.z + other.z,
            e: self.e + other.e,
            e2: self.e2 + other.e2,
            m: self.m + other.m,
            m2: self.m2 + other.m2,
        }
    }
}

/// Exact thermal averages for a chain of `sites` spins using default options.
pub fn compute_average_values(
    sites: usize,
    ham: &IsingHamiltonian1D,
    temperature: f64,
) -> Result<ThermalAverages, IsingError> {
    compute_average_values_with(sites, ham, temperature, &ExactOptions::default())
}

/// Exact thermal averages over all `2^sites` microstates.
///
/// Encodings are visited through [`SpinConfig1D::set_from_integer`]. A first
/// pass finds the ground energy `E0`; weights are then `exp(-(E - E0) / T)`,
/// so the ground state always weighs 1 and no temperature drives `Z` to zero
/// or infinity.
pub fn compute_average_values_with(
    sites: usize,
    ham: &IsingHamiltonian1D,
    temperature: f64,
    opts: &ExactOptions,
) -> Result<ThermalAverages, IsingError> {
    check_temperature(temperature)?;
    check_budget(sites, opts)?;
    let probe = SpinConfig1D::new(sites, ham.pbc())?;
    ham.check_compatible(&probe)?;

    let states = 1u64 << sites;
    let block_size = opts.block_size.max(1);
    let blocks = states.div_ceil(block_size);
    let block_range = |block: usize| {
        let start = block as u64 * block_size;
        start..(start + block_size).min(states)
    };

    let reference = (0..blocks as usize)
        .into_par_iter()
        .map(|block| block_ground_energy(sites, ham, block_range(block)))
        .collect::<Result<Vec<_>, IsingError>>()?
        .into_iter()
        .fold(f64::INFINITY, f64::min);
    debug!(sites, states, blocks, temperature, ground = reference, "exact enumeration");

    let partials = (0..blocks as usize)
        .into_par_iter()
        .map(|block| accumulate_block(sites, ham, temperature, reference, block_range(block)))
        .collect::<Result<Vec<_>, IsingError>>()?;
    // Block order, not completion order, fixes the summation.
    let totals = partials
        .into_iter()
        .fold(Moments::default(), Moments::merge);

    let mean_e = totals.e / totals.z;
    let mean_e2 = totals.e2 / totals.z;
    let mean_m = totals.m / totals.z;
    let mean_m2 = totals.m2 / totals.z;

    Ok(ThermalAverages {
        temperature,
        energy: mean_e,
        magnetization: mean_m,
        heat_capacity: (mean_e2 - mean_e * mean_e) / (temperature * temperature),
        susceptibility: (mean_m2 - mean_m * mean_m) / temperature,
        ln_partition_function: totals.z.ln() - reference / temperature,
        states,
    })
}

/// Exact averages for each temperature in `temperatures`.
///
/// Every temperature is validated before any enumeration starts.
pub fn scan_temperatures(
    sites: usize,
    ham: &IsingHamiltonian1D,
    temperatures: &[f64],
    opts: &ExactOptions,
) -> Result<Vec<ThermalAverages>, IsingError> {
    for &temperature in temperatures {
        check_temperature(temperature)?;
    }
    temperatures
        .iter()
        .map(|&temperature| compute_average_values_with(sites, ham, temperature, opts))
        .collect()
}

fn check_budget(sites: usize, opts: &ExactOptions) -> Result<(), IsingError> {
    let limit = opts.max_sites.min(ENUMERATION_CEILING);
    if sites > limit {
        return Err(IsingError::SizeTooLarge(
            ErrorInfo::new("enumeration-budget", "2^N exceeds the enumeration budget")
                .with_context("sites", sites)
                .with_context("max_sites", limit)
                .with_hint("sample the chain with the Metropolis kernel instead"),
        ));
    }
    Ok(())
}

fn block_ground_energy(
    sites: usize,
    ham: &IsingHamiltonian1D,
    encodings: std::ops::Range<u64>,
) -> Result<f64, IsingError> {
    let mut config = SpinConfig1D::new(sites, ham.pbc())?;
    let mut ground = f64::INFINITY;
    for value in encodings {
        config.set_from_integer(value)?;
        ground = ground.min(ham.energy(&config)?);
    }
    Ok(ground)
}

fn accumulate_block(
    sites: usize,
    ham: &IsingHamiltonian1D,
    temperature: f64,
    reference: f64,
    encodings: std::ops::Range<u64>,
) -> Result<Moments, IsingError> {
    let mut config = SpinConfig1D::new(sites, ham.pbc())?;
    let mut moments = Moments::default();
    for value in encodings {
        config.set_from_integer(value)?;
        let energy = ham.energy(&config)?;
        let magnetization = config.magnetization() as f64;
        let weight = (-(energy - reference) / temperature).exp();
        moments.z += weight;
        moments.e += weight * energy;
        moments.e2 += weight * energy * energy;
        moments.m += weight * magnetization;
        moments.m2 += weight * magnetization * magnetization;
    }
    Ok(moments)
}

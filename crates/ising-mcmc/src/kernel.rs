use std::path::{Path, PathBuf};

use ising_core::errors::ErrorInfo;
use ising_core::{check_temperature, IsingError, IsingHamiltonian1D, RngHandle, SpinConfig1D};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::checkpoint::{self, CheckpointPayload};
use crate::config::{InitialState, OutputConfig, RunConfig};
use crate::determinism;
use crate::manifest::RunManifest;
use crate::metrics::{MetricSample, MetricsRecorder, SampleEstimates};

/// Proposal counters for a single sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepStats {
    /// Number of single-site flips proposed.
    pub proposed: usize,
    /// Number of proposals accepted.
    pub accepted: usize,
}

/// Performs one Metropolis sweep over `config`, visiting sites `0..N` in order.
///
/// Each site consumes exactly one uniform draw from `rng`, whether or not the
/// draw decides the outcome, so the draw sequence depends only on `N`. A flip
/// is accepted when `dE <= 0` or `u < exp(-dE / T)`. Inputs are validated
/// before the first site is touched.
pub fn metropolis_sweep(
    config: &mut SpinConfig1D,
    ham: &IsingHamiltonian1D,
    temperature: f64,
    rng: &mut RngHandle,
) -> Result<SweepStats, IsingError> {
    check_temperature(temperature)?;
    ham.check_compatible(config)?;
    let mut stats = SweepStats::default();
    for site in 0..config.num_sites() {
        let delta = ham.delta_energy_for_flip(site, config)?;
        let draw = rng.uniform();
        stats.proposed += 1;
        if delta <= 0.0 || draw < (-delta / temperature).exp() {
            config.flip_site(site)?;
            stats.accepted += 1;
        }
    }
    Ok(stats)
}

/// Summary returned to callers after a run completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// Sweeps executed in total, burn-in included.
    pub sweeps: usize,
    /// Fraction of proposed flips that were accepted.
    pub acceptance_rate: f64,
    /// Chain state after the last sweep.
    pub final_state: SpinConfig1D,
    /// Energy of the final state.
    pub final_energy: f64,
    /// Magnetization of the final state.
    pub final_magnetization: i64,
    /// Estimates built from the recorded samples.
    pub estimates: SampleEstimates,
    /// Metrics samples collected (useful for tests/diagnostics).
    pub samples: Vec<MetricSample>,
    /// Metrics CSV written during the run.
    pub metrics_path: Option<PathBuf>,
    /// Manifest path, if emitted.
    pub manifest_path: Option<PathBuf>,
    /// Checkpoint files retained at the end of the run.
    pub checkpoints: Vec<PathBuf>,
}

struct RunState {
    next_sweep: usize,
    chain: SpinConfig1D,
    recorder: MetricsRecorder,
    accepted: usize,
    proposed: usize,
    checkpoints: Vec<PathBuf>,
}

/// Runs the sampler from the configured initial state with the given seed.
pub fn run(config: &RunConfig, seed: u64) -> Result<RunSummary, IsingError> {
    config.validate()?;
    let chain = initial_state(config, seed)?;
    run_from(
        config,
        seed,
        RunState {
            next_sweep: 0,
            chain,
            recorder: MetricsRecorder::new(),
            accepted: 0,
            proposed: 0,
            checkpoints: Vec::new(),
        },
    )
}

/// Resumes a run from a checkpoint file.
pub fn resume(path: &Path) -> Result<RunSummary, IsingError> {
    let payload = CheckpointPayload::load(path)?;
    payload.config.validate()?;
    if payload.sweep > payload.config.sweeps
        || payload.state.num_sites() != payload.config.chain.sites
    {
        return Err(IsingError::Serde(
            ErrorInfo::new("checkpoint-inconsistent", "checkpoint does not match its config")
                .with_context("path", path.display())
                .with_context("sweep", payload.sweep),
        ));
    }
    // Earlier checkpoints of the same run stay under the retention limit.
    let mut checkpoints = match checkpoint_dir(&payload.config.output) {
        Some(dir) => checkpoint::existing_checkpoints(&dir, payload.sweep)?,
        None => Vec::new(),
    };
    enforce_checkpoint_retention(&mut checkpoints, payload.config.checkpoint.max_to_keep)?;
    info!(path = %path.display(), sweep = payload.sweep, "resuming run");
    run_from(
        &payload.config,
        payload.master_seed,
        RunState {
            next_sweep: payload.sweep,
            chain: payload.state,
            recorder: MetricsRecorder::from_samples(payload.samples),
            accepted: payload.accepted,
            proposed: payload.proposed,
            checkpoints,
        },
    )
}

/// Builds the starting chain described by `config.chain.initial`.
pub fn initial_state(config: &RunConfig, seed: u64) -> Result<SpinConfig1D, IsingError> {
    let mut chain = SpinConfig1D::new(config.chain.sites, config.chain.pbc)?;
    match config.chain.initial {
        InitialState::AllDown => {}
        InitialState::Magnetization { up } => {
            let mut rng = RngHandle::from_seed(determinism::init_seed(seed));
            chain.initialize_with_magnetization(up, &mut rng)?;
        }
        InitialState::Encoded { value } => chain.set_from_integer(value)?,
    }
    Ok(chain)
}

fn run_from(config: &RunConfig, seed: u64, mut state: RunState) -> Result<RunSummary, IsingError> {
    let ham = config.build_hamiltonian();
    ham.check_compatible(&state.chain)?;
    let mut checkpoints = std::mem::take(&mut state.checkpoints);

    for sweep in state.next_sweep..config.sweeps {
        let mut rng = determinism::sweep_rng(seed, sweep);
        let stats = metropolis_sweep(&mut state.chain, &ham, config.temperature, &mut rng)?;
        state.accepted += stats.accepted;
        state.proposed += stats.proposed;
        state.next_sweep = sweep + 1;
        debug!(sweep, accepted = stats.accepted, "sweep complete");

        if sweep >= config.burn_in && (sweep - config.burn_in) % config.thinning == 0 {
            state.recorder.push_sample(MetricSample {
                sweep,
                energy: ham.energy(&state.chain)?,
                magnetization: state.chain.magnetization(),
                accepted: stats.accepted,
                proposed: stats.proposed,
            });
        }

        if config.checkpoint.interval > 0 && state.next_sweep % config.checkpoint.interval == 0 {
            if let Some(path) = write_checkpoint(config, seed, &state)? {
                checkpoints.push(path);
                enforce_checkpoint_retention(&mut checkpoints, config.checkpoint.max_to_keep)?;
            }
        }
    }

    let final_energy = ham.energy(&state.chain)?;
    let estimates = state.recorder.estimates(config.temperature);
    let acceptance_rate = if state.proposed == 0 {
        0.0
    } else {
        state.accepted as f64 / state.proposed as f64
    };

    let metrics_path = match &config.output.run_directory {
        Some(run_dir) => {
            let path = run_dir.join(&config.output.metrics_file);
            std::fs::create_dir_all(run_dir)
                .map_err(|err| IsingError::serde("run-dir-create", err, run_dir))?;
            state
                .recorder
                .write_csv(&path)
                .map_err(|err| IsingError::serde("metrics-write", err, &path))?;
            Some(path)
        }
        None => None,
    };

    let manifest_path = match &config.output.run_directory {
        Some(run_dir) => {
            let path = run_dir.join(&config.output.manifest_file);
            let manifest = RunManifest {
                config: config.clone(),
                master_seed: seed,
                seed_label: config.seed_policy.label.clone(),
                final_state: state.chain.clone(),
                final_energy,
                estimates,
                metrics_file: relative_to(metrics_path.as_deref(), run_dir),
                checkpoints: checkpoints
                    .iter()
                    .filter_map(|path| relative_to(Some(path.as_path()), run_dir))
                    .collect(),
            };
            manifest.write(&path)?;
            Some(path)
        }
        None => None,
    };

    info!(
        sweeps = config.sweeps,
        acceptance_rate,
        final_energy,
        "run complete"
    );

    Ok(RunSummary {
        sweeps: config.sweeps,
        acceptance_rate,
        final_magnetization: state.chain.magnetization(),
        final_state: state.chain,
        final_energy,
        estimates,
        samples: state.recorder.samples().to_vec(),
        metrics_path,
        manifest_path,
        checkpoints,
    })
}

fn write_checkpoint(
    config: &RunConfig,
    seed: u64,
    state: &RunState,
) -> Result<Option<PathBuf>, IsingError> {
    let Some(dir) = checkpoint_dir(&config.output) else {
        return Ok(None);
    };
    let path = checkpoint::checkpoint_path(&dir, state.next_sweep);
    let payload = CheckpointPayload {
        sweep: state.next_sweep,
        config: config.clone(),
        master_seed: seed,
        state: state.chain.clone(),
        samples: state.recorder.samples().to_vec(),
        accepted: state.accepted,
        proposed: state.proposed,
    };
    payload.store(&path)?;
    debug!(path = %path.display(), "checkpoint written");
    Ok(Some(path))
}

fn checkpoint_dir(output: &OutputConfig) -> Option<PathBuf> {
    output
        .run_directory
        .as_ref()
        .map(|run_dir| run_dir.join(&output.checkpoint_dir))
}

fn enforce_checkpoint_retention(
    paths: &mut Vec<PathBuf>,
    max_to_keep: usize,
) -> Result<(), IsingError> {
    while paths.len() > max_to_keep {
        let path = paths.remove(0);
        std::fs::remove_file(&path)
            .map_err(|err| IsingError::serde("checkpoint-remove", err, &path))?;
    }
    Ok(())
}

fn relative_to(path: Option<&Path>, root: &Path) -> Option<PathBuf> {
    path.and_then(|path| path.strip_prefix(root).ok())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_energy_moves_are_always_accepted() {
        let ham = IsingHamiltonian1D::uniform(0.0, 0.0, 0.0, true);
        let mut chain = SpinConfig1D::new(8, true).unwrap();
        let mut rng = RngHandle::from_seed(3);
        let stats = metropolis_sweep(&mut chain, &ham, 0.01, &mut rng).unwrap();
        assert_eq!(stats, SweepStats { proposed: 8, accepted: 8 });
        assert_eq!(chain.count_up(), 8);
    }

    #[test]
    fn invalid_temperature_leaves_chain_untouched() {
        let ham = IsingHamiltonian1D::uniform(0.0, 0.0, 0.0, true);
        let mut chain = SpinConfig1D::new(4, true).unwrap();
        let mut rng = RngHandle::from_seed(3);
        for t in [0.0, -0.5] {
            assert!(matches!(
                metropolis_sweep(&mut chain, &ham, t, &mut rng),
                Err(IsingError::InvalidTemperature(_))
            ));
        }
        assert_eq!(chain.count_up(), 0);
    }

    #[test]
    fn boundary_mismatch_is_rejected() {
        let ham = IsingHamiltonian1D::uniform(1.0, 1.0, 1.0, false);
        let mut chain = SpinConfig1D::new(4, true).unwrap();
        let err = metropolis_sweep(&mut chain, &ham, 1.0, &mut RngHandle::from_seed(0))
            .unwrap_err();
        assert_eq!(err.info().code, "boundary-mismatch");
    }

    #[test]
    fn initial_state_follows_config() {
        let mut config = RunConfig::default();
        config.chain.initial = InitialState::Encoded { value: 44 };
        assert_eq!(initial_state(&config, 1).unwrap().to_string(), "0000101100");

        config.chain.initial = InitialState::Magnetization { up: 4 };
        let a = initial_state(&config, 11).unwrap();
        assert_eq!(a.count_up(), 4);
        assert_eq!(a, initial_state(&config, 11).unwrap());

        config.chain.initial = InitialState::Encoded { value: 1 << 10 };
        assert!(matches!(
            initial_state(&config, 1),
            Err(IsingError::EncodingRange(_))
        ));
    }
}

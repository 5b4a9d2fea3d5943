#![deny(missing_docs)]

//! Exact enumeration and Metropolis sampling for the 1D Ising chain.

/// Checkpoint serialization helpers and payload structures.
pub mod checkpoint;
/// YAML configuration schema and defaults.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Exact thermal averages by full enumeration of the state space.
pub mod exact;
/// Metropolis sweep and the public `run`/`resume` entry points.
pub mod kernel;
/// Run manifest serialization helpers.
pub mod manifest;
/// Per-sweep samples and sample-based estimates.
pub mod metrics;

pub use config::{
    ChainConfig, CheckpointConfig, HamiltonianConfig, InitialState, OutputConfig, RunConfig,
    SeedPolicy,
};
pub use exact::{
    compute_average_values, compute_average_values_with, scan_temperatures, ExactOptions,
    ThermalAverages,
};
pub use kernel::{initial_state, metropolis_sweep, resume, run, RunSummary, SweepStats};
pub use metrics::{MetricSample, MetricsRecorder, SampleEstimates};

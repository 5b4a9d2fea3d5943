use std::fs;
use std::path::{Path, PathBuf};

use ising_core::errors::ErrorInfo;
use ising_core::{check_temperature, Field, IsingError, IsingHamiltonian1D};
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters governing a sampler run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Chain geometry and starting state.
    #[serde(default)]
    pub chain: ChainConfig,
    /// Physical parameters of the Hamiltonian.
    #[serde(default)]
    pub hamiltonian: HamiltonianConfig,
    /// Sampling temperature (same units as energy).
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Total number of sweeps, burn-in included.
    #[serde(default = "default_sweeps")]
    pub sweeps: usize,
    /// Number of initial sweeps excluded from the recorded samples.
    #[serde(default)]
    pub burn_in: usize,
    /// Interval, in sweeps, between recorded samples.
    #[serde(default = "default_thinning")]
    pub thinning: usize,
    /// Checkpointing behaviour.
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
    /// Master seed and substream policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Output directory configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_temperature() -> f64 {
    1.0
}

fn default_sweeps() -> usize {
    100
}

fn default_thinning() -> usize {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            hamiltonian: HamiltonianConfig::default(),
            temperature: default_temperature(),
            sweeps: default_sweeps(),
            burn_in: 0,
            thinning: default_thinning(),
            checkpoint: CheckpointConfig::default(),
            seed_policy: SeedPolicy::default(),
            output: OutputConfig::default(),
        }
    }
}

impl RunConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, IsingError> {
        serde_yaml::from_str(text)
            .map_err(|err| IsingError::Serde(ErrorInfo::new("config-parse", err.to_string())))
    }

    /// Loads a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, IsingError> {
        let text =
            fs::read_to_string(path).map_err(|err| IsingError::serde("config-read", err, path))?;
        serde_yaml::from_str(&text).map_err(|err| IsingError::serde("config-parse", err, path))
    }

    /// Checks run-level parameters that the core types do not cover.
    pub fn validate(&self) -> Result<(), IsingError> {
        check_temperature(self.temperature)?;
        if self.thinning == 0 {
            return Err(IsingError::Model(
                ErrorInfo::new("thinning-zero", "thinning interval must be at least 1")
                    .with_hint("use thinning: 1 to record every sweep"),
            ));
        }
        if self.burn_in > self.sweeps {
            return Err(IsingError::Model(
                ErrorInfo::new("burn-in-exceeds-sweeps", "burn-in longer than the run")
                    .with_context("burn_in", self.burn_in)
                    .with_context("sweeps", self.sweeps),
            ));
        }
        self.build_hamiltonian()
            .check_sites(self.chain.sites, self.chain.pbc)
    }

    /// Builds the Hamiltonian described by this configuration.
    pub fn build_hamiltonian(&self) -> IsingHamiltonian1D {
        IsingHamiltonian1D::new(
            self.hamiltonian.coupling,
            self.hamiltonian.field.clone(),
            self.hamiltonian.mu,
            self.chain.pbc,
        )
    }
}

/// Chain geometry and initial state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Number of sites.
    #[serde(default = "default_sites")]
    pub sites: usize,
    /// Periodic boundary conditions.
    #[serde(default = "default_pbc")]
    pub pbc: bool,
    /// Starting configuration.
    #[serde(default)]
    pub initial: InitialState,
}

fn default_sites() -> usize {
    10
}

fn default_pbc() -> bool {
    true
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            sites: default_sites(),
            pbc: default_pbc(),
            initial: InitialState::default(),
        }
    }
}

/// Supported starting configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InitialState {
    /// Every spin down.
    #[default]
    AllDown,
    /// Exactly `up` spins up at uniformly random sites.
    Magnetization {
        /// Number of up spins.
        up: usize,
    },
    /// Binary encoding, most significant bit on site 0.
    Encoded {
        /// Integer encoding of the chain.
        value: u64,
    },
}

/// Physical parameters of the Hamiltonian.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HamiltonianConfig {
    /// Nearest-neighbour coupling `J`.
    #[serde(default = "default_coupling")]
    pub coupling: f64,
    /// Scalar or per-site field `h`.
    #[serde(default)]
    pub field: Field,
    /// Field coupling scale.
    #[serde(default = "default_mu")]
    pub mu: f64,
}

fn default_coupling() -> f64 {
    1.0
}

fn default_mu() -> f64 {
    1.0
}

impl Default for HamiltonianConfig {
    fn default() -> Self {
        Self {
            coupling: default_coupling(),
            field: Field::default(),
            mu: default_mu(),
        }
    }
}

/// Checkpointing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Interval in sweeps between checkpoint writes (0 disables checkpoints).
    #[serde(default)]
    pub interval: usize,
    /// Maximum number of checkpoints to retain.
    #[serde(default = "default_checkpoint_retention")]
    pub max_to_keep: usize,
}

fn default_checkpoint_retention() -> usize {
    4
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            interval: 0,
            max_to_keep: default_checkpoint_retention(),
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed used for the run.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in manifests.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x05EE_D5EE_DD15_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// Output directory layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for run artefacts. Nothing is written when unset.
    #[serde(default)]
    pub run_directory: Option<PathBuf>,
    /// Metrics filename relative to `run_directory`.
    #[serde(default = "default_metrics_filename")]
    pub metrics_file: PathBuf,
    /// Manifest filename relative to `run_directory`.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
    /// Subdirectory used for checkpoint files.
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,
}

fn default_metrics_filename() -> PathBuf {
    PathBuf::from("metrics.csv")
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("checkpoints")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            run_directory: None,
            metrics_file: default_metrics_filename(),
            manifest_file: default_manifest_filename(),
            checkpoint_dir: default_checkpoint_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_fills_defaults() {
        let config = RunConfig::from_yaml_str(
            "chain:\n  sites: 6\n  initial:\n    type: encoded\n    value: 44\nhamiltonian:\n  coupling: -1.0\n  field: [1, 1, 1, 1, 1, 0.5]\n  mu: 0.1\ntemperature: 0.9\n",
        )
        .unwrap();
        assert_eq!(config.chain.sites, 6);
        assert!(config.chain.pbc);
        assert_eq!(config.chain.initial, InitialState::Encoded { value: 44 });
        assert_eq!(
            config.hamiltonian.field,
            Field::Sites(vec![1.0, 1.0, 1.0, 1.0, 1.0, 0.5])
        );
        assert_eq!(config.sweeps, 100);
        assert_eq!(config.thinning, 1);
        assert!(config.output.run_directory.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn scalar_field_and_magnetization_start() {
        let config = RunConfig::from_yaml_str(
            "chain:\n  initial:\n    type: magnetization\n    up: 3\nhamiltonian:\n  field: -1.0\n",
        )
        .unwrap();
        assert_eq!(config.chain.initial, InitialState::Magnetization { up: 3 });
        assert_eq!(config.hamiltonian.field, Field::Uniform(-1.0));
    }

    #[test]
    fn validation_catches_bad_runs() {
        let mut config = RunConfig::default();
        config.temperature = 0.0;
        assert!(matches!(
            config.validate(),
            Err(IsingError::InvalidTemperature(_))
        ));

        let mut config = RunConfig::default();
        config.thinning = 0;
        assert_eq!(config.validate().unwrap_err().info().code, "thinning-zero");

        let mut config = RunConfig::default();
        config.hamiltonian.field = Field::Sites(vec![1.0; 3]);
        assert_eq!(config.validate().unwrap_err().info().code, "field-length");

        let mut config = RunConfig::default();
        config.burn_in = config.sweeps + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_yaml_is_a_serde_error() {
        let err = RunConfig::from_yaml_str("temperature: [").unwrap_err();
        assert!(matches!(err, IsingError::Serde(_)));
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use ising_core::{IsingError, SpinConfig1D};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::metrics::SampleEstimates;

/// Structured manifest describing a completed sampler run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Configuration used for the run.
    pub config: RunConfig,
    /// Master seed used to derive the sweep substreams.
    pub master_seed: u64,
    /// Optional seed label captured from the configuration.
    pub seed_label: Option<String>,
    /// Chain state after the last sweep.
    pub final_state: SpinConfig1D,
    /// Energy of the final state.
    pub final_energy: f64,
    /// Estimates built from the recorded samples.
    pub estimates: SampleEstimates,
    /// Metrics file produced during the run (relative to run directory).
    pub metrics_file: Option<PathBuf>,
    /// Checkpoint files retained at the end of the run (oldest first).
    pub checkpoints: Vec<PathBuf>,
}

impl RunManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), IsingError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| IsingError::serde("manifest-mkdir", err, parent))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| IsingError::serde("manifest-serialize", err, path))?;
        fs::write(path, json).map_err(|err| IsingError::serde("manifest-write", err, path))
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, IsingError> {
        let contents =
            fs::read_to_string(path).map_err(|err| IsingError::serde("manifest-read", err, path))?;
        serde_json::from_str(&contents)
            .map_err(|err| IsingError::serde("manifest-parse", err, path))
    }
}

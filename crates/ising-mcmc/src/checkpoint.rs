use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ising_core::{IsingError, SpinConfig1D};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::metrics::MetricSample;

/// Everything needed to continue a run exactly where it stopped.
///
/// Sweep RNGs are derived from `(master_seed, sweep)`, so no generator state
/// has to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointPayload {
    /// Index of the next sweep to execute.
    pub sweep: usize,
    /// Configuration snapshot associated with the run.
    pub config: RunConfig,
    /// Master seed of the run.
    pub master_seed: u64,
    /// Chain state after sweep `sweep - 1`.
    pub state: SpinConfig1D,
    /// Samples recorded so far.
    pub samples: Vec<MetricSample>,
    /// Flips accepted so far.
    pub accepted: usize,
    /// Flips proposed so far.
    pub proposed: usize,
}

impl CheckpointPayload {
    /// Restores the payload from disk.
    pub fn load(path: &Path) -> Result<Self, IsingError> {
        let contents = fs::read_to_string(path)
            .map_err(|err| IsingError::serde("checkpoint-read", err, path))?;
        serde_json::from_str(&contents)
            .map_err(|err| IsingError::serde("checkpoint-parse", err, path))
    }

    /// Writes the payload to disk.
    pub fn store(&self, path: &Path) -> Result<(), IsingError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| IsingError::serde("checkpoint-mkdir", err, parent))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| IsingError::serde("checkpoint-serialize", err, path))?;
        fs::write(path, json).map_err(|err| IsingError::serde("checkpoint-write", err, path))
    }
}

/// Determines the checkpoint file path using a deterministic numbering scheme.
pub fn checkpoint_path(root: &Path, sweep: usize) -> PathBuf {
    root.join(format!("ckpt_{sweep:05}.json"))
}

/// Checkpoint files already in `root` for sweeps up to and including `sweep`,
/// oldest first. A missing directory yields an empty list.
pub fn existing_checkpoints(root: &Path, sweep: usize) -> Result<Vec<PathBuf>, IsingError> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(IsingError::serde("checkpoint-scan", err, root)),
    };
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| IsingError::serde("checkpoint-scan", err, root))?;
        let Some(index) = entry.file_name().to_str().and_then(checkpoint_sweep) else {
            continue;
        };
        if index <= sweep {
            found.push((index, entry.path()));
        }
    }
    found.sort();
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

fn checkpoint_sweep(name: &str) -> Option<usize> {
    name.strip_prefix("ckpt_")?.strip_suffix(".json")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_index_is_parsed_from_file_names() {
        assert_eq!(checkpoint_sweep("ckpt_00015.json"), Some(15));
        assert_eq!(checkpoint_sweep("ckpt_123456.json"), Some(123456));
        assert_eq!(checkpoint_sweep("ckpt_00015.json.tmp"), None);
        assert_eq!(checkpoint_sweep("metrics.csv"), None);
    }

    #[test]
    fn missing_directory_has_no_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let listed = existing_checkpoints(&dir.path().join("absent"), 10).unwrap();
        assert!(listed.is_empty());
    }
}

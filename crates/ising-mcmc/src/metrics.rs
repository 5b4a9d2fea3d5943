use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Observables recorded after a sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricSample {
    /// Zero-based sweep index (burn-in included).
    pub sweep: usize,
    /// Energy of the chain after the sweep.
    pub energy: f64,
    /// Magnetization `#up - #down` after the sweep.
    pub magnetization: i64,
    /// Flips accepted during the sweep.
    pub accepted: usize,
    /// Flips proposed during the sweep.
    pub proposed: usize,
}

/// Sample-based estimates of the thermal averages.
///
/// Same formulas as the exact averager, with Boltzmann weights replaced by the
/// empirical distribution of the recorded samples.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SampleEstimates {
    /// Number of samples the estimates are built from.
    pub samples: usize,
    /// Mean energy.
    pub energy: f64,
    /// Mean magnetization.
    pub magnetization: f64,
    /// Energy variance over `T^2`.
    pub heat_capacity: f64,
    /// Magnetization variance over `T`.
    pub susceptibility: f64,
}

impl SampleEstimates {
    /// Estimates for an empty sample set.
    pub fn empty() -> Self {
        Self {
            samples: 0,
            energy: 0.0,
            magnetization: 0.0,
            heat_capacity: 0.0,
            susceptibility: 0.0,
        }
    }
}

/// Collects per-sweep samples and derives estimates from them.
#[derive(Debug, Default, Clone)]
pub struct MetricsRecorder {
    samples: Vec<MetricSample>,
}

impl MetricsRecorder {
    /// Creates a new recorder instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a recorder from previously recorded samples.
    pub fn from_samples(samples: Vec<MetricSample>) -> Self {
        Self { samples }
    }

    /// Records a sample.
    pub fn push_sample(&mut self, sample: MetricSample) {
        self.samples.push(sample);
    }

    /// Returns an immutable view over the recorded samples.
    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    /// Computes estimates at `temperature` from the recorded samples.
    pub fn estimates(&self, temperature: f64) -> SampleEstimates {
        if self.samples.is_empty() {
            return SampleEstimates::empty();
        }
        let count = self.samples.len() as f64;
        let (mut e, mut e2, mut m, mut m2) = (0.0, 0.0, 0.0, 0.0);
        for sample in &self.samples {
            let mag = sample.magnetization as f64;
            e += sample.energy;
            e2 += sample.energy * sample.energy;
            m += mag;
            m2 += mag * mag;
        }
        let (e, e2, m, m2) = (e / count, e2 / count, m / count, m2 / count);
        SampleEstimates {
            samples: self.samples.len(),
            energy: e,
            magnetization: m,
            heat_capacity: (e2 - e * e).max(0.0) / (temperature * temperature),
            susceptibility: (m2 - m * m).max(0.0) / temperature,
        }
    }

    /// Writes the recorded samples to a CSV file.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        writeln!(file, "sweep,energy,magnetization,accepted,proposed")?;
        for sample in &self.samples {
            writeln!(
                file,
                "{},{:.6},{},{},{}",
                sample.sweep, sample.energy, sample.magnetization, sample.accepted, sample.proposed
            )?;
        }
        file.flush()
    }
}

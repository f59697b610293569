//! Local shot-based execution collaborator
//!
//! Runs calibration circuits without hardware: the prepared basis state is
//! deterministic, so the ideal distribution is a delta, optionally pushed
//! through a readout noise channel and then sampled. With no noise attached
//! and exact sampling, executing the calibration set reproduces the identity
//! confusion matrix.

use crate::circuit::{CalibrationCircuit, CircuitExecutor};
use crate::error::{MitigationError, Result};
use crate::noise::{exact_counts, ReadoutNoise, ShotSampler};
use ndarray::Array1;
use std::collections::HashMap;

/// Shot-based simulator for calibration circuits
#[derive(Debug)]
pub struct Simulator {
    noise: Option<ReadoutNoise>,
    sampler: Option<ShotSampler>,
}

impl Simulator {
    /// Noiseless simulator with exact (deterministic) shot counts
    pub fn new() -> Self {
        Self {
            noise: None,
            sampler: None,
        }
    }

    /// Attach a readout noise channel
    pub fn with_noise(mut self, noise: ReadoutNoise) -> Self {
        self.noise = Some(noise);
        self
    }

    /// Switch from exact counts to multinomial sampling
    pub fn with_sampling(mut self, seed: Option<u64>) -> Self {
        self.sampler = Some(ShotSampler::new(seed));
        self
    }

    pub fn noise(&self) -> Option<&ReadoutNoise> {
        self.noise.as_ref()
    }

    /// Outcome distribution a circuit produces under the attached noise
    fn distribution(&self, circuit: &CalibrationCircuit) -> Result<Array1<f64>> {
        let dim = 1 << circuit.n_qubits();
        let mut probs = Array1::<f64>::zeros(dim);
        probs[circuit.basis_index()] = 1.0;

        match &self.noise {
            None => Ok(probs),
            Some(noise) => {
                if noise.n_qubits() != circuit.n_qubits() {
                    return Err(MitigationError::DimensionMismatch {
                        expected: circuit.n_qubits(),
                        found: noise.n_qubits(),
                    });
                }
                Ok(noise.apply(&probs))
            }
        }
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitExecutor for Simulator {
    fn execute(
        &mut self,
        circuits: &[CalibrationCircuit],
        shots: u64,
    ) -> Result<Vec<HashMap<String, u64>>> {
        let mut results = Vec::with_capacity(circuits.len());

        for circuit in circuits {
            let probs = self.distribution(circuit)?;
            let counts = match &mut self.sampler {
                Some(sampler) => sampler.sample_counts(&probs, shots, circuit.n_qubits()),
                None => exact_counts(&probs, shots, circuit.n_qubits()),
            };
            results.push(counts);
        }

        Ok(results)
    }
}

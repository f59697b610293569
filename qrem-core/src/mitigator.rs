//! Measurement error mitigation engine
//!
//! Holds the confusion matrix as explicit engine state: absent until a
//! calibration run stores it, overwritten when calibration is rerun (e.g.
//! after a backend or noise-model change). Corrections before the first
//! calibration fail.
//!
//! Rebuilding the matrix takes `&mut self` and correction takes `&self`,
//! so shared use across threads gets the exclusive-rebuild / concurrent-read
//! discipline from the borrow checker; wrap the engine in an `RwLock` to
//! share it between callers.

use crate::bitstring::{counts_to_vector, dimension, vector_to_counts};
use crate::circuit::{calibration_circuits, CircuitExecutor};
use crate::confusion::{ConfusionMatrix, SolverPath};
use crate::error::{MitigationError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Configuration
// =============================================================================

/// What to do with the shot total after clamping negative entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Renormalization {
    /// Rescale the clamped vector so corrected counts sum back to the
    /// original shot total
    ShotTotal,

    /// Keep the clamped vector as the solver produced it
    Disabled,
}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitigatorConfig {
    /// Renormalization policy applied after the physicality clamp
    pub renormalization: Renormalization,
}

impl Default for MitigatorConfig {
    fn default() -> Self {
        Self {
            renormalization: Renormalization::ShotTotal,
        }
    }
}

impl MitigatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_renormalization(mut self, policy: Renormalization) -> Self {
        self.renormalization = policy;
        self
    }
}

// =============================================================================
// Corrected Result
// =============================================================================

/// Outcome of one correction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MitigatedCounts {
    /// Corrected outcome counts (bit-label -> count, zero entries omitted)
    pub counts: HashMap<String, u64>,

    /// Which solve path produced the correction
    pub solver: SolverPath,

    /// Total probability mass that was negative before clamping
    pub negative_mass: f64,

    /// Shot total of the noisy input, preserved through the correction
    pub shot_total: f64,

    /// Corrected distribution after clamping and renormalization
    pub probabilities: Array1<f64>,
}

impl MitigatedCounts {
    /// Corrected probability of a basis state
    pub fn probability(&self, basis_index: usize) -> f64 {
        self.probabilities.get(basis_index).copied().unwrap_or(0.0)
    }

    /// Most probable basis state after correction
    pub fn most_likely_state(&self) -> (usize, f64) {
        self.probabilities
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, &p)| (i, p))
            .unwrap_or((0, 0.0))
    }

    /// Whether the linear inversion produced non-trivial negative entries
    pub fn has_significant_negatives(&self) -> bool {
        self.negative_mass > 0.01
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Stateful mitigation engine for a fixed qubit count
#[derive(Debug, Clone)]
pub struct MeasurementMitigator {
    n_qubits: usize,
    config: MitigatorConfig,
    matrix: Option<ConfusionMatrix>,
}

impl MeasurementMitigator {
    /// Create an uncalibrated engine
    pub fn new(n_qubits: usize) -> Result<Self> {
        Self::with_config(n_qubits, MitigatorConfig::default())
    }

    pub fn with_config(n_qubits: usize, config: MitigatorConfig) -> Result<Self> {
        if n_qubits == 0 {
            return Err(MitigationError::InvalidQubitCount(n_qubits));
        }
        Ok(Self {
            n_qubits,
            config,
            matrix: None,
        })
    }

    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    pub fn config(&self) -> &MitigatorConfig {
        &self.config
    }

    /// Whether a confusion matrix has been stored
    pub fn is_calibrated(&self) -> bool {
        self.matrix.is_some()
    }

    pub fn matrix(&self) -> Option<&ConfusionMatrix> {
        self.matrix.as_ref()
    }

    /// Build and store the confusion matrix from calibration counts,
    /// discarding any previously stored matrix.
    pub fn calibrate(&mut self, calibration_results: &[HashMap<String, u64>]) -> Result<()> {
        let matrix = ConfusionMatrix::from_counts(calibration_results, self.n_qubits)?;
        self.matrix = Some(matrix);
        Ok(())
    }

    /// Run the full calibration set through an execution collaborator and
    /// store the resulting matrix.
    pub fn run_calibration(
        &mut self,
        executor: &mut dyn CircuitExecutor,
        shots: u64,
    ) -> Result<()> {
        let circuits = calibration_circuits(self.n_qubits)?;
        let results = executor.execute(&circuits, shots)?;
        self.calibrate(&results)
    }

    /// Install a caller-built matrix (e.g. deserialized from a prior run)
    pub fn set_matrix(&mut self, matrix: ConfusionMatrix) -> Result<()> {
        if matrix.n_qubits() != self.n_qubits {
            return Err(MitigationError::DimensionMismatch {
                expected: self.n_qubits,
                found: matrix.n_qubits(),
            });
        }
        self.matrix = Some(matrix);
        Ok(())
    }

    /// Correct a noisy outcome-count mapping.
    ///
    /// Solves M x = v on the raw-count vector, clamps unphysical negative
    /// entries to zero, applies the configured renormalization policy, and
    /// converts back to counts at the input's shot total. The stored matrix
    /// is never mutated, so repeated calls on the same input are idempotent.
    pub fn mitigate(&self, noisy_counts: &HashMap<String, u64>) -> Result<MitigatedCounts> {
        let matrix = self
            .matrix
            .as_ref()
            .ok_or(MitigationError::MatrixNotInitialized)?;

        let noisy = counts_to_vector(noisy_counts, self.n_qubits)?;
        let shot_total = noisy.sum();

        let (raw, solver) = matrix.solve(&noisy)?;

        let negative: f64 = raw.iter().filter(|&&x| x < 0.0).map(|x| x.abs()).sum();
        let negative_mass = if shot_total > 0.0 {
            negative / shot_total
        } else {
            0.0
        };

        let mut corrected = raw.mapv(|x| x.max(0.0));

        if self.config.renormalization == Renormalization::ShotTotal {
            let clamped_total = corrected.sum();
            if clamped_total > 0.0 {
                corrected *= shot_total / clamped_total;
            }
        }

        let counts = vector_to_counts(&corrected, self.n_qubits);
        let probabilities = if shot_total > 0.0 {
            &corrected / shot_total
        } else {
            Array1::zeros(dimension(self.n_qubits))
        };

        Ok(MitigatedCounts {
            counts,
            solver,
            negative_mass,
            shot_total,
            probabilities,
        })
    }
}

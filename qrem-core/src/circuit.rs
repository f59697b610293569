//! Calibration circuit construction
//!
//! One circuit per computational basis state: X gates flip the qubits
//! matching the set bits of the basis index, then every qubit is measured.
//! No entangling gates are used, so each qubit is prepared independently;
//! any cross-qubit correlated readout error ends up bundled into the full
//! confusion matrix rather than a tensor-product factorization.

use crate::bitstring::dimension;
use crate::error::{MitigationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A basis-state preparation circuit followed by full measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationCircuit {
    /// Number of qubits
    n_qubits: usize,

    /// Basis state this circuit prepares
    basis_index: usize,

    /// Qubits receiving an X gate (set bits of `basis_index`, qubit 0 = LSB)
    x_gates: Vec<usize>,
}

impl CalibrationCircuit {
    /// Build the preparation circuit for one basis state
    pub fn new(n_qubits: usize, basis_index: usize) -> Result<Self> {
        if n_qubits == 0 {
            return Err(MitigationError::InvalidQubitCount(n_qubits));
        }
        let dim = dimension(n_qubits);
        if basis_index >= dim {
            return Err(MitigationError::IndexOutOfRange {
                index: basis_index,
                dim,
            });
        }

        let x_gates = (0..n_qubits)
            .filter(|&k| (basis_index >> k) & 1 == 1)
            .collect();

        Ok(Self {
            n_qubits,
            basis_index,
            x_gates,
        })
    }

    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Basis state this circuit deterministically prepares
    pub fn basis_index(&self) -> usize {
        self.basis_index
    }

    /// Qubits flipped by the preparation, in ascending order
    pub fn x_gates(&self) -> &[usize] {
        &self.x_gates
    }

    /// Bit-label of the prepared state
    pub fn prepared_label(&self) -> String {
        format!("{:0width$b}", self.basis_index, width = self.n_qubits)
    }
}

/// Build the ordered calibration set: exactly 2^n circuits, circuit j
/// preparing basis state j.
///
/// The set is deterministic for a given qubit count and is reusable
/// across repeated calibration runs.
pub fn calibration_circuits(n_qubits: usize) -> Result<Vec<CalibrationCircuit>> {
    if n_qubits == 0 {
        return Err(MitigationError::InvalidQubitCount(n_qubits));
    }

    (0..dimension(n_qubits))
        .map(|j| CalibrationCircuit::new(n_qubits, j))
        .collect()
}

/// Execution collaborator contract
///
/// Given an ordered circuit set and a shot count, return one outcome-count
/// mapping per circuit, in the same order, with counts summing to the shot
/// count (modulo backend-specific discard). How the collaborator batches or
/// parallelizes the circuits internally is its own business; the engine
/// treats the whole exchange as a single blocking call.
pub trait CircuitExecutor {
    fn execute(
        &mut self,
        circuits: &[CalibrationCircuit],
        shots: u64,
    ) -> Result<Vec<HashMap<String, u64>>>;
}

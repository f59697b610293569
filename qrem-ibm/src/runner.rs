//! Hardware execution of calibration circuit sets
//!
//! Bridges the engine's executor contract to IBM Quantum jobs: each
//! calibration circuit is rendered to QASM, submitted as its own job, and
//! polled to completion; the per-circuit counts come back in basis-index
//! order, ready for confusion-matrix assembly.

use crate::backend::IBMBackend;
use crate::error::{IBMError, Result};
use crate::jobs::JobManager;
use crate::qasm;
use qrem_core::{CalibrationCircuit, CircuitExecutor, MeasurementMitigator};
use std::collections::HashMap;

/// Executes circuit sets on a selected IBM backend
pub struct QuantumRunner {
    backend: IBMBackend,

    /// Per-job completion timeout in seconds (None: crate default)
    timeout_secs: Option<u64>,
}

impl QuantumRunner {
    /// Wrap a backend handle; select a device on it first
    pub fn new(backend: IBMBackend) -> Self {
        Self {
            backend,
            timeout_secs: None,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn backend(&self) -> &IBMBackend {
        &self.backend
    }

    /// Execute an ordered circuit set, one job per circuit.
    ///
    /// Returns one count mapping per circuit, in input order. Jobs run
    /// sequentially; queue time dominates, and submission order keeps the
    /// result ordering trivially correct.
    pub async fn execute_circuits(
        &self,
        circuits: &[CalibrationCircuit],
        shots: u64,
    ) -> Result<Vec<HashMap<String, u64>>> {
        let info = self
            .backend
            .backend_info()
            .ok_or_else(|| IBMError::Other("No backend selected".into()))?;

        if let Some(circuit) = circuits.iter().find(|c| c.n_qubits() > info.n_qubits) {
            return Err(IBMError::QubitCountMismatch {
                circuit: circuit.n_qubits(),
                backend: info.n_qubits,
            });
        }

        let mut results = Vec::with_capacity(circuits.len());
        for circuit in circuits {
            let program = qasm::render(circuit);
            let result = JobManager::run(&self.backend, &program, shots, self.timeout_secs).await?;
            results.push(result.counts);
        }

        Ok(results)
    }

    /// Run the full calibration set on hardware and store the resulting
    /// confusion matrix in the mitigator.
    pub async fn calibrate(
        &self,
        mitigator: &mut MeasurementMitigator,
        shots: u64,
    ) -> qrem_core::Result<()> {
        let circuits = qrem_core::calibration_circuits(mitigator.n_qubits())?;
        let results = self.execute_circuits(&circuits, shots).await?;
        mitigator.calibrate(&results)
    }
}

/// Blocking adapter implementing the engine's executor contract.
///
/// The engine treats execution as a single blocking call; this owns a tokio
/// runtime and drives the async job pipeline to completion inside it.
pub struct BlockingRunner {
    runner: QuantumRunner,
    runtime: tokio::runtime::Runtime,
}

impl BlockingRunner {
    pub fn new(runner: QuantumRunner) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        Ok(Self { runner, runtime })
    }

    pub fn runner(&self) -> &QuantumRunner {
        &self.runner
    }
}

impl CircuitExecutor for BlockingRunner {
    fn execute(
        &mut self,
        circuits: &[CalibrationCircuit],
        shots: u64,
    ) -> qrem_core::Result<Vec<HashMap<String, u64>>> {
        self.runtime
            .block_on(self.runner.execute_circuits(circuits, shots))
            .map_err(Into::into)
    }
}

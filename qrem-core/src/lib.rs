//! # QREM-Core: Measurement Error Mitigation Engine
//!
//! Estimates and corrects readout error on multi-qubit devices:
//!
//! - **Calibration circuits**: prepare every computational basis state
//! - **Confusion matrix**: per-column measured-vs-prepared statistics
//! - **Correction**: linear solve with a least-squares fallback and a
//!   physicality clamp on the result
//!
//! ## Quick Start
//!
//! ```rust
//! use qrem_core::{MeasurementMitigator, ReadoutNoise, Simulator};
//!
//! let mut mitigator = MeasurementMitigator::new(2)?;
//!
//! // Calibrate against a noisy execution collaborator (here: the simulator)
//! let mut executor = Simulator::new().with_noise(ReadoutNoise::uniform(2, 0.02, 0.03));
//! mitigator.run_calibration(&mut executor, 8192)?;
//!
//! // Correct noisy counts from an arbitrary circuit
//! let mut noisy = std::collections::HashMap::new();
//! noisy.insert("00".to_string(), 480u64);
//! noisy.insert("11".to_string(), 520u64);
//! let corrected = mitigator.mitigate(&noisy)?;
//! # Ok::<(), qrem_core::MitigationError>(())
//! ```

pub mod bitstring;
pub mod circuit;
pub mod confusion;
pub mod error;
pub mod mitigator;
pub mod noise;
pub mod simulator;

// Re-exports
pub use bitstring::{counts_to_vector, dimension, index_to_label, label_to_index, vector_to_counts};
pub use circuit::{calibration_circuits, CalibrationCircuit, CircuitExecutor};
pub use confusion::{ConfusionMatrix, SolverPath};
pub use error::{MitigationError, Result};
pub use mitigator::{MeasurementMitigator, MitigatedCounts, MitigatorConfig, Renormalization};
pub use noise::{exact_counts, QubitReadoutRates, ReadoutNoise, ShotSampler};
pub use simulator::Simulator;

/// Default number of shots per calibration circuit
pub const DEFAULT_CALIBRATION_SHOTS: u64 = 8192;

/// Tolerance for checking that confusion matrix columns sum to 1
pub const COLUMN_SUM_TOLERANCE: f64 = 1e-6;

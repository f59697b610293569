//! Error types for the mitigation engine
//!
//! Three failure families, surfaced as distinct variants:
//! - Configuration errors (bad qubit count, dimension mismatch)
//! - Precondition errors (uncalibrated engine, empty calibration column)
//! - Numerical errors (degenerate confusion matrix)

use thiserror::Error;

/// Result type alias for mitigation operations
pub type Result<T> = std::result::Result<T, MitigationError>;

/// Error type for calibration and correction operations
#[derive(Error, Debug)]
pub enum MitigationError {
    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Qubit count must be at least 1
    #[error("Invalid qubit count: {0} (must be >= 1)")]
    InvalidQubitCount(usize),

    /// Basis index outside [0, 2^n)
    #[error("Basis index {index} out of range for dimension {dim}")]
    IndexOutOfRange { index: usize, dim: usize },

    /// Outcome label is not a binary string of the configured width
    #[error("Invalid bit label '{label}' for {n_qubits} qubits")]
    InvalidBitLabel { label: String, n_qubits: usize },

    /// Provided data implies a different qubit count than the engine's
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    // ==========================================================================
    // Precondition Errors
    // ==========================================================================
    /// Mitigation requested before any confusion matrix was built
    #[error("Mitigation matrix not initialized. Run calibration first.")]
    MatrixNotInitialized,

    /// Calibration result set does not cover every basis state
    #[error("Calibration result count mismatch: expected {expected} basis states, found {found}")]
    CalibrationSizeMismatch { expected: usize, found: usize },

    /// A calibration circuit recorded no shots at all
    #[error("No shots recorded for calibration basis state {basis_index}")]
    ZeroCalibrationShots { basis_index: usize },

    // ==========================================================================
    // Numerical Errors
    // ==========================================================================
    /// Confusion matrix is degenerate and no least-squares fallback is usable
    #[error("Confusion matrix is numerically singular: {0}")]
    SingularMatrix(String),

    // ==========================================================================
    // Execution Errors
    // ==========================================================================
    /// Failure reported by the circuit execution collaborator
    #[error("Circuit execution failed: {0}")]
    ExecutionFailed(String),
}

impl MitigationError {
    /// Check whether the error is a precondition failure (retriable after
    /// the caller fixes engine state, e.g. by running calibration)
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            MitigationError::MatrixNotInitialized
                | MitigationError::CalibrationSizeMismatch { .. }
                | MitigationError::ZeroCalibrationShots { .. }
        )
    }

    /// Check whether the error is numerical (retrying with more calibration
    /// shots is the usual remedy)
    pub fn is_numerical(&self) -> bool {
        matches!(self, MitigationError::SingularMatrix(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(MitigationError::MatrixNotInitialized.is_precondition());
        assert!(MitigationError::ZeroCalibrationShots { basis_index: 3 }.is_precondition());
        assert!(!MitigationError::InvalidQubitCount(0).is_precondition());

        assert!(MitigationError::SingularMatrix("all-zero".into()).is_numerical());
        assert!(!MitigationError::MatrixNotInitialized.is_numerical());
    }

    #[test]
    fn test_error_display() {
        let err = MitigationError::DimensionMismatch {
            expected: 2,
            found: 3,
        };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 2, found 3");

        let err = MitigationError::ZeroCalibrationShots { basis_index: 5 };
        assert_eq!(
            err.to_string(),
            "No shots recorded for calibration basis state 5"
        );
    }
}

//! # QREM-IBM: IBM Quantum Execution Backend
//!
//! Runs qrem calibration circuits on IBM Quantum hardware through the
//! Qiskit Runtime API.
//!
//! ## Features
//!
//! - **Credentials**: token loading from environment or config file
//! - **Backend Selection**: query devices, pick the least busy one
//! - **Job Management**: submit, poll, and retrieve outcome counts
//! - **QASM Rendering**: calibration circuits as OpenQASM 3.0
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use qrem_core::MeasurementMitigator;
//! use qrem_ibm::{CredentialsManager, IBMBackend, QuantumRunner};
//!
//! let credentials = CredentialsManager::load()?;
//! let mut backend = IBMBackend::new(credentials)?;
//! backend.select_least_busy(5).await?;
//!
//! let runner = QuantumRunner::new(backend);
//! let mut mitigator = MeasurementMitigator::new(5)?;
//! runner.calibrate(&mut mitigator, 8192).await?;
//! ```

pub mod backend;
pub mod credentials;
pub mod error;
pub mod jobs;
pub mod qasm;
pub mod runner;

// Re-exports
pub use backend::{BackendInfo, BackendStatus, IBMBackend};
pub use credentials::{Credentials, CredentialsManager};
pub use error::{IBMError, Result};
pub use jobs::{Job, JobManager, JobResult, JobStatus};
pub use runner::{BlockingRunner, QuantumRunner};

/// IBM Quantum API base URL
pub const IBM_QUANTUM_API_URL: &str = "https://api.quantum.ibm.com";

/// Default number of shots
pub const DEFAULT_SHOTS: u64 = 8192;

/// Maximum wait time for job completion (seconds)
pub const MAX_WAIT_TIME: u64 = 3600;

/// Poll interval for job status (seconds)
pub const POLL_INTERVAL: u64 = 5;

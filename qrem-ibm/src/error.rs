//! Error types for IBM Quantum execution
//!
//! Covers the failure families of the remote collaborator:
//! - Credential errors (missing, malformed, expired tokens)
//! - Network errors (connection, timeout, rate limiting)
//! - API errors (bad responses, unknown backends)
//! - Job errors (submission, execution, cancellation)

use thiserror::Error;

/// Result type alias for IBM Quantum operations
pub type Result<T> = std::result::Result<T, IBMError>;

/// Error type for IBM Quantum operations
#[derive(Error, Debug)]
pub enum IBMError {
    // ==========================================================================
    // Credential Errors
    // ==========================================================================
    /// API token not found
    #[error("API token not found. Set QREM_IBM_TOKEN environment variable.")]
    TokenNotFound,

    /// Invalid API token
    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    // ==========================================================================
    // Network Errors
    // ==========================================================================
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Retry after {0} seconds.")]
    RateLimitExceeded(u64),

    // ==========================================================================
    // API Errors
    // ==========================================================================
    /// API returned error response
    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    /// Invalid response format
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Backend not found
    #[error("Backend '{0}' not found")]
    BackendNotFound(String),

    /// Backend unavailable
    #[error("Backend '{0}' is currently unavailable: {1}")]
    BackendUnavailable(String, String),

    /// No backend satisfies the request
    #[error("No operational backend with at least {0} qubits")]
    NoSuitableBackend(usize),

    /// Circuit is wider than the selected backend
    #[error("Qubit count mismatch: circuit has {circuit} qubits, backend supports {backend}")]
    QubitCountMismatch { circuit: usize, backend: usize },

    // ==========================================================================
    // Job Errors
    // ==========================================================================
    /// Job submission failed
    #[error("Job submission failed: {0}")]
    JobSubmissionFailed(String),

    /// Job not found
    #[error("Job '{0}' not found")]
    JobNotFound(String),

    /// Job failed
    #[error("Job '{0}' failed: {1}")]
    JobFailed(String, String),

    /// Job cancelled
    #[error("Job '{0}' was cancelled")]
    JobCancelled(String),

    /// Job timeout
    #[error("Job '{0}' timed out after {1} seconds")]
    JobTimeout(String, u64),

    // ==========================================================================
    // Other Errors
    // ==========================================================================
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl IBMError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            IBMError::HttpError(_)
                | IBMError::RateLimitExceeded(_)
                | IBMError::BackendUnavailable(_, _)
        )
    }

    /// Get suggested retry delay in seconds
    pub fn retry_delay(&self) -> Option<u64> {
        match self {
            IBMError::RateLimitExceeded(delay) => Some(*delay),
            IBMError::HttpError(_) => Some(10),
            IBMError::BackendUnavailable(_, _) => Some(60),
            _ => None,
        }
    }
}

impl From<IBMError> for qrem_core::MitigationError {
    fn from(err: IBMError) -> Self {
        qrem_core::MitigationError::ExecutionFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(IBMError::RateLimitExceeded(60).is_retryable());
        assert!(IBMError::BackendUnavailable("ibm_x".into(), "maintenance".into()).is_retryable());
        assert!(!IBMError::TokenNotFound.is_retryable());
        assert!(!IBMError::JobCancelled("abc".into()).is_retryable());
    }

    #[test]
    fn test_retry_delay() {
        assert_eq!(IBMError::RateLimitExceeded(120).retry_delay(), Some(120));
        assert_eq!(IBMError::TokenNotFound.retry_delay(), None);
    }

    #[test]
    fn test_conversion_to_mitigation_error() {
        let err: qrem_core::MitigationError = IBMError::JobCancelled("j-17".into()).into();
        assert!(matches!(
            err,
            qrem_core::MitigationError::ExecutionFailed(_)
        ));
    }
}

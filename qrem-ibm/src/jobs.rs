//! IBM Quantum job management
//!
//! Provides functionality to:
//! - Submit calibration and measurement jobs
//! - Monitor job status
//! - Retrieve and parse outcome counts

use crate::backend::IBMBackend;
use crate::error::{IBMError, Result};
use crate::{IBM_QUANTUM_API_URL, MAX_WAIT_TIME, POLL_INTERVAL};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    /// Job is queued
    Queued,

    /// Job is running
    Running,

    /// Job completed successfully
    Completed,

    /// Job failed
    Failed,

    /// Job was cancelled
    Cancelled,

    /// Unknown status
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Check if job is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Check if job succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

/// Outcome counts of one executed circuit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// Measurement counts (bit-label -> count)
    pub counts: HashMap<String, u64>,

    /// Total number of shots
    pub shots: u64,

    /// Backend name
    #[serde(default)]
    pub backend: String,

    /// Job ID
    #[serde(default)]
    pub job_id: String,
}

impl JobResult {
    /// Create empty result
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            shots: 0,
            backend: String::new(),
            job_id: String::new(),
        }
    }

    /// Get probability of a bit-label
    pub fn probability(&self, label: &str) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        self.counts.get(label).copied().unwrap_or(0) as f64 / self.shots as f64
    }

    /// Convert counts to a probability distribution
    pub fn probabilities(&self) -> HashMap<String, f64> {
        if self.shots == 0 {
            return HashMap::new();
        }
        self.counts
            .iter()
            .map(|(label, &count)| (label.clone(), count as f64 / self.shots as f64))
            .collect()
    }

    /// Get most likely bit-label
    pub fn most_likely(&self) -> Option<(&str, u64)> {
        self.counts
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(label, &count)| (label.as_str(), count))
    }
}

impl Default for JobResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Job handle for tracking submitted jobs
#[derive(Debug, Clone)]
pub struct Job {
    /// Job ID
    pub id: String,

    /// Backend name
    pub backend: String,

    /// Current status
    pub status: JobStatus,

    /// Creation time
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Number of shots
    pub shots: u64,
}

impl Job {
    /// Create a new job handle
    pub fn new(id: String, backend: String, shots: u64) -> Self {
        Self {
            id,
            backend,
            status: JobStatus::Queued,
            created_at: chrono::Utc::now(),
            shots,
        }
    }
}

/// Job submission request
#[derive(Debug, Serialize)]
struct JobSubmitRequest {
    /// QASM program
    qasm: String,

    /// Number of shots
    shots: u64,

    /// Backend name
    backend: String,
}

/// Job status response
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct JobStatusResponse {
    id: String,
    status: JobStatus,
    #[serde(default)]
    backend: Option<String>,
}

/// Job result response
#[derive(Debug, Deserialize)]
struct JobResultResponse {
    #[serde(default)]
    results: Vec<CircuitResult>,
}

#[derive(Debug, Deserialize)]
struct CircuitResult {
    #[serde(default)]
    data: ResultData,
    #[serde(default)]
    shots: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct ResultData {
    #[serde(default)]
    counts: HashMap<String, u64>,
}

/// Job manager for submitting and monitoring jobs
pub struct JobManager;

impl JobManager {
    /// Submit a QASM program to the selected backend
    pub async fn submit(backend: &IBMBackend, qasm: &str, shots: u64) -> Result<Job> {
        let backend_name = backend
            .selected_backend()
            .ok_or_else(|| IBMError::Other("No backend selected".into()))?;

        let request = JobSubmitRequest {
            qasm: qasm.to_string(),
            shots,
            backend: backend_name.to_string(),
        };

        let url = format!("{}/jobs", IBM_QUANTUM_API_URL);

        let response = backend
            .client()
            .post(&url)
            .header("Authorization", backend.credentials().auth_header())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(IBMError::JobSubmissionFailed(format!(
                "HTTP {}: {}",
                code, message
            )));
        }

        let status_resp: JobStatusResponse = response.json().await?;

        Ok(Job::new(status_resp.id, backend_name.to_string(), shots))
    }

    /// Get job status
    pub async fn get_status(backend: &IBMBackend, job_id: &str) -> Result<JobStatus> {
        let url = format!("{}/jobs/{}", IBM_QUANTUM_API_URL, job_id);

        let response = backend
            .client()
            .get(&url)
            .header("Authorization", backend.credentials().auth_header())
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            return Err(IBMError::JobNotFound(job_id.to_string()));
        }

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(IBMError::ApiError { code, message });
        }

        let status_resp: JobStatusResponse = response.json().await?;
        Ok(status_resp.status)
    }

    /// Wait for job completion, polling at a fixed interval
    pub async fn wait_for_completion(
        backend: &IBMBackend,
        job: &mut Job,
        timeout_secs: Option<u64>,
    ) -> Result<()> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(MAX_WAIT_TIME));
        let start = Instant::now();

        loop {
            if start.elapsed() > timeout {
                return Err(IBMError::JobTimeout(job.id.clone(), timeout.as_secs()));
            }

            let status = Self::get_status(backend, &job.id).await?;
            job.status = status;

            match status {
                JobStatus::Completed => return Ok(()),
                JobStatus::Failed => {
                    return Err(IBMError::JobFailed(
                        job.id.clone(),
                        "Job execution failed".into(),
                    ))
                }
                JobStatus::Cancelled => return Err(IBMError::JobCancelled(job.id.clone())),
                _ => {
                    sleep(Duration::from_secs(POLL_INTERVAL)).await;
                }
            }
        }
    }

    /// Get job result
    pub async fn get_result(backend: &IBMBackend, job: &Job) -> Result<JobResult> {
        if job.status != JobStatus::Completed {
            return Err(IBMError::Other(format!(
                "Job is not completed. Status: {:?}",
                job.status
            )));
        }

        let url = format!("{}/jobs/{}/results", IBM_QUANTUM_API_URL, job.id);

        let response = backend
            .client()
            .get(&url)
            .header("Authorization", backend.credentials().auth_header())
            .send()
            .await?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(IBMError::ApiError { code, message });
        }

        let result_resp: JobResultResponse = response.json().await?;

        let circuit_result = result_resp
            .results
            .into_iter()
            .next()
            .ok_or_else(|| IBMError::InvalidResponse("No results in response".into()))?;

        Ok(JobResult {
            counts: circuit_result.data.counts,
            shots: circuit_result.shots.unwrap_or(job.shots),
            backend: job.backend.clone(),
            job_id: job.id.clone(),
        })
    }

    /// Submit, wait, and get result (convenience method)
    pub async fn run(
        backend: &IBMBackend,
        qasm: &str,
        shots: u64,
        timeout_secs: Option<u64>,
    ) -> Result<JobResult> {
        let mut job = Self::submit(backend, qasm, shots).await?;
        Self::wait_for_completion(backend, &mut job, timeout_secs).await?;
        Self::get_result(backend, &job).await
    }

    /// Cancel a job
    pub async fn cancel(backend: &IBMBackend, job_id: &str) -> Result<()> {
        let url = format!("{}/jobs/{}/cancel", IBM_QUANTUM_API_URL, job_id);

        let response = backend
            .client()
            .post(&url)
            .header("Authorization", backend.credentials().auth_header())
            .send()
            .await?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(IBMError::ApiError { code, message });
        }

        Ok(())
    }
}

// ============================================================================
// Mock implementation for testing
// ============================================================================

#[cfg(feature = "mock")]
pub mod mock {
    use super::*;
    use rand::Rng;

    /// Mock job manager for testing without IBM credentials
    pub struct MockJobManager;

    impl MockJobManager {
        /// Submit a mock job
        pub fn submit(_qasm: &str, shots: u64) -> Job {
            let id = uuid::Uuid::new_v4().to_string();
            Job::new(id, "mock_backend".to_string(), shots)
        }

        /// Generate a mock result concentrated on one prepared label,
        /// with a configurable flip fraction spread to its neighbors
        pub fn generate_result(prepared_label: &str, shots: u64, flip_fraction: f64) -> JobResult {
            let mut rng = rand::thread_rng();
            let mut counts = HashMap::new();

            let n_qubits = prepared_label.len();
            let flipped_total = (shots as f64 * flip_fraction.clamp(0.0, 1.0)) as u64;
            let mut remaining = flipped_total;

            // Distribute flipped shots over single-bit-flip neighbors
            for k in 0..n_qubits {
                let mut neighbor: Vec<u8> = prepared_label.bytes().collect();
                let pos = n_qubits - 1 - k;
                neighbor[pos] = if neighbor[pos] == b'0' { b'1' } else { b'0' };
                let neighbor = String::from_utf8(neighbor).expect("binary label");

                let count = if k == n_qubits - 1 {
                    remaining
                } else {
                    rng.gen_range(0..=remaining)
                };
                if count > 0 {
                    counts.insert(neighbor, count);
                    remaining -= count;
                }
            }

            counts.insert(prepared_label.to_string(), shots - flipped_total + remaining);

            JobResult {
                counts,
                shots,
                backend: "mock_backend".to_string(),
                job_id: uuid::Uuid::new_v4().to_string(),
            }
        }
    }
}

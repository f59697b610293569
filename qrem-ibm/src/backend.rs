//! IBM Quantum backend management
//!
//! Provides functionality to:
//! - List available backends
//! - Query backend properties
//! - Select a backend by name or pick the least busy one that fits

use crate::credentials::Credentials;
use crate::error::{IBMError, Result};
use crate::IBM_QUANTUM_API_URL;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// IBM Quantum backend handle
pub struct IBMBackend {
    /// HTTP client
    client: Client,

    /// Credentials
    credentials: Credentials,

    /// Selected backend name
    backend_name: Option<String>,

    /// Cached backend info
    backend_info: Option<BackendInfo>,
}

/// Backend status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    /// Backend is online and accepting jobs
    Online,

    /// Backend is offline for maintenance
    Offline,

    /// Backend is paused
    Paused,

    /// Backend status is unknown
    #[default]
    Unknown,
}

/// Backend information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Backend name
    pub name: String,

    /// Number of qubits
    pub n_qubits: usize,

    /// Backend status
    #[serde(default)]
    pub status: BackendStatus,

    /// Pending jobs in queue
    #[serde(default)]
    pub pending_jobs: usize,

    /// Supported gates
    #[serde(default)]
    pub basis_gates: Vec<String>,

    /// Is simulator
    #[serde(default)]
    pub simulator: bool,

    /// Maximum shots per job
    #[serde(default)]
    pub max_shots: u64,
}

impl Default for BackendInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            n_qubits: 0,
            status: BackendStatus::Unknown,
            pending_jobs: 0,
            basis_gates: vec![
                "cx".into(),
                "id".into(),
                "rz".into(),
                "sx".into(),
                "x".into(),
            ],
            simulator: false,
            max_shots: 8192,
        }
    }
}

impl BackendInfo {
    /// Check if backend can run calibration circuits of the given width
    pub fn can_run(&self, n_qubits: usize) -> bool {
        self.status == BackendStatus::Online && n_qubits <= self.n_qubits
    }

    /// Check if a gate is supported
    pub fn supports_gate(&self, gate: &str) -> bool {
        self.basis_gates.iter().any(|g| g == gate)
    }
}

/// Backend response from API
#[derive(Debug, Deserialize)]
struct BackendResponse {
    backends: Vec<BackendData>,
}

#[derive(Debug, Deserialize)]
struct BackendData {
    name: String,
    #[serde(default)]
    n_qubits: Option<usize>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    pending_jobs: Option<usize>,
    #[serde(default)]
    basis_gates: Option<Vec<String>>,
    #[serde(default)]
    simulator: Option<bool>,
    #[serde(default)]
    max_shots: Option<u64>,
}

impl From<BackendData> for BackendInfo {
    fn from(data: BackendData) -> Self {
        Self {
            name: data.name,
            n_qubits: data.n_qubits.unwrap_or(0),
            status: match data.status.as_deref() {
                Some("online") => BackendStatus::Online,
                Some("offline") => BackendStatus::Offline,
                Some("paused") => BackendStatus::Paused,
                _ => BackendStatus::Unknown,
            },
            pending_jobs: data.pending_jobs.unwrap_or(0),
            basis_gates: data.basis_gates.unwrap_or_default(),
            simulator: data.simulator.unwrap_or(false),
            max_shots: data.max_shots.unwrap_or(8192),
        }
    }
}

impl IBMBackend {
    /// Create new IBM backend handle with credentials
    pub fn new(credentials: Credentials) -> Result<Self> {
        credentials.validate()?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            credentials,
            backend_name: None,
            backend_info: None,
        })
    }

    /// Create backend handle from an API token
    pub fn from_token(token: impl Into<String>) -> Result<Self> {
        Self::new(Credentials::new(token))
    }

    /// List available backends
    pub async fn list_backends(&self) -> Result<Vec<BackendInfo>> {
        let url = format!("{}/backends", IBM_QUANTUM_API_URL);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.credentials.auth_header())
            .send()
            .await?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(IBMError::ApiError { code, message });
        }

        let data: BackendResponse = response.json().await?;
        Ok(data.backends.into_iter().map(BackendInfo::from).collect())
    }

    /// Get information about a specific backend
    pub async fn get_backend(&self, name: &str) -> Result<BackendInfo> {
        let backends = self.list_backends().await?;

        backends
            .into_iter()
            .find(|b| b.name == name)
            .ok_or_else(|| IBMError::BackendNotFound(name.to_string()))
    }

    /// Select a backend by name
    pub async fn select(&mut self, name: &str) -> Result<&BackendInfo> {
        let info = self.get_backend(name).await?;

        if info.status != BackendStatus::Online {
            return Err(IBMError::BackendUnavailable(
                name.to_string(),
                format!("Status: {:?}", info.status),
            ));
        }

        self.backend_name = Some(name.to_string());
        self.backend_info = Some(info);

        Ok(self.backend_info.as_ref().unwrap())
    }

    /// Select the least busy operational device that fits the circuit width.
    ///
    /// Filters to online, non-simulator backends with at least `n_qubits`
    /// qubits and picks the one with the shortest queue.
    pub async fn select_least_busy(&mut self, n_qubits: usize) -> Result<&BackendInfo> {
        let backends = self.list_backends().await?;

        let mut candidates: Vec<_> = backends
            .into_iter()
            .filter(|b| !b.simulator && b.can_run(n_qubits))
            .collect();

        if candidates.is_empty() {
            return Err(IBMError::NoSuitableBackend(n_qubits));
        }

        candidates.sort_by_key(|b| b.pending_jobs);

        let best = candidates.remove(0);
        self.backend_name = Some(best.name.clone());
        self.backend_info = Some(best);

        Ok(self.backend_info.as_ref().unwrap())
    }

    /// Get selected backend name
    pub fn selected_backend(&self) -> Option<&str> {
        self.backend_name.as_deref()
    }

    /// Get selected backend info
    pub fn backend_info(&self) -> Option<&BackendInfo> {
        self.backend_info.as_ref()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Create mock backend for testing
    #[cfg(feature = "mock")]
    pub fn mock(n_qubits: usize) -> Self {
        let credentials = Credentials::new(format!("mock_token_{}", "x".repeat(50)));
        let client = Client::new();

        let backend_info = BackendInfo {
            name: "mock_backend".to_string(),
            n_qubits,
            status: BackendStatus::Online,
            pending_jobs: 0,
            simulator: true,
            ..BackendInfo::default()
        };

        Self {
            client,
            credentials,
            backend_name: Some("mock_backend".to_string()),
            backend_info: Some(backend_info),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_info_default() {
        let info = BackendInfo::default();
        assert_eq!(info.n_qubits, 0);
        assert_eq!(info.status, BackendStatus::Unknown);
        assert!(info.supports_gate("x"));
    }

    #[test]
    fn test_backend_info_can_run() {
        let info = BackendInfo {
            n_qubits: 5,
            status: BackendStatus::Online,
            ..BackendInfo::default()
        };

        assert!(info.can_run(4));
        assert!(info.can_run(5));
        assert!(!info.can_run(6));
    }

    #[test]
    fn test_backend_info_can_run_offline() {
        let info = BackendInfo {
            n_qubits: 5,
            status: BackendStatus::Offline,
            ..BackendInfo::default()
        };

        assert!(!info.can_run(4));
    }

    #[test]
    fn test_backend_handle_rejects_bad_token() {
        assert!(IBMBackend::from_token("short").is_err());
    }
}

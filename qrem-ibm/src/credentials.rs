//! IBM Quantum credentials management
//!
//! Handles API token storage, retrieval, and validation.
//!
//! ## Token Sources (in priority order)
//! 1. Direct parameter
//! 2. Environment variable `QREM_IBM_TOKEN`
//! 3. Config file `~/.qrem/ibm.json`

use crate::error::{IBMError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variable holding the API token
pub const TOKEN_ENV_VAR: &str = "QREM_IBM_TOKEN";

/// IBM Quantum credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// API token
    token: String,

    /// Instance (hub/group/project)
    #[serde(default)]
    instance: Option<String>,
}

impl Credentials {
    /// Create credentials with token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            instance: None,
        }
    }

    /// Create credentials with token and instance
    pub fn with_instance(token: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            instance: Some(instance.into()),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// Validate token format (basic check)
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(IBMError::InvalidToken("Token is empty".into()));
        }

        // IBM tokens are long alphanumeric strings
        if self.token.len() < 32 {
            return Err(IBMError::InvalidToken("Token too short".into()));
        }

        Ok(())
    }

    /// Create authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Credentials manager for loading credentials from the environment
pub struct CredentialsManager;

impl CredentialsManager {
    /// Load credentials from available sources.
    ///
    /// Priority: `QREM_IBM_TOKEN` environment variable, then the config
    /// file at `~/.qrem/ibm.json`.
    pub fn load() -> Result<Credentials> {
        if let Ok(token) = env::var(TOKEN_ENV_VAR) {
            if !token.is_empty() {
                return Ok(Credentials::new(token));
            }
        }

        if let Some(path) = Self::config_path() {
            if path.exists() {
                let contents = std::fs::read_to_string(&path)?;
                let credentials: Credentials = serde_json::from_str(&contents)?;
                return Ok(credentials);
            }
        }

        Err(IBMError::TokenNotFound)
    }

    /// Persist credentials to the config file
    pub fn save(credentials: &Credentials) -> Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| IBMError::Other("Cannot determine home directory".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(credentials)?)?;
        Ok(path)
    }

    fn config_path() -> Option<PathBuf> {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".qrem").join("ibm.json"))
    }
}

//! Client configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ClientError, Result};

/// Connection settings for the REST backend.
///
/// Environment variables are prefixed with `MUNIFICENT_`:
/// - `MUNIFICENT_API_BASE_URL`: API root (default: "http://localhost:8000/api")
/// - `MUNIFICENT_TIMEOUT_SECS`: per-request timeout (default: 30)
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// API root, without trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Load configuration from the environment, honouring a `.env` file.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = envy::prefixed("MUNIFICENT_")
            .from_env::<ClientConfig>()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject a base URL without an http(s) scheme and a zero timeout.
    pub fn validate(&self) -> Result<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "API base URL must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config("Timeout must be at least one second".to_string()));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

//! Configuration types for connecting to a logic app and polling its runs.

use crate::error::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides `credentials.client_secret`.
pub const CLIENT_SECRET_ENV: &str = "WFPROBE_CLIENT_SECRET";

/// Comprehensive configuration for a probe session.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Service principal credentials.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Location of the logic app under test.
    #[serde(default)]
    pub logic_app: LogicAppConfig,

    /// Management API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Run polling settings.
    #[serde(default)]
    pub polling: PollingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the default configuration. The client secret
    /// may be supplied through `WFPROBE_CLIENT_SECRET` instead of the file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| ProbeError::ConfigError(format!("failed to read config: {}", e)))?;
            toml::from_str(&content)
                .map_err(|e| ProbeError::ConfigError(format!("failed to parse config: {}", e)))?
        } else {
            Config::default()
        };

        if let Ok(secret) = std::env::var(CLIENT_SECRET_ENV) {
            if !secret.is_empty() {
                config.credentials.client_secret = secret;
            }
        }

        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProbeError::ConfigError(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| ProbeError::ConfigError(format!("failed to write config: {}", e)))?;
        Ok(())
    }

    /// Checks that the identifiers needed to build management URLs are set.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("logic_app.subscription_id", &self.logic_app.subscription_id),
            ("logic_app.resource_group", &self.logic_app.resource_group),
            ("logic_app.logic_app_name", &self.logic_app.logic_app_name),
            ("logic_app.workflow_name", &self.logic_app.workflow_name),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProbeError::ConfigError(format!(
                "missing required settings: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Service principal used to obtain management API tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Azure AD tenant.
    pub tenant_id: String,
    /// Application (client) id.
    pub client_id: String,
    /// Client secret. Prefer the `WFPROBE_CLIENT_SECRET` environment variable.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_secret: String,
    /// Token authority (default: `https://login.microsoftonline.com`).
    pub authority: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            authority: "https://login.microsoftonline.com".to_string(),
        }
    }
}

/// Identifies the logic app site and its primary workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicAppConfig {
    /// Subscription containing the logic app.
    pub subscription_id: String,
    /// Resource group containing the logic app.
    pub resource_group: String,
    /// Logic app (site) name.
    pub logic_app_name: String,
    /// Workflow used when a call does not name one.
    pub workflow_name: String,
}

/// Management API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL all management paths are resolved against.
    pub base_url: String,
    /// `api-version` query parameter.
    pub api_version: String,
    /// Per-request timeout in seconds (default: 60).
    pub timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://management.azure.com/".to_string(),
            api_version: "2018-11-01".to_string(),
            timeout_secs: 60,
            user_agent: format!("wfprobe/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    /// Returns the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Backoff and budget settings for run polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay unit; attempt `n` sleeps `n * base_delay_ms` (default: 2000).
    pub base_delay_ms: u64,

    /// Total backoff allowed while waiting for a run to finish.
    /// Zero waits indefinitely. Default: 300 seconds.
    pub max_wait_secs: u64,

    /// Fetches performed by the "most recent run since" search before it
    /// gives up and reports no run (default: 1500).
    pub since_max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 2000,
            max_wait_secs: 300,
            since_max_attempts: 1500,
        }
    }
}

impl PollingConfig {
    /// Returns the base delay as a Duration.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Returns the wait budget as a Duration.
    pub fn max_wait(&self) -> Option<Duration> {
        (self.max_wait_secs > 0).then(|| Duration::from_secs(self.max_wait_secs))
    }
}

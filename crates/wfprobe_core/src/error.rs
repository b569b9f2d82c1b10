//! Error types for wfprobe_core operations.

use thiserror::Error;

/// Core error type for wfprobe_core operations.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The endpoint answered with a non-success status code.
    #[error("request to {url} failed with status {status}: {body}")]
    Transport {
        /// Requested URL
        url: String,
        /// HTTP status code returned
        status: u16,
        /// Response body, kept for diagnostics
        body: String,
    },

    /// The request could not be completed (DNS, connect, timeout, TLS).
    #[error("request to {url} failed: {reason}")]
    Network {
        /// Requested URL
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// A response body could not be deserialized.
    #[error("failed to deserialize {context}: {reason}")]
    Deserialization {
        /// What was being parsed
        context: String,
        /// Parser message
        reason: String,
    },

    /// The named action is not part of the loaded run history.
    #[error("action does not exist in run history: {0}")]
    ActionNotFound(String),

    /// A record has no content link of the requested kind.
    #[error("{subject} has no {link} content link")]
    ContentLinkMissing {
        /// Action name or "trigger"
        subject: String,
        /// Which link was requested (inputs, outputs)
        link: &'static str,
    },

    /// An operation was invoked before the state it depends on exists.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Polling for a terminal run status exhausted its wait budget.
    #[error("run {run_id} still running after {attempts} attempts ({waited_ms}ms waited)")]
    PollTimeout {
        /// Run being polled
        run_id: String,
        /// Number of status fetches performed
        attempts: u32,
        /// Total time spent sleeping between attempts
        waited_ms: u64,
    },

    /// Bearer token acquisition failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl ProbeError {
    /// Returns true for failures raised by the HTTP layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Network { .. })
    }

    /// Returns the HTTP status code when the endpoint answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Transport { status: 401 | 403, .. } => Some(
                "Check that the service principal has access to the logic app resource group.",
            ),
            Self::Transport { status: 404, .. } => {
                Some("Check the workflow name and run id; the run may belong to a child workflow.")
            }
            Self::Auth(_) => {
                Some("Verify tenant_id, client_id and client_secret in the [credentials] section.")
            }
            Self::Precondition(_) => {
                Some("Trigger the workflow or load a run history before querying it.")
            }
            Self::PollTimeout { .. } => {
                Some("Increase polling.max_wait_secs or check the run in the portal.")
            }
            Self::ActionNotFound(_) => Some(
                "Action names are matched with spaces replaced by underscores; pass format=false to match the raw name.",
            ),
            _ => None,
        }
    }
}

/// Convenience Result type for wfprobe_core operations.
pub type Result<T> = std::result::Result<T, ProbeError>;

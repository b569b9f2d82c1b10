//! wfprobe Core Library
//!
//! Test-support engine for deployed Logic Apps Standard workflows:
//! - Trigger a workflow and capture the run it started
//! - Wait for a run to settle with linear backoff
//! - Cache run documents per run id
//! - Resolve actions by name and classify their status
//! - Follow content links to inputs, outputs and trigger messages
//! - Generate a test skeleton from an observed run
//!
//! # Quick Start
//!
//! ```no_run
//! use wfprobe_core::{ActionStatus, Config, TestManager, WorkflowRunStatus};
//! use std::path::Path;
//!
//! # fn main() -> wfprobe_core::Result<()> {
//! let config = Config::load(Path::new("wfprobe.toml"))?;
//! let mut manager = TestManager::connect(config)?;
//!
//! manager.trigger_with_post(r#"{"orderId": 42}"#, "manual")?;
//! manager.wait_for_run()?;
//! manager.load_workflow_run_history()?;
//!
//! assert_eq!(manager.workflow_run_status("", false)?, WorkflowRunStatus::Succeeded);
//! assert_eq!(manager.action_status("Send email", "", false, true)?, ActionStatus::Succeeded);
//! # Ok(())
//! # }
//! ```
//!
//! # Action Names
//!
//! The run history stores action names with spaces replaced by underscores.
//! Lookups apply the same transformation unless formatting is turned off:
//!
//! ```
//! use wfprobe_core::normalize_name;
//!
//! assert_eq!(normalize_name("Send approval email", true), "Send_approval_email");
//! assert_eq!(normalize_name("Send approval email", false), "Send approval email");
//! ```

mod actions;
mod auth;
mod cache;
mod config;
mod error;
mod manager;
mod model;
mod monitor;
mod sample;
mod status;
mod transport;
mod trigger;
mod workflow;


pub use actions::{normalize_name, ActionResolver};
pub use auth::{ClientSecretCredential, StaticToken, TokenProvider, MANAGEMENT_SCOPE};
pub use cache::{CachedDocument, DocumentKind, RunCache, RunDocument};
pub use config::{
    ApiConfig, Config, CredentialsConfig, LogicAppConfig, PollingConfig, CLIENT_SECRET_ENV,
};
pub use error::{ProbeError, Result};
pub use manager::TestManager;
pub use model::{
    ActionRecord, CallbackUrl, ContentHash, ContentLink, Correlation, RunActionsDocument,
    RunDetails, RunId, RunProperties, TriggerRecord, WorkflowReference, WorkflowRunList,
};
pub use monitor::{LinearBackoff, RunMonitor};
pub use sample::{
    unwrap_trigger_message, GeneratedTestSample, SampleGenerator, SampleTemplates,
    DEFAULT_ACTION_ASSERTION_TEMPLATE, DEFAULT_TEST_TEMPLATE,
};
pub use status::{ActionStatus, TriggerStatus, WorkflowRunStatus};
pub use transport::{
    build_http_client, ApiRequest, ApiResponse, ApiTransport, Endpoint, ManagementClient, Method,
    Payload,
};
pub use trigger::TriggerResolver;
pub use workflow::{
    invoke_trigger, WorkflowEndpoints, WorkflowResponse, CORRELATION_ID_HEADER, RUN_ID_HEADER,
    TRACKING_ID_HEADER,
};

use std::time::Duration;

/// Sleep provider used between poll attempts.
///
/// Lets tests observe backoff delays without waiting. Production code uses
/// [`ThreadSleeper`].
pub trait Sleeper: Send + Sync {
    /// Blocks the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

impl<F> Sleeper for F
where
    F: Fn(Duration) + Send + Sync,
{
    fn sleep(&self, duration: Duration) {
        self(duration)
    }
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

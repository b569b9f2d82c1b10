use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wfprobe_core::{Config, Endpoint, PollingConfig, RunId, WorkflowEndpoints};

pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";
pub const RESOURCE_GROUP: &str = "rg-integration";
pub const LOGIC_APP: &str = "la-orders";
pub const WORKFLOW: &str = "orders";

/// Isolated directory holding the scenario's `wfprobe.toml`
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// Create an empty workspace
    pub fn empty() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp directory")?;
        Ok(Self { dir })
    }

    /// Get workspace path
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the config file
    pub fn config_path(&self) -> PathBuf {
        self.path().join("wfprobe.toml")
    }

    /// Write a config pointing at `base_url` and read it back
    pub fn write_config(&self, base_url: &str, polling: &PollingConfig) -> Result<Config> {
        let mut config = Config::default();
        config.logic_app.subscription_id = SUBSCRIPTION.to_string();
        config.logic_app.resource_group = RESOURCE_GROUP.to_string();
        config.logic_app.logic_app_name = LOGIC_APP.to_string();
        config.logic_app.workflow_name = WORKFLOW.to_string();
        config.api.base_url = format!("{}/", base_url);
        config.api.timeout_secs = 10;
        config.polling = polling.clone();

        let path = self.config_path();
        config.save(&path)?;
        Ok(Config::load(&path)?)
    }

    /// Write a file into the workspace
    pub fn write_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Endpoints of the test logic app
pub fn endpoints() -> WorkflowEndpoints {
    WorkflowEndpoints::new(SUBSCRIPTION, RESOURCE_GROUP, LOGIC_APP, "2018-11-01")
}

/// Request URL the mock sees for an endpoint
pub fn route(endpoint: Endpoint) -> String {
    match endpoint {
        Endpoint::Management(path) => format!("/{}", path.trim_start_matches('/')),
        Endpoint::External(url) => url,
    }
}

/// Route of a run's status snapshot
pub fn run_details_route(run_id: &str) -> String {
    route(endpoints().run_details(WORKFLOW, &RunId::new(run_id)))
}

/// Route of a run's actions document
pub fn run_actions_route(run_id: &str) -> String {
    route(endpoints().run_actions(WORKFLOW, &RunId::new(run_id)))
}

/// Route of a content link created by the fixtures
pub fn content_route(name: &str) -> String {
    format!("/content/{}", name)
}

//! Test manager providing the main wfprobe API.

use crate::actions::ActionResolver;
use crate::auth::{ClientSecretCredential, TokenProvider};
use crate::cache::{DocumentKind, RunCache};
use crate::config::Config;
use crate::error::{ProbeError, Result};
use crate::model::{RunActionsDocument, RunDetails, RunId, TriggerRecord, WorkflowRunList};
use crate::monitor::RunMonitor;
use crate::sample::{GeneratedTestSample, SampleGenerator, SampleTemplates};
use crate::status::{ActionStatus, TriggerStatus, WorkflowRunStatus};
use crate::transport::{build_http_client, ApiTransport, ManagementClient, Method, Payload};
use crate::trigger::TriggerResolver;
use crate::workflow::{invoke_trigger, WorkflowEndpoints, WorkflowResponse};
use crate::{Sleeper, ThreadSleeper};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Test manager handle.
///
/// Tracks the run under test and answers questions about it. Workflow name
/// arguments may be left empty to mean the configured primary workflow.
pub struct TestManager {
    /// Loaded configuration.
    config: Config,
    /// Management API paths for the configured logic app.
    endpoints: WorkflowEndpoints,
    /// HTTP transport.
    transport: Box<dyn ApiTransport>,
    /// Sleep provider for polling (swapped out in tests).
    sleeper: Box<dyn Sleeper>,
    /// Backoff settings.
    monitor: RunMonitor,
    /// Fetched run documents.
    cache: RunCache,
    /// Templates used by sample generation.
    templates: SampleTemplates,
    /// Response of the last trigger invocation.
    last_response: Option<WorkflowResponse>,
    /// Run currently under test.
    current_run: Option<RunId>,
}

impl TestManager {
    /// Connects to the management API with the configured service principal.
    ///
    /// Acquires a token up front so credential problems surface here rather
    /// than on the first query.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wfprobe_core::{Config, TestManager};
    /// use std::path::Path;
    ///
    /// let config = Config::load(Path::new("wfprobe.toml")).unwrap();
    /// let manager = TestManager::connect(config).unwrap();
    /// ```
    pub fn connect(config: Config) -> Result<Self> {
        config.validate()?;
        let client = build_http_client(&config.api)?;
        let credential = ClientSecretCredential::new(&config.credentials, client.clone())?;
        credential.authorization_header()?;

        let transport = ManagementClient::with_client(&config.api, client, Box::new(credential))?;
        info!(
            logic_app = %config.logic_app.logic_app_name,
            workflow = %config.logic_app.workflow_name,
            "connected to management api"
        );
        Ok(Self::with_transport(config, Box::new(transport)))
    }

    /// Creates a manager over an existing transport.
    pub fn with_transport(config: Config, transport: Box<dyn ApiTransport>) -> Self {
        Self {
            endpoints: WorkflowEndpoints::from_config(&config),
            monitor: RunMonitor::new(&config.polling),
            config,
            transport,
            sleeper: Box::new(ThreadSleeper),
            cache: RunCache::new(),
            templates: SampleTemplates::default(),
            last_response: None,
            current_run: None,
        }
    }

    /// Sets a custom sleep provider for polling.
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Sets the templates used by [`generate_test_sample`](Self::generate_test_sample).
    pub fn with_sample_templates(mut self, templates: SampleTemplates) -> Self {
        self.templates = templates;
        self
    }

    /// Loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run document cache.
    pub fn cache(&self) -> &RunCache {
        &self.cache
    }

    /// Run currently under test, if any.
    pub fn current_run_id(&self) -> Option<&RunId> {
        self.current_run.as_ref()
    }

    /// Response of the last trigger invocation, if any.
    pub fn last_response(&self) -> Option<&WorkflowResponse> {
        self.last_response.as_ref()
    }

    fn workflow_name(&self, workflow: &str) -> String {
        if workflow.trim().is_empty() {
            self.config.logic_app.workflow_name.clone()
        } else {
            workflow.to_string()
        }
    }

    fn require_run(&self) -> Result<RunId> {
        self.current_run.clone().ok_or_else(|| {
            ProbeError::Precondition(
                "no run selected; trigger the workflow or load a run history first".to_string(),
            )
        })
    }

    // ===== Triggering =====

    /// Triggers the primary workflow with an HTTP POST.
    pub fn trigger_with_post(&mut self, body: &str, trigger: &str) -> Result<WorkflowResponse> {
        let payload = Payload::json(body);
        self.run_workflow("", trigger, Method::Post, Some(&payload))
    }

    /// Triggers the primary workflow with an HTTP GET.
    pub fn trigger_with_get(&mut self, trigger: &str) -> Result<WorkflowResponse> {
        self.run_workflow("", trigger, Method::Get, None)
    }

    /// Triggers any workflow of the logic app and selects the started run.
    pub fn run_workflow(
        &mut self,
        workflow: &str,
        trigger: &str,
        method: Method,
        payload: Option<&Payload>,
    ) -> Result<WorkflowResponse> {
        let workflow = self.workflow_name(workflow);
        let response = invoke_trigger(
            self.transport.as_ref(),
            &self.endpoints,
            &workflow,
            trigger,
            method,
            payload,
        )?;
        self.current_run = response.run_id.clone();
        self.last_response = Some(response.clone());
        Ok(response)
    }

    // ===== Run documents =====

    /// Run status snapshot of the current run (cached unless `refresh`).
    pub fn run_details(&mut self, workflow: &str, refresh: bool) -> Result<Arc<RunDetails>> {
        let run_id = self.require_run()?;
        let endpoint = self.endpoints.run_details(&self.workflow_name(workflow), &run_id);
        let transport = &self.transport;
        self.cache.get(&run_id, refresh, || {
            RunDetails::from_json(&transport.get(&endpoint)?)
        })
    }

    /// Run record with actions of the current run (cached unless `refresh`).
    pub fn run_actions(&mut self, workflow: &str, refresh: bool) -> Result<Arc<RunActionsDocument>> {
        let run_id = self.require_run()?;
        let endpoint = self.endpoints.run_actions(&self.workflow_name(workflow), &run_id);
        let transport = &self.transport;
        self.cache.get(&run_id, refresh, || {
            RunActionsDocument::from_json(&transport.get(&endpoint)?)
        })
    }

    // ===== Monitoring =====

    /// Waits for the current run of the primary workflow to settle.
    pub fn wait_for_run(&mut self) -> Result<Arc<RunDetails>> {
        self.wait_for_run_in("")
    }

    /// Waits for the current run of `workflow` to settle.
    ///
    /// Each attempt refreshes the cached run details. Cached actions of the
    /// run are dropped so later queries see the final history.
    pub fn wait_for_run_in(&mut self, workflow: &str) -> Result<Arc<RunDetails>> {
        let run_id = self.require_run()?;
        let endpoint = self.endpoints.run_details(&self.workflow_name(workflow), &run_id);

        let Self {
            transport,
            sleeper,
            monitor,
            cache,
            ..
        } = self;
        let details = monitor.poll_until_terminal(&**sleeper, || {
            cache.get(&run_id, true, || RunDetails::from_json(&transport.get(&endpoint)?))
        })?;

        cache.invalidate(DocumentKind::RunActions, &run_id);
        Ok(details)
    }

    /// Latest run of a workflow, if it has any.
    pub fn most_recent_run(&self, workflow: &str) -> Result<Option<RunDetails>> {
        let endpoint = self.endpoints.most_recent_run(&self.workflow_name(workflow));
        let list = WorkflowRunList::from_json(&self.transport.get(&endpoint)?)?;
        Ok(list.most_recent().cloned())
    }

    /// Waits for the latest run of a workflow to settle and returns it.
    pub fn recent_completed_run_details(&self, workflow: &str) -> Result<RunDetails> {
        let workflow = self.workflow_name(workflow);
        self.monitor.poll_until_terminal(self.sleeper.as_ref(), || {
            self.most_recent_run(&workflow)?.ok_or_else(|| {
                ProbeError::Precondition(format!("workflow {} has no runs", workflow))
            })
        })
    }

    /// Runs of a workflow that started at or after `since`.
    pub fn runs_since(&self, workflow: &str, since: DateTime<Utc>) -> Result<WorkflowRunList> {
        let endpoint = self.endpoints.runs_since(&self.workflow_name(workflow), since);
        WorkflowRunList::from_json(&self.transport.get(&endpoint)?)
    }

    /// Single look-up of the latest run started at or after `since`.
    pub fn most_recent_run_id_since(&self, workflow: &str, since: DateTime<Utc>) -> Result<Option<RunId>> {
        Ok(self
            .runs_since(workflow, since)?
            .most_recent()
            .map(RunDetails::run_id))
    }

    /// Polls until a run started at or after `since` is visible.
    ///
    /// Returns `Ok(None)` when none shows up within the attempt cap.
    pub fn most_recent_run_since(&self, workflow: &str, since: DateTime<Utc>) -> Result<Option<RunDetails>> {
        self.monitor.poll_for_run_since(self.sleeper.as_ref(), || {
            Ok(self.runs_since(workflow, since)?.most_recent().cloned())
        })
    }

    /// Finds a run started at or after `since`, selects it and waits for it
    /// to settle.
    ///
    /// Returns `Ok(None)` without selecting anything when no run shows up.
    pub fn completed_run_since(
        &mut self,
        workflow: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<Arc<RunDetails>>> {
        let Some(found) = self.most_recent_run_since(workflow, since)? else {
            return Ok(None);
        };
        self.select_run(found.run_id());
        self.wait_for_run_in(workflow).map(Some)
    }

    // ===== Run history =====

    /// Loads the history of the run started by the last trigger invocation.
    ///
    /// Always fetches both documents again; later queries without
    /// `refresh` see what this load fetched.
    pub fn load_workflow_run_history(&mut self) -> Result<()> {
        if self.last_response.is_none() {
            return Err(ProbeError::Precondition(
                "the workflow has not been triggered".to_string(),
            ));
        }
        self.run_actions("", true)?;
        self.run_details("", true)?;
        Ok(())
    }

    /// Makes `run_id` the run under test without fetching anything.
    pub fn select_run(&mut self, run_id: impl Into<RunId>) {
        self.current_run = Some(run_id.into());
    }

    /// Selects `run_id` and loads its history, replacing any cached copy.
    pub fn load_run_history(&mut self, workflow: &str, run_id: impl Into<RunId>) -> Result<()> {
        self.select_run(run_id);
        self.run_actions(workflow, true)?;
        self.run_details(workflow, true)?;
        Ok(())
    }

    /// Overall status of the current run.
    pub fn workflow_run_status(&mut self, workflow: &str, refresh: bool) -> Result<WorkflowRunStatus> {
        Ok(self.run_details(workflow, refresh)?.status())
    }

    /// Returns true if the current run succeeded.
    pub fn was_run_successful(&mut self, workflow: &str) -> Result<bool> {
        Ok(self.workflow_run_status(workflow, false)?.is_success())
    }

    /// Status of an action in the current run.
    ///
    /// `format` replaces spaces with underscores before the lookup.
    pub fn action_status(
        &mut self,
        action: &str,
        workflow: &str,
        refresh: bool,
        format: bool,
    ) -> Result<ActionStatus> {
        let doc = self.run_actions(workflow, refresh)?;
        Ok(ActionResolver::new(&doc).status(action, format))
    }

    /// Every action of the current run with its status, in document order.
    pub fn action_statuses(&mut self, workflow: &str, refresh: bool) -> Result<Vec<(String, ActionStatus)>> {
        let doc = self.run_actions(workflow, refresh)?;
        Ok(ActionResolver::new(&doc)
            .statuses()
            .into_iter()
            .map(|(name, status)| (name.to_string(), status))
            .collect())
    }

    /// Raw JSON of an action in the current run.
    pub fn action_json(&mut self, action: &str, workflow: &str, refresh: bool, format: bool) -> Result<Value> {
        let doc = self.run_actions(workflow, refresh)?;
        ActionResolver::new(&doc).action_json(action, format).cloned()
    }

    /// Inputs of an action in the current run.
    pub fn action_input_message(
        &mut self,
        action: &str,
        workflow: &str,
        refresh: bool,
        format: bool,
    ) -> Result<String> {
        let doc = self.run_actions(workflow, refresh)?;
        ActionResolver::new(&doc).input_message(self.transport.as_ref(), action, format)
    }

    /// Outputs of an action in the current run.
    pub fn action_output_message(
        &mut self,
        action: &str,
        workflow: &str,
        refresh: bool,
        format: bool,
    ) -> Result<String> {
        let doc = self.run_actions(workflow, refresh)?;
        ActionResolver::new(&doc).output_message(self.transport.as_ref(), action, format)
    }

    /// Trigger status of the current run.
    pub fn trigger_status(&mut self, workflow: &str, refresh: bool) -> Result<TriggerStatus> {
        let doc = self.run_actions(workflow, refresh)?;
        Ok(TriggerResolver::new(&doc).status())
    }

    /// Trigger record of the current run.
    pub fn trigger_details(&mut self, workflow: &str, refresh: bool) -> Result<TriggerRecord> {
        let doc = self.run_actions(workflow, refresh)?;
        Ok(TriggerResolver::new(&doc).details().clone())
    }

    /// Message that started the current run.
    pub fn trigger_message(&mut self, workflow: &str, refresh: bool) -> Result<String> {
        let doc = self.run_actions(workflow, refresh)?;
        TriggerResolver::new(&doc).message(self.transport.as_ref())
    }

    /// Inputs the trigger of the current run received.
    pub fn trigger_input_message(&mut self, workflow: &str, refresh: bool) -> Result<String> {
        let doc = self.run_actions(workflow, refresh)?;
        TriggerResolver::new(&doc).input_message(self.transport.as_ref())
    }

    // ===== Samples =====

    /// Generates a test skeleton from a run of the primary workflow.
    ///
    /// Selects `run_id` as the current run and reloads its history first.
    pub fn generate_test_sample(
        &mut self,
        run_id: impl Into<RunId>,
        include_skipped_steps: bool,
    ) -> Result<GeneratedTestSample> {
        self.load_run_history("", run_id)?;
        let doc = self.run_actions("", false)?;
        let workflow = self.workflow_name("");

        SampleGenerator::new(self.templates.clone())
            .include_skipped_steps(include_skipped_steps)
            .generate(self.transport.as_ref(), &workflow, &doc)
    }
}

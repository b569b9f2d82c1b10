use super::assertions::{Assertion, ErrorMatch};
use super::fixtures::{self, RunActionsFixture};
use super::mock_api::MockResponse;
use super::runner::ScenarioRunner;
use super::steps::ScenarioStep;
use super::workspace::{
    content_route, endpoints, route, run_actions_route, run_details_route, WORKFLOW,
};
use chrono::{DateTime, Utc};
use std::time::Duration;
use wfprobe_core::{
    ActionStatus, PollingConfig, TestManager, TriggerStatus, WorkflowRunStatus, CORRELATION_ID_HEADER,
    RUN_ID_HEADER, TRACKING_ID_HEADER,
};

/// Fluent DSL for building test scenarios
pub struct Scenario {
    name: String,
    routes: Vec<(String, MockResponse)>,
    polling: PollingConfig,
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Create a new scenario with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            routes: Vec::new(),
            polling: PollingConfig::default(),
            steps: Vec::new(),
        }
    }

    // ===== Mock API setup =====

    /// Serve a response on a raw route
    pub fn with_route(mut self, url: &str, response: MockResponse) -> Self {
        self.routes.push((url.to_string(), response));
        self
    }

    /// Request trigger that starts `run_id`
    pub fn with_trigger(self, trigger: &str, run_id: &str) -> Self {
        let callback = route(endpoints().trigger_callback(WORKFLOW, trigger));
        let invoke = format!("/invoke/{}?sig=test-signature", trigger);
        self.with_route(&callback, MockResponse::ok(fixtures::callback_url(trigger)))
            .with_route(
                &invoke,
                MockResponse::status(202, "")
                    .with_header(RUN_ID_HEADER, run_id)
                    .with_header(TRACKING_ID_HEADER, &format!("tracking-{}", run_id))
                    .with_header(CORRELATION_ID_HEADER, "corr-1"),
            )
    }

    /// Status snapshots served for a run, one per poll; the last one repeats
    pub fn with_run_statuses(mut self, run_id: &str, statuses: &[&str]) -> Self {
        let url = run_details_route(run_id);
        for status in statuses {
            self.routes
                .push((url.clone(), MockResponse::ok(fixtures::run_details(run_id, status))));
        }
        self
    }

    /// Actions document of a run
    pub fn with_run_actions(self, run_id: &str, actions: RunActionsFixture) -> Self {
        self.with_route(&run_actions_route(run_id), MockResponse::ok(actions.build()))
    }

    /// Raw actions document of a run
    pub fn with_run_actions_body(self, run_id: &str, body: &str) -> Self {
        self.with_route(&run_actions_route(run_id), MockResponse::ok(body))
    }

    /// Body behind a content link created by the fixtures
    pub fn with_content(self, name: &str, body: &str) -> Self {
        self.with_route(&content_route(name), MockResponse::ok(body))
    }

    /// Run list pages served for a since-search, one per fetch
    pub fn with_runs_since(mut self, since: DateTime<Utc>, pages: &[String]) -> Self {
        let url = route(endpoints().runs_since(WORKFLOW, since));
        for page in pages {
            self.routes.push((url.clone(), MockResponse::ok(page.clone())));
        }
        self
    }

    /// Run list pages served for the latest-run query, one per fetch
    pub fn with_most_recent(mut self, pages: &[String]) -> Self {
        let url = route(endpoints().most_recent_run(WORKFLOW));
        for page in pages {
            self.routes.push((url.clone(), MockResponse::ok(page.clone())));
        }
        self
    }

    // ===== Configuration =====

    /// Limit the total wait for a run
    pub fn with_max_wait_secs(mut self, secs: u64) -> Self {
        self.polling.max_wait_secs = secs;
        self
    }

    /// Limit the since-search attempts
    pub fn with_since_max_attempts(mut self, attempts: u32) -> Self {
        self.polling.since_max_attempts = attempts;
        self
    }

    // ===== Actions =====

    /// Trigger the workflow with a JSON body
    pub fn trigger_post(mut self, trigger: &str, body: &str) -> Self {
        self.steps.push(ScenarioStep::TriggerPost {
            trigger: trigger.to_string(),
            body: body.to_string(),
        });
        self
    }

    /// Trigger the workflow with GET
    pub fn trigger_get(mut self, trigger: &str) -> Self {
        self.steps.push(ScenarioStep::TriggerGet {
            trigger: trigger.to_string(),
        });
        self
    }

    /// Wait for the current run to settle
    pub fn wait_for_run(mut self) -> Self {
        self.steps.push(ScenarioStep::WaitForRun);
        self
    }

    /// Look for a run started at or after `since`
    pub fn find_run_since(mut self, since: DateTime<Utc>) -> Self {
        self.steps.push(ScenarioStep::FindRunSince { since });
        self
    }

    /// Wait for the latest run to settle
    pub fn find_recent_completed_run(mut self) -> Self {
        self.steps.push(ScenarioStep::FindRecentCompletedRun);
        self
    }

    /// Load history of the triggered run
    pub fn load_history(mut self) -> Self {
        self.steps.push(ScenarioStep::LoadHistory);
        self
    }

    /// Load history of an existing run
    pub fn load_run(mut self, run_id: &str) -> Self {
        self.steps.push(ScenarioStep::LoadRun {
            run_id: run_id.to_string(),
        });
        self
    }

    /// Generate a test sample from a run
    pub fn generate_sample(mut self, run_id: &str, include_skipped: bool) -> Self {
        self.steps.push(ScenarioStep::GenerateSample {
            run_id: run_id.to_string(),
            include_skipped,
        });
        self
    }

    /// Run the last added step again, expecting it to fail
    pub fn expect_failure(mut self, error: ErrorMatch) -> Self {
        if let Some(step) = self.steps.pop() {
            self.steps.push(ScenarioStep::ExpectFailure {
                step: Box::new(step),
                error,
            });
        }
        self
    }

    // ===== Assertions =====

    /// Add a general assertion
    pub fn assert(mut self, assertion: Assertion) -> Self {
        self.steps.push(ScenarioStep::Assert { assertion });
        self
    }

    /// Assert with arbitrary code against the manager
    pub fn check<F>(self, check: F) -> Self
    where
        F: Fn(&mut TestManager) -> anyhow::Result<()> + 'static,
    {
        self.assert(Assertion::Custom(Box::new(check)))
    }

    /// Assert the run status (cached)
    pub fn assert_run_status(self, status: WorkflowRunStatus) -> Self {
        self.assert(Assertion::RunStatus(status))
    }

    /// Assert an action's status; the name is formatted
    pub fn assert_action(self, action: &str, status: ActionStatus) -> Self {
        self.assert(Assertion::ActionStatus {
            action: action.to_string(),
            status,
        })
    }

    /// Assert the trigger status
    pub fn assert_trigger(self, status: TriggerStatus) -> Self {
        self.assert(Assertion::TriggerStatus(status))
    }

    /// Assert how often a route was called
    pub fn assert_hits(self, url: &str, count: usize) -> Self {
        self.assert(Assertion::RouteHits {
            url: url.to_string(),
            count,
        })
    }

    /// Assert the exact poll delays
    pub fn assert_sleeps(self, delays: &[Duration]) -> Self {
        self.assert(Assertion::Sleeps(delays.to_vec()))
    }

    // ===== Execution =====

    /// Execute the scenario and return results
    pub fn run(self) -> ScenarioResult {
        let mut runner = match ScenarioRunner::new(self.routes, &self.polling) {
            Ok(r) => r,
            Err(e) => {
                return ScenarioResult {
                    name: self.name.clone(),
                    success: false,
                    steps_executed: 0,
                    failure_step: Some(0),
                    error: Some(format!("Failed to create runner: {:#}", e)),
                }
            }
        };

        match runner.execute(&self.steps) {
            Ok(()) => ScenarioResult {
                name: self.name,
                success: true,
                steps_executed: self.steps.len(),
                failure_step: None,
                error: None,
            },
            Err(e) => {
                let failure_step = runner.current_step();
                ScenarioResult {
                    name: self.name,
                    success: false,
                    steps_executed: failure_step,
                    failure_step: Some(failure_step),
                    error: Some(format!("{:?}", e)),
                }
            }
        }
    }
}

/// Result of running a scenario
#[derive(Debug)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub steps_executed: usize,
    pub failure_step: Option<usize>,
    pub error: Option<String>,
}

impl ScenarioResult {
    /// Unwrap the result, panicking if it failed
    pub fn unwrap(self) {
        if !self.success {
            panic!(
                "Scenario '{}' failed at step {}: {}",
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }

    /// Expect the result to be successful
    pub fn expect(self, msg: &str) {
        if !self.success {
            panic!(
                "{}: Scenario '{}' failed at step {}: {}",
                msg,
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }
}

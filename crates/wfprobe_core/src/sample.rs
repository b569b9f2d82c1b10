//! Test skeleton generation from an observed run.
//!
//! Templates are plain strings with `{{Placeholder}}` markers:
//! - test template: `{{WorkflowName}}`, `{{TriggerName}}`, `{{RunStatus}}`,
//!   `{{ActionAssertions}}`
//! - assertion template: `{{ActionName}}`, `{{ActionStatus}}`

use crate::error::Result;
use crate::model::RunActionsDocument;
use crate::status::ActionStatus;
use crate::transport::ApiTransport;
use crate::trigger::TriggerResolver;
use serde_json::Value;
use tracing::debug;

/// Default test template: a Rust integration test driving [`crate::TestManager`].
pub const DEFAULT_TEST_TEMPLATE: &str = r#"//! Generated from a recorded run of {{WorkflowName}}.

use std::path::Path;
use wfprobe_core::{ActionStatus, Config, TestManager, WorkflowRunStatus};

const TRIGGER_MESSAGE: &str = include_str!("{{WorkflowName}}.trigger.json");

#[test]
fn recorded_run_replays() -> wfprobe_core::Result<()> {
    let mut config = Config::load(Path::new("wfprobe.toml"))?;
    config.logic_app.workflow_name = "{{WorkflowName}}".to_string();
    let mut manager = TestManager::connect(config)?;

    manager.trigger_with_post(TRIGGER_MESSAGE, "{{TriggerName}}")?;
    manager.wait_for_run()?;
    manager.load_workflow_run_history()?;

    assert_eq!(
        manager.workflow_run_status("", true)?,
        WorkflowRunStatus::from_provider("{{RunStatus}}")
    );
{{ActionAssertions}}
    Ok(())
}
"#;

/// Default per-action assertion.
pub const DEFAULT_ACTION_ASSERTION_TEMPLATE: &str = r#"    assert_eq!(
        manager.action_status("{{ActionName}}", "", false, false)?,
        ActionStatus::from_provider("{{ActionStatus}}")
    );"#;

/// Template pair used to render a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleTemplates {
    /// Whole-test template.
    pub test: String,
    /// Template rendered once per included action.
    pub action_assertion: String,
}

impl Default for SampleTemplates {
    fn default() -> Self {
        Self {
            test: DEFAULT_TEST_TEMPLATE.to_string(),
            action_assertion: DEFAULT_ACTION_ASSERTION_TEMPLATE.to_string(),
        }
    }
}

/// A generated test plus the message to trigger it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTestSample {
    /// Rendered test source.
    pub test_sample_code: String,
    /// Trigger message, unwrapped to its body for HTTP triggers.
    pub trigger_message: String,
}

/// Renders test samples from loaded runs.
#[derive(Debug, Clone, Default)]
pub struct SampleGenerator {
    templates: SampleTemplates,
    include_skipped_steps: bool,
}

impl SampleGenerator {
    /// Creates a generator with custom templates.
    pub fn new(templates: SampleTemplates) -> Self {
        Self {
            templates,
            include_skipped_steps: false,
        }
    }

    /// Whether actions with status `Skipped` get an assertion.
    pub fn include_skipped_steps(mut self, include: bool) -> Self {
        self.include_skipped_steps = include;
        self
    }

    /// Renders the test source for a run.
    pub fn render_script(&self, workflow_name: &str, document: &RunActionsDocument) -> String {
        let mut assertions = String::new();
        for action in &document.actions {
            if !self.include_skipped_steps && action.action_status() == ActionStatus::Skipped {
                continue;
            }
            let fragment = self
                .templates
                .action_assertion
                .replace("{{ActionName}}", &action.name)
                .replace("{{ActionStatus}}", &action.status);
            assertions.push_str(&fragment);
            assertions.push('\n');
        }

        self.templates
            .test
            .replace("{{WorkflowName}}", workflow_name)
            .replace("{{TriggerName}}", &document.trigger.name)
            .replace("{{RunStatus}}", &document.status)
            .replace("{{ActionAssertions}}", &assertions)
    }

    /// Renders the test and fetches the trigger message.
    pub fn generate(
        &self,
        transport: &dyn ApiTransport,
        workflow_name: &str,
        document: &RunActionsDocument,
    ) -> Result<GeneratedTestSample> {
        let test_sample_code = self.render_script(workflow_name, document);
        let raw_message = TriggerResolver::new(document).message(transport)?;

        Ok(GeneratedTestSample {
            test_sample_code,
            trigger_message: unwrap_trigger_message(raw_message),
        })
    }
}

/// Reduces an HTTP trigger envelope to its pretty-printed body.
///
/// Messages that are not a JSON object with both `body` and `headers` are
/// returned unchanged.
pub fn unwrap_trigger_message(raw: String) -> String {
    let parsed: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "trigger message is not JSON, keeping it as-is");
            return raw;
        }
    };

    let body = match parsed.as_object() {
        Some(envelope) if envelope.contains_key("headers") => envelope.get("body"),
        _ => None,
    };

    match body.map(serde_json::to_string_pretty) {
        Some(Ok(pretty)) => pretty,
        _ => raw,
    }
}

//! Management endpoints of a logic app and workflow triggering.

use crate::config::Config;
use crate::error::Result;
use crate::model::{CallbackUrl, RunId};
use crate::transport::{ApiRequest, ApiTransport, Endpoint, Method, Payload};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

/// Header carrying the id of the run started by a trigger invocation.
pub const RUN_ID_HEADER: &str = "x-ms-workflow-run-id";
/// Header carrying the client tracking id of the started run.
pub const TRACKING_ID_HEADER: &str = "x-ms-client-tracking-id";
/// Header carrying the correlation id of the invocation.
pub const CORRELATION_ID_HEADER: &str = "x-ms-correlation-id";

/// Builds management API paths for one logic app site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowEndpoints {
    subscription_id: String,
    resource_group: String,
    logic_app_name: String,
    api_version: String,
}

impl WorkflowEndpoints {
    /// Creates endpoints for a logic app site.
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        logic_app_name: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            logic_app_name: logic_app_name.into(),
            api_version: api_version.into(),
        }
    }

    /// Creates endpoints from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.logic_app.subscription_id,
            &config.logic_app.resource_group,
            &config.logic_app.logic_app_name,
            &config.api.api_version,
        )
    }

    fn workflow_path(&self, workflow: &str) -> String {
        format!(
            "subscriptions/{}/resourceGroups/{}/providers/Microsoft.Web/sites/{}/hostruntime/runtime/webhooks/workflow/api/management/workflows/{}",
            self.subscription_id, self.resource_group, self.logic_app_name, workflow
        )
    }

    /// Run status snapshot.
    pub fn run_details(&self, workflow: &str, run_id: &RunId) -> Endpoint {
        Endpoint::Management(format!(
            "{}/runs/{}?api-version={}",
            self.workflow_path(workflow),
            run_id,
            self.api_version
        ))
    }

    /// Run record with actions and workflow properties expanded.
    pub fn run_actions(&self, workflow: &str, run_id: &RunId) -> Endpoint {
        Endpoint::Management(format!(
            "{}/runs/{}?api-version={}&$expand=properties/actions,workflow/properties",
            self.workflow_path(workflow),
            run_id,
            self.api_version
        ))
    }

    /// Runs that started at or after `since`.
    pub fn runs_since(&self, workflow: &str, since: DateTime<Utc>) -> Endpoint {
        let filter = format!(
            "properties/startTime ge {}",
            since.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let encoded: String = url::form_urlencoded::byte_serialize(filter.as_bytes()).collect();
        Endpoint::Management(format!(
            "{}/runs?api-version={}&$filter={}",
            self.workflow_path(workflow),
            self.api_version,
            encoded
        ))
    }

    /// The latest run of a workflow.
    pub fn most_recent_run(&self, workflow: &str) -> Endpoint {
        Endpoint::Management(format!(
            "{}/runs?api-version={}&$top=1",
            self.workflow_path(workflow),
            self.api_version
        ))
    }

    /// Callback URL of a request trigger.
    pub fn trigger_callback(&self, workflow: &str, trigger: &str) -> Endpoint {
        Endpoint::Management(format!(
            "{}/triggers/{}/listCallbackUrl?api-version={}",
            self.workflow_path(workflow),
            trigger,
            self.api_version
        ))
    }
}

/// Outcome of invoking a workflow trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowResponse {
    /// HTTP status returned by the trigger.
    pub status: u16,
    /// Run started by the invocation, when the runtime reported one.
    pub run_id: Option<RunId>,
    /// Client tracking id of the run.
    pub client_tracking_id: Option<String>,
    /// Correlation id of the invocation.
    pub correlation_id: Option<String>,
    /// Response body (the workflow's Response action output, if any).
    pub body: String,
}

/// Invokes a request trigger and reports the run it started.
///
/// The trigger's signed callback URL is fetched first, then called with
/// `method` and the optional payload.
pub fn invoke_trigger(
    transport: &dyn ApiTransport,
    endpoints: &WorkflowEndpoints,
    workflow: &str,
    trigger: &str,
    method: Method,
    payload: Option<&Payload>,
) -> Result<WorkflowResponse> {
    let callback_body = transport
        .post(&endpoints.trigger_callback(workflow, trigger), None)?
        .body;
    let callback = CallbackUrl::from_json(&callback_body)?;

    let target = Endpoint::External(callback.value);
    let response = transport.send(ApiRequest {
        method,
        endpoint: &target,
        payload,
    })?;

    let run_id = response.header(RUN_ID_HEADER).map(RunId::from);
    info!(workflow, trigger, run_id = ?run_id, status = response.status, "workflow triggered");

    Ok(WorkflowResponse {
        status: response.status,
        run_id,
        client_tracking_id: response.header(TRACKING_ID_HEADER).map(str::to_string),
        correlation_id: response.header(CORRELATION_ID_HEADER).map(str::to_string),
        body: response.body,
    })
}

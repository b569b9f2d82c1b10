//! Documents returned by the workflow management API.
//!
//! All types tolerate unknown fields. Action and trigger records keep their
//! raw JSON alongside the typed view so tests can inspect anything the typed
//! fields do not cover.

use crate::error::{ProbeError, Result};
use crate::status::{ActionStatus, TriggerStatus, WorkflowRunStatus};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier of one execution of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Wraps a run identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RunId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Reference to a payload stored outside the run document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentLink {
    /// Signed URI of the payload.
    pub uri: String,
    /// Version tag of the stored content.
    #[serde(default)]
    pub content_version: Option<String>,
    /// Size of the stored content in bytes.
    #[serde(default)]
    pub content_size: Option<u64>,
    /// Hash of the stored content.
    #[serde(default)]
    pub content_hash: Option<ContentHash>,
}

/// Content hash reported next to a content link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentHash {
    /// Hash algorithm name (e.g. `md5`).
    pub algorithm: String,
    /// Encoded hash value.
    pub value: String,
}

/// Client tracking information of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    /// Tracking id supplied by the caller or generated by the runtime.
    #[serde(default)]
    pub client_tracking_id: Option<String>,
}

/// The workflow a run belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowReference {
    /// Resource id of the workflow version.
    #[serde(default)]
    pub id: Option<String>,
    /// Workflow name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Status snapshot of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDetails {
    /// Resource id of the run.
    #[serde(default)]
    pub id: String,
    /// Run identifier.
    #[serde(default)]
    pub name: String,
    /// Resource type.
    #[serde(rename = "type", default)]
    pub resource_type: String,
    /// Run properties.
    pub properties: RunProperties,
}

/// Properties of a run snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProperties {
    /// Raw provider status.
    #[serde(default)]
    pub status: String,
    /// Error code reported for failed runs.
    #[serde(default)]
    pub code: Option<String>,
    /// When the run started.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// When the run finished.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Correlation information.
    #[serde(default)]
    pub correlation: Option<Correlation>,
    /// Workflow the run belongs to.
    #[serde(default)]
    pub workflow: Option<WorkflowReference>,
    /// Error details for failed runs.
    #[serde(default)]
    pub error: Option<Value>,
}

impl RunDetails {
    /// Parses a run detail response body.
    pub fn from_json(body: &str) -> Result<Self> {
        parse_json(body, "run details")
    }

    /// Returns the run identifier.
    pub fn run_id(&self) -> RunId {
        RunId::new(self.name.clone())
    }

    /// Classifies the run status.
    pub fn status(&self) -> WorkflowRunStatus {
        WorkflowRunStatus::from_provider(&self.properties.status)
    }

    /// Returns the name of the workflow the run belongs to, if reported.
    pub fn workflow_name(&self) -> Option<&str> {
        self.properties
            .workflow
            .as_ref()
            .and_then(|w| w.name.as_deref())
            .or_else(|| workflow_name_from_id(&self.id))
    }
}

/// Extracts `{name}` from a resource id containing `/workflows/{name}/runs/`.
fn workflow_name_from_id(id: &str) -> Option<&str> {
    let mut segments = id.split('/');
    while let Some(segment) = segments.next() {
        if segment.eq_ignore_ascii_case("workflows") {
            return segments.next().filter(|s| !s.is_empty());
        }
    }
    None
}

/// A page of runs returned by the run list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRunList {
    /// Runs on this page.
    #[serde(default)]
    pub value: Vec<RunDetails>,
    /// Link to the next page, if any.
    #[serde(default)]
    pub next_link: Option<String>,
}

impl WorkflowRunList {
    /// Parses a run list response body.
    pub fn from_json(body: &str) -> Result<Self> {
        parse_json(body, "run list")
    }

    /// Returns the run with the latest start time.
    ///
    /// Runs without a start time sort before any timed run; on ties the
    /// entry listed first wins.
    pub fn most_recent(&self) -> Option<&RunDetails> {
        let mut best: Option<&RunDetails> = None;
        for run in &self.value {
            match best {
                Some(current) if run.properties.start_time <= current.properties.start_time => {}
                _ => best = Some(run),
            }
        }
        best
    }
}

/// Per-step record of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    /// Canonical action name (spaces already replaced by the provider).
    pub name: String,
    /// Raw provider status.
    pub status: String,
    /// Result code (e.g. `OK`, `ActionFailed`).
    pub code: Option<String>,
    /// When the action started.
    pub start_time: Option<DateTime<Utc>>,
    /// When the action finished.
    pub end_time: Option<DateTime<Utc>>,
    /// Link to the action inputs.
    pub inputs_link: Option<ContentLink>,
    /// Link to the action outputs.
    pub outputs_link: Option<ContentLink>,
    /// Error details for failed actions.
    pub error: Option<Value>,
    /// The action exactly as returned by the API.
    pub raw: Value,
}

/// Typed subset shared by action and trigger records.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepFields {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    inputs_link: Option<ContentLink>,
    #[serde(default)]
    outputs_link: Option<ContentLink>,
    #[serde(default)]
    error: Option<Value>,
}

impl ActionRecord {
    /// Builds a record from the JSON stored under `name` in the actions map.
    pub fn from_value(name: &str, raw: Value) -> Result<Self> {
        let fields: StepFields = serde_json::from_value(raw.clone()).map_err(|e| {
            ProbeError::Deserialization {
                context: format!("action {}", name),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            name: name.to_string(),
            status: fields.status,
            code: fields.code,
            start_time: fields.start_time,
            end_time: fields.end_time,
            inputs_link: fields.inputs_link,
            outputs_link: fields.outputs_link,
            error: fields.error,
            raw,
        })
    }

    /// Classifies the action status.
    pub fn action_status(&self) -> ActionStatus {
        ActionStatus::from_provider(&self.status)
    }
}

/// The trigger record of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRecord {
    /// Trigger name (e.g. `manual`).
    pub name: String,
    /// Raw provider status.
    pub status: String,
    /// Result code.
    pub code: Option<String>,
    /// When the trigger fired.
    pub start_time: Option<DateTime<Utc>>,
    /// When the trigger completed.
    pub end_time: Option<DateTime<Utc>>,
    /// Link to the trigger inputs.
    pub inputs_link: Option<ContentLink>,
    /// Link to the triggering message.
    pub outputs_link: Option<ContentLink>,
    /// The trigger exactly as returned by the API.
    pub raw: Value,
}

impl TriggerRecord {
    /// Builds a record from the `properties.trigger` JSON.
    pub fn from_value(raw: Value) -> Result<Self> {
        let fields: StepFields =
            serde_json::from_value(raw.clone()).map_err(|e| ProbeError::Deserialization {
                context: "trigger".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            name: fields.name.unwrap_or_default(),
            status: fields.status,
            code: fields.code,
            start_time: fields.start_time,
            end_time: fields.end_time,
            inputs_link: fields.inputs_link,
            outputs_link: fields.outputs_link,
            raw,
        })
    }

    /// Classifies the trigger status.
    pub fn trigger_status(&self) -> TriggerStatus {
        TriggerStatus::from_provider(&self.status)
    }
}

/// Run record fetched with actions and workflow properties expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct RunActionsDocument {
    /// Resource id of the run.
    pub id: String,
    /// Run identifier.
    pub name: String,
    /// Raw provider status of the run.
    pub status: String,
    /// Workflow the run belongs to.
    pub workflow: Option<WorkflowReference>,
    /// The trigger that started the run.
    pub trigger: TriggerRecord,
    /// Actions in document order.
    pub actions: Vec<ActionRecord>,
}

#[derive(Deserialize)]
struct RunActionsWire {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    properties: RunActionsWireProperties,
}

#[derive(Deserialize)]
struct RunActionsWireProperties {
    #[serde(default)]
    status: String,
    #[serde(default)]
    workflow: Option<WorkflowReference>,
    #[serde(default)]
    trigger: Option<Value>,
    #[serde(default)]
    actions: Map<String, Value>,
}

impl RunActionsDocument {
    /// Parses a run-with-actions response body.
    ///
    /// The actions object keeps the order it had in the body. A key that is
    /// repeated in the body keeps its last value, so each canonical name maps
    /// to at most one record.
    pub fn from_json(body: &str) -> Result<Self> {
        let wire: RunActionsWire = parse_json(body, "run actions")?;
        let trigger = match wire.properties.trigger {
            Some(raw) => TriggerRecord::from_value(raw)?,
            None => {
                return Err(ProbeError::Deserialization {
                    context: "run actions".to_string(),
                    reason: "properties.trigger is missing".to_string(),
                })
            }
        };

        let actions = wire
            .properties
            .actions
            .into_iter()
            .map(|(name, raw)| ActionRecord::from_value(&name, raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: wire.id,
            name: wire.name,
            status: wire.properties.status,
            workflow: wire.properties.workflow,
            trigger,
            actions,
        })
    }

    /// Classifies the run status.
    pub fn run_status(&self) -> WorkflowRunStatus {
        WorkflowRunStatus::from_provider(&self.status)
    }

    /// Returns the name of the workflow the run belongs to, if reported.
    pub fn workflow_name(&self) -> Option<&str> {
        self.workflow
            .as_ref()
            .and_then(|w| w.name.as_deref())
            .or_else(|| workflow_name_from_id(&self.id))
    }
}

/// Response of a trigger's `listCallbackUrl` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackUrl {
    /// Signed invocation URL.
    pub value: String,
    /// HTTP method the trigger accepts.
    #[serde(default)]
    pub method: Option<String>,
}

impl CallbackUrl {
    /// Parses a `listCallbackUrl` response body.
    pub fn from_json(body: &str) -> Result<Self> {
        parse_json(body, "trigger callback url")
    }
}

fn parse_json<T: DeserializeOwned>(body: &str, context: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| ProbeError::Deserialization {
        context: context.to_string(),
        reason: e.to_string(),
    })
}

//! Lifecycle classifications derived from provider status strings.
//!
//! Every enum here is a pure function of the raw string reported by the
//! workflow runtime. Strings that are not recognised land on `Unknown`
//! carrying the original text, so classification never fails.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall state of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowRunStatus {
    /// Run is still executing.
    Running,
    /// Run is waiting on a concurrency slot.
    Waiting,
    /// Run completed successfully.
    Succeeded,
    /// Run completed with at least one failed action.
    Failed,
    /// Run was cancelled.
    Cancelled,
    /// Run was suspended.
    Suspended,
    /// Run was paused.
    Paused,
    /// Run exceeded its time limit.
    TimedOut,
    /// Run was aborted by the runtime.
    Aborted,
    /// Run was skipped.
    Skipped,
    /// Runtime did not specify a status.
    NotSpecified,
    /// Status string not recognised.
    Unknown(String),
}

impl WorkflowRunStatus {
    /// Classifies a provider status string.
    pub fn from_provider(raw: &str) -> Self {
        match raw {
            "Running" => Self::Running,
            "Waiting" => Self::Waiting,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "Cancelled" => Self::Cancelled,
            "Suspended" => Self::Suspended,
            "Paused" => Self::Paused,
            "TimedOut" => Self::TimedOut,
            "Aborted" => Self::Aborted,
            "Skipped" => Self::Skipped,
            "NotSpecified" => Self::NotSpecified,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns true while the run may still change state.
    ///
    /// Only `Running` is transient; every other value ends a poll.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true when the run finished successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for WorkflowRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(raw) => write!(f, "Unknown({})", raw),
            other => write!(f, "{:?}", other),
        }
    }
}

/// State of a single action within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionStatus {
    /// Action is executing.
    Running,
    /// Action is waiting (e.g. on a callback).
    Waiting,
    /// Action completed successfully.
    Succeeded,
    /// Action failed.
    Failed,
    /// Action did not run because its run-after conditions were not met.
    Skipped,
    /// Action timed out.
    TimedOut,
    /// Action was cancelled.
    Cancelled,
    /// Action was aborted.
    Aborted,
    /// Action was ignored.
    Ignored,
    /// No action with the requested name exists in the run history.
    ActionDoesntExistInRunHistory,
    /// Status string not recognised.
    Unknown(String),
}

impl ActionStatus {
    /// Classifies a provider status string.
    pub fn from_provider(raw: &str) -> Self {
        match raw {
            "Running" => Self::Running,
            "Waiting" => Self::Waiting,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "Skipped" => Self::Skipped,
            "TimedOut" => Self::TimedOut,
            "Cancelled" => Self::Cancelled,
            "Aborted" => Self::Aborted,
            "Ignored" => Self::Ignored,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(raw) => write!(f, "Unknown({})", raw),
            other => write!(f, "{:?}", other),
        }
    }
}

/// State of the trigger that started a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerStatus {
    /// Trigger fired and produced outputs.
    Succeeded,
    /// Trigger failed.
    Failed,
    /// Trigger evaluated but did not fire.
    Skipped,
    /// Trigger is still running.
    Running,
    /// Trigger is waiting.
    Waiting,
    /// Trigger was cancelled.
    Cancelled,
    /// Trigger timed out.
    TimedOut,
    /// Status string not recognised.
    Unknown(String),
}

impl TriggerStatus {
    /// Classifies a provider status string.
    pub fn from_provider(raw: &str) -> Self {
        match raw {
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "Skipped" => Self::Skipped,
            "Running" => Self::Running,
            "Waiting" => Self::Waiting,
            "Cancelled" => Self::Cancelled,
            "TimedOut" => Self::TimedOut,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for TriggerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(raw) => write!(f, "Unknown({})", raw),
            other => write!(f, "{:?}", other),
        }
    }
}

//! CLI commands.

pub mod actions;
pub mod latest;
pub mod sample;
pub mod status;
pub mod trigger;
pub mod wait;

use anyhow::{Context, Result};
use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::debug;
use wfprobe_core::{ActionStatus, Config, ProbeError, TestManager, TriggerStatus, WorkflowRunStatus};

/// Load configuration and connect to the management API.
pub fn connect(config_path: &Path) -> Result<TestManager> {
    debug!(path = %config_path.display(), "loading config");
    let config = Config::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    TestManager::connect(config).map_err(with_hint)
}

/// Attach the error's recovery suggestion, if it has one.
pub fn with_hint(error: ProbeError) -> anyhow::Error {
    match error.recovery_suggestion() {
        Some(hint) => anyhow::Error::new(error).context(hint),
        None => anyhow::Error::new(error),
    }
}

/// Spinner shown while polling.
pub fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

pub fn paint_run(status: &WorkflowRunStatus) -> StyledObject<String> {
    let text = style(status.to_string());
    match status {
        WorkflowRunStatus::Succeeded => text.green(),
        WorkflowRunStatus::Running | WorkflowRunStatus::Waiting => text.cyan(),
        WorkflowRunStatus::Skipped | WorkflowRunStatus::Cancelled => text.yellow(),
        WorkflowRunStatus::Unknown(_) | WorkflowRunStatus::NotSpecified => text.dim(),
        _ => text.red(),
    }
}

pub fn paint_action(status: &ActionStatus) -> StyledObject<String> {
    let text = style(status.to_string());
    match status {
        ActionStatus::Succeeded => text.green(),
        ActionStatus::Running | ActionStatus::Waiting => text.cyan(),
        ActionStatus::Skipped | ActionStatus::Ignored | ActionStatus::Cancelled => text.yellow(),
        ActionStatus::ActionDoesntExistInRunHistory | ActionStatus::Unknown(_) => text.dim(),
        _ => text.red(),
    }
}

pub fn paint_trigger(status: &TriggerStatus) -> StyledObject<String> {
    let text = style(status.to_string());
    match status {
        TriggerStatus::Succeeded => text.green(),
        TriggerStatus::Running | TriggerStatus::Waiting => text.cyan(),
        TriggerStatus::Skipped | TriggerStatus::Cancelled => text.yellow(),
        TriggerStatus::Unknown(_) => text.dim(),
        _ => text.red(),
    }
}

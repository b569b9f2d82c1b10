//! Action inspection commands.

use super::{connect, paint_action, with_hint};
use anyhow::Result;
use console::style;
use std::path::Path;

/// List every action of a run with its status.
pub fn list(config: &Path, run_id: &str, workflow: &str) -> Result<()> {
    let mut manager = connect(config)?;
    manager.load_run_history(workflow, run_id).map_err(with_hint)?;

    let statuses = manager.action_statuses(workflow, false).map_err(with_hint)?;
    if statuses.is_empty() {
        println!("No actions recorded for run {}", run_id);
        return Ok(());
    }

    let width = statuses.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    println!("{}", style(format!("Actions of run {}:", run_id)).bold());
    for (name, status) in &statuses {
        println!("  {:width$}  {}", name, paint_action(status), width = width);
    }
    Ok(())
}

/// Show one action, optionally with its inputs and outputs.
pub fn inspect(
    config: &Path,
    run_id: &str,
    workflow: &str,
    action: &str,
    format: bool,
    inputs: bool,
    outputs: bool,
) -> Result<()> {
    let mut manager = connect(config)?;
    manager.load_run_history(workflow, run_id).map_err(with_hint)?;

    let status = manager
        .action_status(action, workflow, false, format)
        .map_err(with_hint)?;
    println!("{} {}", style(action).bold(), paint_action(&status));

    if inputs {
        let message = manager
            .action_input_message(action, workflow, false, format)
            .map_err(with_hint)?;
        println!();
        println!("{}", style("Inputs:").bold());
        println!("{}", message);
    }
    if outputs {
        let message = manager
            .action_output_message(action, workflow, false, format)
            .map_err(with_hint)?;
        println!();
        println!("{}", style("Outputs:").bold());
        println!("{}", message);
    }
    Ok(())
}

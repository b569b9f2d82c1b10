//! Trigger command.

use super::{connect, paint_run, spinner, with_hint};
use anyhow::{Context, Result};
use console::style;
use std::fs;
use std::path::Path;
use wfprobe_core::{Method, Payload};

/// Invoke a request trigger, optionally waiting for the run it starts.
pub fn run(config: &Path, workflow: &str, trigger: &str, body: Option<&Path>, wait: bool) -> Result<()> {
    let mut manager = connect(config)?;

    let payload = match body {
        Some(path) => Some(Payload::json(
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?,
        )),
        None => None,
    };
    let method = if payload.is_some() { Method::Post } else { Method::Get };

    let response = manager
        .run_workflow(workflow, trigger, method, payload.as_ref())
        .map_err(with_hint)?;

    println!(
        "{} Trigger {} answered {}",
        style("→").cyan(),
        style(trigger).bold(),
        response.status
    );
    if let Some(id) = &response.client_tracking_id {
        println!("  Tracking id: {}", id);
    }
    if !response.body.is_empty() {
        println!("  Response:    {}", response.body);
    }

    let Some(run_id) = response.run_id.clone() else {
        println!("{} The trigger did not report a run id", style("⚠").yellow());
        return Ok(());
    };
    println!("  Run id:      {}", style(&run_id).cyan());

    if wait {
        let pb = spinner(&format!("Waiting for run {}...", run_id))?;
        let result = manager.wait_for_run_in(workflow);
        pb.finish_and_clear();
        let details = result.map_err(with_hint)?;
        println!("{} Run finished: {}", style("✓").green(), paint_run(&details.status()));
    }
    Ok(())
}

//! Run status command.

use super::{connect, paint_run, paint_trigger, with_hint};
use anyhow::Result;
use console::style;
use std::path::Path;

/// Show the status of a run and its trigger.
pub fn run(config: &Path, run_id: &str, workflow: &str) -> Result<()> {
    let mut manager = connect(config)?;
    manager.load_run_history(workflow, run_id).map_err(with_hint)?;

    let details = manager.run_details(workflow, false).map_err(with_hint)?;
    let trigger = manager.trigger_details(workflow, false).map_err(with_hint)?;

    println!("{} {}", style("Run").bold(), style(&details.name).cyan());
    if let Some(name) = details.workflow_name() {
        println!("  Workflow: {}", name);
    }
    println!("  Status:   {}", paint_run(&details.status()));
    if let Some(code) = &details.properties.code {
        println!("  Code:     {}", code);
    }
    if let Some(start) = details.properties.start_time {
        println!("  Started:  {}", start.to_rfc3339());
    }
    if let Some(end) = details.properties.end_time {
        println!("  Ended:    {}", end.to_rfc3339());
    }
    if let Some(tracking) = details
        .properties
        .correlation
        .as_ref()
        .and_then(|c| c.client_tracking_id.as_deref())
    {
        println!("  Tracking: {}", tracking);
    }
    println!(
        "  Trigger:  {} ({})",
        trigger.name,
        paint_trigger(&trigger.trigger_status())
    );

    Ok(())
}

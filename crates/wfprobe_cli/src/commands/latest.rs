//! Most recent run command.

use super::{connect, paint_run, spinner, with_hint};
use anyhow::Result;
use chrono::{DateTime, Utc};
use console::style;
use std::path::Path;

/// Show the most recent run, optionally restricted to runs since a time.
pub fn run(config: &Path, workflow: &str, since: Option<DateTime<Utc>>, completed: bool) -> Result<()> {
    let mut manager = connect(config)?;

    let found = match (since, completed) {
        (Some(since), false) => {
            let pb = spinner(&format!("Looking for a run since {}...", since.to_rfc3339()))?;
            let result = manager.most_recent_run_since(workflow, since);
            pb.finish_and_clear();
            result.map_err(with_hint)?
        }
        (Some(since), true) => {
            let pb = spinner(&format!(
                "Waiting for a run since {} to finish...",
                since.to_rfc3339()
            ))?;
            let result = manager.completed_run_since(workflow, since);
            pb.finish_and_clear();
            result.map_err(with_hint)?.map(|details| (*details).clone())
        }
        (None, true) => {
            let pb = spinner("Waiting for the latest run to finish...")?;
            let result = manager.recent_completed_run_details(workflow);
            pb.finish_and_clear();
            Some(result.map_err(with_hint)?)
        }
        (None, false) => manager.most_recent_run(workflow).map_err(with_hint)?,
    };

    let Some(details) = found else {
        println!("{} No run found", style("×").yellow());
        return Ok(());
    };

    println!(
        "{} {}",
        style(&details.name).cyan(),
        paint_run(&details.status())
    );
    if let Some(start) = details.properties.start_time {
        println!("  Started: {}", start.to_rfc3339());
    }
    Ok(())
}

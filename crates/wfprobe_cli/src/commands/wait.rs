//! Wait command.

use super::{connect, paint_run, spinner, with_hint};
use anyhow::Result;
use console::style;
use std::path::Path;

/// Poll a run until it leaves the running state.
pub fn run(config: &Path, run_id: &str, workflow: &str) -> Result<()> {
    let mut manager = connect(config)?;
    manager.select_run(run_id);

    let pb = spinner(&format!("Waiting for run {}...", run_id))?;
    let result = manager.wait_for_run_in(workflow);
    pb.finish_and_clear();

    let details = result.map_err(with_hint)?;
    println!(
        "{} Run {} finished: {}",
        style("✓").green(),
        style(&details.name).cyan(),
        paint_run(&details.status())
    );
    Ok(())
}

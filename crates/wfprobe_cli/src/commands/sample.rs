//! Test sample generation command.

use super::{connect, with_hint};
use anyhow::{Context, Result};
use console::style;
use std::fs;
use std::path::Path;

/// Generate a test from a recorded run and write or print it.
pub fn run(config: &Path, run_id: &str, include_skipped: bool, out: Option<&Path>) -> Result<()> {
    let mut manager = connect(config)?;
    let sample = manager
        .generate_test_sample(run_id, include_skipped)
        .map_err(with_hint)?;
    let workflow = manager.config().logic_app.workflow_name.clone();

    let Some(dir) = out else {
        println!("{}", sample.test_sample_code);
        println!("{}", style("// Trigger message:").dim());
        println!("{}", sample.trigger_message);
        return Ok(());
    };

    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let test_path = dir.join(format!("{}.rs", workflow));
    let message_path = dir.join(format!("{}.trigger.json", workflow));
    fs::write(&test_path, &sample.test_sample_code)
        .with_context(|| format!("Failed to write {}", test_path.display()))?;
    fs::write(&message_path, &sample.trigger_message)
        .with_context(|| format!("Failed to write {}", message_path.display()))?;

    println!("{} Wrote {}", style("✓").green(), test_path.display());
    println!("{} Wrote {}", style("✓").green(), message_path.display());
    Ok(())
}

//! wfprobe CLI - Inspect and exercise deployed Logic Apps Standard workflows.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "wfprobe")]
#[command(about = "Run monitoring and assertions for deployed workflows", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "wfprobe.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the status of a run and its trigger
    Status {
        /// Run ID
        run_id: String,
        /// Workflow name (defaults to the configured workflow)
        #[arg(short, long, default_value = "")]
        workflow: String,
    },
    /// Wait for a run to finish
    Wait {
        /// Run ID
        run_id: String,
        /// Workflow name (defaults to the configured workflow)
        #[arg(short, long, default_value = "")]
        workflow: String,
    },
    /// List actions of a run, or inspect one action
    Actions {
        /// Run ID
        run_id: String,
        /// Workflow name (defaults to the configured workflow)
        #[arg(short, long, default_value = "")]
        workflow: String,
        /// Action to inspect (as shown in the designer)
        #[arg(short, long)]
        action: Option<String>,
        /// Match the action name exactly, without replacing spaces
        #[arg(long)]
        no_format: bool,
        /// Print the action inputs
        #[arg(long)]
        inputs: bool,
        /// Print the action outputs
        #[arg(long)]
        outputs: bool,
    },
    /// Show the most recent run of a workflow
    Latest {
        /// Workflow name (defaults to the configured workflow)
        #[arg(short, long, default_value = "")]
        workflow: String,
        /// Only consider runs started at or after this RFC 3339 time
        #[arg(long, value_parser = parse_timestamp)]
        since: Option<DateTime<Utc>>,
        /// Wait for the run to finish
        #[arg(long)]
        completed: bool,
    },
    /// Generate a test skeleton from a recorded run
    Sample {
        /// Run ID
        run_id: String,
        /// Also assert on skipped actions
        #[arg(long)]
        include_skipped: bool,
        /// Directory to write the test and trigger message into (prints if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Invoke a request trigger
    Trigger {
        /// Workflow name (defaults to the configured workflow)
        #[arg(short, long, default_value = "")]
        workflow: String,
        /// Trigger name
        #[arg(short, long, default_value = "manual")]
        trigger: String,
        /// File with the JSON body to POST (sends GET if omitted)
        #[arg(short, long)]
        body: Option<PathBuf>,
        /// Wait for the started run to finish
        #[arg(long)]
        wait: bool,
    },
}

fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

fn main() -> Result<()> {
    // Respects RUST_LOG (e.g. RUST_LOG=wfprobe_core=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_path();

    match cli.command {
        Commands::Status { run_id, workflow } => commands::status::run(config, &run_id, &workflow),
        Commands::Wait { run_id, workflow } => commands::wait::run(config, &run_id, &workflow),
        Commands::Actions {
            run_id,
            workflow,
            action,
            no_format,
            inputs,
            outputs,
        } => match action {
            Some(action) => commands::actions::inspect(
                config,
                &run_id,
                &workflow,
                &action,
                !no_format,
                inputs,
                outputs,
            ),
            None => commands::actions::list(config, &run_id, &workflow),
        },
        Commands::Latest {
            workflow,
            since,
            completed,
        } => commands::latest::run(config, &workflow, since, completed),
        Commands::Sample {
            run_id,
            include_skipped,
            out,
        } => commands::sample::run(config, &run_id, include_skipped, out.as_deref()),
        Commands::Trigger {
            workflow,
            trigger,
            body,
            wait,
        } => commands::trigger::run(config, &workflow, &trigger, body.as_deref(), wait),
    }
}

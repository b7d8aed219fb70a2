//! Pulse CLI
//!
//! Replay widget scenarios through render sessions.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod runner;
mod scenario;

use runner::Runner;
use scenario::Scenario;

#[derive(Parser)]
#[command(name = "pulse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pulse widget event-synchronization CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario and report the final state
    Run {
        /// Scenario file
        scenario: PathBuf,

        /// Stop at the first failing step
        #[arg(long)]
        fail_fast: bool,
    },

    /// Validate a scenario and build its widgets without replaying it
    Check {
        /// Scenario file
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            fail_fast,
        } => cmd_run(&scenario, fail_fast),

        Commands::Check { scenario } => cmd_check(&scenario),
    }
}

fn cmd_run(path: &Path, fail_fast: bool) -> Result<()> {
    let scenario = Scenario::load(path)?;
    info!(
        "Running {} ({} widget(s), {} step(s), {} session(s))",
        scenario.scenario.name,
        scenario.widgets.len(),
        scenario.actions.len(),
        scenario.scenario.sessions
    );

    let mut runner = Runner::new(&scenario)?;
    let report = runner.run(&scenario.actions, fail_fast)?;

    print!("{}", runner.summary());
    println!();
    println!(
        "{} step(s), {} dropped, {} failed",
        report.steps,
        report.dropped,
        report.failures.len()
    );

    if !report.passed() {
        for failure in &report.failures {
            println!("  {failure}");
        }
        anyhow::bail!("Scenario '{}' failed", scenario.scenario.name);
    }
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let scenario = Scenario::load(path)?;
    Runner::new(&scenario)?;
    info!(
        "Scenario {} is valid ({} widget(s), {} step(s))",
        scenario.scenario.name,
        scenario.widgets.len(),
        scenario.actions.len()
    );
    Ok(())
}

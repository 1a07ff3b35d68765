//! Single-step commands: run one of the project's build steps by name

use anyhow::{Context, Result};
use flare_build::Executor;
use std::path::PathBuf;

/// Arguments shared by the single-step commands
pub struct StepArgs {
    /// Project directory
    pub project_dir: PathBuf,
    /// SDK root override
    pub sdk: Option<PathBuf>,
    /// Verbose output
    pub verbose: bool,
    /// JSON output
    pub json: bool,
}

/// Plan the project and run one named step (plus its predecessors)
pub fn run(step: &str, args: StepArgs) -> Result<()> {
    let planner = super::make_planner(&args.project_dir, args.sdk.as_deref())?;
    let plan = planner
        .plan(&args.project_dir)
        .context("Failed to construct the build graph")?;

    let target = plan.root_step(step);
    let summary = Executor::new(&plan.graph)
        .with_verbose(args.verbose)
        .run(&target)
        .with_context(|| format!("Step '{target}' failed"))?;

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "success": true,
                "target": target,
                "executed": summary.executed(),
                "skipped": summary.skipped(),
            })
        );
    } else {
        println!(
            "{target}: {} step(s) executed, {} up to date",
            summary.executed(),
            summary.skipped()
        );
    }

    Ok(())
}

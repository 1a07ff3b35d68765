//! Build command - run the full artifact pipeline for a project

use anyhow::{Context, Result};
use flare_build::planner::steps;
use flare_build::Executor;
use std::path::PathBuf;

/// Build command arguments
pub struct BuildArgs {
    /// Project directory
    pub project_dir: PathBuf,
    /// SDK root override
    pub sdk: Option<PathBuf>,
    /// Delete the build directory first
    pub clean: bool,
    /// Verbose output
    pub verbose: bool,
    /// Quiet output (errors only)
    pub quiet: bool,
    /// JSON output
    pub json: bool,
}

/// Run the build command
pub fn run(args: BuildArgs) -> Result<()> {
    let planner = super::make_planner(&args.project_dir, args.sdk.as_deref())?;
    let plan = planner
        .plan(&args.project_dir)
        .context("Failed to construct the build graph")?;

    let executor = Executor::new(&plan.graph).with_verbose(args.verbose);

    if args.clean {
        if !args.quiet && !args.json {
            println!("Cleaning build directory...");
        }
        executor
            .run(&plan.root_step(steps::CLEAN))
            .context("Clean failed")?;
    }

    let summary = executor
        .run(&plan.root_step(steps::BUILD))
        .context("Build failed")?;

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "success": true,
                "project": plan.root_project,
                "executed": summary.executed(),
                "skipped": summary.skipped(),
            })
        );
    } else if !args.quiet {
        println!(
            "Build of '{}' succeeded: {} step(s) executed, {} up to date",
            plan.root_project,
            summary.executed(),
            summary.skipped()
        );
    }

    Ok(())
}

pub mod build;
pub mod ide;
pub mod step;

use anyhow::{Context, Result};
use flare_build::Planner;
use flare_config::{ProjectConfig, Sdk};
use std::path::Path;

/// Locate the SDK for a project and construct the planner.
///
/// Precedence: the --sdk flag, then FLARE_SDK (clap folds the environment
/// variable into the flag), then 'sdk.root' from the project manifest.
pub fn make_planner(project_dir: &Path, explicit_sdk: Option<&Path>) -> Result<Planner> {
    let config = ProjectConfig::load_from_dir(project_dir)
        .with_context(|| format!("Failed to load project at {}", project_dir.display()))?;

    let sdk = Sdk::locate(explicit_sdk, config.sdk.root.as_deref(), project_dir)
        .context("Failed to locate the ActionScript SDK")?;

    Ok(Planner::new(sdk))
}

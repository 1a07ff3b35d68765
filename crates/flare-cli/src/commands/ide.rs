//! IDE command - generate the per-project module descriptor

use anyhow::{Context, Result};
use flare_build::IdeDescriptor;
use std::path::PathBuf;

/// IDE command arguments
pub struct IdeArgs {
    /// Project directory
    pub project_dir: PathBuf,
    /// Workspace root owning the .idea directory
    pub workspace_root: PathBuf,
    /// JSON output
    pub json: bool,
}

/// Run the IDE command
pub fn run(args: IdeArgs) -> Result<()> {
    let descriptor = IdeDescriptor::generate(&args.project_dir, &args.workspace_root)
        .context("Failed to resolve the IDE module descriptor")?;
    let path = descriptor
        .write()
        .context("Failed to write the IDE module file")?;

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "success": true,
                "module": descriptor.name(),
                "file": path.display().to_string(),
            })
        );
    } else {
        println!("Generated {}", path.display());
    }

    Ok(())
}

//! Dependency entry kinds
//!
//! A declared dependency is either a reference to another Flare project
//! (whose archive-compilation step becomes a hard predecessor of the
//! consumer) or a literal file collection. The raw manifest declaration is
//! an open shape; anything that fits neither kind is rejected here with an
//! unsupported-kind error rather than silently ignored.

use crate::error::{BuildError, BuildResult};
use flare_config::DependencyDecl;
use std::path::{Path, PathBuf};

/// A resolved dependency declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyEntry {
    /// Another Flare project; consuming it orders the consumer after the
    /// project's archive-compilation step
    Project { dir: PathBuf },
    /// Literal library locations; no ordering edge
    Files { paths: Vec<PathBuf> },
}

impl DependencyEntry {
    /// Interpret a manifest declaration, resolving relative paths against
    /// the declaring project's directory.
    pub fn from_decl(decl: &DependencyDecl, project_dir: &Path) -> BuildResult<Self> {
        match (&decl.project, &decl.files) {
            (Some(dir), None) => Ok(Self::Project {
                dir: resolve(project_dir, dir),
            }),
            (None, Some(files)) if !files.is_empty() => Ok(Self::Files {
                paths: files.iter().map(|f| resolve(project_dir, f)).collect(),
            }),
            _ => Err(BuildError::UnsupportedDependency(describe(decl))),
        }
    }
}

fn resolve(project_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}

fn describe(decl: &DependencyDecl) -> String {
    match (&decl.project, &decl.files) {
        (Some(_), Some(_)) => "entry declares both 'project' and 'files'".to_string(),
        (None, Some(_)) => "entry declares an empty 'files' list".to_string(),
        (None, None) => "entry declares neither 'project' nor 'files'".to_string(),
        _ => unreachable!(),
    }
}

//! Conventional output locations under a project's build directory
//!
//! Every artifact lives at a fixed path: the archive and the extracted or
//! compiled executable share the `libs/` directory, generated intermediates
//! live under `tmp/`, and step fingerprints under `stamps/`.

use std::path::{Path, PathBuf};

/// Name of the inner executable entry inside a generated archive
pub const ARCHIVE_INNER_SWF: &str = "library.swf";

/// Output layout for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    build_dir: PathBuf,
}

impl Layout {
    /// Create a layout rooted at the given build directory
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
        }
    }

    /// Conventional layout for a project directory (`<project>/build`)
    pub fn for_project(project_dir: &Path) -> Self {
        Self::new(project_dir.join("build"))
    }

    /// Build directory root
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Archive artifact path
    pub fn swc_path(&self) -> PathBuf {
        self.build_dir.join("libs").join("library.swc")
    }

    /// Executable artifact path (shared by compilation and extraction)
    pub fn swf_path(&self) -> PathBuf {
        self.build_dir.join("libs").join("executable.swf")
    }

    /// Generated class-manifest path
    pub fn class_list_path(&self) -> PathBuf {
        self.build_dir.join("tmp").join("classes.xml")
    }

    /// Fingerprint stamp path for a step name
    pub fn stamp_path(&self, step: &str) -> PathBuf {
        let file = step.replace([':', '/', '\\'], "_");
        self.build_dir.join("stamps").join(format!("{file}.json"))
    }
}

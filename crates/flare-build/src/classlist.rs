//! Class enumeration for embed-all-classes executable builds
//!
//! Walks the configured source roots and produces a manifest naming every
//! compilable unit. The executable compiler loads the manifest as an extra
//! config, forcing it to embed every discovered class rather than only
//! those reachable from the entry point.

use crate::error::{BuildError, BuildResult};
use crate::xml::XmlElement;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// ActionScript source extension
const SOURCE_EXTENSION: &str = "as";

/// Ordered list of fully-qualified class names discovered under the
/// source roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassManifest {
    entries: Vec<String>,
}

impl ClassManifest {
    /// Scan the given source roots, in declaration order.
    ///
    /// Within each root, relative paths are sorted lexically so the
    /// manifest is reproducible for a given filesystem state.
    pub fn scan(roots: &[PathBuf]) -> BuildResult<Self> {
        let mut entries = Vec::new();

        for root in roots {
            if !root.is_dir() {
                return Err(BuildError::SourceRootMissing(root.clone()));
            }

            let mut relative_paths: Vec<PathBuf> = WalkDir::new(root)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| {
                    e.file_type().is_file()
                        && e.path().extension().and_then(|s| s.to_str()) == Some(SOURCE_EXTENSION)
                })
                .filter_map(|e| e.path().strip_prefix(root).ok().map(Path::to_path_buf))
                .collect();
            relative_paths.sort();

            for relative in relative_paths {
                entries.push(qualified_name(&relative));
            }
        }

        Ok(Self { entries })
    }

    /// Discovered class names, in manifest order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the manifest document: a `flex-config` root wrapping an
    /// `includes` section with one `symbol` entry per class
    pub fn to_xml(&self) -> XmlElement {
        let includes = XmlElement::new("includes").children(
            self.entries
                .iter()
                .map(|entry| XmlElement::new("symbol").text(entry.clone())),
        );
        XmlElement::new("flex-config").child(includes)
    }

    /// Write the manifest document to the given path
    pub fn write_to(&self, path: &Path) -> BuildResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        fs::write(path, self.to_xml().render()).map_err(|e| BuildError::io(path, e))
    }
}

/// Derive `pkg.Name` (or `Name` at root level) from a root-relative path
fn qualified_name(relative: &Path) -> String {
    let class_name = relative
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let package: Vec<String> = relative
        .parent()
        .map(|dir| {
            dir.components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();

    if package.is_empty() {
        class_name
    } else {
        format!("{}.{}", package.join("."), class_name)
    }
}

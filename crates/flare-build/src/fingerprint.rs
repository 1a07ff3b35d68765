//! Step fingerprints for up-to-date detection
//!
//! A fingerprint is a sha-256 digest over a step's action and the contents
//! of its declared inputs (recursively, for directory inputs). A step is
//! up to date when its stored fingerprint matches the recomputed one and
//! all declared outputs exist.

use crate::error::{BuildError, BuildResult};
use crate::step::BuildStep;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Stored digest for one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    digest: String,
}

impl Fingerprint {
    /// Compute the fingerprint of a step's current inputs and action
    pub fn compute(step: &BuildStep) -> BuildResult<Self> {
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", step.action()).as_bytes());

        for input in step.inputs() {
            hash_path(&mut hasher, input)?;
        }

        Ok(Self {
            digest: format!("{:x}", hasher.finalize()),
        })
    }

    /// Load a stored fingerprint; any failure reads as "no stamp"
    pub fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Persist the fingerprint as a JSON stamp
    pub fn store(&self, path: &Path) -> BuildResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| BuildError::io(path, std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        fs::write(path, content).map_err(|e| BuildError::io(path, e))
    }
}

/// Feed one declared input into the digest.
///
/// Directories hash every contained file in sorted relative order; a
/// missing input hashes as a marker so its later appearance invalidates
/// the stamp.
fn hash_path(hasher: &mut Sha256, path: &Path) -> BuildResult<()> {
    if path.is_dir() {
        let mut files: Vec<_> = WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();

        for file in files {
            let relative = file.strip_prefix(path).unwrap_or(&file);
            hasher.update(relative.display().to_string().as_bytes());
            let content = fs::read(&file).map_err(|e| BuildError::io(&file, e))?;
            hasher.update(&content);
        }
    } else if path.is_file() {
        hasher.update(path.display().to_string().as_bytes());
        let content = fs::read(path).map_err(|e| BuildError::io(path, e))?;
        hasher.update(&content);
    } else {
        hasher.update(format!("missing:{}", path.display()).as_bytes());
    }
    Ok(())
}

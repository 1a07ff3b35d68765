//! ActionScript SDK location and tool paths
//!
//! The SDK is an external AIR/Flex distribution. Flare never inspects its
//! contents beyond the root existence check; the compiler jars and the
//! baseline config are conventional locations inside it.

use crate::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Environment variable naming the SDK root
pub const SDK_ENV_VAR: &str = "FLARE_SDK";

/// A located ActionScript SDK
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sdk {
    root: PathBuf,
}

impl Sdk {
    /// Resolve the SDK root from an explicit flag, the environment, or the
    /// manifest, in that precedence order. The root must exist.
    pub fn locate(
        explicit: Option<&Path>,
        manifest_root: Option<&Path>,
        project_dir: &Path,
    ) -> ConfigResult<Self> {
        let env_root = std::env::var_os(SDK_ENV_VAR).map(PathBuf::from);

        let root = explicit
            .map(Path::to_path_buf)
            .or(env_root)
            .or_else(|| manifest_root.map(Path::to_path_buf))
            .ok_or(ConfigError::SdkNotConfigured)?;

        // Manifest-relative paths resolve against the project directory
        let root = if root.is_absolute() {
            root
        } else {
            project_dir.join(root)
        };

        if !root.exists() {
            return Err(ConfigError::SdkMissing(root));
        }

        Ok(Self { root })
    }

    /// SDK root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Baseline platform configuration, loaded first by every invocation
    pub fn base_config(&self) -> PathBuf {
        self.root.join("frameworks").join("air-config.xml")
    }

    /// Frameworks directory, passed to the tools as the `flexlib` property
    pub fn frameworks_dir(&self) -> PathBuf {
        self.root.join("frameworks")
    }

    /// Archive (SWC) compiler jar
    pub fn swc_compiler(&self) -> PathBuf {
        self.root.join("lib").join("compc-cli.jar")
    }

    /// Executable (SWF) compiler jar
    pub fn swf_compiler(&self) -> PathBuf {
        self.root.join("lib").join("mxmlc-cli.jar")
    }
}

//! Flare configuration system
//!
//! Provides configuration management for Flare projects including:
//! - Project manifests (flare.toml)
//! - ActionScript SDK location and tool paths
//! - Dependency declarations (bundled and external partitions)
//!
//! # SDK resolution
//!
//! The SDK root is resolved in the following order (earlier wins):
//! 1. Explicit CLI flag (`--sdk`)
//! 2. `FLARE_SDK` environment variable
//! 3. `sdk.root` in the project manifest

pub mod project;
pub mod sdk;

use std::path::PathBuf;
use thiserror::Error;

pub use project::{
    BuildSection, Define, DependencyDecl, ProjectConfig, SwfKind,
};
pub use sdk::Sdk;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Manifest not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate dependency '{name}' in the {partition} partition")]
    DuplicateDependency { name: String, partition: String },

    #[error("Dependency '{name}' declared in both the bundled and external partitions")]
    ConflictingDependency { name: String },

    #[error("Missing ActionScript SDK path. Pass --sdk, set FLARE_SDK, or set 'sdk.root' in flare.toml")]
    SdkNotConfigured,

    #[error("ActionScript SDK path does not exist: {0}")]
    SdkMissing(PathBuf),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

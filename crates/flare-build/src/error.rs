/// Build orchestration error types
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Nothing to build. Set 'build.swc' or 'build.swf' in flare.toml")]
    NothingToBuild,

    #[error("Executable mode is 'archive', but archive production is disabled")]
    ExtractWithoutArchive,

    #[error("Missing main class. Set 'build.main_class' in flare.toml")]
    MissingMainClass,

    #[error("Entry point requires at least one source root")]
    NoSourceRoots,

    #[error("Unsupported dependency kind: {0}")]
    UnsupportedDependency(String),

    #[error("Unknown build step: {0}")]
    UnknownStep(String),

    #[error("Duplicate build step: {0}")]
    DuplicateStep(String),

    #[error("Cyclic dependency detected: {0}")]
    CyclicDependency(String),

    #[error("Source root is not a directory: {0}")]
    SourceRootMissing(PathBuf),

    #[error("{tool} exited with status {code}")]
    CompilerFailed { tool: String, code: i32 },

    #[error("Failed to launch {tool}: {error}")]
    SpawnFailed { tool: String, error: String },

    #[error("Archive entry '{entry}' not found in {archive}")]
    ArchiveEntryMissing { entry: String, archive: PathBuf },

    #[error("Archive error at {path}: {error}")]
    ArchiveError { path: PathBuf, error: String },

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] flare_config::ConfigError),
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }

    /// Create an archive error with path context
    pub fn archive(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::ArchiveError {
            path: path.into(),
            error: error.to_string(),
        }
    }

    /// Create a spawn failure for a compiler tool
    pub fn spawn(tool: impl Into<String>, error: impl ToString) -> Self {
        Self::SpawnFailed {
            tool: tool.into(),
            error: error.to_string(),
        }
    }
}

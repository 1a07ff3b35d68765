//! Project manifest
//!
//! Handles project metadata, build settings, and dependency declarations
//! for Flare projects. Sequence fields (sources, configs, defines, options)
//! preserve declaration order because the external compiler treats later
//! flags of the same kind as overriding earlier ones.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Conventional manifest file name
pub const MANIFEST_NAME: &str = "flare.toml";

/// Project manifest (flare.toml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// Project metadata
    pub project: ProjectMeta,

    /// SDK settings
    #[serde(default)]
    pub sdk: SdkSection,

    /// Build settings
    #[serde(default)]
    pub build: BuildSection,

    /// Dependency declarations
    #[serde(default)]
    pub dependencies: DependencySection,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectMeta {
    /// Project name
    pub name: String,
}

/// SDK settings from the manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SdkSection {
    /// SDK root directory (lowest-precedence source; see crate docs)
    pub root: Option<PathBuf>,
}

/// Executable artifact mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwfKind {
    /// Do not produce an executable
    #[default]
    None,
    /// Compile the executable from the configured entry-point class
    Entry,
    /// Extract the executable from the generated archive (no entry point)
    Archive,
}

/// A conditional-compilation define
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Define {
    /// Symbol name (e.g. `CONFIG::debug`)
    pub name: String,
    /// Symbol value (an ActionScript constant expression)
    pub value: String,
}

/// Build settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildSection {
    /// Produce the library archive artifact
    #[serde(default)]
    pub swc: bool,

    /// Executable artifact mode
    #[serde(default)]
    pub swf: SwfKind,

    /// Fully-qualified entry-point class for `swf = "entry"`
    pub main_class: Option<String>,

    /// Embed every discovered class in the executable, not just those
    /// reachable from the entry point
    #[serde(default = "default_true")]
    pub include_all_classes: bool,

    /// Source roots, in declaration order; the first is the conventional
    /// home of the entry-point file
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Extra compiler config files, in declaration order
    #[serde(default)]
    pub configs: Vec<PathBuf>,

    /// Conditional-compilation defines, in declaration order
    #[serde(default)]
    pub defines: Vec<Define>,

    /// Free-form compiler options, in declaration order
    #[serde(default)]
    pub options: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            swc: false,
            swf: SwfKind::None,
            main_class: None,
            include_all_classes: true,
            sources: Vec::new(),
            configs: Vec::new(),
            defines: Vec::new(),
            options: Vec::new(),
        }
    }
}

/// A single dependency declaration.
///
/// Exactly one of `project` or `files` must be set; any other shape is an
/// unsupported dependency kind, rejected when the declaration is resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DependencyDecl {
    /// Directory of another Flare project whose archive output is consumed
    pub project: Option<PathBuf>,

    /// Literal library file locations, consumed as-is
    pub files: Option<Vec<PathBuf>>,
}

impl DependencyDecl {
    /// Stable identity used for uniqueness checks and IDE entry names
    pub fn key(&self) -> String {
        match (&self.project, &self.files) {
            (Some(dir), _) => dir.display().to_string(),
            (None, Some(files)) => files
                .iter()
                .map(|f| f.display().to_string())
                .collect::<Vec<_>>()
                .join(","),
            (None, None) => String::new(),
        }
    }
}

/// The two dependency partitions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DependencySection {
    /// Merged into the consuming project's archive output
    #[serde(default)]
    pub bundled: Vec<DependencyDecl>,

    /// Assumed present at runtime; referenced but not merged
    #[serde(default)]
    pub external: Vec<DependencyDecl>,
}

impl ProjectConfig {
    /// Load a manifest from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load the conventional `flare.toml` from a project directory
    pub fn load_from_dir(dir: &Path) -> ConfigResult<Self> {
        Self::load_from_file(&dir.join(MANIFEST_NAME))
    }

    /// Validate the manifest
    pub fn validate(&self) -> ConfigResult<()> {
        if self.project.name.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "project.name".to_string(),
                reason: "name cannot be empty".to_string(),
            });
        }

        for define in &self.build.defines {
            if define.name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "build.defines".to_string(),
                    reason: "define name cannot be empty".to_string(),
                });
            }
        }

        let bundled = check_partition(&self.dependencies.bundled, "bundled")?;
        let external = check_partition(&self.dependencies.external, "external")?;

        if let Some(name) = bundled.intersection(&external).next() {
            return Err(ConfigError::ConflictingDependency { name: name.clone() });
        }

        Ok(())
    }

    /// Project name
    pub fn name(&self) -> &str {
        &self.project.name
    }

    /// Whether any artifact is requested
    pub fn produces_artifact(&self) -> bool {
        self.build.swc || self.build.swf != SwfKind::None
    }
}

/// Check one partition for duplicates and return its key set
fn check_partition(
    entries: &[DependencyDecl],
    partition: &str,
) -> ConfigResult<HashSet<String>> {
    let mut seen = HashSet::new();
    for entry in entries {
        let key = entry.key();
        if !seen.insert(key.clone()) {
            return Err(ConfigError::DuplicateDependency {
                name: key,
                partition: partition.to_string(),
            });
        }
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(content: &str) -> ProjectConfig {
        toml::from_str(content).unwrap()
    }

    #[rstest]
    #[case("none", SwfKind::None)]
    #[case("entry", SwfKind::Entry)]
    #[case("archive", SwfKind::Archive)]
    fn test_swf_kind_values(#[case] value: &str, #[case] expected: SwfKind) {
        let config = parse(&format!(
            "[project]\nname = \"game\"\n\n[build]\nswf = \"{value}\"\n"
        ));
        assert_eq!(config.build.swf, expected);
    }

    #[test]
    fn test_minimal_manifest() {
        let config = parse(
            r#"
[project]
name = "game"
"#,
        );
        assert_eq!(config.name(), "game");
        assert!(!config.build.swc);
        assert_eq!(config.build.swf, SwfKind::None);
        assert!(config.build.include_all_classes);
        assert!(!config.produces_artifact());
    }

    #[test]
    fn test_full_manifest() {
        let config = parse(
            r#"
[project]
name = "game"

[sdk]
root = "/opt/air-sdk"

[build]
swc = true
swf = "entry"
main_class = "com.example.Main"
sources = ["src", "generated"]
configs = ["build-config.xml"]
options = ["-optimize=true"]
defines = [
  { name = "CONFIG::debug", value = "false" },
  { name = "CONFIG::release", value = "true" },
]

[[dependencies.bundled]]
project = "../corelib"

[[dependencies.external]]
files = ["libs/runtime.swc"]
"#,
        );
        config.validate().unwrap();
        assert_eq!(config.sdk.root, Some(PathBuf::from("/opt/air-sdk")));
        assert_eq!(config.build.swf, SwfKind::Entry);
        assert_eq!(config.build.main_class.as_deref(), Some("com.example.Main"));
        assert_eq!(config.build.sources.len(), 2);
        assert_eq!(config.build.defines[0].name, "CONFIG::debug");
        assert_eq!(config.build.defines[1].value, "true");
        assert_eq!(config.dependencies.bundled.len(), 1);
        assert_eq!(
            config.dependencies.bundled[0].project,
            Some(PathBuf::from("../corelib"))
        );
        assert_eq!(config.dependencies.external[0].key(), "libs/runtime.swc");
        assert!(config.produces_artifact());
    }

    #[test]
    fn test_defines_preserve_declaration_order() {
        let config = parse(
            r#"
[project]
name = "game"

[build]
defines = [
  { name = "B", value = "2" },
  { name = "A", value = "1" },
]
"#,
        );
        let names: Vec<_> = config.build.defines.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_empty_name_rejected() {
        let config = parse(
            r#"
[project]
name = ""
"#,
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_duplicate_dependency_rejected() {
        let config = parse(
            r#"
[project]
name = "game"

[[dependencies.bundled]]
project = "../corelib"

[[dependencies.bundled]]
project = "../corelib"
"#,
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateDependency { .. })
        ));
    }

    #[test]
    fn test_conflicting_partitions_rejected() {
        let config = parse(
            r#"
[project]
name = "game"

[[dependencies.bundled]]
project = "../corelib"

[[dependencies.external]]
project = "../corelib"
"#,
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ConflictingDependency { .. })
        ));
    }

    #[test]
    fn test_load_from_dir_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProjectConfig::load_from_dir(dir.path());
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_dir_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_NAME),
            r#"
[project]
name = "lib"

[build]
swc = true
sources = ["src"]
"#,
        )
        .unwrap();

        let config = ProjectConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.name(), "lib");
        assert!(config.build.swc);
    }
}

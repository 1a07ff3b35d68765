//! Compiler command-line synthesis
//!
//! Pure construction of the argument lists passed to the external compc
//! (archive) and mxmlc (executable) tools. The external compiler gives
//! later flags of the same kind `+=` semantics, so argument order is part
//! of the contract and must be reproduced exactly: baseline config, extra
//! configs, defines, source paths, library paths, free options, `-output=`
//! last, and (executable only) the trailing entry-point source file.

use crate::error::{BuildError, BuildResult};
use crate::layout::Layout;
use flare_config::{Define, Sdk};
use std::path::PathBuf;

/// Everything argument synthesis depends on.
///
/// Library lists arrive already resolved; resolution and its ordering
/// edges are the planner's concern.
#[derive(Debug, Clone)]
pub struct CommandInputs<'a> {
    pub sdk: &'a Sdk,
    pub layout: &'a Layout,
    pub sources: &'a [PathBuf],
    pub configs: &'a [PathBuf],
    pub defines: &'a [Define],
    pub options: &'a [String],
    pub bundled_libs: &'a [PathBuf],
    pub external_libs: &'a [PathBuf],
    pub main_class: Option<&'a str>,
    pub include_all_classes: bool,
}

impl CommandInputs<'_> {
    /// Arguments for the archive compiler
    pub fn archive_args(&self) -> Vec<String> {
        let mut args = self.common_prefix();

        if !self.bundled_libs.is_empty() {
            args.push(format!("-include-libraries+={}", join(self.bundled_libs)));
        }
        if !self.external_libs.is_empty() {
            args.push(format!("-external-library-path+={}", join(self.external_libs)));
        }
        // Include every top-level unit found under the roots, not just
        // explicitly referenced ones
        if !self.sources.is_empty() {
            args.push(format!("-include-sources+={}", join(self.sources)));
        }

        args.extend(self.options.iter().cloned());
        args.push(format!("-output={}", self.layout.swc_path().display()));
        args
    }

    /// Arguments for the executable compiler.
    ///
    /// Fails when no entry-point class is configured or no source root can
    /// host the entry-point file.
    pub fn executable_args(&self) -> BuildResult<Vec<String>> {
        let entry = self.entry_point_source()?;
        let mut args = self.common_prefix();

        if self.include_all_classes {
            args.push(format!(
                "-load-config+={}",
                self.layout.class_list_path().display()
            ));
        }
        if !self.bundled_libs.is_empty() {
            args.push(format!("-include-libraries+={}", join(self.bundled_libs)));
        }
        if !self.external_libs.is_empty() {
            args.push(format!("-external-library-path+={}", join(self.external_libs)));
        }

        args.extend(self.options.iter().cloned());
        args.push(format!("-output={}", self.layout.swf_path().display()));
        args.push(entry.display().to_string());
        Ok(args)
    }

    /// Entry-point source file: the main class resolved against the first
    /// source root, with namespace separators converted to path separators.
    pub fn entry_point_source(&self) -> BuildResult<PathBuf> {
        let main_class = self.main_class.ok_or(BuildError::MissingMainClass)?;
        let root = self.sources.first().ok_or(BuildError::NoSourceRoots)?;

        let mut relative = PathBuf::new();
        for part in main_class.split('.') {
            relative.push(part);
        }
        relative.set_extension("as");
        Ok(root.join(relative))
    }

    /// Shared prefix for both modes: baseline config, extra configs,
    /// defines, source paths, each in declared order.
    fn common_prefix(&self) -> Vec<String> {
        let mut args = Vec::new();
        args.push(format!("-load-config={}", self.sdk.base_config().display()));
        for config in self.configs {
            args.push(format!("-load-config+={}", config.display()));
        }
        for define in self.defines {
            args.push(format!("-define+={},{}", define.name, define.value));
        }
        for source in self.sources {
            args.push(format!("-source-path+={}", source.display()));
        }
        args
    }
}

/// Comma-join a path list into a single argument value
fn join(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    struct Fixture {
        _sdk_dir: tempfile::TempDir,
        sdk: Sdk,
        layout: Layout,
    }

    fn fixture() -> Fixture {
        let sdk_dir = tempfile::tempdir().unwrap();
        let sdk = Sdk::locate(Some(sdk_dir.path()), None, Path::new(".")).unwrap();
        Fixture {
            sdk,
            layout: Layout::new("/proj/build"),
            _sdk_dir: sdk_dir,
        }
    }

    fn inputs<'a>(f: &'a Fixture, sources: &'a [PathBuf]) -> CommandInputs<'a> {
        CommandInputs {
            sdk: &f.sdk,
            layout: &f.layout,
            sources,
            configs: &[],
            defines: &[],
            options: &[],
            bundled_libs: &[],
            external_libs: &[],
            main_class: None,
            include_all_classes: false,
        }
    }

    #[test]
    fn test_archive_minimal_scenario() {
        let f = fixture();
        let sources = [PathBuf::from("/proj/src")];
        let args = inputs(&f, &sources).archive_args();

        assert_eq!(
            args,
            vec![
                format!("-load-config={}/frameworks/air-config.xml", f.sdk.root().display()),
                "-source-path+=/proj/src".to_string(),
                "-include-sources+=/proj/src".to_string(),
                "-output=/proj/build/libs/library.swc".to_string(),
            ]
        );
    }

    #[test]
    fn test_archive_full_ordering() {
        let f = fixture();
        let sources = [PathBuf::from("/proj/src"), PathBuf::from("/proj/gen")];
        let configs = [PathBuf::from("/proj/a.xml"), PathBuf::from("/proj/b.xml")];
        let defines = [
            Define {
                name: "CONFIG::debug".to_string(),
                value: "false".to_string(),
            },
            Define {
                name: "CONFIG::release".to_string(),
                value: "true".to_string(),
            },
        ];
        let options = ["-optimize=true".to_string(), "-strict=false".to_string()];
        let bundled = [PathBuf::from("/libs/core.swc"), PathBuf::from("/libs/ui.swc")];
        let external = [PathBuf::from("/libs/runtime.swc")];

        let mut inputs = inputs(&f, &sources);
        inputs.configs = &configs;
        inputs.defines = &defines;
        inputs.options = &options;
        inputs.bundled_libs = &bundled;
        inputs.external_libs = &external;

        let args = inputs.archive_args();
        assert_eq!(
            args,
            vec![
                format!("-load-config={}/frameworks/air-config.xml", f.sdk.root().display()),
                "-load-config+=/proj/a.xml".to_string(),
                "-load-config+=/proj/b.xml".to_string(),
                "-define+=CONFIG::debug,false".to_string(),
                "-define+=CONFIG::release,true".to_string(),
                "-source-path+=/proj/src".to_string(),
                "-source-path+=/proj/gen".to_string(),
                "-include-libraries+=/libs/core.swc,/libs/ui.swc".to_string(),
                "-external-library-path+=/libs/runtime.swc".to_string(),
                "-include-sources+=/proj/src,/proj/gen".to_string(),
                "-optimize=true".to_string(),
                "-strict=false".to_string(),
                "-output=/proj/build/libs/library.swc".to_string(),
            ]
        );
    }

    #[test]
    fn test_archive_empty_lists_emit_no_library_args() {
        let f = fixture();
        let args = inputs(&f, &[]).archive_args();
        assert!(!args.iter().any(|a| a.starts_with("-include-libraries")));
        assert!(!args.iter().any(|a| a.starts_with("-external-library-path")));
        assert!(!args.iter().any(|a| a.starts_with("-include-sources")));
    }

    #[test]
    fn test_executable_ordering_with_class_list() {
        let f = fixture();
        let sources = [PathBuf::from("/proj/src")];
        let bundled = [PathBuf::from("/libs/core.swc")];

        let mut inputs = inputs(&f, &sources);
        inputs.bundled_libs = &bundled;
        inputs.main_class = Some("com.example.Main");
        inputs.include_all_classes = true;

        let args = inputs.executable_args().unwrap();
        assert_eq!(
            args,
            vec![
                format!("-load-config={}/frameworks/air-config.xml", f.sdk.root().display()),
                "-source-path+=/proj/src".to_string(),
                "-load-config+=/proj/build/tmp/classes.xml".to_string(),
                "-include-libraries+=/libs/core.swc".to_string(),
                "-output=/proj/build/libs/executable.swf".to_string(),
                format!(
                    "/proj/src/com{sep}example{sep}Main.as",
                    sep = std::path::MAIN_SEPARATOR
                ),
            ]
        );
    }

    #[test]
    fn test_executable_without_class_list() {
        let f = fixture();
        let sources = [PathBuf::from("/proj/src")];
        let mut inputs = inputs(&f, &sources);
        inputs.main_class = Some("Main");

        let args = inputs.executable_args().unwrap();
        assert!(!args.iter().any(|a| a.contains("classes.xml")));
        // Entry point is the trailing positional, after -output=
        assert_eq!(args[args.len() - 2], "-output=/proj/build/libs/executable.swf");
        assert_eq!(args[args.len() - 1], format!("/proj/src{}Main.as", std::path::MAIN_SEPARATOR));
    }

    #[test]
    fn test_executable_missing_main_class() {
        let f = fixture();
        let sources = [PathBuf::from("/proj/src")];
        let result = inputs(&f, &sources).executable_args();
        assert!(matches!(result, Err(BuildError::MissingMainClass)));
    }

    #[test]
    fn test_executable_without_source_roots() {
        let f = fixture();
        let mut inputs = inputs(&f, &[]);
        inputs.main_class = Some("Main");
        assert!(matches!(
            inputs.executable_args(),
            Err(BuildError::NoSourceRoots)
        ));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let f = fixture();
        let sources = [PathBuf::from("/proj/src")];
        let defines = [Define {
            name: "CONFIG::debug".to_string(),
            value: "true".to_string(),
        }];
        let mut inputs = inputs(&f, &sources);
        inputs.defines = &defines;

        assert_eq!(inputs.archive_args(), inputs.archive_args());
    }

    #[test]
    fn test_options_precede_output() {
        let f = fixture();
        let sources = [PathBuf::from("/proj/src")];
        let options = ["-output=/elsewhere/evil.swc".to_string()];
        let mut inputs = inputs(&f, &sources);
        inputs.options = &options;

        let args = inputs.archive_args();
        // The configured output is always last, so a free-form option
        // cannot override it
        assert_eq!(args.last().unwrap(), "-output=/proj/build/libs/library.swc");
    }
}

//! IDE module descriptor generation
//!
//! Emits a Flex-flavored IntelliJ module file per project under the
//! workspace's `.idea/modules/` tree. Bundled dependencies appear with
//! merged linkage; external and indirect transitive dependencies appear
//! with external linkage. A project name never gets both linkages.

use crate::deps::DependencyEntry;
use crate::error::{BuildError, BuildResult};
use crate::xml::XmlElement;
use flare_config::ProjectConfig;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved content of one project's IDE module file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeDescriptor {
    name: String,
    workspace_root: PathBuf,
    /// Project directory relative to the workspace root
    rel_path: PathBuf,
    /// Bundled dependency names, merged linkage
    merged: Vec<String>,
    /// External plus indirect transitive dependency names
    external: Vec<String>,
    /// Source roots relative to the project directory
    source_roots: Vec<PathBuf>,
}

impl IdeDescriptor {
    /// Resolve the descriptor for the project at `project_dir`.
    ///
    /// Walks the transitive project-dependency graph of both partitions;
    /// names reached only indirectly are demoted to external linkage.
    /// File-collection dependencies have no module identity and do not
    /// appear in the descriptor.
    pub fn generate(project_dir: &Path, workspace_root: &Path) -> BuildResult<Self> {
        let project_dir = canonical(project_dir)?;
        let workspace_root = canonical(workspace_root)?;
        let config = ProjectConfig::load_from_dir(&project_dir)?;

        let merged = partition_names(&config.dependencies.bundled, &project_dir)?;
        let declared_external = partition_names(&config.dependencies.external, &project_dir)?;

        let mut stack = Vec::new();
        let mut seen = HashSet::new();
        let mut transitive = Vec::new();
        collect_transitive(&project_dir, &mut stack, &mut seen, &mut transitive)?;

        let mut external = declared_external;
        for name in transitive {
            if !merged.contains(&name) && !external.contains(&name) {
                external.push(name);
            }
        }

        let rel_path = project_dir
            .strip_prefix(&workspace_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(&config.project.name));

        let source_roots = config
            .build
            .sources
            .iter()
            .map(|source| {
                source
                    .strip_prefix(&project_dir)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| source.clone())
            })
            .collect();

        Ok(Self {
            name: config.project.name.clone(),
            workspace_root,
            rel_path,
            merged,
            external,
            source_roots,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names emitted with merged linkage
    pub fn merged(&self) -> &[String] {
        &self.merged
    }

    /// Names emitted with external linkage
    pub fn external(&self) -> &[String] {
        &self.external
    }

    /// Location of the module file under the workspace root
    pub fn module_file(&self) -> PathBuf {
        self.workspace_root
            .join(".idea/modules")
            .join(&self.rel_path)
            .join(format!("{}.iml", self.name))
    }

    /// Serialize and write the module file, creating parent directories
    pub fn write(&self) -> BuildResult<PathBuf> {
        let path = self.module_file();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        fs::write(&path, self.to_xml().render_document())
            .map_err(|e| BuildError::io(&path, e))?;
        Ok(path)
    }

    /// Build the module document tree
    pub fn to_xml(&self) -> XmlElement {
        // The module file lives at .idea/modules/<rel>/, so the content
        // url climbs back to the workspace root before descending to the
        // project directory.
        let rel = path_with_slashes(&self.rel_path);
        let dots = "/..".repeat(2 + self.rel_path.components().count());
        let content_url = format!("file://$MODULE_DIR${dots}/{rel}");

        let mut entries = XmlElement::new("entries");
        for name in &self.merged {
            entries = entries.child(dependency_entry(name, "Merged"));
        }
        for name in &self.external {
            entries = entries.child(dependency_entry(name, "External"));
        }

        let configuration = XmlElement::new("configuration")
            .attr("name", &self.name)
            .attr("target-platform", "Desktop")
            .attr("pure-as", "true")
            .attr("output-type", "Library")
            .attr("skip-build", "true")
            .child(
                XmlElement::new("dependencies")
                    .attr("target-player", "32.0")
                    .child(entries)
                    .child(XmlElement::new("sdk").attr("name", "SDK")),
            )
            .child(
                XmlElement::new("compiler-options").child(
                    XmlElement::new("option")
                        .attr("name", "additionalConfigFilePath")
                        .attr("value", "$MODULE_DIR$/config.xml"),
                ),
            )
            .child(XmlElement::new("packaging-air-desktop"))
            .child(XmlElement::new("packaging-android"))
            .child(XmlElement::new("packaging-ios"));

        let mut content = XmlElement::new("content").attr("url", content_url.clone());
        for root in &self.source_roots {
            content = content.child(
                XmlElement::new("sourceFolder")
                    .attr(
                        "url",
                        format!("{content_url}/{}", path_with_slashes(root)),
                    )
                    .attr("isTestSource", "false"),
            );
        }

        let mut root_manager = XmlElement::new("component")
            .attr("name", "NewModuleRootManager")
            .attr("inherit-compiler-output", "true")
            .child(XmlElement::new("exclude-output"))
            .child(content)
            .child(
                XmlElement::new("orderEntry")
                    .attr("type", "jdk")
                    .attr("jdkName", "SDK")
                    .attr("jdkType", "Flex SDK Type (new)"),
            )
            .child(
                XmlElement::new("orderEntry")
                    .attr("type", "sourceFolder")
                    .attr("forTests", "false"),
            );
        for name in self.merged.iter().chain(self.external.iter()) {
            root_manager = root_manager.child(
                XmlElement::new("orderEntry")
                    .attr("type", "module")
                    .attr("module-name", name)
                    .attr("exported", ""),
            );
        }

        XmlElement::new("module")
            .attr("type", "Flex")
            .attr("version", "4")
            .child(
                XmlElement::new("component")
                    .attr("name", "FlexBuildConfigurationManager")
                    .attr("active", &self.name)
                    .child(XmlElement::new("configurations").child(configuration))
                    .child(XmlElement::new("compiler-options")),
            )
            .child(root_manager)
    }
}

/// Names of the project-reference dependencies in one declared partition
fn partition_names(
    decls: &[flare_config::DependencyDecl],
    project_dir: &Path,
) -> BuildResult<Vec<String>> {
    let mut names = Vec::new();
    for decl in decls {
        if let DependencyEntry::Project { dir } = DependencyEntry::from_decl(decl, project_dir)? {
            let config = ProjectConfig::load_from_dir(&canonical(&dir)?)?;
            names.push(config.project.name);
        }
    }
    Ok(names)
}

/// Depth-first walk over project-reference dependencies of both
/// partitions, recording every reached project name. `stack` holds the
/// active path for cycle reporting; `seen` short-circuits diamonds.
fn collect_transitive(
    dir: &Path,
    stack: &mut Vec<(PathBuf, String)>,
    seen: &mut HashSet<PathBuf>,
    names: &mut Vec<String>,
) -> BuildResult<()> {
    let config = ProjectConfig::load_from_dir(dir)?;

    if let Some(position) = stack.iter().position(|(d, _)| d == dir) {
        let mut cycle: Vec<&str> = stack[position..].iter().map(|(_, n)| n.as_str()).collect();
        cycle.push(&config.project.name);
        return Err(BuildError::CyclicDependency(cycle.join(" -> ")));
    }
    if !seen.insert(dir.to_path_buf()) {
        return Ok(());
    }

    stack.push((dir.to_path_buf(), config.project.name.clone()));
    for decl in config
        .dependencies
        .bundled
        .iter()
        .chain(config.dependencies.external.iter())
    {
        if let DependencyEntry::Project { dir: dep_dir } = DependencyEntry::from_decl(decl, dir)? {
            let dep_dir = canonical(&dep_dir)?;
            let dep_config = ProjectConfig::load_from_dir(&dep_dir)?;
            if !names.contains(&dep_config.project.name) {
                names.push(dep_config.project.name);
            }
            collect_transitive(&dep_dir, stack, seen, names)?;
        }
    }
    stack.pop();
    Ok(())
}

fn dependency_entry(name: &str, linkage: &str) -> XmlElement {
    XmlElement::new("entry")
        .attr("module-name", name)
        .attr("build-configuration-name", name)
        .child(XmlElement::new("dependency").attr("linkage", linkage))
}

fn path_with_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn canonical(path: &Path) -> BuildResult<PathBuf> {
    fs::canonicalize(path).map_err(|e| BuildError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_project(dir: &Path, name: &str, manifest_tail: &str) {
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::write(
            dir.join("flare.toml"),
            format!(
                "[project]\nname = \"{name}\"\n\n[build]\nswc = true\nsources = [\"src\"]\n{manifest_tail}"
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_indirect_dependency_gets_external_linkage() {
        let ws = tempfile::tempdir().unwrap();
        write_project(&ws.path().join("util"), "util", "");
        write_project(
            &ws.path().join("corelib"),
            "corelib",
            "[[dependencies.bundled]]\nproject = \"../util\"\n",
        );
        write_project(
            &ws.path().join("game"),
            "game",
            "[[dependencies.bundled]]\nproject = \"../corelib\"\n",
        );

        let descriptor =
            IdeDescriptor::generate(&ws.path().join("game"), ws.path()).unwrap();
        assert_eq!(descriptor.merged(), ["corelib".to_string()]);
        assert_eq!(descriptor.external(), ["util".to_string()]);

        let xml = descriptor.to_xml().render();
        assert!(xml.contains(
            "<entry module-name=\"corelib\" build-configuration-name=\"corelib\">"
        ));
        assert!(xml.contains("<dependency linkage=\"Merged\" />"));
        assert!(xml.contains("<dependency linkage=\"External\" />"));
        // One linkage per name
        assert_eq!(xml.matches("module-name=\"corelib\"").count(), 1);
        assert_eq!(xml.matches("module-name=\"util\"").count(), 1);
    }

    #[test]
    fn test_cyclic_project_graph_is_an_error() {
        let ws = tempfile::tempdir().unwrap();
        write_project(
            &ws.path().join("a"),
            "a",
            "[[dependencies.bundled]]\nproject = \"../b\"\n",
        );
        write_project(
            &ws.path().join("b"),
            "b",
            "[[dependencies.bundled]]\nproject = \"../a\"\n",
        );

        let result = IdeDescriptor::generate(&ws.path().join("a"), ws.path());
        assert!(matches!(result, Err(BuildError::CyclicDependency(_))));
    }

    #[test]
    fn test_content_url_climbs_to_workspace_root() {
        let ws = tempfile::tempdir().unwrap();
        write_project(&ws.path().join("game"), "game", "");

        let descriptor =
            IdeDescriptor::generate(&ws.path().join("game"), ws.path()).unwrap();
        let xml = descriptor.to_xml().render();
        assert!(xml.contains("url=\"file://$MODULE_DIR$/../../../game\""));
        assert!(xml.contains(
            "sourceFolder url=\"file://$MODULE_DIR$/../../../game/src\" isTestSource=\"false\""
        ));
    }

    #[test]
    fn test_write_places_module_under_idea_modules() {
        let ws = tempfile::tempdir().unwrap();
        write_project(&ws.path().join("game"), "game", "");

        let descriptor =
            IdeDescriptor::generate(&ws.path().join("game"), ws.path()).unwrap();
        let path = descriptor.write().unwrap();
        assert!(path.ends_with(".idea/modules/game/game.iml"));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(content.contains("<module type=\"Flex\" version=\"4\">"));
        assert!(content.contains("active=\"game\""));
    }

    #[test]
    fn test_diamond_dependency_listed_once() {
        let ws = tempfile::tempdir().unwrap();
        write_project(&ws.path().join("base"), "base", "");
        write_project(
            &ws.path().join("left"),
            "left",
            "[[dependencies.bundled]]\nproject = \"../base\"\n",
        );
        write_project(
            &ws.path().join("right"),
            "right",
            "[[dependencies.bundled]]\nproject = \"../base\"\n",
        );
        write_project(
            &ws.path().join("game"),
            "game",
            "[[dependencies.bundled]]\nproject = \"../left\"\n\n[[dependencies.bundled]]\nproject = \"../right\"\n",
        );

        let descriptor =
            IdeDescriptor::generate(&ws.path().join("game"), ws.path()).unwrap();
        assert_eq!(
            descriptor.merged(),
            ["left".to_string(), "right".to_string()]
        );
        assert_eq!(descriptor.external(), ["base".to_string()]);
    }
}

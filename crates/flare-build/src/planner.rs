//! Task graph construction from project manifests
//!
//! Loads a project (and, recursively, every project it references through
//! its dependency partitions), resolves dependencies into library locations
//! and ordering edges, synthesizes the compiler invocations, and declares
//! the full step set for each project. Steps are declared exactly once;
//! dependency resolution happens here, at construction time, so edges are
//! never registered twice.

use crate::command::CommandInputs;
use crate::deps::DependencyEntry;
use crate::error::{BuildError, BuildResult};
use crate::graph::TaskGraph;
use crate::layout::{Layout, ARCHIVE_INNER_SWF};
use crate::step::{BuildStep, CompilerInvocation, StepAction};
use flare_config::{DependencyDecl, ProjectConfig, Sdk, SwfKind};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Short step names, namespaced per project via [`step_id`]
pub mod steps {
    pub const PREPARE_SOURCES: &str = "prepare-sources";
    pub const COMPILE_SWC: &str = "compile-swc";
    pub const ENUMERATE_CLASSES: &str = "enumerate-classes";
    pub const COMPILE_SWF: &str = "compile-swf";
    pub const EXTRACT_SWF: &str = "extract-swf";
    pub const BUILD: &str = "build";
    pub const CLEAN: &str = "clean";
}

/// Full step name for a project
pub fn step_id(project: &str, step: &str) -> String {
    format!("{project}:{step}")
}

/// A planned build: the task graph plus the root project's name
#[derive(Debug)]
pub struct BuildPlan {
    pub graph: TaskGraph,
    pub root_project: String,
}

impl BuildPlan {
    /// Full name of one of the root project's steps
    pub fn root_step(&self, step: &str) -> String {
        step_id(&self.root_project, step)
    }
}

/// Builds task graphs from project directories
pub struct Planner {
    sdk: Sdk,
}

impl Planner {
    pub fn new(sdk: Sdk) -> Self {
        Self { sdk }
    }

    /// Plan the project at the given directory and everything it references
    pub fn plan(&self, project_dir: &Path) -> BuildResult<BuildPlan> {
        let mut graph = TaskGraph::new();
        let mut planned = HashMap::new();
        let mut loading = Vec::new();

        let root_project =
            self.plan_project(project_dir, &mut graph, &mut planned, &mut loading)?;
        graph.validate()?;

        Ok(BuildPlan {
            graph,
            root_project,
        })
    }

    /// Declare one project's steps, recursing into project dependencies
    /// first. Returns the project's name.
    fn plan_project(
        &self,
        dir: &Path,
        graph: &mut TaskGraph,
        planned: &mut HashMap<PathBuf, String>,
        loading: &mut Vec<String>,
    ) -> BuildResult<String> {
        let dir = fs::canonicalize(dir).map_err(|e| BuildError::io(dir, e))?;
        if let Some(name) = planned.get(&dir) {
            return Ok(name.clone());
        }

        let config = ProjectConfig::load_from_dir(&dir)?;
        let name = config.name().to_string();

        if loading.contains(&name) {
            let mut cycle = loading.clone();
            cycle.push(name);
            return Err(BuildError::CyclicDependency(cycle.join(" -> ")));
        }
        loading.push(name.clone());

        let (bundled_libs, bundled_producers) =
            self.resolve_partition(&config.dependencies.bundled, &dir, graph, planned, loading)?;
        let (external_libs, external_producers) =
            self.resolve_partition(&config.dependencies.external, &dir, graph, planned, loading)?;

        loading.pop();

        // Artifact-selection policy, checked before any step is declared
        if !config.produces_artifact() {
            return Err(BuildError::NothingToBuild);
        }
        if config.build.swf == SwfKind::Archive && !config.build.swc {
            return Err(BuildError::ExtractWithoutArchive);
        }
        if config.build.swf == SwfKind::Entry && config.build.main_class.is_none() {
            return Err(BuildError::MissingMainClass);
        }

        let layout = Layout::for_project(&dir);
        let sources: Vec<PathBuf> =
            config.build.sources.iter().map(|p| absolute(&dir, p)).collect();
        let configs: Vec<PathBuf> =
            config.build.configs.iter().map(|p| absolute(&dir, p)).collect();

        let inputs = CommandInputs {
            sdk: &self.sdk,
            layout: &layout,
            sources: &sources,
            configs: &configs,
            defines: &config.build.defines,
            options: &config.build.options,
            bundled_libs: &bundled_libs,
            external_libs: &external_libs,
            main_class: config.build.main_class.as_deref(),
            include_all_classes: config.build.include_all_classes,
        };

        let prepare_id = step_id(&name, steps::PREPARE_SOURCES);
        let swc_id = step_id(&name, steps::COMPILE_SWC);
        let classes_id = step_id(&name, steps::ENUMERATE_CLASSES);
        let swf_id = step_id(&name, steps::COMPILE_SWF);
        let extract_id = step_id(&name, steps::EXTRACT_SWF);

        graph.add_step(
            BuildStep::builder(&prepare_id)
                .description("Prepares ActionScript sources before compilation")
                .group("flare")
                .build(),
        )?;

        graph.add_step(
            BuildStep::builder(&swc_id)
                .description("Compiles the project into an SWC file")
                .group("flare")
                .depends_on(prepare_id.clone())
                .depends_on_all(bundled_producers.iter().cloned())
                .depends_on_all(external_producers.iter().cloned())
                .inputs(sources.iter().cloned())
                .inputs(configs.iter().cloned())
                .inputs(bundled_libs.iter().cloned())
                .inputs(external_libs.iter().cloned())
                .output(layout.swc_path())
                .stamp(layout.stamp_path(&swc_id))
                .action(StepAction::Compiler(CompilerInvocation {
                    tool: self.sdk.swc_compiler(),
                    flexlib: self.sdk.frameworks_dir(),
                    args: inputs.archive_args(),
                }))
                .build(),
        )?;

        graph.add_step(
            BuildStep::builder(&classes_id)
                .description("Generates the list of classes for the project")
                .group("flare")
                .inputs(sources.iter().cloned())
                .output(layout.class_list_path())
                .stamp(layout.stamp_path(&classes_id))
                .action(StepAction::WriteClassList {
                    roots: sources.clone(),
                    output: layout.class_list_path(),
                })
                .build(),
        )?;

        // The step is always declared so it can be invoked by name; the
        // argument synthesis needs an entry point, so without a main class
        // the step fails when run rather than vanishing from the graph
        let mut swf_builder = BuildStep::builder(&swf_id)
            .description("Compiles the project into an SWF file")
            .group("flare")
            .depends_on(prepare_id.clone());

        if config.build.main_class.is_some() {
            if config.build.include_all_classes {
                swf_builder = swf_builder
                    .depends_on(classes_id.clone())
                    .input(layout.class_list_path());
            }

            swf_builder = swf_builder
                .depends_on_all(bundled_producers.iter().cloned())
                .depends_on_all(external_producers.iter().cloned())
                .inputs(sources.iter().cloned())
                .inputs(configs.iter().cloned())
                .inputs(bundled_libs.iter().cloned())
                .inputs(external_libs.iter().cloned())
                .output(layout.swf_path())
                .stamp(layout.stamp_path(&swf_id))
                .action(StepAction::Compiler(CompilerInvocation {
                    tool: self.sdk.swf_compiler(),
                    flexlib: self.sdk.frameworks_dir(),
                    args: inputs.executable_args()?,
                }));
        } else {
            swf_builder = swf_builder.action(StepAction::MissingEntryPoint);
        }
        graph.add_step(swf_builder.build())?;

        graph.add_step(
            BuildStep::builder(&extract_id)
                .description("Extracts the SWF file from the generated SWC")
                .group("flare")
                .must_run_after(swc_id.clone())
                .input(layout.swc_path())
                .output(layout.swf_path())
                .stamp(layout.stamp_path(&extract_id))
                .action(StepAction::ExtractArchive {
                    archive: layout.swc_path(),
                    entry: ARCHIVE_INNER_SWF.to_string(),
                    dest: layout.swf_path(),
                })
                .build(),
        )?;

        graph.add_step(
            BuildStep::builder(step_id(&name, steps::CLEAN))
                .description("Cleans the build directory")
                .group("build")
                .action(StepAction::Clean {
                    dir: layout.build_dir().to_path_buf(),
                })
                .build(),
        )?;

        let mut build = BuildStep::builder(step_id(&name, steps::BUILD))
            .description("Builds the project")
            .group("build");
        if config.build.swc {
            build = build.depends_on(swc_id.clone());
        }
        match config.build.swf {
            SwfKind::Archive => build = build.depends_on(extract_id.clone()),
            SwfKind::Entry => build = build.depends_on(swf_id.clone()),
            SwfKind::None => {}
        }
        graph.add_step(build.build())?;

        planned.insert(dir, name.clone());
        Ok(name)
    }

    /// Resolve one dependency partition into library locations plus the
    /// producer steps the consumer must run after.
    fn resolve_partition(
        &self,
        decls: &[DependencyDecl],
        project_dir: &Path,
        graph: &mut TaskGraph,
        planned: &mut HashMap<PathBuf, String>,
        loading: &mut Vec<String>,
    ) -> BuildResult<(Vec<PathBuf>, Vec<String>)> {
        let mut libs = Vec::new();
        let mut producers = Vec::new();

        for decl in decls {
            match DependencyEntry::from_decl(decl, project_dir)? {
                DependencyEntry::Project { dir } => {
                    let dep_name = self.plan_project(&dir, graph, planned, loading)?;
                    let producer = step_id(&dep_name, steps::COMPILE_SWC);
                    let step = graph
                        .get(&producer)
                        .ok_or_else(|| BuildError::UnknownStep(producer.clone()))?;
                    libs.extend(step.outputs().iter().cloned());
                    producers.push(producer);
                }
                DependencyEntry::Files { paths } => libs.extend(paths),
            }
        }

        Ok((libs, producers))
    }
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

//! Build step values
//!
//! A step is declared once at graph-construction time and never mutated
//! afterwards: its inputs, outputs, predecessor edges, and action are all
//! fixed when the builder finishes. Which declared steps actually run is
//! the scheduler's decision.

use std::path::PathBuf;

/// A blocking invocation of one of the external compiler tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerInvocation {
    /// Tool jar (compc-cli.jar or mxmlc-cli.jar)
    pub tool: PathBuf,
    /// Frameworks directory, passed as the `flexlib` system property
    pub flexlib: PathBuf,
    /// Synthesized argument list, order-exact
    pub args: Vec<String>,
}

impl CompilerInvocation {
    /// Short tool name for diagnostics
    pub fn tool_name(&self) -> String {
        self.tool
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.tool.display().to_string())
    }
}

/// The side effect a step performs when executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Launch an external compiler
    Compiler(CompilerInvocation),
    /// Generate the class manifest from the source roots
    WriteClassList { roots: Vec<PathBuf>, output: PathBuf },
    /// Copy one entry out of an archive
    ExtractArchive {
        archive: PathBuf,
        entry: String,
        dest: PathBuf,
    },
    /// Executable compilation declared without an entry point; running
    /// the step reports the missing configuration
    MissingEntryPoint,
    /// Delete a directory tree
    Clean { dir: PathBuf },
    /// Pure ordering node (aggregate or extension hook)
    Nothing,
}

/// An immutable build step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    name: String,
    description: String,
    group: String,
    inputs: Vec<PathBuf>,
    outputs: Vec<PathBuf>,
    depends_on: Vec<String>,
    must_run_after: Vec<String>,
    stamp: Option<PathBuf>,
    action: StepAction,
}

impl BuildStep {
    /// Start building a step with the given name
    pub fn builder(name: impl Into<String>) -> StepBuilder {
        StepBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Declared inputs (files or directories), for up-to-date detection
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// Declared outputs
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    /// Hard predecessors: these run first, and their failure aborts this step
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    /// Soft ordering: applied only when both steps are scheduled
    pub fn must_run_after(&self) -> &[String] {
        &self.must_run_after
    }

    /// Fingerprint stamp location, when the step supports up-to-date skips
    pub fn stamp(&self) -> Option<&PathBuf> {
        self.stamp.as_ref()
    }

    pub fn action(&self) -> &StepAction {
        &self.action
    }
}

/// Builder returning an immutable [`BuildStep`]
#[derive(Debug)]
pub struct StepBuilder {
    step: BuildStep,
}

impl StepBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            step: BuildStep {
                name: name.into(),
                description: String::new(),
                group: String::new(),
                inputs: Vec::new(),
                outputs: Vec::new(),
                depends_on: Vec::new(),
                must_run_after: Vec::new(),
                stamp: None,
                action: StepAction::Nothing,
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.step.description = description.into();
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.step.group = group.into();
        self
    }

    pub fn input(mut self, input: impl Into<PathBuf>) -> Self {
        self.step.inputs.push(input.into());
        self
    }

    pub fn inputs(mut self, inputs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.step.inputs.extend(inputs);
        self
    }

    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.step.outputs.push(output.into());
        self
    }

    pub fn depends_on(mut self, step: impl Into<String>) -> Self {
        self.step.depends_on.push(step.into());
        self
    }

    pub fn depends_on_all(mut self, steps: impl IntoIterator<Item = String>) -> Self {
        self.step.depends_on.extend(steps);
        self
    }

    pub fn must_run_after(mut self, step: impl Into<String>) -> Self {
        self.step.must_run_after.push(step.into());
        self
    }

    pub fn stamp(mut self, path: impl Into<PathBuf>) -> Self {
        self.step.stamp = Some(path.into());
        self
    }

    pub fn action(mut self, action: StepAction) -> Self {
        self.step.action = action;
        self
    }

    /// Finish, fixing the step
    pub fn build(self) -> BuildStep {
        self.step
    }
}

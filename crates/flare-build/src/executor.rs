//! Step execution
//!
//! Runs a schedule sequentially; every action runs to completion before
//! the next starts. Compiler invocations block on the external tool with
//! inherited output streams (the tool's own diagnostics are the error
//! surface) and are never retried. A failing step aborts the run, so
//! nothing scheduled after it executes.

use crate::classlist::ClassManifest;
use crate::error::{BuildError, BuildResult};
use crate::fingerprint::Fingerprint;
use crate::graph::TaskGraph;
use crate::step::{BuildStep, CompilerInvocation, StepAction};
use std::fs;
use std::path::Path;
use std::process::Command;

/// What happened to one scheduled step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The action ran
    Executed,
    /// Skipped: stored fingerprint matched and all outputs exist
    UpToDate,
}

/// Per-step outcomes of a completed run
#[derive(Debug)]
pub struct RunSummary {
    outcomes: Vec<(String, StepOutcome)>,
}

impl RunSummary {
    /// Steps whose action ran
    pub fn executed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == StepOutcome::Executed)
            .count()
    }

    /// Steps skipped as up to date
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == StepOutcome::UpToDate)
            .count()
    }

    /// Outcome of a named step, if it was scheduled
    pub fn outcome_of(&self, step: &str) -> Option<StepOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == step)
            .map(|(_, o)| *o)
    }

    /// All outcomes, in execution order
    pub fn outcomes(&self) -> &[(String, StepOutcome)] {
        &self.outcomes
    }
}

/// Executes scheduled steps from a task graph
pub struct Executor<'a> {
    graph: &'a TaskGraph,
    verbose: bool,
}

impl<'a> Executor<'a> {
    pub fn new(graph: &'a TaskGraph) -> Self {
        Self {
            graph,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Schedule and run the target step and its predecessors
    pub fn run(&self, target: &str) -> BuildResult<RunSummary> {
        let schedule = self.graph.schedule(target)?;
        let mut outcomes = Vec::with_capacity(schedule.len());

        for name in schedule {
            let step = self
                .graph
                .get(&name)
                .ok_or_else(|| BuildError::UnknownStep(name.clone()))?;

            let fingerprint = match step.stamp() {
                Some(_) => Some(Fingerprint::compute(step)?),
                None => None,
            };

            if let (Some(stamp), Some(current)) = (step.stamp(), fingerprint.as_ref()) {
                if outputs_exist(step) && Fingerprint::load(stamp).as_ref() == Some(current) {
                    if self.verbose {
                        println!("Skipping {name} (up to date)");
                    }
                    outcomes.push((name, StepOutcome::UpToDate));
                    continue;
                }
            }

            if self.verbose {
                println!("Running {name}: {}", step.description());
            }
            self.run_action(step)?;

            if let (Some(stamp), Some(current)) = (step.stamp(), fingerprint) {
                current.store(stamp)?;
            }
            outcomes.push((name, StepOutcome::Executed));
        }

        Ok(RunSummary { outcomes })
    }

    fn run_action(&self, step: &BuildStep) -> BuildResult<()> {
        match step.action() {
            StepAction::Nothing => Ok(()),
            StepAction::Compiler(invocation) => {
                ensure_output_dirs(step)?;
                self.run_compiler(invocation)
            }
            StepAction::WriteClassList { roots, output } => {
                ClassManifest::scan(roots)?.write_to(output)
            }
            StepAction::ExtractArchive {
                archive,
                entry,
                dest,
            } => extract_entry(archive, entry, dest),
            StepAction::MissingEntryPoint => Err(BuildError::MissingMainClass),
            StepAction::Clean { dir } => {
                if dir.exists() {
                    fs::remove_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
                }
                Ok(())
            }
        }
    }

    /// Launch a compiler tool and block until it exits. Output streams are
    /// inherited; a non-zero exit fails the step.
    fn run_compiler(&self, invocation: &CompilerInvocation) -> BuildResult<()> {
        if self.verbose {
            println!(
                "Invoking {} with {} arguments",
                invocation.tool_name(),
                invocation.args.len()
            );
        }

        let status = Command::new("java")
            .arg(format!("-Dflexlib={}", invocation.flexlib.display()))
            .arg("-jar")
            .arg(&invocation.tool)
            .args(&invocation.args)
            .status()
            .map_err(|e| BuildError::spawn(invocation.tool_name(), e))?;

        if !status.success() {
            return Err(BuildError::CompilerFailed {
                tool: invocation.tool_name(),
                code: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }
}

fn outputs_exist(step: &BuildStep) -> bool {
    !step.outputs().is_empty() && step.outputs().iter().all(|o| o.exists())
}

fn ensure_output_dirs(step: &BuildStep) -> BuildResult<()> {
    for output in step.outputs() {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
    }
    Ok(())
}

/// Copy one entry out of a zip-format archive
fn extract_entry(archive: &Path, entry: &str, dest: &Path) -> BuildResult<()> {
    let file = fs::File::open(archive).map_err(|e| BuildError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| BuildError::archive(archive, e))?;

    let mut inner = match zip.by_name(entry) {
        Ok(inner) => inner,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(BuildError::ArchiveEntryMissing {
                entry: entry.to_string(),
                archive: archive.to_path_buf(),
            })
        }
        Err(e) => return Err(BuildError::archive(archive, e)),
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    let mut out = fs::File::create(dest).map_err(|e| BuildError::io(dest, e))?;
    std::io::copy(&mut inner, &mut out).map_err(|e| BuildError::io(dest, e))?;
    Ok(())
}

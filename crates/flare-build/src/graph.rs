//! Task graph construction and scheduling
//!
//! Holds every declared step, by name, and computes the execution schedule
//! for a requested step: the transitive closure of its hard predecessors,
//! topologically ordered, with soft `must_run_after` edges honored between
//! steps that are both scheduled.

use crate::error::{BuildError, BuildResult};
use crate::step::BuildStep;
use std::collections::{HashMap, HashSet};

/// All declared build steps
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    steps: HashMap<String, BuildStep>,
}

impl TaskGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
        }
    }

    /// Add a step; declaring the same name twice is an error
    pub fn add_step(&mut self, step: BuildStep) -> BuildResult<()> {
        let name = step.name().to_string();
        if self.steps.contains_key(&name) {
            return Err(BuildError::DuplicateStep(name));
        }
        self.steps.insert(name, step);
        Ok(())
    }

    /// Look up a step by name
    pub fn get(&self, name: &str) -> Option<&BuildStep> {
        self.steps.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// All step names, sorted
    pub fn step_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.steps.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check that every referenced predecessor exists
    pub fn validate(&self) -> BuildResult<()> {
        for (name, step) in &self.steps {
            for dep in step.depends_on().iter().chain(step.must_run_after()) {
                if !self.steps.contains_key(dep) {
                    return Err(BuildError::UnknownStep(format!(
                        "{dep} (referenced by {name})"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Compute the execution schedule for a target step.
    ///
    /// The schedule contains the target and its transitive hard
    /// predecessors, in an order where every step follows all of its hard
    /// predecessors and any scheduled `must_run_after` steps. Ties break
    /// lexically so the schedule is deterministic.
    pub fn schedule(&self, target: &str) -> BuildResult<Vec<String>> {
        let closure = self.closure(target)?;

        // Effective predecessor edges within the scheduled set
        let mut predecessors: HashMap<&str, HashSet<&str>> = HashMap::new();
        for name in &closure {
            let step = &self.steps[*name];
            let mut preds: HashSet<&str> = step
                .depends_on()
                .iter()
                .map(String::as_str)
                .collect();
            preds.extend(
                step.must_run_after()
                    .iter()
                    .map(String::as_str)
                    .filter(|soft| closure.contains(soft)),
            );
            predecessors.insert(*name, preds);
        }

        let mut scheduled: Vec<String> = Vec::with_capacity(closure.len());
        let mut done: HashSet<&str> = HashSet::new();

        while done.len() < closure.len() {
            let mut ready: Vec<&str> = closure
                .iter()
                .copied()
                .filter(|name| !done.contains(name))
                .filter(|name| predecessors[name].iter().all(|p| done.contains(p)))
                .collect();

            if ready.is_empty() {
                return Err(BuildError::CyclicDependency(self.find_cycle(&closure)));
            }

            ready.sort_unstable();
            for name in ready {
                done.insert(name);
                scheduled.push(name.to_string());
            }
        }

        Ok(scheduled)
    }

    /// Transitive hard-predecessor closure of a target step
    fn closure<'a>(&'a self, target: &str) -> BuildResult<HashSet<&'a str>> {
        let (target_key, _) = self
            .steps
            .get_key_value(target)
            .ok_or_else(|| BuildError::UnknownStep(target.to_string()))?;

        let mut closure: HashSet<&str> = HashSet::new();
        let mut pending = vec![target_key.as_str()];

        while let Some(name) = pending.pop() {
            if !closure.insert(name) {
                continue;
            }
            let step = &self.steps[name];
            for dep in step.depends_on() {
                let (key, _) = self.steps.get_key_value(dep).ok_or_else(|| {
                    BuildError::UnknownStep(format!("{dep} (referenced by {name})"))
                })?;
                pending.push(key.as_str());
            }
        }

        Ok(closure)
    }

    /// Render a cycle path for error reporting
    fn find_cycle(&self, within: &HashSet<&str>) -> String {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        let mut names: Vec<&str> = within.iter().copied().collect();
        names.sort_unstable();

        for name in names {
            if let Some(cycle) = self.dfs_cycle(name, within, &mut visited, &mut stack) {
                return cycle;
            }
        }

        "unknown cycle".to_string()
    }

    fn dfs_cycle<'a>(
        &'a self,
        name: &'a str,
        within: &HashSet<&str>,
        visited: &mut HashSet<&'a str>,
        stack: &mut Vec<&'a str>,
    ) -> Option<String> {
        if let Some(start) = stack.iter().position(|n| *n == name) {
            let mut path: Vec<&str> = stack[start..].to_vec();
            path.push(name);
            return Some(path.join(" -> "));
        }
        if !visited.insert(name) {
            return None;
        }

        stack.push(name);
        let step = &self.steps[name];
        for dep in step.depends_on().iter().chain(step.must_run_after()) {
            if within.contains(dep.as_str()) {
                if let Some(cycle) = self.dfs_cycle(dep, within, visited, stack) {
                    return Some(cycle);
                }
            }
        }
        stack.pop();
        None
    }
}

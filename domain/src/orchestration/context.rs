//! Running context threaded between sub-tasks.

use crate::subtask::{DependencyError, SubTaskId, SubTaskOutcome, SubTaskSpec};
use std::collections::{HashMap, HashSet};

/// Effective outputs of the sub-tasks processed so far.
///
/// The engine folds each terminal outcome in and resolves the next
/// sub-task's input from its declared dependencies only.
#[derive(Debug, Clone, Default)]
pub struct RunningContext {
    plan_ids: HashSet<SubTaskId>,
    outputs: HashMap<SubTaskId, Option<String>>,
}

impl RunningContext {
    /// Context for a validated decomposition.
    pub fn new(specs: &[SubTaskSpec]) -> Self {
        Self {
            plan_ids: specs.iter().map(|s| s.id.clone()).collect(),
            outputs: HashMap::new(),
        }
    }

    pub fn processed(&self) -> usize {
        self.outputs.len()
    }

    pub fn output_of(&self, id: &SubTaskId) -> Option<&str> {
        self.outputs.get(id).and_then(|o| o.as_deref())
    }

    /// Record a terminal outcome's effective output.
    pub fn fold(&mut self, outcome: &SubTaskOutcome) {
        self.outputs.insert(
            outcome.id().clone(),
            outcome.effective_output().map(str::to_string),
        );
    }

    /// Dependency context for `spec`, in declared order.
    ///
    /// `Ok(None)` when the sub-task declares no dependencies. Each section is
    /// headed `### Output of sub-task <id>`.
    pub fn resolve(&self, spec: &SubTaskSpec) -> Result<Option<String>, DependencyError> {
        if spec.declared_dependencies.is_empty() {
            return Ok(None);
        }

        let mut sections = Vec::with_capacity(spec.declared_dependencies.len());
        for dep in &spec.declared_dependencies {
            if !self.plan_ids.contains(dep) {
                return Err(DependencyError::Unknown {
                    sub_task: spec.id.clone(),
                    dependency: dep.clone(),
                });
            }
            let output = match self.outputs.get(dep) {
                None => {
                    return Err(DependencyError::NotYetProcessed {
                        sub_task: spec.id.clone(),
                        dependency: dep.clone(),
                    });
                }
                Some(None) => {
                    return Err(DependencyError::NoOutput {
                        sub_task: spec.id.clone(),
                        dependency: dep.clone(),
                    });
                }
                Some(Some(output)) => output,
            };
            sections.push(format!("### Output of sub-task {dep}\n{}", output.trim()));
        }

        Ok(Some(sections.join("\n\n")))
    }
}

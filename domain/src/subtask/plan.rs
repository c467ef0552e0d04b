//! Decomposition validation.
//!
//! A decomposition is usable when it is non-empty, every id is present and
//! unique, and `declared_dependencies` form no cycle. Forward references are
//! allowed here; they surface per sub-task as [`DependencyError::NotYetProcessed`]
//! when the engine reaches them.

use super::spec::{SubTaskId, SubTaskSpec};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Why a decomposition was rejected as a whole
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("decomposition produced no sub-tasks")]
    Empty,

    #[error("sub-task at position {0} has an empty id")]
    MissingId(usize),

    #[error("duplicate sub-task id: {0}")]
    DuplicateId(SubTaskId),

    #[error("sub-task {0} has an empty prompt")]
    EmptyPrompt(SubTaskId),

    #[error("dependency cycle through sub-task {0}")]
    Cycle(SubTaskId),
}

/// Why one sub-task's inputs could not be assembled
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error("sub-task {sub_task} depends on unknown sub-task {dependency}")]
    Unknown {
        sub_task: SubTaskId,
        dependency: SubTaskId,
    },

    #[error("sub-task {sub_task} depends on {dependency}, which has not run yet")]
    NotYetProcessed {
        sub_task: SubTaskId,
        dependency: SubTaskId,
    },

    #[error("sub-task {sub_task} depends on {dependency}, which produced no output")]
    NoOutput {
        sub_task: SubTaskId,
        dependency: SubTaskId,
    },
}

/// Validate a decomposition before any sub-task runs.
pub fn validate_specs(specs: &[SubTaskSpec]) -> Result<(), PlanError> {
    if specs.is_empty() {
        return Err(PlanError::Empty);
    }

    let mut seen = HashSet::new();
    for (position, spec) in specs.iter().enumerate() {
        if spec.id.as_str().trim().is_empty() {
            return Err(PlanError::MissingId(position));
        }
        if !seen.insert(&spec.id) {
            return Err(PlanError::DuplicateId(spec.id.clone()));
        }
        if spec.prompt_text.trim().is_empty() {
            return Err(PlanError::EmptyPrompt(spec.id.clone()));
        }
    }

    detect_cycle(specs)
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

fn detect_cycle(specs: &[SubTaskSpec]) -> Result<(), PlanError> {
    let by_id: HashMap<&SubTaskId, &SubTaskSpec> = specs.iter().map(|s| (&s.id, s)).collect();
    let mut marks: HashMap<&SubTaskId, Mark> = HashMap::new();

    for spec in specs {
        visit(&spec.id, &by_id, &mut marks)?;
    }
    Ok(())
}

fn visit<'a>(
    id: &'a SubTaskId,
    by_id: &HashMap<&'a SubTaskId, &'a SubTaskSpec>,
    marks: &mut HashMap<&'a SubTaskId, Mark>,
) -> Result<(), PlanError> {
    match marks.get(id) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => return Err(PlanError::Cycle(id.clone())),
        None => {}
    }

    // Unknown dependencies are reported per sub-task at run time
    let Some(&spec) = by_id.get(id) else {
        return Ok(());
    };

    marks.insert(id, Mark::Visiting);
    for dep in &spec.declared_dependencies {
        visit(dep, by_id, marks)?;
    }
    marks.insert(id, Mark::Done);
    Ok(())
}

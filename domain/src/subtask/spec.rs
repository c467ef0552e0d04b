//! Sub-task specification value objects.
//!
//! A [`SubTaskSpec`] is produced once by a decomposition strategy and never
//! mutated afterwards; everything that changes while the sub-task runs lives
//! in [`SubTaskOutcome`](super::outcome::SubTaskOutcome).

use serde::{Deserialize, Serialize};

/// Identifier of a sub-task within one decomposition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubTaskId(String);

impl SubTaskId {
    /// Creates a SubTaskId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for SubTaskId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for SubTaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of work a sub-task asks for.
///
/// Used by assignment strategies to look up per-type model preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Creative,
    Technical,
    Summarization,
    Analysis,
    Code,
    #[default]
    Other,
}

impl TaskType {
    pub const ALL: [TaskType; 6] = [
        TaskType::Creative,
        TaskType::Technical,
        TaskType::Summarization,
        TaskType::Analysis,
        TaskType::Code,
        TaskType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Creative => "creative",
            TaskType::Technical => "technical",
            TaskType::Summarization => "summarization",
            TaskType::Analysis => "analysis",
            TaskType::Code => "code",
            TaskType::Other => "other",
        }
    }

    /// Parse a task type leniently; unknown labels map to [`TaskType::Other`].
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse_strict(s).unwrap_or(TaskType::Other)
    }

    /// Parse a task type, returning `None` for unknown labels.
    pub fn parse_strict(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One unit of decomposed work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTaskSpec {
    pub id: SubTaskId,
    /// Prompt sent to the backend, before dependency context is merged in
    pub prompt_text: String,
    pub task_type: TaskType,
    /// What a good answer achieves; the judge falls back to `prompt_text`
    pub expected_goal: Option<String>,
    /// Prior sub-tasks whose effective outputs feed this one, in order
    pub declared_dependencies: Vec<SubTaskId>,
}

impl SubTaskSpec {
    pub fn new(id: impl Into<SubTaskId>, prompt_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt_text: prompt_text.into(),
            task_type: TaskType::Other,
            expected_goal: None,
            declared_dependencies: Vec::new(),
        }
    }

    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    pub fn with_expected_goal(mut self, goal: impl Into<String>) -> Self {
        self.expected_goal = Some(goal.into());
        self
    }

    /// Add a dependency. Repeated ids are ignored so the declared order is
    /// that of first mention.
    pub fn with_dependency(mut self, id: impl Into<SubTaskId>) -> Self {
        let id = id.into();
        if !self.declared_dependencies.contains(&id) {
            self.declared_dependencies.push(id);
        }
        self
    }

    /// Goal text handed to the judgment strategy.
    pub fn goal(&self) -> &str {
        match &self.expected_goal {
            Some(goal) if !goal.trim().is_empty() => goal,
            _ => &self.prompt_text,
        }
    }
}

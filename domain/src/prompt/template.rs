//! Prompt templates for each orchestration stage

use crate::core::model::ModelName;
use crate::subtask::{SubTaskSpec, TaskType};

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Prompt sent to the backend for one sub-task.
    ///
    /// Without dependency context the sub-task prompt is sent unchanged.
    pub fn subtask_prompt(spec: &SubTaskSpec, dependency_context: Option<&str>) -> String {
        match dependency_context {
            Some(context) if !context.trim().is_empty() => format!(
                r#"Use the results of the earlier steps below.

{}

---

{}"#,
                context.trim(),
                spec.prompt_text
            ),
            _ => spec.prompt_text.clone(),
        }
    }

    /// Prompt for the evaluator model.
    pub fn judge_prompt(goal: &str, output: &str) -> String {
        format!(
            r#"You are an expert evaluator. Given a sub-task and a model's answer, determine if the answer correctly and sufficiently fulfills the sub-task.

Sub-task:
{goal}

Model's answer:
{output}

Respond with 'YES' if the answer is correct and sufficient, 'NO' otherwise. Optionally, provide a confidence score (0-1) and a brief explanation, e.g.:
YES (0.95): The answer is correct and complete.
NO (0.2): The answer is missing key details."#
        )
    }

    /// Prompt asking a planner model to split a request into sub-tasks.
    pub fn decomposition_prompt(request: &str, context: Option<&str>) -> String {
        let types = TaskType::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
        let mut prompt = format!(
            r#"Break the following request into a short ordered list of sub-tasks that together answer it.
Each sub-task must be answerable on its own by a language model, given the outputs of the sub-tasks it depends on.

Request:
{request}
"#
        );
        if let Some(context) = context
            && !context.trim().is_empty()
        {
            prompt.push_str(&format!("\nAdditional context:\n{}\n", context.trim()));
        }
        prompt.push_str(&format!(
            r#"
Respond with JSON only, inside a ```json block:
```json
{{
  "subtasks": [
    {{
      "id": "1",
      "prompt": "self-contained instruction for this step",
      "task_type": "{types}",
      "expected_goal": "what a good answer achieves",
      "depends_on": []
    }}
  ]
}}
```
Use between 1 and 5 sub-tasks. Only reference earlier ids in depends_on."#
        ));
        prompt
    }

    /// Prompt asking a router model to pick a backend for a sub-task.
    pub fn selection_prompt(spec: &SubTaskSpec, candidates: &[ModelName]) -> String {
        let list = candidates
            .iter()
            .map(|m| format!("- {m}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            r#"Choose the best model for the following {} task.

Task:
{}

Available models:
{list}

Reply with the exact name of one model from the list."#,
            spec.task_type, spec.prompt_text
        )
    }

    /// Prompt asking a moderator model to merge sub-task outputs.
    pub fn synthesis_prompt(request: &str, sections: &[(String, String)]) -> String {
        let mut prompt = format!(
            r#"Original request: {request}

The request was answered in steps. Step results:
"#
        );
        for (id, content) in sections {
            prompt.push_str(&format!("\n--- Sub-task {id} ---\n{content}\n"));
        }
        prompt.push_str(
            r#"
Combine the step results into one coherent final answer to the original request.
Keep every correct detail, drop repetition, and do not mention the steps themselves."#,
        );
        prompt
    }
}

//! Sub-task list parsing from planner model replies.
//!
//! Accepts a ` ```json ` (or ` ```subtasks `) fenced block, or a reply that is
//! JSON on its own. The JSON may be an object with a `subtasks` (or `tasks`)
//! array, or the bare array.

use super::spec::{SubTaskSpec, TaskType};
use serde_json::Value;

/// Parse sub-tasks from a planner reply.
///
/// Returns `None` when no well-formed JSON sub-task list is found.
pub fn parse_subtasks(reply: &str) -> Option<Vec<SubTaskSpec>> {
    let mut in_block = false;
    let mut current_block = String::new();

    for line in reply.lines() {
        let trimmed = line.trim();
        if !in_block && (trimmed == "```json" || trimmed == "```subtasks") {
            in_block = true;
            current_block.clear();
        } else if in_block && trimmed == "```" {
            in_block = false;
            if let Ok(parsed) = serde_json::from_str::<Value>(&current_block)
                && let Some(specs) = parse_subtasks_json(&parsed)
            {
                return Some(specs);
            }
        } else if in_block {
            current_block.push_str(line);
            current_block.push('\n');
        }
    }

    if let Ok(parsed) = serde_json::from_str::<Value>(reply.trim()) {
        return parse_subtasks_json(&parsed);
    }

    // Some models wrap the JSON in prose without a fence
    let start = reply.find(['{', '['])?;
    let end = reply.rfind(['}', ']'])?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&reply[start..=end])
        .ok()
        .and_then(|parsed| parse_subtasks_json(&parsed))
}

fn json_value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse sub-tasks from a JSON value.
///
/// Expected schema:
/// ```json
/// {
///   "subtasks": [
///     {
///       "id": "1",
///       "prompt": "string",
///       "task_type": "analysis | creative | technical | summarization | code | other",
///       "expected_goal": "string (optional)",
///       "depends_on": ["id", ...]
///     }
///   ]
/// }
/// ```
///
/// Every entry needs a non-empty `id` and prompt text; one malformed entry
/// rejects the whole list. `content` and `description` are accepted in place
/// of `prompt`, `dependencies` in place of `depends_on`.
pub fn parse_subtasks_json(json: &Value) -> Option<Vec<SubTaskSpec>> {
    let items = match json {
        Value::Array(items) => items,
        Value::Object(_) => json
            .get("subtasks")
            .or_else(|| json.get("tasks"))
            .and_then(|v| v.as_array())?,
        _ => return None,
    };

    let mut specs = Vec::with_capacity(items.len());
    for item in items {
        let prompt = ["prompt", "content", "description"]
            .iter()
            .find_map(|key| item.get(*key).and_then(json_value_to_string))?;
        let id = item.get("id").and_then(json_value_to_string)?;

        let mut spec = SubTaskSpec::new(id, prompt);

        if let Some(task_type) = item.get("task_type").and_then(|v| v.as_str()) {
            spec = spec.with_task_type(TaskType::parse_lenient(task_type));
        }

        if let Some(goal) = item.get("expected_goal").and_then(json_value_to_string) {
            spec = spec.with_expected_goal(goal);
        }

        if let Some(deps) = item
            .get("depends_on")
            .or_else(|| item.get("dependencies"))
            .and_then(|v| v.as_array())
        {
            for dep in deps {
                if let Some(dep_id) = json_value_to_string(dep) {
                    spec = spec.with_dependency(dep_id);
                }
            }
        }

        specs.push(spec);
    }

    if specs.is_empty() { None } else { Some(specs) }
}

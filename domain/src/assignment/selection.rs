//! Model choice parsing for router-model replies.

use crate::core::model::ModelName;

/// Find the model a router reply names.
///
/// Returns the first candidate (in candidate order) mentioned in the reply,
/// compared case-insensitively. A mention only counts when it is not part of
/// a longer token, so `qwen3:1.7b-instruct` does not select `qwen3:1.7b`.
pub fn extract_model_name<'a>(reply: &str, candidates: &'a [ModelName]) -> Option<&'a ModelName> {
    let reply_lower = reply.to_lowercase();
    candidates
        .iter()
        .find(|model| mentions(&reply_lower, &model.as_str().to_lowercase()))
}

fn mentions(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(is_name_char) && !after.is_some_and(is_name_char)
    })
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '/')
}

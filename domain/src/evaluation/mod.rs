//! Evaluation domain
//!
//! Judging whether one execution fulfilled its sub-task.
//!
//! - [`EvaluationResult`]: verdict + clamped confidence + how it was obtained
//! - [`parse_judgment`]: read an evaluator model's YES/NO reply
//! - [`cosine_similarity`]: heuristic used when no evaluator answers

pub mod parsing;
pub mod similarity;
pub mod value_objects;

pub use parsing::{parse_confidence, parse_judgment};
pub use similarity::cosine_similarity;
pub use value_objects::{EvaluationResult, JudgmentMethod, Verdict};

//! Prompt domain
//!
//! Templates for generating prompts at each stage of a run: sub-task
//! execution, judging, decomposition, model selection and synthesis.

mod template;

pub use template::PromptTemplate;

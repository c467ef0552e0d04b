//! Evaluation value objects

use serde::{Deserialize, Serialize};

/// Pass/fail decision of a judgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a judgment was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JudgmentMethod {
    /// An evaluator model read the output and answered
    JudgeModel,
    /// Text similarity between goal and output; used when no judge answered
    SimilarityFallback,
}

impl JudgmentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            JudgmentMethod::JudgeModel => "judge-model",
            JudgmentMethod::SimilarityFallback => "similarity-fallback",
        }
    }
}

impl std::fmt::Display for JudgmentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Judgment of one successful execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub verdict: Verdict,
    /// Always within `0.0..=1.0`
    pub confidence: f64,
    pub method: JudgmentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl EvaluationResult {
    /// Build a result, clamping the confidence into `0.0..=1.0`.
    ///
    /// A NaN confidence is treated as zero.
    pub fn new(verdict: Verdict, confidence: f64, method: JudgmentMethod) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            verdict,
            confidence,
            method,
            feedback: None,
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        let feedback = feedback.into();
        self.feedback = if feedback.trim().is_empty() {
            None
        } else {
            Some(feedback)
        };
        self
    }

    /// Pass verdict with confidence at or above `threshold`.
    pub fn clears(&self, threshold: f64) -> bool {
        self.verdict.is_pass() && self.confidence >= threshold
    }
}

//! Judgment strategies.

use super::model_call::ModelCall;
use crate::ports::judgment::JudgmentStrategy;
use async_trait::async_trait;
use sage_domain::{
    EvaluationResult, JudgmentMethod, PromptTemplate, Verdict, cosine_similarity, parse_judgment,
};
use tracing::{debug, warn};

/// Bag-of-words similarity between goal and output
///
/// Passes when the similarity reaches `pass_threshold`; the similarity is
/// reported as the confidence.
#[derive(Debug, Clone)]
pub struct SimilarityJudgment {
    pass_threshold: f64,
}

impl SimilarityJudgment {
    pub fn new(pass_threshold: f64) -> Self {
        Self { pass_threshold }
    }

    pub fn evaluate(&self, goal: &str, output: &str) -> EvaluationResult {
        let similarity = cosine_similarity(goal, output);
        let verdict = if similarity >= self.pass_threshold {
            Verdict::Pass
        } else {
            Verdict::Fail
        };
        EvaluationResult::new(verdict, similarity, JudgmentMethod::SimilarityFallback)
            .with_feedback(format!("similarity {similarity:.2}"))
    }
}

#[async_trait]
impl JudgmentStrategy for SimilarityJudgment {
    fn name(&self) -> &'static str {
        "similarity"
    }

    async fn judge(&self, goal: &str, output: &str) -> EvaluationResult {
        self.evaluate(goal, output)
    }
}

/// Evaluator model answering YES/NO with a confidence
///
/// Falls back to [`SimilarityJudgment`] when the evaluator cannot be reached
/// or times out.
pub struct LlmJudgment {
    evaluator: ModelCall,
    fallback: SimilarityJudgment,
}

impl LlmJudgment {
    pub fn new(evaluator: ModelCall, fallback: SimilarityJudgment) -> Self {
        Self {
            evaluator,
            fallback,
        }
    }
}

#[async_trait]
impl JudgmentStrategy for LlmJudgment {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn judge(&self, goal: &str, output: &str) -> EvaluationResult {
        let prompt = PromptTemplate::judge_prompt(goal, output);
        match self.evaluator.send(&prompt).await {
            Ok(reply) => {
                let result = parse_judgment(&reply);
                debug!(
                    model = %self.evaluator.model(),
                    verdict = %result.verdict,
                    confidence = result.confidence,
                    "Judge replied"
                );
                result
            }
            Err(e) => {
                warn!(
                    "Judge model {} unavailable ({}), falling back to similarity",
                    self.evaluator.model(),
                    e
                );
                self.fallback.evaluate(goal, output)
            }
        }
    }
}

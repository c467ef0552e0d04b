//! Strategy implementations behind the orchestration ports.
//!
//! Each port has a deterministic implementation that needs no model and a
//! model-backed one built on [`ModelCall`]:
//!
//! | Port | Deterministic | Model-backed |
//! |------|---------------|--------------|
//! | Decomposition | [`SingleTaskDecomposition`], [`TemplateDecomposition`] | [`LlmDecomposition`] |
//! | Assignment | [`ConfiguredAssignment`] | [`LlmAssignment`] |
//! | Judgment | [`SimilarityJudgment`] | [`LlmJudgment`] |
//! | Aggregation | [`SectionedAggregation`] | [`ModeratorAggregation`] |

pub mod aggregation;
pub mod assignment;
pub mod decomposition;
pub mod judgment;
pub mod model_call;

pub use aggregation::{ModeratorAggregation, SectionedAggregation};
pub use assignment::{ConfiguredAssignment, LlmAssignment};
pub use decomposition::{LlmDecomposition, SingleTaskDecomposition, TemplateDecomposition};
pub use judgment::{LlmJudgment, SimilarityJudgment};
pub use model_call::ModelCall;

//! Judge module - case-based trade direction recommendation
//!
//! Stages run in order: plan metrics, similarity, candidate selection,
//! weighted aggregation, setup prior, gates and confidence. Each stage is a
//! plain function returning its output plus a diagnostic record.

pub mod aggregate;
pub mod confidence;
pub mod config;
pub mod engine;
pub mod gates;
pub mod plan;
pub mod prior;
pub mod proposal;
pub mod result;
pub mod selector;
pub mod similarity;

// Re-export main types for convenience
pub use aggregate::{effective_sample_size, Aggregate, DirectionStats};
pub use confidence::{confidence_pct, wilson_lower_bound, WILSON_Z};
pub use self::config::JudgeConfig;
pub use engine::{judge, JudgeEngine};
pub use gates::{AbstainReason, RrGateDiagnostics};
pub use plan::PlanMetrics;
pub use prior::{PriorMix, SetupPriorDiagnostics, SetupStats};
pub use proposal::{ProposedTrade, DEFAULT_MIN_WIN_RATE};
pub use result::{Diagnostics, JudgeResult};
pub use selector::{Neighbor, Selection, SelectionDiagnostics};
pub use similarity::{similarity, SimilarityBreakdown, SimilarityScorer, TradeFeatures, SIMILARITY_DIMENSIONS};

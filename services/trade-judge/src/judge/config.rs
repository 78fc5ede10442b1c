//! Judge configuration
//!
//! Every threshold the engine reads comes from one `JudgeConfig` value that
//! the caller passes in. There is no process-wide copy.

use crate::error::Result;
use record_store::{CompletionStatus, TradeType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix (`JUDGE_MIN_SIMILARITY=0.6`)
pub const ENV_PREFIX: &str = "JUDGE";

/// Tunable thresholds for one judging call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Minimum similarity for a neighbor, in [0, 1]
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
    /// Maximum neighbors kept after ranking
    #[serde(default = "default_max_neighbors")]
    pub max_neighbors: usize,
    /// Exponent turning similarity into weight
    #[serde(default = "default_similarity_alpha")]
    pub similarity_alpha: f64,
    #[serde(default = "default_min_cases")]
    pub min_cases: usize,
    /// Minimum effective sample size of the neighbor set
    #[serde(default = "default_min_ess")]
    pub min_ess: f64,
    /// Below this many comparable dimensions similarity is scaled down
    #[serde(default = "default_min_comparable_features")]
    pub min_comparable_features: usize,

    #[serde(default = "default_true")]
    pub rr_gate_enabled: bool,
    #[serde(default = "default_rr_min")]
    pub rr_min: f64,
    /// Let proposals without a computable RR through the RR gate
    #[serde(default)]
    pub rr_allow_missing: bool,

    /// EV floor in R
    #[serde(default)]
    pub ev_min_r: f64,
    /// Minimum long/short EV separation in R
    #[serde(default = "default_ev_gap_r")]
    pub ev_gap_r: f64,

    #[serde(default = "default_true")]
    pub setup_prior_enabled: bool,
    /// Pseudo-count of the setup prior
    #[serde(default = "default_setup_prior_n0")]
    pub setup_prior_n0: f64,

    #[serde(default = "default_allowed_trade_types")]
    pub allowed_trade_types: Vec<TradeType>,
    #[serde(default = "default_allowed_completion_statuses")]
    pub allowed_completion_statuses: Vec<CompletionStatus>,
}

fn default_min_similarity() -> f64 { 0.55 }
fn default_max_neighbors() -> usize { 60 }
fn default_similarity_alpha() -> f64 { 3.0 }
fn default_min_cases() -> usize { 30 }
fn default_min_ess() -> f64 { 10.0 }
fn default_min_comparable_features() -> usize { 6 }
fn default_true() -> bool { true }
fn default_rr_min() -> f64 { 1.0 }
fn default_ev_gap_r() -> f64 { 0.05 }
fn default_setup_prior_n0() -> f64 { 30.0 }

fn default_allowed_trade_types() -> Vec<TradeType> {
    TradeType::ALL.to_vec()
}

fn default_allowed_completion_statuses() -> Vec<CompletionStatus> {
    vec![CompletionStatus::Complete, CompletionStatus::CompleteWithMissing]
}

fn dedup_in_order<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            min_similarity: default_min_similarity(),
            max_neighbors: default_max_neighbors(),
            similarity_alpha: default_similarity_alpha(),
            min_cases: default_min_cases(),
            min_ess: default_min_ess(),
            min_comparable_features: default_min_comparable_features(),
            rr_gate_enabled: true,
            rr_min: default_rr_min(),
            rr_allow_missing: false,
            ev_min_r: 0.0,
            ev_gap_r: default_ev_gap_r(),
            setup_prior_enabled: true,
            setup_prior_n0: default_setup_prior_n0(),
            allowed_trade_types: default_allowed_trade_types(),
            allowed_completion_statuses: default_allowed_completion_statuses(),
        }
    }
}

impl JudgeConfig {
    /// Load from an optional file layered under `JUDGE_*` environment
    /// variables, then repair out-of-range values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("allowed_trade_types")
                .with_list_parse_key("allowed_completion_statuses"),
        );

        let raw: JudgeConfig = builder.build()?.try_deserialize()?;
        Ok(raw.sanitized())
    }

    /// Repair malformed values instead of failing.
    ///
    /// Non-finite numbers fall back to their defaults, the similarity
    /// threshold is clamped to [0, 1], the neighbor cap and comparable
    /// minimum are at least 1, alpha is at least 1 and N0 is non-negative.
    /// Allow-lists lose repeats; an empty trade-type list means every type,
    /// an empty status list means complete records only.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let finite_or = |v: f64, d: f64| if v.is_finite() { v } else { d };

        let mut allowed_trade_types = dedup_in_order(self.allowed_trade_types);
        if allowed_trade_types.is_empty() {
            allowed_trade_types = TradeType::ALL.to_vec();
        }
        let mut allowed_completion_statuses = dedup_in_order(self.allowed_completion_statuses);
        if allowed_completion_statuses.is_empty() {
            allowed_completion_statuses = vec![CompletionStatus::Complete];
        }

        Self {
            min_similarity: finite_or(self.min_similarity, defaults.min_similarity).clamp(0.0, 1.0),
            max_neighbors: self.max_neighbors.max(1),
            similarity_alpha: finite_or(self.similarity_alpha, defaults.similarity_alpha).max(1.0),
            min_cases: self.min_cases,
            min_ess: finite_or(self.min_ess, defaults.min_ess).max(0.0),
            min_comparable_features: self.min_comparable_features.max(1),
            rr_gate_enabled: self.rr_gate_enabled,
            rr_min: finite_or(self.rr_min, defaults.rr_min),
            rr_allow_missing: self.rr_allow_missing,
            ev_min_r: finite_or(self.ev_min_r, defaults.ev_min_r),
            ev_gap_r: finite_or(self.ev_gap_r, defaults.ev_gap_r).max(0.0),
            setup_prior_enabled: self.setup_prior_enabled,
            setup_prior_n0: finite_or(self.setup_prior_n0, defaults.setup_prior_n0).max(0.0),
            allowed_trade_types,
            allowed_completion_statuses,
        }
    }

    /// An unrecognized type is never allowed
    pub fn allows_trade_type(&self, trade_type: Option<TradeType>) -> bool {
        trade_type.is_some_and(|t| self.allowed_trade_types.contains(&t))
    }

    /// A missing status counts as complete-with-missing-input
    pub fn allows_completion_status(&self, status: Option<CompletionStatus>) -> bool {
        let status = status.unwrap_or(CompletionStatus::CompleteWithMissing);
        self.allowed_completion_statuses.contains(&status)
    }
}

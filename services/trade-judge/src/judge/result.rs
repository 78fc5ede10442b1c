//! Judge output

use crate::judge::aggregate::Aggregate;
use crate::judge::config::JudgeConfig;
use crate::judge::gates::{AbstainReason, RrGateDiagnostics};
use crate::judge::plan::PlanMetrics;
use crate::judge::prior::SetupPriorDiagnostics;
use crate::judge::selector::SelectionDiagnostics;
use record_store::Direction;
use serde::{Deserialize, Serialize};

/// Unit of `expected_move`
pub const EXPECTED_MOVE_UNIT: &str = "pt";

/// Trace of how a result was reached
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub total_records: usize,
    pub plan: PlanMetrics,
    pub rr_gate: RrGateDiagnostics,
    /// Absent when the RR gate stopped the call
    pub selection: Option<SelectionDiagnostics>,
    /// Thresholds actually used, after sanitizing
    pub params: JudgeConfig,
    pub min_win_rate: f64,
    pub setup_prior: Option<SetupPriorDiagnostics>,
    /// Per-direction statistics (after mixing)
    pub stats: Option<Aggregate>,
}

/// Recommendation for one proposed trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeResult {
    pub recommendation: Direction,
    /// Expected favorable move in price points
    pub expected_move: Option<f64>,
    pub expected_move_unit: String,
    /// Percent
    pub confidence: f64,
    /// Percent
    pub win_rate: Option<f64>,
    pub avg_win: Option<f64>,
    pub avg_loss: Option<f64>,
    pub ev: Option<f64>,
    /// Neighbors the statistics are based on
    pub pseudo_case_count: usize,
    /// ESS of the whole neighbor set
    pub ess: Option<f64>,
    /// ESS of the chosen direction
    pub ess_chosen: Option<f64>,
    pub min_win_rate: f64,
    /// Human-readable abstention reason
    pub reason: Option<String>,
    pub abstain: Option<AbstainReason>,
    pub setup_id: Option<String>,
    pub setup_n: Option<usize>,
    pub setup_weight: Option<f64>,
    pub ev_neighbors: Option<f64>,
    pub ev_setup: Option<f64>,
    pub diagnostics: Diagnostics,
}

impl JudgeResult {
    /// Empty flat result; the engine fills it in
    pub fn flat(min_win_rate: f64, diagnostics: Diagnostics) -> Self {
        Self {
            recommendation: Direction::Flat,
            expected_move: None,
            expected_move_unit: EXPECTED_MOVE_UNIT.to_string(),
            confidence: 0.0,
            win_rate: None,
            avg_win: None,
            avg_loss: None,
            ev: None,
            pseudo_case_count: 0,
            ess: None,
            ess_chosen: None,
            min_win_rate,
            reason: None,
            abstain: None,
            setup_id: None,
            setup_n: None,
            setup_weight: None,
            ev_neighbors: None,
            ev_setup: None,
            diagnostics,
        }
    }

    /// Turn into an abstention: flat, statistics cleared, zero confidence.
    pub fn abstained(mut self, reason: AbstainReason) -> Self {
        self.recommendation = Direction::Flat;
        self.expected_move = None;
        self.confidence = 0.0;
        self.win_rate = None;
        self.avg_win = None;
        self.avg_loss = None;
        self.ev = None;
        self.setup_id = None;
        self.setup_n = None;
        self.setup_weight = None;
        self.ev_neighbors = None;
        self.ev_setup = None;
        if reason.is_pre_pool() {
            self.pseudo_case_count = 0;
        }
        self.reason = Some(reason.to_string());
        self.abstain = Some(reason);
        self
    }

    pub fn is_flat(&self) -> bool {
        self.recommendation == Direction::Flat
    }

    /// One-line summary for terminals and logs
    pub fn summary(&self) -> String {
        match (&self.abstain, self.recommendation) {
            (Some(reason), _) => format!("FLAT ({}): {}", reason.code(), reason),
            (None, Direction::Flat) => format!(
                "FLAT: no directional cases among {} neighbors",
                self.pseudo_case_count
            ),
            (None, direction) => format!(
                "{} confidence={:.1}% win_rate={} ev={} expected_move={} cases={}",
                direction.as_str().to_uppercase(),
                self.confidence,
                fmt_opt(self.win_rate, "%"),
                fmt_opt(self.ev, "R"),
                fmt_opt(self.expected_move, EXPECTED_MOVE_UNIT),
                self.pseudo_case_count
            ),
        }
    }
}

fn fmt_opt(v: Option<f64>, unit: &str) -> String {
    match v {
        Some(v) => format!("{:.2}{}", v, unit),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abstained_clears_statistics() {
        let mut r = JudgeResult::flat(30.0, Diagnostics::default());
        r.recommendation = Direction::Long;
        r.win_rate = Some(70.0);
        r.ev = Some(0.4);
        r.confidence = 55.0;
        r.pseudo_case_count = 40;
        r.setup_n = Some(12);

        let gated = r.clone().abstained(AbstainReason::WinRateBelowMinimum {
            win_rate: 70.0,
            min: 80.0,
        });
        assert!(gated.is_flat());
        assert_eq!(gated.confidence, 0.0);
        assert!(gated.win_rate.is_none() && gated.ev.is_none() && gated.setup_n.is_none());
        assert_eq!(gated.pseudo_case_count, 40);
        assert!(gated.summary().starts_with("FLAT (win_rate_below_minimum)"));

        let early = r.abstained(AbstainReason::NoSimilarCases);
        assert_eq!(early.pseudo_case_count, 0);
    }

    #[test]
    fn test_serializes_reason_code() {
        let r = JudgeResult::flat(30.0, Diagnostics::default()).abstained(AbstainReason::RiskRewardMissing);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["recommendation"], "flat");
        assert_eq!(json["abstain"]["code"], "risk_reward_missing");
        assert_eq!(json["expected_move_unit"], "pt");
    }
}

//! Similarity between a proposal and a historical trade
//!
//! Categorical agreement over a fixed list of indicators is blended with
//! numeric closeness of the plan metrics. Pairs with too few comparable
//! dimensions are scaled down so sparse records cannot look identical.

use crate::judge::plan::PlanMetrics;
use crate::judge::proposal::ProposedTrade;
use record_store::{HistoricalTrade, Indicator, IndicatorStates, TradePlan};
use serde::{Deserialize, Serialize};

/// Categorical dimensions compared for similarity.
///
/// `rsi_zone` is deliberately absent: it can be a decisive signal but does
/// not count toward similarity.
pub const SIMILARITY_DIMENSIONS: [Indicator; 17] = [
    Indicator::WaveCount,
    Indicator::DowShape,
    Indicator::MaCycle,
    Indicator::PriceVsEma200,
    Indicator::EmaBandColor,
    Indicator::Zone,
    Indicator::CmfSign,
    Indicator::CmfSmaDir,
    Indicator::MacdState,
    Indicator::RocSign,
    Indicator::RocSmaDir,
    Indicator::UoState,
    Indicator::UoSmaDir,
    Indicator::VolumeSpike,
    Indicator::VolBodyGap,
    Indicator::RsiOverheat,
    Indicator::MarketContext,
];

pub const RR_WEIGHT: f64 = 1.0;
pub const TARGET_DISTANCE_WEIGHT: f64 = 0.9;
pub const STOP_DISTANCE_WEIGHT: f64 = 0.9;

/// Anything carrying a plan and indicator readings
pub trait TradeFeatures {
    fn plan(&self) -> &TradePlan;
    fn indicators(&self) -> &IndicatorStates;
}

impl TradeFeatures for HistoricalTrade {
    fn plan(&self) -> &TradePlan {
        &self.plan
    }

    fn indicators(&self) -> &IndicatorStates {
        &self.indicators
    }
}

impl TradeFeatures for ProposedTrade {
    fn plan(&self) -> &TradePlan {
        &self.plan
    }

    fn indicators(&self) -> &IndicatorStates {
        &self.indicators
    }
}

/// How a similarity score was built
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityBreakdown {
    /// Final score in [0, 1]
    pub score: f64,
    /// Dimensions present on both sides, categorical and numeric
    pub comparable: usize,
    pub categorical_compared: usize,
    pub categorical_matches: usize,
    pub weighted_match: f64,
    pub weighted_denominator: f64,
    /// Multiplier applied for too few comparable dimensions (1.0 when none)
    pub decay: f64,
}

/// `min(a, b) / max(a, b)` for two positive finite values
pub fn relative_similarity(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    let (a, b) = (a?, b?);
    if !a.is_finite() || !b.is_finite() || a <= 0.0 || b <= 0.0 {
        return None;
    }
    Some(a.min(b) / a.max(b))
}

/// Scores historical trades against one query.
///
/// The query's plan metrics are computed once up front.
#[derive(Debug, Clone)]
pub struct SimilarityScorer<'q, Q: TradeFeatures> {
    query: &'q Q,
    metrics: PlanMetrics,
    min_comparable: usize,
}

impl<'q, Q: TradeFeatures> SimilarityScorer<'q, Q> {
    pub fn new(query: &'q Q, min_comparable_features: usize) -> Self {
        Self {
            query,
            metrics: PlanMetrics::from_plan(query.plan()),
            min_comparable: min_comparable_features.max(1),
        }
    }

    pub fn query_metrics(&self) -> &PlanMetrics {
        &self.metrics
    }

    pub fn score<T: TradeFeatures>(&self, other: &T) -> f64 {
        self.breakdown(other).score
    }

    pub fn breakdown<T: TradeFeatures>(&self, other: &T) -> SimilarityBreakdown {
        let mut out = SimilarityBreakdown {
            decay: 1.0,
            ..Default::default()
        };

        let ours = self.query.indicators();
        let theirs = other.indicators();
        for dim in SIMILARITY_DIMENSIONS {
            if let (Some(a), Some(b)) = (ours.get(dim), theirs.get(dim)) {
                out.comparable += 1;
                out.categorical_compared += 1;
                out.weighted_denominator += 1.0;
                if a == b {
                    out.categorical_matches += 1;
                    out.weighted_match += 1.0;
                }
            }
        }

        let other_metrics = PlanMetrics::from_plan(other.plan());
        let numeric = [
            (self.metrics.rr, other_metrics.rr, RR_WEIGHT),
            (
                self.metrics.target_distance,
                other_metrics.target_distance,
                TARGET_DISTANCE_WEIGHT,
            ),
            (
                self.metrics.stop_distance,
                other_metrics.stop_distance,
                STOP_DISTANCE_WEIGHT,
            ),
        ];
        for (a, b, weight) in numeric {
            if let Some(sim) = relative_similarity(a, b) {
                out.comparable += 1;
                out.weighted_denominator += weight;
                out.weighted_match += weight * sim;
            }
        }

        let mut score = if out.weighted_denominator > 0.0 {
            out.weighted_match / out.weighted_denominator
        } else {
            0.0
        };
        if out.comparable < self.min_comparable {
            out.decay = out.comparable as f64 / self.min_comparable as f64;
            score *= out.decay;
        }
        out.score = if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 };
        out
    }
}

/// One-off similarity between two feature carriers
pub fn similarity<Q: TradeFeatures, T: TradeFeatures>(
    query: &Q,
    other: &T,
    min_comparable_features: usize,
) -> f64 {
    SimilarityScorer::new(query, min_comparable_features).score(other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use record_store::Direction;

    fn trade(plan: TradePlan, indicators: IndicatorStates) -> HistoricalTrade {
        let mut t = HistoricalTrade::new("t", "nk225mc", "1h");
        t.plan = plan;
        t.indicators = indicators;
        t
    }

    fn full_indicators() -> IndicatorStates {
        SIMILARITY_DIMENSIONS
            .iter()
            .fold(IndicatorStates::new(), |acc, ind| acc.with(*ind, "x"))
    }

    #[test]
    fn test_identical_trades_score_one() {
        let plan = TradePlan::new(Direction::Long, 100.0, 110.0, 95.0);
        let a = trade(plan.clone(), full_indicators());
        let b = trade(plan, full_indicators());
        let detail = SimilarityScorer::new(&a, 6).breakdown(&b);
        assert_eq!(detail.comparable, 20);
        assert!((detail.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rsi_zone_is_ignored() {
        let plan = TradePlan::new(Direction::Long, 100.0, 110.0, 95.0);
        let a = trade(plan.clone(), full_indicators().with(Indicator::RsiZone, "high"));
        let b = trade(plan, full_indicators().with(Indicator::RsiZone, "low"));
        assert!((similarity(&a, &b, 6) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_numeric_only_decays() {
        // RR 2 vs RR 1, distances 10/5 vs 10/10
        let a = trade(TradePlan::new(Direction::Long, 100.0, 110.0, 95.0), IndicatorStates::new());
        let b = trade(TradePlan::new(Direction::Long, 100.0, 110.0, 90.0), IndicatorStates::new());
        let detail = SimilarityScorer::new(&a, 6).breakdown(&b);
        assert_eq!(detail.comparable, 3);
        let raw = (1.0 * 0.5 + 0.9 * 1.0 + 0.9 * 0.5) / 2.8;
        assert!((detail.score - raw * 0.5).abs() < 1e-12);
        assert_eq!(detail.decay, 0.5);
    }

    #[test]
    fn test_nothing_comparable_scores_zero() {
        let a = trade(TradePlan::default(), IndicatorStates::new());
        let b = trade(TradePlan::default(), full_indicators());
        assert_eq!(similarity(&a, &b, 6), 0.0);
    }

    #[test]
    fn test_relative_similarity() {
        assert_eq!(relative_similarity(Some(2.0), Some(4.0)), Some(0.5));
        assert_eq!(relative_similarity(Some(0.0), Some(4.0)), None);
        assert_eq!(relative_similarity(Some(-1.0), Some(4.0)), None);
        assert_eq!(relative_similarity(None, Some(4.0)), None);
    }
}

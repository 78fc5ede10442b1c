//! Candidate selection: eligibility filters, similarity threshold and cap

use crate::judge::config::JudgeConfig;
use crate::judge::proposal::ProposedTrade;
use crate::judge::similarity::SimilarityScorer;
use record_store::HistoricalTrade;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of top similarity scores kept for diagnostics
pub const TOP_SCORES: usize = 5;

/// A ranked neighbor
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    pub trade: &'a HistoricalTrade,
    pub similarity: f64,
}

/// Stage counts of one selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionDiagnostics {
    pub total: usize,
    /// After the trade type / completion status filter
    pub after_eligibility: usize,
    /// After the realized-outcome / symbol / timeframe filter
    pub after_outcome: usize,
    pub after_threshold: usize,
    pub dropped_eligibility: usize,
    pub dropped_outcome: usize,
    pub dropped_threshold: usize,
    /// Neighbors cut by the cap
    pub dropped_cap: usize,
    /// Highest scores in the pool before the threshold, rounded to 3 decimals
    pub top_scores: Vec<f64>,
}

/// Result of candidate selection
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    /// Every trade passing both filters, in input order
    pub pool: Vec<&'a HistoricalTrade>,
    /// Neighbors by descending similarity
    pub neighbors: Vec<Neighbor<'a>>,
    pub diagnostics: SelectionDiagnostics,
}

/// Trade type and completion status are allowed
pub fn is_eligible(trade: &HistoricalTrade, config: &JudgeConfig) -> bool {
    config.allows_trade_type(trade.trade_type)
        && config.allows_completion_status(trade.completion_status)
}

/// Closed trade on the query's symbol and timeframe with a usable R-multiple
pub fn has_comparable_outcome(trade: &HistoricalTrade, symbol: &str, timeframe: &str) -> bool {
    trade.has_result
        && trade.symbol == symbol
        && trade.timeframe == timeframe
        && trade.realized_r().is_some()
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Filter, score and rank the history for one query.
pub fn select<'a>(
    trades: &'a [HistoricalTrade],
    query: &ProposedTrade,
    config: &JudgeConfig,
) -> Selection<'a> {
    let timeframe = query.timeframe_key();

    let eligible: Vec<&HistoricalTrade> = trades.iter().filter(|t| is_eligible(t, config)).collect();
    let pool: Vec<&HistoricalTrade> = eligible
        .iter()
        .copied()
        .filter(|t| has_comparable_outcome(t, &query.symbol, &timeframe))
        .collect();

    let scorer = SimilarityScorer::new(query, config.min_comparable_features);
    let mut scored: Vec<Neighbor<'a>> = pool
        .iter()
        .map(|t| Neighbor {
            trade: *t,
            similarity: scorer.score(*t),
        })
        .collect();
    // stable: ties keep input order
    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    let top_scores: Vec<f64> = scored
        .iter()
        .take(TOP_SCORES)
        .map(|n| round3(n.similarity))
        .collect();

    let mut neighbors: Vec<Neighbor<'a>> = scored
        .into_iter()
        .filter(|n| n.similarity >= config.min_similarity)
        .collect();
    let after_threshold = neighbors.len();
    neighbors.truncate(config.max_neighbors);

    let diagnostics = SelectionDiagnostics {
        total: trades.len(),
        after_eligibility: eligible.len(),
        after_outcome: pool.len(),
        after_threshold,
        dropped_eligibility: trades.len() - eligible.len(),
        dropped_outcome: eligible.len() - pool.len(),
        dropped_threshold: pool.len() - after_threshold,
        dropped_cap: after_threshold - neighbors.len(),
        top_scores,
    };

    debug!(
        "Selected {} neighbors for {} {} (total={}, eligible={}, closed={}, above threshold={})",
        neighbors.len(),
        query.symbol,
        timeframe,
        diagnostics.total,
        diagnostics.after_eligibility,
        diagnostics.after_outcome,
        diagnostics.after_threshold
    );

    Selection {
        pool,
        neighbors,
        diagnostics,
    }
}

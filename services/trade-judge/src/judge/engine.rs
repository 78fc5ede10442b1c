//! Judge engine - runs the selection, aggregation and gate stages

use crate::judge::{
    aggregate::Aggregate,
    config::JudgeConfig,
    confidence::confidence_pct,
    gates::{decision_gates, pool_gates, rr_gate, select_direction},
    plan::PlanMetrics,
    prior::apply_setup_prior,
    proposal::ProposedTrade,
    result::{Diagnostics, JudgeResult},
    selector::{select, Neighbor},
};
use record_store::HistoricalTrade;
use tracing::{debug, info};

/// Case-based judge: scores a proposal against historical trades
#[derive(Debug, Clone, Default)]
pub struct JudgeEngine {
    config: JudgeConfig,
}

impl JudgeEngine {
    /// Create an engine; the config is sanitized once here
    pub fn new(config: JudgeConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    /// Ranked neighbors of a proposal, without any gating
    pub fn neighbors<'a>(
        &self,
        query: &ProposedTrade,
        trades: &'a [HistoricalTrade],
    ) -> Vec<Neighbor<'a>> {
        select(trades, query, &self.config).neighbors
    }

    /// Judge one proposal. Never fails: every problem ends in a flat
    /// recommendation with a reason.
    pub fn judge(&self, query: &ProposedTrade, trades: &[HistoricalTrade]) -> JudgeResult {
        let config = &self.config;
        let min_win_rate = query.effective_min_win_rate();
        let plan = PlanMetrics::from_plan(&query.plan);

        let (rr_outcome, rr_diag) = rr_gate(plan.rr, config);
        let mut result = JudgeResult::flat(
            min_win_rate,
            Diagnostics {
                total_records: trades.len(),
                plan,
                rr_gate: rr_diag,
                params: config.clone(),
                min_win_rate,
                ..Default::default()
            },
        );
        if let Err(reason) = rr_outcome {
            debug!("RR gate failed for {} {}: {}", query.symbol, query.timeframe, reason);
            return finish(query, result.abstained(reason));
        }

        let selection = select(trades, query, config);
        result.pseudo_case_count = selection.neighbors.len();
        result.diagnostics.selection = Some(selection.diagnostics.clone());

        let mut aggregate = Aggregate::compute(&selection.neighbors, config.similarity_alpha);
        result.ess = Some(aggregate.overall_ess);
        debug!(
            "Aggregated {} neighbors: ess={:.2} long n={} short n={} flat n={}",
            aggregate.neighbor_count,
            aggregate.overall_ess,
            aggregate.long.n,
            aggregate.short.n,
            aggregate.flat.n
        );

        let prior = apply_setup_prior(&mut aggregate, &selection.pool, query.setup.as_ref(), config);
        result.diagnostics.setup_prior = Some(prior);

        if let Err(reason) = pool_gates(selection.neighbors.len(), aggregate.overall_ess, config) {
            result.diagnostics.stats = Some(aggregate);
            return finish(query, result.abstained(reason));
        }

        let chosen = select_direction(&aggregate);
        let stats = aggregate.get(chosen).clone();
        result.ess_chosen = Some(stats.ess);
        let gate_outcome = chosen
            .is_directional()
            .then(|| decision_gates(chosen, &aggregate, min_win_rate, config));
        result.diagnostics.stats = Some(aggregate);
        if !chosen.is_directional() {
            // only flat outcomes among the neighbors
            return finish(query, result);
        }

        result.recommendation = chosen;
        result.win_rate = stats.win_rate;
        result.avg_win = stats.avg_win;
        result.avg_loss = stats.avg_loss;
        result.ev = stats.ev;
        result.expected_move = stats.expected_move;
        if let Some(mix) = &stats.prior {
            result.setup_id = Some(mix.setup_id.clone());
            result.setup_n = Some(mix.setup_n);
            result.setup_weight = Some(mix.weight);
            result.ev_neighbors = mix.raw_ev;
            result.ev_setup = mix.setup_ev;
        }

        if let Some(Err(reason)) = gate_outcome {
            return finish(query, result.abstained(reason));
        }

        result.confidence = confidence_pct(stats.win_rate.unwrap_or(0.0), stats.ess);
        finish(query, result)
    }
}

fn finish(query: &ProposedTrade, result: JudgeResult) -> JudgeResult {
    info!("Judged {} {}: {}", query.symbol, query.timeframe, result.summary());
    result
}

/// Judge with an explicit config, without keeping an engine around
pub fn judge(query: &ProposedTrade, trades: &[HistoricalTrade], config: &JudgeConfig) -> JudgeResult {
    JudgeEngine::new(config.clone()).judge(query, trades)
}

//! Setup prior: shrink neighbor statistics toward the setup's own record
//!
//! A setup is the decisive indicator and the value it showed. Trades that
//! share the query's setup form an unweighted prior; each direction's
//! neighbor statistics are pulled toward it with weight `N0 / (N0 + n)`
//! on the neighbor side.

use crate::judge::aggregate::{Aggregate, DirectionStats};
use crate::judge::config::JudgeConfig;
use record_store::{Direction, HistoricalTrade, SetupId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Unweighted statistics of one setup in one realized direction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupStats {
    pub n: usize,
    pub ev: Option<f64>,
    pub win_rate: Option<f64>,
    pub avg_win: Option<f64>,
    pub avg_loss: Option<f64>,
}

impl SetupStats {
    pub fn compute(pool: &[&HistoricalTrade], setup: &SetupId, direction: Direction) -> Self {
        let rs: Vec<f64> = pool
            .iter()
            .filter(|t| t.setup.as_ref() == Some(setup))
            .filter(|t| t.direction_taken == Some(direction))
            .filter_map(|t| t.realized_r())
            .collect();
        let n = rs.len();
        let wins: Vec<f64> = rs.iter().copied().filter(|r| *r > 0.0).collect();
        let losses: Vec<f64> = rs.iter().copied().filter(|r| *r < 0.0).collect();

        Self {
            n,
            ev: mean(&rs),
            win_rate: (n > 0).then(|| 100.0 * wins.len() as f64 / n as f64),
            avg_win: mean(&wins),
            avg_loss: mean(&losses),
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Weight kept on the neighbor side: `N0 / (N0 + n)`
pub fn prior_weight(n0: f64, setup_n: usize) -> f64 {
    let denom = n0 + setup_n as f64;
    if denom > 0.0 {
        n0 / denom
    } else {
        // N0 = 0 and no setup sample: nothing to mix
        1.0
    }
}

/// `w * neighbor + (1 - w) * setup`, falling back to whichever side exists
pub fn mix_stat(neighbor: Option<f64>, setup: Option<f64>, weight: f64) -> Option<f64> {
    match (neighbor, setup) {
        (Some(a), Some(b)) => Some(weight * a + (1.0 - weight) * b),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Record of how one direction was mixed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorMix {
    pub setup_id: String,
    pub setup_n: usize,
    /// Neighbor-side weight
    pub weight: f64,
    pub raw_ev: Option<f64>,
    pub raw_win_rate: Option<f64>,
    pub raw_avg_win: Option<f64>,
    pub raw_avg_loss: Option<f64>,
    pub setup_ev: Option<f64>,
    pub setup_win_rate: Option<f64>,
}

/// Setup prior summary for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupPriorDiagnostics {
    pub enabled: bool,
    pub setup_id: Option<String>,
    pub n0: f64,
    pub long: Option<SetupStats>,
    pub short: Option<SetupStats>,
}

fn mix_direction(stats: &mut DirectionStats, setup_id: &SetupId, setup: &SetupStats, n0: f64) {
    let mut mix = PriorMix {
        setup_id: setup_id.to_string(),
        setup_n: setup.n,
        weight: 1.0,
        raw_ev: stats.ev,
        raw_win_rate: stats.win_rate,
        raw_avg_win: stats.avg_win,
        raw_avg_loss: stats.avg_loss,
        setup_ev: setup.ev,
        setup_win_rate: setup.win_rate,
    };
    if setup.n > 0 {
        let w = prior_weight(n0, setup.n);
        mix.weight = w;
        stats.ev = mix_stat(stats.ev, setup.ev, w);
        stats.win_rate = mix_stat(stats.win_rate, setup.win_rate, w);
        stats.avg_win = mix_stat(stats.avg_win, setup.avg_win, w);
        stats.avg_loss = mix_stat(stats.avg_loss, setup.avg_loss, w);
    }
    stats.prior = Some(mix);
}

/// Mix the setup prior into the long and short statistics in place.
///
/// `pool` is the full set of closed same-market trades, not just the
/// neighbors.
pub fn apply_setup_prior(
    aggregate: &mut Aggregate,
    pool: &[&HistoricalTrade],
    setup: Option<&SetupId>,
    config: &JudgeConfig,
) -> SetupPriorDiagnostics {
    let mut diag = SetupPriorDiagnostics {
        enabled: config.setup_prior_enabled,
        setup_id: setup.map(ToString::to_string),
        n0: config.setup_prior_n0,
        long: None,
        short: None,
    };
    let Some(setup) = setup.filter(|_| config.setup_prior_enabled) else {
        return diag;
    };

    for direction in [Direction::Long, Direction::Short] {
        let stats = SetupStats::compute(pool, setup, direction);
        mix_direction(aggregate.get_mut(direction), setup, &stats, config.setup_prior_n0);
        debug!(
            "Setup prior {} {}: n={} weight={:.3}",
            setup,
            direction,
            stats.n,
            prior_weight(config.setup_prior_n0, stats.n)
        );
        match direction {
            Direction::Long => diag.long = Some(stats),
            _ => diag.short = Some(stats),
        }
    }
    diag
}

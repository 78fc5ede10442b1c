//! Weighted per-direction statistics over the neighbor set

use crate::judge::prior::PriorMix;
use crate::judge::selector::Neighbor;
use record_store::Direction;
use serde::{Deserialize, Serialize};

/// Weight of a neighbor: `similarity ^ alpha`
pub fn neighbor_weight(similarity: f64, alpha: f64) -> f64 {
    similarity.max(0.0).powf(alpha)
}

/// Kish effective sample size, `(Σw)² / Σw²`; 0 for no (or all-zero) weights.
pub fn effective_sample_size<I: IntoIterator<Item = f64>>(weights: I) -> f64 {
    let (sum, sum_sq) = weights
        .into_iter()
        .fold((0.0, 0.0), |(s, s2), w| (s + w, s2 + w * w));
    if sum_sq > 0.0 {
        sum * sum / sum_sq
    } else {
        0.0
    }
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    (den > 0.0).then(|| num / den).filter(|v| v.is_finite())
}

/// Statistics of the neighbors that were realized in one direction.
///
/// `win_rate`, `avg_win`, `avg_loss` and `ev` hold the values used for
/// decisions; when a setup prior was mixed in, the raw neighbor values are
/// kept in `prior`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionStats {
    pub n: usize,
    pub weight_sum: f64,
    pub ess: f64,
    /// Percent
    pub win_rate: Option<f64>,
    /// Mean winning R
    pub avg_win: Option<f64>,
    /// Mean losing R (negative)
    pub avg_loss: Option<f64>,
    /// Expected R
    pub ev: Option<f64>,
    /// Expected favorable excursion in price points
    pub expected_move: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior: Option<PriorMix>,
}

impl DirectionStats {
    pub fn compute(neighbors: &[Neighbor<'_>], direction: Direction, alpha: f64) -> Self {
        let mut stats = Self::default();
        let mut sum_sq = 0.0;
        let (mut win_w, mut win_wr) = (0.0, 0.0);
        let (mut loss_w, mut loss_wr) = (0.0, 0.0);
        let mut wr_sum = 0.0;
        let (mut move_w, mut move_sum) = (0.0, 0.0);

        for n in neighbors {
            if n.trade.direction_taken != Some(direction) {
                continue;
            }
            let Some(r) = n.trade.realized_r() else {
                continue;
            };
            let w = neighbor_weight(n.similarity, alpha);
            stats.n += 1;
            stats.weight_sum += w;
            sum_sq += w * w;
            wr_sum += w * r;
            if r > 0.0 {
                win_w += w;
                win_wr += w * r;
            } else if r < 0.0 {
                loss_w += w;
                loss_wr += w * r;
            }
            if let Some(excursion) = favorable_excursion(n, direction) {
                move_w += w;
                move_sum += w * excursion;
            }
        }

        if sum_sq > 0.0 {
            stats.ess = stats.weight_sum * stats.weight_sum / sum_sq;
        }
        stats.win_rate = ratio(100.0 * win_w, stats.weight_sum);
        stats.avg_win = ratio(win_wr, win_w);
        stats.avg_loss = ratio(loss_wr, loss_w);
        stats.ev = ratio(wr_sum, stats.weight_sum);
        stats.expected_move = ratio(move_sum, move_w);
        stats
    }

    /// Has any weight, so it can be chosen
    pub fn is_supported(&self) -> bool {
        self.weight_sum > 0.0
    }
}

/// How far price moved in the trade's favor after entry
fn favorable_excursion(n: &Neighbor<'_>, direction: Direction) -> Option<f64> {
    let entry = n.trade.plan.entry_price.filter(|v| v.is_finite())?;
    let excursion = match direction {
        Direction::Long => n.trade.high_during_trade.filter(|v| v.is_finite())? - entry,
        Direction::Short => entry - n.trade.low_during_trade.filter(|v| v.is_finite())?,
        Direction::Flat => return None,
    };
    Some(excursion.max(0.0))
}

/// Statistics of the whole neighbor set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub neighbor_count: usize,
    /// ESS over every neighbor regardless of direction
    pub overall_ess: f64,
    pub long: DirectionStats,
    pub short: DirectionStats,
    pub flat: DirectionStats,
}

impl Aggregate {
    pub fn compute(neighbors: &[Neighbor<'_>], alpha: f64) -> Self {
        Self {
            neighbor_count: neighbors.len(),
            overall_ess: effective_sample_size(
                neighbors.iter().map(|n| neighbor_weight(n.similarity, alpha)),
            ),
            long: DirectionStats::compute(neighbors, Direction::Long, alpha),
            short: DirectionStats::compute(neighbors, Direction::Short, alpha),
            flat: DirectionStats::compute(neighbors, Direction::Flat, alpha),
        }
    }

    pub fn get(&self, direction: Direction) -> &DirectionStats {
        match direction {
            Direction::Long => &self.long,
            Direction::Short => &self.short,
            Direction::Flat => &self.flat,
        }
    }

    pub fn get_mut(&mut self, direction: Direction) -> &mut DirectionStats {
        match direction {
            Direction::Long => &mut self.long,
            Direction::Short => &mut self.short,
            Direction::Flat => &mut self.flat,
        }
    }
}

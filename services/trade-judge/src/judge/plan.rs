//! Plan metrics: risk/reward and distances from entry

use record_store::{Direction, TradePlan};
use serde::{Deserialize, Serialize};

/// Metrics derived from a planned entry, target and stop
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanMetrics {
    /// Reward divided by risk
    pub rr: Option<f64>,
    /// Favorable distance from entry to target, in price points
    pub target_distance: Option<f64>,
    /// Adverse distance from entry to stop, in price points
    pub stop_distance: Option<f64>,
}

impl PlanMetrics {
    /// Metrics for a plan, always from its planned direction.
    pub fn from_plan(plan: &TradePlan) -> Self {
        Self {
            rr: risk_reward(plan.direction, plan.entry_price, plan.target_price, plan.stop_price),
            target_distance: target_distance(plan.direction, plan.entry_price, plan.target_price),
            stop_distance: stop_distance(plan.direction, plan.entry_price, plan.stop_price),
        }
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite())
}

fn positive(v: f64) -> Option<f64> {
    (v.is_finite() && v > 0.0).then_some(v)
}

/// Risk/reward ratio.
///
/// `None` unless the direction is long or short, all three prices are
/// finite, and both reward and risk are strictly positive.
pub fn risk_reward(
    direction: Option<Direction>,
    entry: Option<f64>,
    target: Option<f64>,
    stop: Option<f64>,
) -> Option<f64> {
    let (entry, target, stop) = (finite(entry)?, finite(target)?, finite(stop)?);
    let (reward, risk) = match direction? {
        Direction::Long => (target - entry, entry - stop),
        Direction::Short => (entry - target, stop - entry),
        Direction::Flat => return None,
    };
    if reward <= 0.0 || risk <= 0.0 {
        return None;
    }
    positive(reward / risk)
}

pub fn target_distance(
    direction: Option<Direction>,
    entry: Option<f64>,
    target: Option<f64>,
) -> Option<f64> {
    let (entry, target) = (finite(entry)?, finite(target)?);
    match direction? {
        Direction::Long => positive(target - entry),
        Direction::Short => positive(entry - target),
        Direction::Flat => None,
    }
}

pub fn stop_distance(
    direction: Option<Direction>,
    entry: Option<f64>,
    stop: Option<f64>,
) -> Option<f64> {
    let (entry, stop) = (finite(entry)?, finite(stop)?);
    match direction? {
        Direction::Long => positive(entry - stop),
        Direction::Short => positive(stop - entry),
        Direction::Flat => None,
    }
}

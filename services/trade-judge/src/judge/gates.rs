//! Decision gates
//!
//! Gates run in a fixed order and the first failure decides the outcome:
//! RR, empty pool, case count, ESS, then (after a direction is chosen) EV
//! floor, EV gap and win rate.

use crate::judge::aggregate::{Aggregate, DirectionStats};
use crate::judge::config::JudgeConfig;
use record_store::Direction;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Why the engine recommended staying flat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum AbstainReason {
    /// RR could not be computed and missing RR is not allowed
    RiskRewardMissing,
    RiskRewardBelowFloor { rr: f64, floor: f64 },
    NoSimilarCases,
    TooFewCases { count: usize, min: usize },
    LowEffectiveSampleSize { ess: f64, min: f64 },
    ExpectedValueBelowFloor { ev: f64, floor: f64 },
    /// Long and short expectancies too close to call
    DirectionTooClose { gap: f64, min_gap: f64 },
    WinRateBelowMinimum { win_rate: f64, min: f64 },
}

impl AbstainReason {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AbstainReason::RiskRewardMissing => "risk_reward_missing",
            AbstainReason::RiskRewardBelowFloor { .. } => "risk_reward_below_floor",
            AbstainReason::NoSimilarCases => "no_similar_cases",
            AbstainReason::TooFewCases { .. } => "too_few_cases",
            AbstainReason::LowEffectiveSampleSize { .. } => "low_effective_sample_size",
            AbstainReason::ExpectedValueBelowFloor { .. } => "expected_value_below_floor",
            AbstainReason::DirectionTooClose { .. } => "direction_too_close",
            AbstainReason::WinRateBelowMinimum { .. } => "win_rate_below_minimum",
        }
    }

    /// Raised before any neighbor was looked at
    pub fn is_pre_pool(&self) -> bool {
        matches!(
            self,
            AbstainReason::RiskRewardMissing
                | AbstainReason::RiskRewardBelowFloor { .. }
                | AbstainReason::NoSimilarCases
        )
    }
}

impl fmt::Display for AbstainReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstainReason::RiskRewardMissing => {
                write!(f, "RR unknown (target or stop missing) while the RR gate is on")
            }
            AbstainReason::RiskRewardBelowFloor { rr, floor } => {
                write!(f, "RR {:.2} is below the RR floor {:.2}", rr, floor)
            }
            AbstainReason::NoSimilarCases => write!(
                f,
                "No similar cases (threshold too high or inputs too sparse)"
            ),
            AbstainReason::TooFewCases { count, min } => {
                write!(f, "Only {} similar cases, need at least {}", count, min)
            }
            AbstainReason::LowEffectiveSampleSize { ess, min } => write!(
                f,
                "Effective sample size {:.1} is below {:.1}; similar cases are too concentrated",
                ess, min
            ),
            AbstainReason::ExpectedValueBelowFloor { ev, floor } => {
                write!(f, "Expected value {:.3}R is below the floor {:.3}R", ev, floor)
            }
            AbstainReason::DirectionTooClose { gap, min_gap } => write!(
                f,
                "Long and short expectancies differ by {:.3}R, less than {:.3}R",
                gap, min_gap
            ),
            AbstainReason::WinRateBelowMinimum { win_rate, min } => {
                write!(f, "Win rate {:.1}% is below the minimum {:.1}%", win_rate, min)
            }
        }
    }
}

/// RR gate state for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RrGateDiagnostics {
    pub enabled: bool,
    pub rr: Option<f64>,
    pub floor: f64,
    pub allow_missing: bool,
    pub passed: bool,
}

/// Gate 1: the proposal's own risk/reward.
pub fn rr_gate(rr: Option<f64>, config: &JudgeConfig) -> (Result<(), AbstainReason>, RrGateDiagnostics) {
    let outcome = if !config.rr_gate_enabled {
        Ok(())
    } else {
        match rr {
            None if config.rr_allow_missing => Ok(()),
            None => Err(AbstainReason::RiskRewardMissing),
            Some(rr) if rr < config.rr_min => Err(AbstainReason::RiskRewardBelowFloor {
                rr,
                floor: config.rr_min,
            }),
            Some(_) => Ok(()),
        }
    };
    let diag = RrGateDiagnostics {
        enabled: config.rr_gate_enabled,
        rr,
        floor: config.rr_min,
        allow_missing: config.rr_allow_missing,
        passed: outcome.is_ok(),
    };
    (outcome, diag)
}

/// Gates 2 to 4: the neighbor set is large and diverse enough.
pub fn pool_gates(neighbor_count: usize, overall_ess: f64, config: &JudgeConfig) -> Result<(), AbstainReason> {
    if neighbor_count == 0 {
        return Err(AbstainReason::NoSimilarCases);
    }
    if neighbor_count < config.min_cases {
        return Err(AbstainReason::TooFewCases {
            count: neighbor_count,
            min: config.min_cases,
        });
    }
    if overall_ess < config.min_ess {
        return Err(AbstainReason::LowEffectiveSampleSize {
            ess: overall_ess,
            min: config.min_ess,
        });
    }
    Ok(())
}

/// `None` ranks below every number
fn cmp_opt(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Preference order between two directions: EV, win rate, ESS, count
fn rank(a: &DirectionStats, b: &DirectionStats) -> Ordering {
    cmp_opt(a.ev, b.ev)
        .then_with(|| cmp_opt(a.win_rate, b.win_rate))
        .then_with(|| a.ess.total_cmp(&b.ess))
        .then_with(|| a.n.cmp(&b.n))
}

/// Gate 5: pick long or short among directions with weight.
///
/// Flat when neither has any. Full ties go to long.
pub fn select_direction(aggregate: &Aggregate) -> Direction {
    match (aggregate.long.is_supported(), aggregate.short.is_supported()) {
        (true, true) => {
            if rank(&aggregate.short, &aggregate.long) == Ordering::Greater {
                Direction::Short
            } else {
                Direction::Long
            }
        }
        (true, false) => Direction::Long,
        (false, true) => Direction::Short,
        (false, false) => Direction::Flat,
    }
}

/// Gates 6 to 8 for the chosen direction.
pub fn decision_gates(
    chosen: Direction,
    aggregate: &Aggregate,
    min_win_rate: f64,
    config: &JudgeConfig,
) -> Result<(), AbstainReason> {
    let stats = aggregate.get(chosen);
    // a missing EV or win rate ranks lowest, so it cannot clear a floor
    let ev = stats.ev.unwrap_or(f64::NEG_INFINITY);
    if ev < config.ev_min_r {
        return Err(AbstainReason::ExpectedValueBelowFloor {
            ev,
            floor: config.ev_min_r,
        });
    }

    if let Some(other) = chosen.opposite().map(|d| aggregate.get(d)) {
        if other.is_supported() {
            if let (Some(a), Some(b)) = (stats.ev, other.ev) {
                let gap = (a - b).abs();
                if gap < config.ev_gap_r {
                    return Err(AbstainReason::DirectionTooClose {
                        gap,
                        min_gap: config.ev_gap_r,
                    });
                }
            }
        }
    }

    let win_rate = stats.win_rate.unwrap_or(f64::NEG_INFINITY);
    if win_rate < min_win_rate {
        return Err(AbstainReason::WinRateBelowMinimum {
            win_rate,
            min: min_win_rate,
        });
    }
    Ok(())
}

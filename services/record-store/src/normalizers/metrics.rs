//! Realized per-unit profit, risk and R-multiple
//!
//! Computed in exact decimal arithmetic; only the final R-multiple is handed
//! to the engine as `f64`.

use super::contract_multiplier;
use crate::types::Direction;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Derived result metrics for one closed trade
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetrics {
    pub profit_per_unit: Option<Decimal>,
    pub risk_per_unit: Option<Decimal>,
    pub r_multiple: Option<Decimal>,
}

/// Profit per contract unit after fees. Flat trades earn nothing but still pay the fee.
/// `None` on decimal overflow.
pub fn profit_per_unit(
    symbol: &str,
    direction: Direction,
    entry: Decimal,
    exit: Decimal,
    fee_per_unit: Decimal,
) -> Option<Decimal> {
    let diff = match direction {
        Direction::Long => exit.checked_sub(entry)?,
        Direction::Short => entry.checked_sub(exit)?,
        Direction::Flat => Decimal::ZERO,
    };
    diff.checked_mul(contract_multiplier(symbol))?
        .checked_sub(fee_per_unit)
}

/// Initial risk per contract unit; `None` unless strictly positive
pub fn risk_per_unit(
    symbol: &str,
    direction: Direction,
    entry: Decimal,
    stop: Decimal,
) -> Option<Decimal> {
    let dist = match direction {
        Direction::Long => entry.checked_sub(stop)?,
        Direction::Short => stop.checked_sub(entry)?,
        Direction::Flat => Decimal::ZERO,
    };
    let risk = dist.checked_mul(contract_multiplier(symbol))?;
    (risk > Decimal::ZERO).then_some(risk)
}

/// Compute the metrics a closed trade needs for learning.
pub fn compute_result_metrics(
    symbol: &str,
    direction: Direction,
    entry: Option<Decimal>,
    exit: Option<Decimal>,
    stop: Option<Decimal>,
    fee_per_unit: Option<Decimal>,
) -> ResultMetrics {
    let profit = match (entry, exit, fee_per_unit) {
        (Some(entry), Some(exit), Some(fee)) => profit_per_unit(symbol, direction, entry, exit, fee),
        _ => None,
    };
    let risk = match (entry, stop) {
        (Some(entry), Some(stop)) => risk_per_unit(symbol, direction, entry, stop),
        _ => None,
    };
    let r_multiple = match (profit, risk) {
        (Some(profit), Some(risk)) => profit.checked_div(risk),
        _ => None,
    };

    ResultMetrics {
        profit_per_unit: profit,
        risk_per_unit: risk,
        r_multiple,
    }
}

/// `Decimal` to `f64`, dropping anything that does not convert to a finite value
pub fn to_finite_f64(value: Decimal) -> Option<f64> {
    value.to_f64().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_long_r_multiple_on_micro_contract() {
        // entry 38000, stop 37950 (50pt risk), exit 38100, fee 11 per unit
        let m = compute_result_metrics(
            "nk225mc",
            Direction::Long,
            Some(dec("38000")),
            Some(dec("38100")),
            Some(dec("37950")),
            Some(dec("11")),
        );
        assert_eq!(m.profit_per_unit, Some(dec("989")));
        assert_eq!(m.risk_per_unit, Some(dec("500")));
        assert_eq!(m.r_multiple, Some(dec("1.978")));
    }

    #[test]
    fn test_short_loss_is_negative() {
        let m = compute_result_metrics(
            "usdjpy",
            Direction::Short,
            Some(dec("150.00")),
            Some(dec("150.50")),
            Some(dec("150.25")),
            Some(dec("0")),
        );
        assert_eq!(m.r_multiple, Some(dec("-2")));
    }

    #[test]
    fn test_stop_on_wrong_side_has_no_risk() {
        let m = compute_result_metrics(
            "nk225",
            Direction::Long,
            Some(dec("100")),
            Some(dec("110")),
            Some(dec("105")),
            Some(dec("0")),
        );
        assert!(m.risk_per_unit.is_none());
        assert!(m.r_multiple.is_none());
        assert_eq!(m.profit_per_unit, Some(dec("10000")));
    }

    #[test]
    fn test_missing_fee_means_no_profit() {
        let m = compute_result_metrics(
            "nk225mc",
            Direction::Long,
            Some(dec("100")),
            Some(dec("110")),
            Some(dec("90")),
            None,
        );
        assert!(m.profit_per_unit.is_none());
        assert!(m.r_multiple.is_none());
        assert!(m.risk_per_unit.is_some());
    }

    #[test]
    fn test_overflow_yields_no_metrics() {
        let m = compute_result_metrics(
            "nk225",
            Direction::Long,
            Some(Decimal::MIN),
            Some(Decimal::MAX),
            Some(Decimal::MIN),
            Some(dec("0")),
        );
        assert!(m.profit_per_unit.is_none());
        assert!(m.r_multiple.is_none());

        let m = compute_result_metrics(
            "nk225",
            Direction::Long,
            Some(Decimal::MAX),
            Some(Decimal::MAX),
            Some(dec("0")),
            Some(dec("0")),
        );
        assert_eq!(m.profit_per_unit, Some(Decimal::ZERO));
        assert!(m.risk_per_unit.is_none());
    }
}

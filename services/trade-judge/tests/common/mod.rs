//! Shared fixtures for integration tests

#![allow(dead_code)]

use record_store::{Direction, HistoricalTrade, Indicator, IndicatorStates, TradePlan};
use trade_judge::ProposedTrade;

pub const SYMBOL: &str = "X";
pub const TIMEFRAME: &str = "1h";

pub fn indicators() -> IndicatorStates {
    IndicatorStates::new()
        .with(Indicator::WaveCount, "3")
        .with(Indicator::DowShape, "higher_highs")
        .with(Indicator::MaCycle, "stage1")
        .with(Indicator::PriceVsEma200, "above")
        .with(Indicator::EmaBandColor, "green")
        .with(Indicator::Zone, "mid")
        .with(Indicator::MacdState, "golden")
        .with(Indicator::CmfSign, "positive")
}

/// RR 2.0: 100 points of reward for 50 of risk
pub fn plan(direction: Direction) -> TradePlan {
    match direction {
        Direction::Short => TradePlan::new(Direction::Short, 38000.0, 37900.0, 38050.0),
        _ => TradePlan::new(Direction::Long, 38000.0, 38100.0, 37950.0),
    }
}

/// Closed trade realized in `direction` with R-multiple `r`
pub fn closed_trade(id: usize, direction: Direction, r: f64) -> HistoricalTrade {
    let mut t = HistoricalTrade::new(format!("case-{id}"), SYMBOL, TIMEFRAME);
    t.plan = plan(direction);
    t.indicators = indicators();
    t.has_result = true;
    t.direction_taken = Some(direction);
    t.r_multiple = Some(r);
    t.exit_price = Some(38000.0);
    t.high_during_trade = Some(38120.0);
    t.low_during_trade = Some(37880.0);
    t
}

pub fn closed_trades(count: usize, direction: Direction, r: f64) -> Vec<HistoricalTrade> {
    (0..count).map(|i| closed_trade(i, direction, r)).collect()
}

/// Long proposal matching every fixture trade
pub fn proposal() -> ProposedTrade {
    ProposedTrade::new(SYMBOL, TIMEFRAME, plan(Direction::Long)).with_indicators(indicators())
}

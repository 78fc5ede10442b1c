//! The trade being judged

use crate::error::{JudgeError, Result};
use record_store::normalizers::normalize_timeframe;
use record_store::{Direction, HistoricalTrade, IndicatorStates, SetupId, TradePlan};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Minimum win rate (percent) used when the proposal gives none
pub const DEFAULT_MIN_WIN_RATE: f64 = 30.0;

/// A proposed trade plan to score against the history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedTrade {
    pub symbol: String,
    pub timeframe: String,
    #[serde(default)]
    pub plan: TradePlan,
    #[serde(default)]
    pub indicators: IndicatorStates,
    #[serde(default)]
    pub setup: Option<SetupId>,
    /// Minimum acceptable win rate in percent
    #[serde(default)]
    pub min_win_rate: Option<f64>,
}

impl ProposedTrade {
    pub fn new(symbol: impl Into<String>, timeframe: &str, plan: TradePlan) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: normalize_timeframe(timeframe),
            plan,
            indicators: IndicatorStates::new(),
            setup: None,
            min_win_rate: None,
        }
    }

    pub fn with_indicators(mut self, indicators: IndicatorStates) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn with_setup(mut self, setup: SetupId) -> Self {
        self.setup = Some(setup);
        self
    }

    pub fn with_min_win_rate(mut self, pct: f64) -> Self {
        self.min_win_rate = Some(pct);
        self
    }

    /// Judge an existing journal entry (usually one still open) as if it
    /// were a new plan. Keeps the entry's own minimum win rate.
    pub fn from_trade(trade: &HistoricalTrade) -> Self {
        Self {
            symbol: trade.symbol.clone(),
            timeframe: trade.timeframe.clone(),
            plan: trade.plan.clone(),
            indicators: trade.indicators.clone(),
            setup: trade.setup.clone(),
            min_win_rate: trade.min_win_rate,
        }
    }

    /// Read a proposal from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| JudgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut proposal: Self = serde_json::from_str(&json)?;
        proposal.timeframe = normalize_timeframe(&proposal.timeframe);
        Ok(proposal)
    }

    /// Canonical timeframe key of the proposal
    pub fn timeframe_key(&self) -> String {
        normalize_timeframe(&self.timeframe)
    }

    /// The minimum win rate actually applied
    pub fn effective_min_win_rate(&self) -> f64 {
        self.min_win_rate
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_MIN_WIN_RATE)
    }

    pub fn planned_direction(&self) -> Option<Direction> {
        self.plan.direction
    }
}

//! Raw journal records and their normalization
//!
//! `TradeRecord` mirrors what the journal exports: every field optional,
//! numbers sometimes stored as strings, indicator readings as top-level keys.
//! `normalize` resolves all of that once so the engine reads a clean
//! `HistoricalTrade`.

use crate::normalizers::{self, metrics};
use crate::types::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A journal record as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime_entry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime_exit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction_planned: Option<String>,

    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<Decimal>,
    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub size: Option<Decimal>,
    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub fee_per_unit: Option<Decimal>,
    /// Planned take-profit price
    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub planned_limit_price: Option<Decimal>,
    /// Planned stop price
    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub cut_loss_price: Option<Decimal>,
    /// Older exports stored the stop here
    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub ls_price: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decisive_indicator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decisive_signal: Option<String>,
    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub min_win_rate: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_result: Option<bool>,
    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction_taken: Option<String>,
    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub high_during_trade: Option<Decimal>,
    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub low_during_trade: Option<Decimal>,
    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub profit: Option<Decimal>,
    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub profit_per_unit: Option<Decimal>,
    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub risk_per_unit: Option<Decimal>,
    #[serde(default, with = "lenient_decimal", skip_serializing_if = "Option::is_none")]
    pub r_multiple: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_status: Option<String>,

    /// Indicator readings and any fields this version does not model
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TradeRecord {
    /// Read one indicator reading from the flattened fields
    pub fn indicator(&self, indicator: Indicator) -> Option<String> {
        let value = self.extra.get(indicator.key())?;
        let text = match value {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// Planned stop, whichever field it was saved under
    pub fn stop_price(&self) -> Option<Decimal> {
        self.cut_loss_price.or(self.ls_price)
    }

    /// Stop the realized risk is measured from. A legacy `lsPrice` wins
    /// here, since older records kept the filled stop there.
    pub fn result_stop_price(&self) -> Option<Decimal> {
        self.ls_price.or(self.cut_loss_price)
    }

    /// Fill in derived fields the way the journal does on load.
    ///
    /// Assigns an id when missing and derives per-unit profit, risk and the
    /// R-multiple for closed trades that lack them.
    pub fn migrate(mut self) -> Self {
        if self.id.as_deref().map(str::trim).unwrap_or("").is_empty() {
            self.id = Some(uuid::Uuid::new_v4().to_string());
        }
        if self.updated_at.is_none() {
            self.updated_at = self.created_at.clone();
        }

        if self.has_result.unwrap_or(false) {
            let m = metrics::compute_result_metrics(
                &self.symbol_or_default(),
                self.realized_direction(),
                self.entry_price,
                self.exit_price,
                self.result_stop_price(),
                self.fee_per_unit,
            );
            if self.profit_per_unit.is_none() {
                self.profit_per_unit = m.profit_per_unit;
            }
            if self.risk_per_unit.is_none() {
                self.risk_per_unit = m.risk_per_unit;
            }
            if self.r_multiple.is_none() {
                self.r_multiple = m.r_multiple;
            }
            if self.profit.is_none() {
                if let (Some(ppu), Some(size)) = (self.profit_per_unit, self.size) {
                    self.profit = ppu.checked_mul(size);
                }
            }
        }
        self
    }

    fn symbol_or_default(&self) -> String {
        self.symbol
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(normalizers::DEFAULT_SYMBOL)
            .to_string()
    }

    /// A missing or blank type is real; an unknown one stays unknown
    fn parsed_trade_type(&self) -> Option<TradeType> {
        match self.trade_type.as_deref().map(str::trim) {
            None | Some("") => Some(TradeType::default()),
            Some(s) => TradeType::parse(s),
        }
    }

    fn planned_direction(&self) -> Direction {
        self.direction_planned
            .as_deref()
            .and_then(Direction::parse)
            .unwrap_or(Direction::Long)
    }

    fn realized_direction(&self) -> Direction {
        self.direction_taken
            .as_deref()
            .and_then(Direction::parse)
            .unwrap_or_else(|| self.planned_direction())
    }

    /// Convert to the canonical engine shape.
    pub fn normalize(&self) -> HistoricalTrade {
        let migrated = self.clone().migrate();
        let symbol = migrated.symbol_or_default();
        let timeframe = migrated
            .timeframe
            .as_deref()
            .map(normalizers::normalize_timeframe)
            .filter(|tf| !tf.is_empty())
            .unwrap_or_else(|| normalizers::DEFAULT_TIMEFRAME.to_string());

        let mut indicators = IndicatorStates::new();
        for indicator in Indicator::ALL {
            if let Some(value) = migrated.indicator(indicator) {
                indicators.set(indicator, value);
            }
        }

        let setup = SetupId::new(
            migrated
                .decisive_indicator
                .as_deref()
                .and_then(Indicator::parse),
            migrated.decisive_signal.as_deref().unwrap_or(""),
        );

        let has_result = migrated.has_result.unwrap_or(false);
        let trade = HistoricalTrade {
            id: migrated.id.clone().unwrap_or_default(),
            symbol,
            timeframe,
            trade_type: migrated.parsed_trade_type(),
            completion_status: normalizers::normalize_completion_status(
                migrated.completion_status.as_deref(),
            ),
            plan: TradePlan {
                direction: Some(migrated.planned_direction()),
                entry_price: migrated.entry_price.and_then(metrics::to_finite_f64),
                target_price: migrated.planned_limit_price.and_then(metrics::to_finite_f64),
                stop_price: migrated.stop_price().and_then(metrics::to_finite_f64),
            },
            indicators,
            setup,
            min_win_rate: migrated.min_win_rate.and_then(metrics::to_finite_f64),
            has_result,
            direction_taken: Some(migrated.realized_direction()),
            exit_price: migrated.exit_price.and_then(metrics::to_finite_f64),
            r_multiple: migrated.r_multiple.and_then(metrics::to_finite_f64),
            high_during_trade: migrated.high_during_trade.and_then(metrics::to_finite_f64),
            low_during_trade: migrated.low_during_trade.and_then(metrics::to_finite_f64),
            entry_time: migrated
                .datetime_entry
                .as_deref()
                .and_then(normalizers::parse_local_datetime),
            exit_time: migrated
                .datetime_exit
                .as_deref()
                .and_then(normalizers::parse_local_datetime),
            updated_at: migrated
                .updated_at
                .as_deref()
                .or(migrated.created_at.as_deref())
                .and_then(normalizers::parse_timestamp),
        };

        debug!(
            "Normalized record {} ({} {}, r={:?})",
            trade.id, trade.symbol, trade.timeframe, trade.r_multiple
        );
        trade
    }
}

/// Decimal fields that tolerate `null`, `""`, numbers and numeric strings.
/// Written back as plain JSON numbers.
mod lenient_decimal {
    use rust_decimal::prelude::*;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value.and_then(|d| d.to_f64()) {
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(serde_json::Value::Number(n)) => {
                let text = n.to_string();
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .ok()
            }
            Some(serde_json::Value::String(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Decimal::from_str(s).ok()
                }
            }
            _ => None,
        })
    }
}

//! Canonical trade types shared with the judge engine
//!
//! Everything here is already normalized: the engine never sees legacy
//! spellings or alternate field names.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trade direction (planned or realized)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
    /// No position
    Flat,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" | "ロング" => Some(Direction::Long),
            "short" | "sell" | "ショート" => Some(Direction::Short),
            "flat" | "none" | "ノーポジ" => Some(Direction::Flat),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
            Direction::Flat => "flat",
        }
    }

    /// Long or short
    pub fn is_directional(&self) -> bool {
        matches!(self, Direction::Long | Direction::Short)
    }

    /// The opposite side for long/short; flat has none
    pub fn opposite(&self) -> Option<Self> {
        match self {
            Direction::Long => Some(Direction::Short),
            Direction::Short => Some(Direction::Long),
            Direction::Flat => None,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the trade was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TradeType {
    #[default]
    Real,
    Virtual,
    Practice,
}

impl TradeType {
    pub const ALL: [TradeType; 3] = [TradeType::Real, TradeType::Virtual, TradeType::Practice];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "real" | "リアル" => Some(TradeType::Real),
            "virtual" | "バーチャル" => Some(TradeType::Virtual),
            "practice" | "練習" => Some(TradeType::Practice),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Real => "real",
            TradeType::Virtual => "virtual",
            TradeType::Practice => "practice",
        }
    }
}

/// Record completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    /// Entry saved, exit not recorded yet
    Incomplete,
    /// Every field filled in
    Complete,
    /// Closed, but some inputs were left blank
    CompleteWithMissing,
}

impl CompletionStatus {
    pub const ALL: [CompletionStatus; 3] = [
        CompletionStatus::Incomplete,
        CompletionStatus::Complete,
        CompletionStatus::CompleteWithMissing,
    ];

    /// Accepts the canonical keys and the labels the journal app stored.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "incomplete" | "未完成" => Some(CompletionStatus::Incomplete),
            "complete" | "完全完成" => Some(CompletionStatus::Complete),
            "complete_with_missing" | "未入力あり完成" => {
                Some(CompletionStatus::CompleteWithMissing)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::Incomplete => "incomplete",
            CompletionStatus::Complete => "complete",
            CompletionStatus::CompleteWithMissing => "complete_with_missing",
        }
    }
}

/// Categorical chart indicators recorded with every trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    WaveCount,
    DowShape,
    /// 5/20/40 moving-average cycle
    #[serde(rename = "trend_5_20_40")]
    MaCycle,
    PriceVsEma200,
    EmaBandColor,
    /// ATR zone
    Zone,
    CmfSign,
    CmfSmaDir,
    MacdState,
    RocSign,
    RocSmaDir,
    RsiZone,
    UoState,
    UoSmaDir,
    VolumeSpike,
    VolBodyGap,
    RsiOverheat,
    MarketContext,
}

impl Indicator {
    pub const ALL: [Indicator; 18] = [
        Indicator::WaveCount,
        Indicator::DowShape,
        Indicator::MaCycle,
        Indicator::PriceVsEma200,
        Indicator::EmaBandColor,
        Indicator::Zone,
        Indicator::CmfSign,
        Indicator::CmfSmaDir,
        Indicator::MacdState,
        Indicator::RocSign,
        Indicator::RocSmaDir,
        Indicator::RsiZone,
        Indicator::UoState,
        Indicator::UoSmaDir,
        Indicator::VolumeSpike,
        Indicator::VolBodyGap,
        Indicator::RsiOverheat,
        Indicator::MarketContext,
    ];

    /// Indicators that can be picked as the decisive signal of a setup
    pub const DECISIVE: [Indicator; 12] = [
        Indicator::WaveCount,
        Indicator::DowShape,
        Indicator::MaCycle,
        Indicator::PriceVsEma200,
        Indicator::Zone,
        Indicator::EmaBandColor,
        Indicator::CmfSign,
        Indicator::CmfSmaDir,
        Indicator::MacdState,
        Indicator::RocSign,
        Indicator::RocSmaDir,
        Indicator::RsiZone,
    ];

    /// Canonical key, also used in setup ids
    pub fn key(&self) -> &'static str {
        match self {
            Indicator::WaveCount => "waveCount",
            Indicator::DowShape => "dowShape",
            Indicator::MaCycle => "trend_5_20_40",
            Indicator::PriceVsEma200 => "price_vs_ema200",
            Indicator::EmaBandColor => "ema_band_color",
            Indicator::Zone => "zone",
            Indicator::CmfSign => "cmf_sign",
            Indicator::CmfSmaDir => "cmf_sma_dir",
            Indicator::MacdState => "macd_state",
            Indicator::RocSign => "roc_sign",
            Indicator::RocSmaDir => "roc_sma_dir",
            Indicator::RsiZone => "rsi_zone",
            Indicator::UoState => "uo_state",
            Indicator::UoSmaDir => "uo_sma_dir",
            Indicator::VolumeSpike => "volume_spike",
            Indicator::VolBodyGap => "vol_body_gap",
            Indicator::RsiOverheat => "rsi_overheat",
            Indicator::MarketContext => "market_context",
        }
    }

    /// Accepts the journal key or the snake_case serde name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "wave_count" => Some(Indicator::WaveCount),
            "dow_shape" => Some(Indicator::DowShape),
            s => Indicator::ALL.into_iter().find(|ind| ind.key() == s),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Indicator::WaveCount => "Wave count",
            Indicator::DowShape => "Dow shape",
            Indicator::MaCycle => "MA cycle (5/20/40)",
            Indicator::PriceVsEma200 => "EMA200",
            Indicator::EmaBandColor => "EMA band",
            Indicator::Zone => "ATR zone",
            Indicator::CmfSign => "CMF",
            Indicator::CmfSmaDir => "CMF SMA hist",
            Indicator::MacdState => "MACD",
            Indicator::RocSign => "ROC",
            Indicator::RocSmaDir => "ROC SMA hist",
            Indicator::RsiZone => "RSI",
            Indicator::UoState => "Ultimate oscillator",
            Indicator::UoSmaDir => "UO SMA hist",
            Indicator::VolumeSpike => "Volume spike",
            Indicator::VolBodyGap => "Volume/body gap",
            Indicator::RsiOverheat => "RSI overheat",
            Indicator::MarketContext => "Market context",
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Indicator readings; blank readings are never stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorStates(BTreeMap<Indicator, String>);

impl IndicatorStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a trimmed value; blank values clear the slot.
    pub fn set(&mut self, indicator: Indicator, value: impl AsRef<str>) {
        let value = value.as_ref().trim();
        if value.is_empty() {
            self.0.remove(&indicator);
        } else {
            self.0.insert(indicator, value.to_string());
        }
    }

    pub fn with(mut self, indicator: Indicator, value: impl AsRef<str>) -> Self {
        self.set(indicator, value);
        self
    }

    pub fn get(&self, indicator: Indicator) -> Option<&str> {
        self.0
            .get(&indicator)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Indicator, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Setup identity: the decisive indicator and the value it showed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetupId {
    pub indicator: Indicator,
    pub value: String,
}

impl SetupId {
    /// `None` when either half is blank
    pub fn new(indicator: Option<Indicator>, value: &str) -> Option<Self> {
        let value = value.trim();
        match indicator {
            Some(indicator) if !value.is_empty() => Some(Self {
                indicator,
                value: value.to_string(),
            }),
            _ => None,
        }
    }
}

impl std::fmt::Display for SetupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.indicator.key(), self.value)
    }
}

/// Planned entry, target and stop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    /// Planned direction; `None` when unknown
    pub direction: Option<Direction>,
    pub entry_price: Option<f64>,
    pub target_price: Option<f64>,
    pub stop_price: Option<f64>,
}

impl TradePlan {
    pub fn new(direction: Direction, entry: f64, target: f64, stop: f64) -> Self {
        Self {
            direction: Some(direction),
            entry_price: Some(entry),
            target_price: Some(target),
            stop_price: Some(stop),
        }
    }
}

/// A normalized historical trade, as read by the judge engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalTrade {
    pub id: String,
    pub symbol: String,
    /// Canonical timeframe key ("1m", "1h", "1d", ...)
    pub timeframe: String,
    /// `None` when the stored type was not one this version knows
    pub trade_type: Option<TradeType>,
    /// `None` when the stored status was missing or unrecognized
    pub completion_status: Option<CompletionStatus>,
    pub plan: TradePlan,
    pub indicators: IndicatorStates,
    pub setup: Option<SetupId>,
    /// Minimum win rate (percent) saved with the plan
    #[serde(default)]
    pub min_win_rate: Option<f64>,
    pub has_result: bool,
    /// Direction actually taken
    pub direction_taken: Option<Direction>,
    pub exit_price: Option<f64>,
    /// Realized profit divided by initial risk
    pub r_multiple: Option<f64>,
    pub high_during_trade: Option<f64>,
    pub low_during_trade: Option<f64>,
    pub entry_time: Option<NaiveDateTime>,
    pub exit_time: Option<NaiveDateTime>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl HistoricalTrade {
    /// A blank trade for `symbol`/`timeframe`; callers fill in the rest.
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            trade_type: Some(TradeType::Real),
            completion_status: Some(CompletionStatus::Complete),
            plan: TradePlan::default(),
            indicators: IndicatorStates::new(),
            setup: None,
            min_win_rate: None,
            has_result: false,
            direction_taken: None,
            exit_price: None,
            r_multiple: None,
            high_during_trade: None,
            low_during_trade: None,
            entry_time: None,
            exit_time: None,
            updated_at: None,
        }
    }

    /// Realized R-multiple when it is a usable number
    pub fn realized_r(&self) -> Option<f64> {
        self.r_multiple.filter(|r| r.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_parse_accepts_both_spellings() {
        assert_eq!(Indicator::parse("waveCount"), Some(Indicator::WaveCount));
        assert_eq!(Indicator::parse("wave_count"), Some(Indicator::WaveCount));
        assert_eq!(Indicator::parse("trend_5_20_40"), Some(Indicator::MaCycle));
        assert_eq!(Indicator::parse("price_vs_ema200"), Some(Indicator::PriceVsEma200));
        assert_eq!(Indicator::parse("bogus"), None);
    }

    #[test]
    fn test_indicator_states_drop_blanks() {
        let mut states = IndicatorStates::new().with(Indicator::MacdState, " golden ");
        assert_eq!(states.get(Indicator::MacdState), Some("golden"));

        states.set(Indicator::MacdState, "   ");
        assert_eq!(states.get(Indicator::MacdState), None);
        assert!(states.is_empty());
    }

    #[test]
    fn test_setup_id_requires_both_halves() {
        assert!(SetupId::new(None, "up").is_none());
        assert!(SetupId::new(Some(Indicator::RsiZone), " ").is_none());

        let id = SetupId::new(Some(Indicator::RsiZone), "oversold").unwrap();
        assert_eq!(id.to_string(), "rsi_zone::oversold");
    }

    #[test]
    fn test_completion_status_labels() {
        assert_eq!(CompletionStatus::parse("完全完成"), Some(CompletionStatus::Complete));
        assert_eq!(
            CompletionStatus::parse("未入力あり完成"),
            Some(CompletionStatus::CompleteWithMissing)
        );
        assert_eq!(CompletionStatus::parse("incomplete"), Some(CompletionStatus::Incomplete));
        assert_eq!(CompletionStatus::parse("done"), None);
    }

    #[test]
    fn test_direction_round_trip_names() {
        assert_eq!(Direction::parse("LONG"), Some(Direction::Long));
        assert_eq!(Direction::parse("ショート"), Some(Direction::Short));
        assert_eq!(Direction::Long.opposite(), Some(Direction::Short));
        assert_eq!(Direction::Flat.opposite(), None);
        assert!(!Direction::Flat.is_directional());
    }
}

// Normalization logic for records written by older journal versions
use crate::types::*;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

pub mod metrics;

/// Timeframe used when a record has none
pub const DEFAULT_TIMEFRAME: &str = "1h";

/// Symbol used when a record has none (micro Nikkei 225 futures)
pub const DEFAULT_SYMBOL: &str = "nk225mc";

/// Normalize a timeframe label to its canonical key ("1時間足" -> "1h")
pub fn normalize_timeframe(tf: &str) -> String {
    let s = tf.trim();
    let canonical = match s {
        "1分" | "1分足" | "1m" => "1m",
        "5分" | "5分足" | "5m" => "5m",
        "15分" | "15分足" | "15m" => "15m",
        "30分" | "30分足" | "30m" => "30m",
        "1時間" | "1時間足" | "1h" => "1h",
        "4時間" | "4時間足" | "4h" => "4h",
        "日足" | "日" | "1日" | "1d" => "1d",
        // "<digits><m|h|d>" and unknown labels pass through untouched
        other => other,
    };
    canonical.to_string()
}

/// Contract multiplier: price points to currency per unit
pub fn contract_multiplier(symbol: &str) -> Decimal {
    match symbol {
        "nk225mc" => Decimal::from(10),
        "nk225m" => Decimal::from(100),
        "nk225" => Decimal::from(1000),
        _ => Decimal::ONE,
    }
}

/// Completion status for judging: unknown or legacy labels become `None`,
/// which the engine treats as "complete with missing input".
pub fn normalize_completion_status(raw: Option<&str>) -> Option<CompletionStatus> {
    raw.and_then(CompletionStatus::parse)
}

/// Parse the journal's entry/exit timestamps.
///
/// Accepts `datetime-local` values ("2024-05-01T09:30", with or without
/// seconds) and RFC 3339 strings.
pub fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
}

/// Parse an RFC 3339 audit timestamp (`createdAt`/`updatedAt`)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_aliases() {
        assert_eq!(normalize_timeframe("1時間足"), "1h");
        assert_eq!(normalize_timeframe(" 5分 "), "5m");
        assert_eq!(normalize_timeframe("日足"), "1d");
        assert_eq!(normalize_timeframe("2h"), "2h");
        assert_eq!(normalize_timeframe("weekly"), "weekly");
    }

    #[test]
    fn test_contract_multiplier() {
        assert_eq!(contract_multiplier("nk225mc"), Decimal::from(10));
        assert_eq!(contract_multiplier("nk225"), Decimal::from(1000));
        assert_eq!(contract_multiplier("usdjpy"), Decimal::ONE);
    }

    #[test]
    fn test_unknown_status_is_none() {
        assert_eq!(normalize_completion_status(Some("完全完成")), Some(CompletionStatus::Complete));
        assert_eq!(normalize_completion_status(Some("")), None);
        assert_eq!(normalize_completion_status(None), None);
    }

    #[test]
    fn test_parse_local_datetime() {
        let dt = parse_local_datetime("2024-05-01T09:30").unwrap();
        assert_eq!(dt.to_string(), "2024-05-01 09:30:00");
        assert!(parse_local_datetime("2024-05-01T09:30:15Z").is_some());
        assert!(parse_local_datetime("yesterday").is_none());
        assert!(parse_local_datetime("").is_none());
    }
}

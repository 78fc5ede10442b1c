//! File-level tests for journal exports

use record_store::{CompletionStatus, Direction, Indicator, RecordStore, StoreError};
use std::io::Write;

const EXPORT: &str = r#"{
  "version": 1,
  "records": [
    {
      "id": "r-1",
      "createdAt": "2024-03-01T00:00:00Z",
      "datetimeEntry": "2024-03-01T10:00",
      "symbol": "nk225mc",
      "timeframe": "15分足",
      "directionPlanned": "short",
      "entryPrice": 39000,
      "feePerUnit": 0,
      "plannedLimitPrice": 38900,
      "cutLossPrice": 39050,
      "rsi_zone": "overbought",
      "decisiveIndicator": "rsi_zone",
      "decisiveSignal": "overbought",
      "hasResult": true,
      "exitPrice": 38950,
      "lowDuringTrade": 38920,
      "completionStatus": "未入力あり完成"
    },
    {
      "id": "r-2",
      "createdAt": "2024-03-02T00:00:00Z",
      "symbol": "nk225mc",
      "timeframe": "15m",
      "entryPrice": 39100,
      "hasResult": false,
      "completionStatus": "未完成"
    }
  ]
}"#;

#[test]
fn test_load_from_disk_normalizes_records() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(EXPORT.as_bytes()).unwrap();

    let store = RecordStore::load(file.path()).unwrap();
    assert_eq!(store.len(), 2);

    let closed = &store.trades()[0];
    assert_eq!(closed.timeframe, "15m");
    assert_eq!(closed.direction_taken, Some(Direction::Short));
    assert_eq!(closed.completion_status, Some(CompletionStatus::CompleteWithMissing));
    assert_eq!(closed.indicators.get(Indicator::RsiZone), Some("overbought"));
    // (39000 - 38950) * 10 / ((39050 - 39000) * 10)
    assert_eq!(closed.r_multiple, Some(1.0));
    assert_eq!(closed.low_during_trade, Some(38920.0));

    let open = &store.trades()[1];
    assert!(!open.has_result);
    assert_eq!(open.completion_status, Some(CompletionStatus::Incomplete));
}

#[test]
fn test_save_then_load_keeps_records() {
    let store = RecordStore::parse(EXPORT).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.json");

    store.save(&path).unwrap();
    let reloaded = RecordStore::load(&path).unwrap();

    assert_eq!(reloaded.trades(), store.trades());
}

#[test]
fn test_missing_file_reports_path() {
    let err = RecordStore::load("/definitely/not/here.json").unwrap_err();
    match err {
        StoreError::Io { path, .. } => assert!(path.ends_with("here.json")),
        other => panic!("unexpected error: {other}"),
    }
}

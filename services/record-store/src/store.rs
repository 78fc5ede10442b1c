//! In-memory record store with journal export import/merge

use crate::error::{Result, StoreError};
use crate::normalizers;
use crate::record::TradeRecord;
use crate::types::HistoricalTrade;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Export format version written by the journal
pub const EXPORT_VERSION: u32 = 1;

/// Journal export file (`{"version": 1, "records": [...]}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFile {
    pub version: u32,
    pub records: Vec<TradeRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Export(ExportFile),
    Bare(Vec<TradeRecord>),
}

/// Outcome of merging an import into the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub added: usize,
    pub updated: usize,
}

/// Ordered collection of journal records and their normalized form
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<TradeRecord>,
    trades: Vec<HistoricalTrade>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw records, keeping their order
    pub fn from_records(records: impl IntoIterator<Item = TradeRecord>) -> Self {
        let records: Vec<TradeRecord> = records.into_iter().map(TradeRecord::migrate).collect();
        let trades = records.iter().map(TradeRecord::normalize).collect();
        Self { records, trades }
    }

    /// Parse an export file or a bare JSON array of records
    pub fn parse(json: &str) -> Result<Self> {
        let records = match serde_json::from_str::<RecordFile>(json)? {
            RecordFile::Export(file) => {
                if file.version != EXPORT_VERSION {
                    return Err(StoreError::UnsupportedVersion {
                        found: file.version,
                        expected: EXPORT_VERSION,
                    });
                }
                file.records
            }
            RecordFile::Bare(records) => records,
        };
        Ok(Self::from_records(records))
    }

    /// Load records from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::parse(&json)?;
        info!("Loaded {} records from {}", store.len(), path.display());
        Ok(store)
    }

    /// Serialize as a journal export file
    pub fn to_json(&self) -> Result<String> {
        let file = ExportFile {
            version: EXPORT_VERSION,
            records: self.records.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Wrote {} records to {}", self.len(), path.display());
        Ok(())
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    /// Normalized trades, same order as `records()`
    pub fn trades(&self) -> &[HistoricalTrade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Trades for one symbol/timeframe. Judging on this subset gives the
    /// same result as judging on the full store.
    pub fn prefilter(&self, symbol: &str, timeframe: &str) -> Vec<HistoricalTrade> {
        let timeframe = normalizers::normalize_timeframe(timeframe);
        self.trades
            .iter()
            .filter(|t| t.symbol == symbol && t.timeframe == timeframe)
            .cloned()
            .collect()
    }

    /// `prefilter`, leaving out the record being judged so it never
    /// counts as its own case.
    pub fn history_for(
        &self,
        symbol: &str,
        timeframe: &str,
        exclude_id: Option<&str>,
    ) -> Vec<HistoricalTrade> {
        let mut history = self.prefilter(symbol, timeframe);
        if let Some(id) = exclude_id {
            history.retain(|t| t.id != id);
        }
        history
    }

    /// Merge imported records.
    ///
    /// New ids are added. An existing id is replaced only when the incoming
    /// record's `updatedAt` (or `createdAt`) is strictly newer. The store is
    /// then ordered by entry time, newest first.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = TradeRecord>) -> MergeSummary {
        let mut summary = MergeSummary::default();
        let mut index: HashMap<String, usize> = self
            .records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.id.clone().map(|id| (id, i)))
            .collect();

        for record in incoming.into_iter().map(TradeRecord::migrate) {
            let Some(id) = record.id.clone() else {
                warn!("Skipping imported record without id");
                continue;
            };
            match index.get(&id) {
                None => {
                    index.insert(id, self.records.len());
                    self.records.push(record);
                    summary.added += 1;
                }
                Some(&pos) => {
                    let current = revision_time(&self.records[pos]);
                    let candidate = revision_time(&record);
                    if let (Some(current), Some(candidate)) = (current, candidate) {
                        if candidate > current {
                            self.records[pos] = record;
                            summary.updated += 1;
                        }
                    }
                }
            }
        }

        self.records.sort_by(|a, b| entry_time(b).cmp(&entry_time(a)));
        self.trades = self.records.iter().map(TradeRecord::normalize).collect();

        info!(
            "Merged import: {} added, {} updated, {} total",
            summary.added,
            summary.updated,
            self.records.len()
        );
        summary
    }
}

fn revision_time(record: &TradeRecord) -> Option<chrono::DateTime<chrono::Utc>> {
    record
        .updated_at
        .as_deref()
        .or(record.created_at.as_deref())
        .and_then(normalizers::parse_timestamp)
}

fn entry_time(record: &TradeRecord) -> Option<chrono::NaiveDateTime> {
    record
        .datetime_entry
        .as_deref()
        .and_then(normalizers::parse_local_datetime)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, updated: &str, entry: &str, symbol: &str) -> TradeRecord {
        TradeRecord {
            id: Some(id.to_string()),
            updated_at: Some(updated.to_string()),
            datetime_entry: Some(entry.to_string()),
            symbol: Some(symbol.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_adds_and_updates_newer_only() {
        let mut store = RecordStore::from_records(vec![
            record("a", "2024-01-01T00:00:00Z", "2024-01-01T09:00", "nk225mc"),
            record("b", "2024-01-05T00:00:00Z", "2024-01-02T09:00", "nk225mc"),
        ]);

        let summary = store.merge(vec![
            // newer revision of a
            record("a", "2024-02-01T00:00:00Z", "2024-01-01T09:00", "nk225m"),
            // older revision of b is ignored
            record("b", "2023-12-01T00:00:00Z", "2024-01-02T09:00", "nk225"),
            record("c", "2024-01-03T00:00:00Z", "2024-01-03T09:00", "nk225mc"),
        ]);

        assert_eq!(summary, MergeSummary { added: 1, updated: 1 });
        let ids: Vec<_> = store.trades().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(store.trades()[2].symbol, "nk225m");
        assert_eq!(store.trades()[1].symbol, "nk225mc");
    }

    #[test]
    fn test_parse_rejects_unknown_version() {
        let err = RecordStore::parse(r#"{"version": 2, "records": []}"#).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnsupportedVersion { found: 2, expected: 1 }
        ));
    }

    #[test]
    fn test_parse_accepts_bare_array() {
        let store = RecordStore::parse(r#"[{"id": "x", "symbol": "nk225m"}]"#).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.trades()[0].symbol, "nk225m");
    }

    #[test]
    fn test_prefilter_normalizes_timeframe() {
        let store = RecordStore::parse(
            r#"[{"id": "x", "symbol": "nk225m", "timeframe": "1時間"},
                {"id": "y", "symbol": "nk225m", "timeframe": "5m"}]"#,
        )
        .unwrap();
        let subset = store.prefilter("nk225m", "1時間足");
        assert_eq!(subset.len(), 1);
        assert_eq!(subset[0].id, "x");
    }

    #[test]
    fn test_history_for_excludes_the_judged_record() {
        let store = RecordStore::parse(
            r#"[{"id": "self", "symbol": "nk225m", "timeframe": "1h"},
                {"id": "other", "symbol": "nk225m", "timeframe": "1h"}]"#,
        )
        .unwrap();
        let history = store.history_for("nk225m", "1h", Some("self"));
        let ids: Vec<_> = history.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["other"]);
        assert_eq!(store.history_for("nk225m", "1h", None).len(), 2);
    }
}

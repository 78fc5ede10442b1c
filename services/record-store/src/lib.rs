//! Record Store Library
//!
//! Trade journal records for the judge engine: loading, legacy
//! normalization, R-multiple derivation and import merging.

pub mod error;
pub mod normalizers;
pub mod record;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use error::{Result, StoreError};
pub use record::TradeRecord;
pub use store::{ExportFile, MergeSummary, RecordStore, EXPORT_VERSION};
pub use types::*;

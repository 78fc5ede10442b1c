use std::path::PathBuf;

/// Error types for the record store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid record file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported export version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Result type for record store operations
pub type Result<T> = std::result::Result<T, StoreError>;

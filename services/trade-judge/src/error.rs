use std::path::PathBuf;

/// Errors at the engine's I/O boundary. Judging itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Record store error: {0}")]
    Store(#[from] record_store::StoreError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid proposal: {0}")]
    Proposal(#[from] serde_json::Error),
}

/// Result type for judge boundary operations
pub type Result<T> = std::result::Result<T, JudgeError>;

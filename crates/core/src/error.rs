use std::path::PathBuf;
use thiserror::Error;

/// Main error type for search index operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search index needs to be rebuilt: {0}")]
    CorruptIndex(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Index checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Checksum { expected: u32, actual: u32 },

    #[error("Index snapshot error: incompatible version {actual}, expected <= {expected}")]
    IncompatibleSnapshot { expected: u32, actual: u32 },

    #[error("Invalid wildcard pattern: {0}")]
    InvalidPattern(String),

    #[error("Malformed TSV row in {path:?} at line {line}: {message}")]
    Tsv {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Index worker stopped - cannot accept new tasks")]
    WorkerStopped,
}

/// Result type alias for search index operations
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// Check if this error is resolved by rebuilding the index from the corpus
    pub fn needs_rebuild(&self) -> bool {
        matches!(
            self,
            SearchError::CorruptIndex(_)
                | SearchError::Serialization(_)
                | SearchError::Checksum { .. }
                | SearchError::IncompatibleSnapshot { .. }
        )
    }
}

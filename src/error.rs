//! Error types for keyword partitioning and embedding export.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, KeywordError>;

/// Every failure the library reports. All of them are fatal for the run.
#[derive(Error, Debug)]
pub enum KeywordError {
    // Input errors
    #[error("input file not found: {}", path.display())]
    InputMissing { path: PathBuf },

    #[error("failed to read input {}: {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse / validation errors
    #[error("row {row}: column '{column}' expects a number, got '{value}'")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: column '{column}' has non-finite value '{value}'")]
    NonFinite {
        row: usize,
        column: String,
        value: String,
    },

    #[error("required column '{0}' is missing from the header")]
    MissingColumn(String),

    #[error("row {row}: expected {expected} fields, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    // Output errors
    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Embedding export errors
    #[error(
        "embedding matrix size mismatch: expected {expected} bytes \
         ({keywords} keywords x {dimensions} dims x 4), found {found}"
    )]
    ShapeMismatch {
        keywords: usize,
        dimensions: usize,
        expected: u64,
        found: u64,
    },

    #[error("embedding matrix of {keywords} keywords x {dimensions} dims does not fit in memory")]
    MatrixTooLarge { keywords: usize, dimensions: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KeywordError {
    pub(crate) fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KeywordError::Output {
            path: path.into(),
            source,
        }
    }

    /// Map an I/O failure on an input path, distinguishing "absent" from
    /// "present but unreadable".
    pub(crate) fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            KeywordError::InputMissing { path }
        } else {
            KeywordError::InputUnreadable { path, source }
        }
    }
}

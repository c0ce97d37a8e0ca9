use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading reference data from disk.
///
/// Loaders never hand these to resolvers: they are logged and the affected
/// table falls back to empty.
#[derive(Debug, Error)]
pub enum RefDataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },
}

pub type Result<T> = std::result::Result<T, RefDataError>;

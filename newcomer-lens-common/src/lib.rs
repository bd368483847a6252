pub mod config;
pub use config::{AnalysisConfig, Config, LoaderConfig, ReportsConfig};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewcomerLensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),
    #[error("config error: {0}")]
    Config(String),
    #[error("malformed record {}: field `{field}` {reason}", path.display())]
    MalformedRecord {
        path: PathBuf,
        field: String,
        reason: String,
    },
    #[error("incomplete label data for {repository}: missing `{field}`")]
    IncompleteLabelData { repository: String, field: String },
    #[error("empty input")]
    EmptyInput,
    #[error("one side of the comparison is empty")]
    EmptyComparisonInput,
    #[error("report {kind} failed: {message}")]
    Report { kind: String, message: String },
}

impl NewcomerLensError {
    pub fn malformed(path: impl Into<PathBuf>, field: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            path: path.into(),
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NewcomerLensError>;

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LexideckError>;

#[derive(Error, Debug)]
pub enum LexideckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("missing environment variable '{key}'")]
    MissingEnvVar { key: String },

    #[error("environment variable '{key}' has malformed value '{value}': {reason}")]
    MalformedEnvVar {
        key: String,
        value: String,
        reason: String,
    },

    #[error("no input file found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("input file is empty or missing headers: {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("missing column '{column}' in input file: {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("no data to write down")]
    EmptyWrite,

    #[error("note set file is corrupt: {}: {source}", .path.display())]
    CorruptNoteSet {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// All field violations found while constructing one entry batch.
#[derive(Debug, Error)]
#[error("invalid entry data: {}", .violations.join("; "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

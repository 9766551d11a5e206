use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: invalid YAML: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{path}: invalid front matter: {reason}")]
    FrontMatter { path: PathBuf, reason: String },

    #[error("{path}: invalid date `{value}`")]
    Date { path: PathBuf, value: String },

    #[error("invalid store: {0}")]
    Store(String),

    #[error("record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

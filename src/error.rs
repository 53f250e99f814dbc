use thiserror::Error;

/// Failure to load one source. Never retried; the caller decides whether to abort.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("source '{source_id}': network error: {reason}")]
    Network { source_id: String, reason: String },

    #[error("source '{source_id}': HTTP status {status}")]
    Status { source_id: String, status: u16 },

    #[error("source '{source_id}': malformed payload: {reason}")]
    Malformed { source_id: String, reason: String },

    #[error("source '{source_id}': IO error: {error}")]
    Io {
        source_id: String,
        #[source]
        error: std::io::Error,
    },
}

impl FetchError {
    pub fn source_id(&self) -> &str {
        match self {
            FetchError::Network { source_id, .. }
            | FetchError::Status { source_id, .. }
            | FetchError::Malformed { source_id, .. }
            | FetchError::Io { source_id, .. } => source_id,
        }
    }

    pub(crate) fn malformed(source_id: &str, reason: impl Into<String>) -> Self {
        FetchError::Malformed {
            source_id: source_id.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Cache(err.to_string())
    }
}

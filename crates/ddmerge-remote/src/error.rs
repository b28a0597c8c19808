//! Error types for ddmerge-remote

use ddmerge_core::DatasetError;
use thiserror::Error;

/// Errors that can occur talking to project directories or reading JSON
#[derive(Error, Debug)]
pub enum RemoteError {
    /// HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success HTTP status
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    /// Uri cannot be handled by this client
    #[error("unsupported uri: {0}")]
    InvalidUri(String),

    /// Response body is not the expected document
    #[error("unexpected response from {url}: {detail}")]
    UnexpectedBody { url: String, detail: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Http(err.to_string())
    }
}

impl RemoteError {
    /// Report as a project-list retrieval failure for `uri`.
    pub fn into_retrieval(self, uri: &str) -> DatasetError {
        DatasetError::Retrieval {
            uri: uri.to_string(),
            detail: self.to_string(),
        }
    }

    /// Report as a JSON fetch failure for `uri`.
    pub fn into_fetch(self, uri: &str) -> DatasetError {
        DatasetError::Fetch {
            uri: uri.to_string(),
            detail: self.to_string(),
        }
    }
}

/// Result type for remote operations
pub type Result<T> = std::result::Result<T, RemoteError>;

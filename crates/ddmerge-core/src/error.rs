//! Error types for the default-data pipeline.

use thiserror::Error;

/// Errors produced while loading, retrieving, or merging default data.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// No retriever is registered for the scheme of a project source uri.
    #[error("no retriever registered for scheme '{scheme}' (uri {uri})")]
    UnknownScheme { scheme: String, uri: String },

    /// A project source is unusable as configured.
    #[error("malformed project source for organization '{organization}': {reason}")]
    MalformedSource {
        organization: String,
        reason: String,
    },

    /// A retriever failed to produce the project list of a source.
    #[error("project list retrieval failed for {uri}: {detail}")]
    Retrieval { uri: String, detail: String },

    /// A remote JSON document could not be fetched.
    #[error("failed to fetch JSON from {uri}: {detail}")]
    Fetch { uri: String, detail: String },

    /// A fetched document does not have the expected shape.
    #[error("unexpected document shape from {uri}: {detail}")]
    Shape { uri: String, detail: String },

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias.
pub type DatasetResult<T> = std::result::Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_scheme_displays_scheme_and_uri() {
        let err = DatasetError::UnknownScheme {
            scheme: "svn".to_string(),
            uri: "svn://example.org".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("svn"));
        assert!(msg.contains("svn://example.org"));
    }

    #[test]
    fn test_retrieval_error_displays_uri_and_detail() {
        let err = DatasetError::Retrieval {
            uri: "gerrit://review.openstack.org".to_string(),
            detail: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("review.openstack.org"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_serde_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: DatasetError = parse.unwrap_err().into();
        assert!(err.to_string().contains("serialization error"));
    }
}

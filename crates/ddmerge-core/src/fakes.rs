//! In-memory fakes for the retrieval traits (testing only)
//!
//! Provides `StaticRetriever`, `FailingRetriever`, and `MemoryJsonFetcher`
//! that satisfy the trait contracts without any network access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::dataset::ProjectSource;
use crate::error::{DatasetError, DatasetResult};
use crate::retrieval::{JsonFetcher, RepoCandidate, SourceRetriever};

// ---------------------------------------------------------------------------
// StaticRetriever
// ---------------------------------------------------------------------------

/// Returns the same candidate list for every source and counts calls.
#[derive(Debug, Default)]
pub struct StaticRetriever {
    candidates: Vec<RepoCandidate>,
    calls: AtomicUsize,
}

impl StaticRetriever {
    pub fn new(candidates: Vec<RepoCandidate>) -> Self {
        Self {
            candidates,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceRetriever for StaticRetriever {
    async fn retrieve(&self, source: &ProjectSource) -> DatasetResult<Vec<RepoCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .candidates
            .iter()
            .filter(|c| !source.excludes(&c.module))
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// OrganizationRetriever
// ---------------------------------------------------------------------------

/// Serves a candidate list per organization; unknown organizations get `[]`.
#[derive(Debug, Default)]
pub struct OrganizationRetriever {
    by_organization: HashMap<String, Vec<RepoCandidate>>,
}

impl OrganizationRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, organization: &str, candidates: Vec<RepoCandidate>) -> Self {
        self.by_organization
            .insert(organization.to_string(), candidates);
        self
    }
}

#[async_trait]
impl SourceRetriever for OrganizationRetriever {
    async fn retrieve(&self, source: &ProjectSource) -> DatasetResult<Vec<RepoCandidate>> {
        Ok(self
            .by_organization
            .get(&source.organization)
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// FailingRetriever
// ---------------------------------------------------------------------------

/// Always fails with a retrieval error carrying `detail`.
#[derive(Debug)]
pub struct FailingRetriever {
    detail: String,
}

impl FailingRetriever {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[async_trait]
impl SourceRetriever for FailingRetriever {
    async fn retrieve(&self, source: &ProjectSource) -> DatasetResult<Vec<RepoCandidate>> {
        Err(DatasetError::Retrieval {
            uri: source.uri.clone(),
            detail: self.detail.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// MemoryJsonFetcher
// ---------------------------------------------------------------------------

/// JSON documents served from a `HashMap<uri, Value>`; records requested uris.
#[derive(Debug, Default)]
pub struct MemoryJsonFetcher {
    documents: HashMap<String, Value>,
    requested: Mutex<Vec<String>>,
}

impl MemoryJsonFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, uri: &str, document: Value) -> Self {
        self.documents.insert(uri.to_string(), document);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl JsonFetcher for MemoryJsonFetcher {
    async fn read_json(&self, uri: &str) -> DatasetResult<Value> {
        self.requested.lock().unwrap().push(uri.to_string());
        self.documents
            .get(uri)
            .cloned()
            .ok_or_else(|| DatasetError::Fetch {
                uri: uri.to_string(),
                detail: "not found".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_static_retriever_honours_exclude() {
        let retriever = StaticRetriever::new(vec![
            RepoCandidate::new("nova", "git://x/nova"),
            RepoCandidate::new("attic", "git://x/attic"),
        ]);
        let mut source = ProjectSource::new("openstack", "gerrit://x");
        source.exclude = vec!["attic".to_string()];
        let got = retriever.retrieve(&source).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].module, "nova");
        assert_eq!(retriever.calls(), 1);
    }

    #[tokio::test]
    async fn test_memory_fetcher_missing_uri_is_fetch_error() {
        let fetcher = MemoryJsonFetcher::new().with("mem://a", json!({"drivers": []}));
        assert!(fetcher.read_json("mem://a").await.is_ok());
        let err = fetcher.read_json("mem://b").await.unwrap_err();
        assert!(matches!(err, DatasetError::Fetch { .. }));
        assert_eq!(fetcher.requested(), vec!["mem://a", "mem://b"]);
    }
}

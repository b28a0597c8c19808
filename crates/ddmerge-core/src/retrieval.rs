//! Retrieval seams: project-list retrievers and the remote JSON fetcher.
//!
//! Implementations live outside this crate (HTTP clients) or in
//! [`crate::fakes`] (tests). A [`RetrieverRegistry`] maps a uri scheme to the
//! retriever that understands it and is built once at pipeline setup.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::{ProjectSource, Repository};
use crate::error::DatasetResult;

/// A repository as reported by an external project directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoCandidate {
    pub module: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_gerrit: Option<bool>,
}

impl RepoCandidate {
    pub fn new(module: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            uri: uri.into(),
            organization: None,
            has_gerrit: None,
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_gerrit(mut self, has_gerrit: bool) -> Self {
        self.has_gerrit = Some(has_gerrit);
        self
    }

    /// New repository record, falling back to `organization` when the
    /// candidate does not name one.
    pub fn into_repository(self, organization: &str) -> Repository {
        let mut repo = Repository::new(self.module).with_uri(self.uri);
        repo.organization = Some(
            self.organization
                .unwrap_or_else(|| organization.to_string()),
        );
        repo.has_gerrit = self.has_gerrit;
        // Normalization has already run by the time candidates arrive.
        repo.releases = Some(Vec::new());
        repo
    }
}

/// Fetches the project list of one [`ProjectSource`].
///
/// Implement this trait to plug in a code-review system, a code-hosting
/// API, or a test stub.
#[async_trait]
pub trait SourceRetriever: Send + Sync {
    async fn retrieve(&self, source: &ProjectSource) -> DatasetResult<Vec<RepoCandidate>>;
}

/// Reads a JSON document from a uri (remote or local).
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn read_json(&self, uri: &str) -> DatasetResult<Value>;
}

/// Scheme of a project source uri: `gerrit` for `gerrit://review.openstack.org`.
pub fn source_scheme(uri: &str) -> Option<&str> {
    uri.split_once("://")
        .map(|(scheme, _)| scheme)
        .filter(|scheme| !scheme.is_empty())
}

/// Scheme → retriever lookup table.
#[derive(Clone, Default)]
pub struct RetrieverRegistry {
    retrievers: BTreeMap<String, Arc<dyn SourceRetriever>>,
}

impl RetrieverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `retriever` for `scheme`, replacing any previous one.
    pub fn register(mut self, scheme: impl Into<String>, retriever: Arc<dyn SourceRetriever>) -> Self {
        self.retrievers
            .insert(scheme.into().to_ascii_lowercase(), retriever);
        self
    }

    pub fn get(&self, scheme: &str) -> Option<&Arc<dyn SourceRetriever>> {
        self.retrievers.get(&scheme.to_ascii_lowercase())
    }

    /// Retriever for the scheme of `uri`.
    pub fn for_uri(&self, uri: &str) -> Option<&Arc<dyn SourceRetriever>> {
        source_scheme(uri).and_then(|scheme| self.get(scheme))
    }

    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.retrievers.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for RetrieverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrieverRegistry")
            .field("schemes", &self.retrievers.keys().collect::<Vec<_>>())
            .finish()
    }
}

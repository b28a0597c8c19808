//! ddmerge-remote: network collaborators of the default-data pipeline
//!
//! Implements the retrieval traits of `ddmerge-core` over HTTP:
//!
//! - [`GerritRetriever`] for `gerrit://` project sources
//! - [`GithubRetriever`] for `github://` project sources
//! - [`HttpJsonFetcher`] for DriverLog documents (HTTP or local file)
//!
//! Requests are anonymous; timeouts come from [`RemoteConfig`].

pub mod client;
pub mod config;
pub mod error;
pub mod gerrit;
pub mod github;

use std::sync::Arc;

use ddmerge_core::RetrieverRegistry;

pub use client::{HttpClient, HttpJsonFetcher};
pub use config::RemoteConfig;
pub use error::{RemoteError, Result};
pub use gerrit::GerritRetriever;
pub use github::GithubRetriever;

pub const GERRIT_SCHEME: &str = "gerrit";
pub const GITHUB_SCHEME: &str = "github";

/// Registry with the Gerrit and GitHub retrievers sharing one HTTP client
pub fn default_registry(config: &RemoteConfig) -> Result<RetrieverRegistry> {
    let client = HttpClient::new(config)?;
    Ok(RetrieverRegistry::new()
        .register(
            GERRIT_SCHEME,
            Arc::new(GerritRetriever::new(client.clone(), config.clone())),
        )
        .register(GITHUB_SCHEME, Arc::new(GithubRetriever::new(client, config))))
}

//! Gerrit project-list retriever (`gerrit://<host>` sources)
//!
//! Uses the Gerrit REST endpoint `GET /projects/?p=<organization>/`. Gerrit
//! prefixes JSON bodies with `)]}'` to defeat XSSI; it is stripped before
//! parsing.

use async_trait::async_trait;
use ddmerge_core::{DatasetResult, ProjectSource, RepoCandidate, SourceRetriever};
use serde_json::{Map, Value};
use tracing::info;

use crate::client::HttpClient;
use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::Result;

const XSSI_PREFIX: &str = ")]}'";

/// Lists an organization's projects from a Gerrit server
#[derive(Debug, Clone)]
pub struct GerritRetriever {
    client: HttpClient,
    config: RemoteConfig,
}

impl GerritRetriever {
    pub fn new(client: HttpClient, config: RemoteConfig) -> Self {
        GerritRetriever { client, config }
    }

    /// Server base URL for a `gerrit://` uri, falling back to the configured one
    pub fn server_url(&self, source_uri: &str) -> String {
        let host = source_uri
            .split_once("://")
            .map(|(_, rest)| rest.trim_end_matches('/'))
            .unwrap_or_default();
        if host.is_empty() {
            self.config.gerrit_url.trim_end_matches('/').to_string()
        } else {
            format!("https://{host}")
        }
    }

    async fn list(&self, source: &ProjectSource) -> Result<Vec<RepoCandidate>> {
        let url = format!(
            "{}/projects/?p={}%2F",
            self.server_url(&source.uri),
            source.organization
        );
        let body = self.client.get_text(&url).await?;
        let git_base = source
            .git_base_uri
            .as_deref()
            .unwrap_or(self.config.git_base_uri.as_str());
        let candidates = parse_projects(&body, source, git_base).map_err(|detail| {
            RemoteError::UnexpectedBody {
                url: url.clone(),
                detail,
            }
        })?;
        info!(
            organization = %source.organization,
            projects = candidates.len(),
            "gerrit project list retrieved"
        );
        Ok(candidates)
    }
}

#[async_trait]
impl SourceRetriever for GerritRetriever {
    async fn retrieve(&self, source: &ProjectSource) -> DatasetResult<Vec<RepoCandidate>> {
        self.list(source)
            .await
            .map_err(|e| e.into_retrieval(&source.uri))
    }
}

/// Map a `/projects/` response body to candidates of `source`'s organization
pub fn parse_projects(
    body: &str,
    source: &ProjectSource,
    git_base_uri: &str,
) -> std::result::Result<Vec<RepoCandidate>, String> {
    let json = body.trim_start().trim_start_matches(XSSI_PREFIX);
    let projects: Map<String, Value> =
        serde_json::from_str(json).map_err(|e| format!("not a project map: {e}"))?;

    let prefix = format!("{}/", source.organization);
    let base = git_base_uri.trim_end_matches('/');
    Ok(projects
        .keys()
        .filter_map(|project| {
            let module = project.strip_prefix(&prefix)?;
            if module.is_empty() || module.contains('/') || source.excludes(module) {
                return None;
            }
            Some(
                RepoCandidate::new(module, format!("{base}/{project}.git"))
                    .with_organization(source.organization.clone())
                    .with_gerrit(true),
            )
        })
        .collect())
}

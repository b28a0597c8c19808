//! GitHub project-list retriever (`github://` sources)
//!
//! Pages through `GET <api>/orgs/<organization>/repos` anonymously.

use async_trait::async_trait;
use ddmerge_core::{DatasetResult, ProjectSource, RepoCandidate, SourceRetriever};
use serde::Deserialize;
use tracing::{info, warn};

use crate::client::HttpClient;
use crate::config::RemoteConfig;
use crate::Result;

const PER_PAGE: usize = 100;
const DEFAULT_MAX_PAGES: usize = 50;

/// Repository entry of the GitHub organization listing
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRepo {
    pub name: String,
    #[serde(default)]
    pub git_url: Option<String>,
    #[serde(default)]
    pub clone_url: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

/// Lists the repositories of a GitHub organization
#[derive(Debug, Clone)]
pub struct GithubRetriever {
    client: HttpClient,
    api: String,
    max_pages: usize,
}

impl GithubRetriever {
    pub fn new(client: HttpClient, config: &RemoteConfig) -> Self {
        GithubRetriever {
            client,
            api: config.github_api.trim_end_matches('/').to_string(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Cap on listing pages fetched per organization (at least one).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    fn page_url(&self, organization: &str, page: usize) -> String {
        format!(
            "{}/orgs/{}/repos?per_page={PER_PAGE}&page={page}",
            self.api, organization
        )
    }

    async fn list(&self, source: &ProjectSource) -> Result<Vec<RepoCandidate>> {
        let mut repos = Vec::new();
        for page in 1..=self.max_pages {
            let batch: Vec<GithubRepo> = self
                .client
                .get_json(&self.page_url(&source.organization, page))
                .await?;
            let last = batch.len() < PER_PAGE;
            repos.extend(batch);
            if last {
                break;
            }
            if page == self.max_pages {
                warn!(
                    event = "github.listing_truncated",
                    organization = %source.organization,
                    pages = self.max_pages,
                    repos = repos.len(),
                    "github listing hit the page cap; remaining repositories not retrieved"
                );
            }
        }
        let candidates = to_candidates(repos, source);
        info!(
            organization = %source.organization,
            projects = candidates.len(),
            "github project list retrieved"
        );
        Ok(candidates)
    }
}

#[async_trait]
impl SourceRetriever for GithubRetriever {
    async fn retrieve(&self, source: &ProjectSource) -> DatasetResult<Vec<RepoCandidate>> {
        self.list(source)
            .await
            .map_err(|e| e.into_retrieval(&source.uri))
    }
}

/// Map listing entries to candidates; archived and excluded repos are skipped
pub fn to_candidates(repos: Vec<GithubRepo>, source: &ProjectSource) -> Vec<RepoCandidate> {
    repos
        .into_iter()
        .filter(|r| !r.archived)
        .filter_map(|r| {
            let module = r.name.to_lowercase();
            if source.excludes(&module) {
                return None;
            }
            let uri = r.git_url.or(r.clone_url)?;
            Some(RepoCandidate::new(module, uri).with_organization(source.organization.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing() -> Vec<GithubRepo> {
        serde_json::from_value(json!([
            {"name": "Kubernetes", "git_url": "git://github.com/kubernetes/kubernetes.git",
             "clone_url": "https://github.com/kubernetes/kubernetes.git"},
            {"name": "website", "clone_url": "https://github.com/kubernetes/website.git"},
            {"name": "old", "git_url": "git://github.com/kubernetes/old.git", "archived": true},
            {"name": "kops", "git_url": "git://github.com/kubernetes/kops.git"},
            {"name": "nourl"},
        ]))
        .unwrap()
    }

    #[test]
    fn test_to_candidates() {
        let mut source = ProjectSource::new("kubernetes", "github://");
        source.exclude = vec!["kops".to_string()];
        let candidates = to_candidates(listing(), &source);
        let modules: Vec<&str> = candidates.iter().map(|c| c.module.as_str()).collect();
        assert_eq!(modules, vec!["kubernetes", "website"]);
        assert_eq!(candidates[0].uri, "git://github.com/kubernetes/kubernetes.git");
        assert_eq!(candidates[1].uri, "https://github.com/kubernetes/website.git");
        assert_eq!(candidates[0].organization.as_deref(), Some("kubernetes"));
        assert_eq!(candidates[0].has_gerrit, None);
    }

    #[test]
    fn test_page_url() {
        let config = RemoteConfig::default().with_github_api("http://localhost:9000/");
        let retriever = GithubRetriever::new(HttpClient::new(&config).unwrap(), &config);
        assert_eq!(
            retriever.page_url("kubernetes", 2),
            "http://localhost:9000/orgs/kubernetes/repos?per_page=100&page=2"
        );
    }
}

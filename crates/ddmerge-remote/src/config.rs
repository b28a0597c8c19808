//! Remote access configuration
//!
//! Every field has a default and can be overridden from the environment.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_GERRIT_URL: &str = "https://review.openstack.org";
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_GIT_BASE_URI: &str = "git://git.openstack.org";

/// Settings shared by all HTTP retrievers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User agent sent with every request (GitHub rejects requests without one)
    pub user_agent: String,
    /// Gerrit server used when a `gerrit://` uri names no host
    pub gerrit_url: String,
    /// GitHub REST API base URL
    pub github_api: String,
    /// Base for Gerrit clone URIs when a project source sets none
    pub git_base_uri: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            timeout_secs: 30,
            user_agent: format!("ddmerge/{}", ddmerge_core::VERSION),
            gerrit_url: DEFAULT_GERRIT_URL.to_string(),
            github_api: DEFAULT_GITHUB_API.to_string(),
            git_base_uri: DEFAULT_GIT_BASE_URI.to_string(),
        }
    }
}

impl RemoteConfig {
    /// Defaults overridden by `DDMERGE_HTTP_TIMEOUT_SECS`, `DDMERGE_USER_AGENT`,
    /// `DDMERGE_GERRIT_URL`, `DDMERGE_GITHUB_API` and `DDMERGE_GIT_BASE_URI`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        RemoteConfig {
            timeout_secs: lookup("DDMERGE_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            user_agent: lookup("DDMERGE_USER_AGENT").unwrap_or(defaults.user_agent),
            gerrit_url: lookup("DDMERGE_GERRIT_URL").unwrap_or(defaults.gerrit_url),
            github_api: lookup("DDMERGE_GITHUB_API").unwrap_or(defaults.github_api),
            git_base_uri: lookup("DDMERGE_GIT_BASE_URI").unwrap_or(defaults.git_base_uri),
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_github_api(mut self, url: &str) -> Self {
        self.github_api = url.trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

//! Repository, project source and module group records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dataset::driver::Driver;

/// Tag carried by module groups derived from organizations.
pub const ORGANIZATION_TAG: &str = "organization";

/// A tracked repository. `module` is the merge key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Presence flag; absent means unknown/false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_gerrit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub releases: Option<Vec<RepoRelease>>,
    /// Created on first driver attachment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drivers: Option<Vec<Driver>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Repository {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            uri: None,
            organization: None,
            has_gerrit: None,
            releases: None,
            drivers: None,
            extra: Map::new(),
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Drivers attached so far (empty when none).
    pub fn drivers(&self) -> &[Driver] {
        self.drivers.as_deref().unwrap_or_default()
    }
}

/// A release range of a single repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoRelease {
    pub release_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_to: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An external directory of projects for one organization.
///
/// The scheme of `uri` (`gerrit://`, `github://`) selects the retriever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSource {
    /// Empty when missing; such a source is skipped as malformed.
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_group_name: Option<String>,
    /// Base for clone URIs of Gerrit projects, e.g. `git://git.openstack.org`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_base_uri: Option<String>,
    /// Modules the retriever must not report.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectSource {
    pub fn new(organization: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            uri: uri.into(),
            module_group_id: None,
            module_group_name: None,
            git_base_uri: None,
            exclude: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_module_group_id(mut self, id: impl Into<String>) -> Self {
        self.module_group_id = Some(id.into());
        self
    }

    /// Group id: `module_group_id` when set, else the organization.
    pub fn group_id(&self) -> &str {
        self.module_group_id
            .as_deref()
            .unwrap_or(self.organization.as_str())
    }

    /// Group label: `module_group_name` when set, else the organization.
    pub fn group_name(&self) -> &str {
        self.module_group_name
            .as_deref()
            .unwrap_or(self.organization.as_str())
    }

    pub fn excludes(&self, module: &str) -> bool {
        self.exclude.iter().any(|m| m == module)
    }
}

/// Named collection of modules classified by `tag`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleGroup {
    pub id: String,
    pub module_group_name: String,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModuleGroup {
    pub fn organization(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            module_group_name: name.into(),
            modules: Vec::new(),
            tag: Some(ORGANIZATION_TAG.to_string()),
            extra: Map::new(),
        }
    }

    pub fn is_organization_group(&self) -> bool {
        self.tag.as_deref() == Some(ORGANIZATION_TAG)
    }

    /// Append `module` unless it is already listed. Returns true when added.
    pub fn add_module(&mut self, module: &str) -> bool {
        if self.modules.iter().any(|m| m == module) {
            return false;
        }
        self.modules.push(module.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_repo_fields_survive_round_trip() {
        let raw = json!({
            "module": "nova",
            "uri": "git://git.openstack.org/openstack/nova",
            "organization": "openstack",
            "branches": ["master"],
        });
        let repo: Repository = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(repo.extra.get("branches"), Some(&json!(["master"])));
        assert_eq!(serde_json::to_value(&repo).unwrap(), raw);
    }

    #[test]
    fn test_group_id_falls_back_to_organization() {
        let plain = ProjectSource::new("openstack", "gerrit://review.openstack.org");
        assert_eq!(plain.group_id(), "openstack");
        assert_eq!(plain.group_name(), "openstack");

        let overridden = plain.clone().with_module_group_id("openstack-official");
        assert_eq!(overridden.group_id(), "openstack-official");
        assert_eq!(overridden.group_name(), "openstack");
    }

    #[test]
    fn test_add_module_is_deduplicated() {
        let mut group = ModuleGroup::organization("openstack", "openstack");
        assert!(group.add_module("nova"));
        assert!(!group.add_module("nova"));
        assert_eq!(group.modules, vec!["nova".to_string()]);
        assert!(group.is_organization_group());
    }
}

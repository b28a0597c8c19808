//! DriverLog records: third-party drivers and the CI systems testing them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// CI system that reports on a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CiInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_pattern: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One driver entry of a DriverLog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    /// `organization/module` of the parent project.
    pub project_id: String,
    /// `organization/module` of a specific repository (plugins, forks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    pub vendor: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci: Option<CiInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Driver {
    /// Module slug of the repository this driver belongs to.
    ///
    /// `repo` wins over `project_id`. Ids read `organization/module`: the
    /// slug is the second `/`-separated segment (`a/b/c` targets `b`), or the
    /// whole value when there is no `/`.
    pub fn target_module(&self) -> &str {
        let path = self.repo.as_deref().unwrap_or(self.project_id.as_str());
        path.split('/').nth(1).unwrap_or(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn driver(raw: Value) -> Driver {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_target_module_from_project_id() {
        let d = driver(json!({
            "project_id": "openstack/cinder",
            "vendor": "VMware",
            "name": "VMware VMDK Driver",
        }));
        assert_eq!(d.target_module(), "cinder");
    }

    #[test]
    fn test_repo_overrides_project_id() {
        let d = driver(json!({
            "project_id": "openstack/fuel",
            "repo": "stackforge/fuel-plugin-mellanox",
            "vendor": "Mellanox",
            "name": "ConnectX-3 Pro Network Adapter Support plugin",
        }));
        assert_eq!(d.target_module(), "fuel-plugin-mellanox");
    }

    #[test]
    fn test_bare_project_id_is_used_as_module() {
        let d = driver(json!({"project_id": "cinder", "vendor": "v", "name": "n"}));
        assert_eq!(d.target_module(), "cinder");
    }

    #[test]
    fn test_nested_id_targets_second_segment() {
        let d = driver(json!({
            "project_id": "openstack/neutron/plugins",
            "vendor": "v",
            "name": "n",
        }));
        assert_eq!(d.target_module(), "neutron");
    }

    #[test]
    fn test_feed_fields_are_preserved() {
        let raw = json!({
            "project_id": "openstack/nova",
            "vendor": "Acme",
            "name": "Acme Driver",
            "description": "Compute driver",
            "ci": {"id": "acme-ci", "success_pattern": "ok", "failure_pattern": "ko"},
        });
        let d = driver(raw.clone());
        assert_eq!(d.ci.as_ref().map(|c| c.id.as_str()), Some("acme-ci"));
        assert_eq!(serde_json::to_value(&d).unwrap(), raw);
    }
}

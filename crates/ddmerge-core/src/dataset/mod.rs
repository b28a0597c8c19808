//! In-memory shape of the default data.
//!
//! This is the sole contract between the pipeline and whoever loads the
//! baseline: a JSON object with `repos`, `users`, `project_sources` and
//! `module_groups`, plus optional `releases` and `companies`. Keys the
//! pipeline does not model are kept in `extra` and written back verbatim.

pub mod driver;
pub mod end_date;
pub mod repo;
pub mod user;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DatasetResult;

pub use driver::{CiInfo, Driver};
pub use end_date::EndDate;
pub use repo::{ModuleGroup, ProjectSource, RepoRelease, Repository, ORGANIZATION_TAG};
pub use user::{Company, CompanyEntry, Release, User, INDEPENDENT};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultData {
    #[serde(default)]
    pub repos: Vec<Repository>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub project_sources: Vec<ProjectSource>,
    #[serde(default)]
    pub module_groups: Vec<ModuleGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub releases: Vec<Release>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub companies: Vec<Company>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DefaultData {
    pub fn from_json_str(raw: &str) -> DatasetResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_value(value: Value) -> DatasetResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_pretty(&self) -> DatasetResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn repo(&self, module: &str) -> Option<&Repository> {
        self.repos.iter().find(|r| r.module == module)
    }

    pub fn repo_mut(&mut self, module: &str) -> Option<&mut Repository> {
        self.repos.iter_mut().find(|r| r.module == module)
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.user_id.as_deref() == Some(user_id))
    }

    pub fn module_group(&self, id: &str) -> Option<&ModuleGroup> {
        self.module_groups.iter().find(|g| g.id == id)
    }
}

//! Post-pipeline invariant checks over a dataset.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::dataset::DefaultData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    MissingReleases { module: String },
    DuplicateModule { module: String },
    MissingUserId { user_name: String },
    NoCurrentCompany { user_id: String },
    DuplicateGroupModule { group: String, module: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingReleases { module } => {
                write!(f, "repository '{module}' has no releases list")
            }
            Violation::DuplicateModule { module } => {
                write!(f, "module '{module}' appears more than once")
            }
            Violation::MissingUserId { user_name } => {
                write!(f, "user '{user_name}' has no user_id")
            }
            Violation::NoCurrentCompany { user_id } => {
                write!(f, "user '{user_id}' has no current company")
            }
            Violation::DuplicateGroupModule { group, module } => {
                write!(f, "module group '{group}' lists '{module}' more than once")
            }
        }
    }
}

/// Every violated invariant, in dataset order.
pub fn check(data: &DefaultData) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut seen = HashSet::new();
    for repo in &data.repos {
        if repo.releases.is_none() {
            violations.push(Violation::MissingReleases {
                module: repo.module.clone(),
            });
        }
        if !seen.insert(repo.module.as_str()) {
            violations.push(Violation::DuplicateModule {
                module: repo.module.clone(),
            });
        }
    }

    for user in &data.users {
        let Some(user_id) = user.user_id.as_deref() else {
            violations.push(Violation::MissingUserId {
                user_name: user.user_name.clone().unwrap_or_default(),
            });
            continue;
        };
        if user.current_company().is_none() {
            violations.push(Violation::NoCurrentCompany {
                user_id: user_id.to_string(),
            });
        }
    }

    for group in &data.module_groups {
        let mut members = HashSet::new();
        for module in &group.modules {
            if !members.insert(module.as_str()) {
                violations.push(Violation::DuplicateGroupModule {
                    group: group.id.clone(),
                    module: module.clone(),
                });
            }
        }
    }

    violations
}

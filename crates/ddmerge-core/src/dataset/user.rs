//! Contributors, their employment history, and company records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dataset::end_date::EndDate;

/// Company name given to contributors with no current employer.
pub const INDEPENDENT: &str = "*independent";

/// One employment period. Entries are chronological; the last one is current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyEntry {
    pub company_name: String,
    #[serde(default)]
    pub end_date: EndDate,
}

impl CompanyEntry {
    pub fn new(company_name: impl Into<String>, end_date: EndDate) -> Self {
        Self {
            company_name: company_name.into(),
            end_date,
        }
    }

    pub fn independent() -> Self {
        Self::new(INDEPENDENT, EndDate::Present)
    }
}

/// A contributor, human or synthesized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launchpad_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gerrit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_id: Option<String>,
    #[serde(default)]
    pub companies: Vec<CompanyEntry>,
    /// Set for synthesized non-human identities.
    #[serde(rename = "static", default, skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Synthesized identity for an automated system.
    pub fn synthesized(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        company: CompanyEntry,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            user_name: Some(user_name.into()),
            launchpad_id: None,
            emails: Vec::new(),
            gerrit_id: None,
            github_id: None,
            companies: vec![company],
            is_static: Some(true),
            extra: Map::new(),
        }
    }

    pub fn is_static(&self) -> bool {
        self.is_static.unwrap_or(false)
    }

    /// The employer of the last company entry if it is still current.
    pub fn current_company(&self) -> Option<&str> {
        self.companies
            .last()
            .filter(|c| c.end_date.is_current())
            .map(|c| c.company_name.as_str())
    }
}

/// A company known to the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A product release cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub release_name: String,
    #[serde(default)]
    pub end_date: EndDate,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_flag_serializes_under_reserved_name() {
        let user = User::synthesized(
            "ci:acme",
            "Acme CI",
            CompanyEntry::new("Acme", EndDate::Open),
        );
        let v = serde_json::to_value(&user).unwrap();
        assert_eq!(
            v,
            json!({
                "user_id": "ci:acme",
                "user_name": "Acme CI",
                "companies": [{"company_name": "Acme", "end_date": null}],
                "static": true,
            })
        );
    }

    #[test]
    fn test_missing_end_date_reads_as_open() {
        let user: User = serde_json::from_value(json!({
            "launchpad_id": "john_doe",
            "companies": [{"company_name": "Mirantis"}],
        }))
        .unwrap();
        assert_eq!(user.companies[0].end_date, EndDate::Open);
        assert_eq!(user.current_company(), Some("Mirantis"));
    }

    #[test]
    fn test_current_company_none_when_last_ended() {
        let user: User = serde_json::from_value(json!({
            "launchpad_id": "john_doe",
            "companies": [{"company_name": "Mirantis", "end_date": "2013-Jan-01"}],
        }))
        .unwrap();
        assert_eq!(user.current_company(), None);
        assert!(!user.is_static());
    }
}

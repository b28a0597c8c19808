//! User id derivation for real contributors and synthesized CI identities.

use std::sync::OnceLock;

use regex::Regex;

use crate::dataset::User;

/// Prefix of user ids synthesized for CI systems.
pub const CI_PREFIX: &str = "ci:";

fn non_alnum_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^[:alnum:]]+").expect("static pattern compiles"))
}

/// Lowercase `text` and collapse every run of non-alphanumerics into `_`.
///
/// ```
/// assert_eq!(ddmerge_core::identity::slugify("VMware VMDK Driver"), "vmware_vmdk_driver");
/// ```
pub fn slugify(text: &str) -> String {
    non_alnum_runs()
        .replace_all(&text.to_lowercase(), "_")
        .into_owned()
}

/// User id of the CI system named `name`.
pub fn ci_user_id(name: &str) -> String {
    format!("{CI_PREFIX}{}", slugify(name))
}

/// Derive a user id from external identities.
///
/// Order: launchpad id, first email, `gerrit:<id>`, `github:<id>`.
pub fn make_user_id(user: &User) -> Option<String> {
    if let Some(lp) = user.launchpad_id.as_deref().filter(|s| !s.is_empty()) {
        return Some(lp.to_string());
    }
    if let Some(email) = user.emails.first() {
        return Some(email.clone());
    }
    if let Some(gerrit) = user.gerrit_id.as_deref() {
        return Some(format!("gerrit:{gerrit}"));
    }
    user.github_id
        .as_deref()
        .map(|github| format!("github:{github}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(raw: serde_json::Value) -> User {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_ci_user_id_collapses_punctuation() {
        assert_eq!(ci_user_id("VMware VMDK Driver"), "ci:vmware_vmdk_driver");
        assert_eq!(
            ci_user_id("ConnectX-3 Pro Network Adapter Support plugin"),
            "ci:connectx_3_pro_network_adapter_support_plugin"
        );
        assert_eq!(ci_user_id("A -- B"), "ci:a_b");
    }

    #[test]
    fn test_launchpad_id_wins() {
        let u = user(json!({
            "launchpad_id": "john_doe",
            "emails": ["john@example.com"],
            "github_id": "jd",
        }));
        assert_eq!(make_user_id(&u).as_deref(), Some("john_doe"));
    }

    #[test]
    fn test_fallback_chain() {
        let by_email = user(json!({"emails": ["jane@example.com", "j@example.org"]}));
        assert_eq!(make_user_id(&by_email).as_deref(), Some("jane@example.com"));

        let by_gerrit = user(json!({"gerrit_id": "jane"}));
        assert_eq!(make_user_id(&by_gerrit).as_deref(), Some("gerrit:jane"));

        let by_github = user(json!({"github_id": "jane-gh"}));
        assert_eq!(make_user_id(&by_github).as_deref(), Some("github:jane-gh"));

        let anonymous = user(json!({"user_name": "Nobody"}));
        assert_eq!(make_user_id(&anonymous), None);
    }
}

//! Field defaults and invariants over a freshly loaded baseline.
//!
//! After [`normalize_default_data`]:
//! - every repository has a `releases` sequence (possibly empty);
//! - every identifiable user has a `user_id`;
//! - every user's companies are chronological and the last entry is current.
//!
//! Running it again on its own output changes nothing.

use serde::Serialize;

use crate::dataset::{Company, CompanyEntry, DefaultData, EndDate, Release, Repository, User};
use crate::identity::make_user_id;
use crate::obs;

/// What the normalizer had to fill in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub releases_defaulted: usize,
    pub user_ids_assigned: usize,
    pub independent_added: usize,
    /// Names of users with no identity to derive a `user_id` from.
    pub users_without_identity: Vec<String>,
}

pub fn normalize_default_data(data: &mut DefaultData) -> NormalizeReport {
    let mut report = NormalizeReport::default();

    normalize_releases(&mut data.releases);
    normalize_companies(&mut data.companies);
    report.releases_defaulted = normalize_repos(&mut data.repos);

    for user in &mut data.users {
        normalize_user(user, &mut report);
    }

    obs::emit_normalize_finished(data.repos.len(), data.users.len(), report.independent_added);
    report
}

fn normalize_repos(repos: &mut [Repository]) -> usize {
    let mut defaulted = 0;
    for repo in repos.iter_mut().filter(|r| r.releases.is_none()) {
        repo.releases = Some(Vec::new());
        defaulted += 1;
    }
    defaulted
}

fn normalize_releases(releases: &mut [Release]) {
    for release in releases.iter_mut() {
        release.release_name = release.release_name.to_lowercase();
    }
    releases.sort_by_key(|r| r.end_date.sort_key());
}

fn normalize_companies(companies: &mut [Company]) {
    for company in companies.iter_mut() {
        for domain in company.domains.iter_mut() {
            *domain = domain.to_lowercase();
        }
    }
}

fn normalize_user(user: &mut User, report: &mut NormalizeReport) {
    if user.user_id.is_none() {
        match make_user_id(user) {
            Some(id) => {
                user.user_id = Some(id);
                report.user_ids_assigned += 1;
            }
            None => {
                obs::emit_user_without_identity(user.user_name.as_deref());
                report
                    .users_without_identity
                    .push(user.user_name.clone().unwrap_or_default());
            }
        }
    }

    // Stable: among several current entries the listed order is kept.
    user.companies.sort_by_key(|c| c.end_date.sort_key());

    match user.companies.last_mut() {
        Some(last) if last.end_date.is_current() => last.end_date = EndDate::Present,
        // Last employment ended, or nothing recorded at all.
        _ => {
            user.companies.push(CompanyEntry::independent());
            report.independent_added += 1;
        }
    }
}

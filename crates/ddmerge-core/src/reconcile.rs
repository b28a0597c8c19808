//! Project-list reconciliation.
//!
//! [`update_project_list`] asks the retriever registered for each project
//! source's scheme for that source's repositories, folds them into
//! `repos`, and files every repository into its organization's module group.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dataset::{DefaultData, ModuleGroup, ProjectSource, Repository};
use crate::error::DatasetError;
use crate::obs;
use crate::retrieval::{source_scheme, RepoCandidate, RetrieverRegistry};

/// Why a project source contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceIssueKind {
    /// The source is missing its organization or its uri has no scheme.
    Malformed,
    /// No retriever is registered for the uri scheme.
    UnknownScheme,
    /// The retriever returned an error.
    RetrievalFailed,
}

/// A project source that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIssue {
    pub organization: String,
    pub uri: String,
    pub kind: SourceIssueKind,
    pub detail: String,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Sources whose project list was retrieved and merged.
    pub sources_processed: usize,
    pub repos_added: usize,
    pub repos_merged: usize,
    pub groups_created: usize,
    pub issues: Vec<SourceIssue>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Group id and label a module is filed under.
type GroupKey = (String, String);

/// Merge the project lists of all `project_sources` into `repos` and derive
/// organization module groups.
///
/// Sources are processed one at a time; a failing source is recorded in the
/// report and the remaining sources still run. Existing repositories are
/// only ever added to, never overwritten.
pub async fn update_project_list(
    data: &mut DefaultData,
    registry: &RetrieverRegistry,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let mut index: HashMap<String, usize> = data
        .repos
        .iter()
        .enumerate()
        .map(|(i, r)| (r.module.clone(), i))
        .collect();
    // First source to report a module decides its group.
    let mut assigned: HashMap<String, GroupKey> = HashMap::new();

    let sources = data.project_sources.clone();
    for source in &sources {
        let candidates = match retrieve(source, registry).await {
            Ok(candidates) => candidates,
            Err(issue) => {
                report.issues.push(issue);
                continue;
            }
        };
        obs::emit_source_retrieved(&source.organization, &source.uri, candidates.len());
        report.sources_processed += 1;

        for candidate in candidates {
            assigned
                .entry(candidate.module.clone())
                .or_insert_with(|| group_key(source));
            merge_candidate(&mut data.repos, &mut index, candidate, source, &mut report);
        }
    }

    report.groups_created = derive_module_groups(data, &assigned);

    obs::emit_reconcile_finished(
        report.sources_processed,
        report.repos_added,
        report.repos_merged,
        report.issues.len(),
    );
    report
}

async fn retrieve(
    source: &ProjectSource,
    registry: &RetrieverRegistry,
) -> Result<Vec<RepoCandidate>, SourceIssue> {
    let issue = |kind: SourceIssueKind, err: &DatasetError| SourceIssue {
        organization: source.organization.clone(),
        uri: source.uri.clone(),
        kind,
        detail: err.to_string(),
    };

    let scheme = match source_scheme(&source.uri) {
        Some(scheme) if !source.organization.is_empty() => scheme,
        _ => {
            let err = DatasetError::MalformedSource {
                organization: source.organization.clone(),
                reason: format!("uri '{}' needs a scheme and an organization", source.uri),
            };
            obs::emit_source_skipped(&source.organization, &source.uri, &err);
            return Err(issue(SourceIssueKind::Malformed, &err));
        }
    };

    let Some(retriever) = registry.get(scheme) else {
        let err = DatasetError::UnknownScheme {
            scheme: scheme.to_string(),
            uri: source.uri.clone(),
        };
        obs::emit_source_skipped(&source.organization, &source.uri, &err);
        return Err(issue(SourceIssueKind::UnknownScheme, &err));
    };

    retriever.retrieve(source).await.map_err(|err| {
        obs::emit_source_failed(&source.organization, &source.uri, &err);
        issue(SourceIssueKind::RetrievalFailed, &err)
    })
}

fn merge_candidate(
    repos: &mut Vec<Repository>,
    index: &mut HashMap<String, usize>,
    candidate: RepoCandidate,
    source: &ProjectSource,
    report: &mut ReconcileReport,
) {
    match index.get(&candidate.module) {
        Some(&i) => {
            absorb(&mut repos[i], candidate);
            report.repos_merged += 1;
        }
        None => {
            index.insert(candidate.module.clone(), repos.len());
            repos.push(candidate.into_repository(&source.organization));
            report.repos_added += 1;
        }
    }
}

/// Fill in what `repo` lacks from `candidate`; `has_gerrit` is taken when
/// the candidate reports it.
fn absorb(repo: &mut Repository, candidate: RepoCandidate) {
    if candidate.has_gerrit.is_some() {
        repo.has_gerrit = candidate.has_gerrit;
    }
    if repo.uri.is_none() {
        repo.uri = Some(candidate.uri);
    }
    if repo.organization.is_none() {
        repo.organization = candidate.organization;
    }
}

fn group_key(source: &ProjectSource) -> GroupKey {
    (source.group_id().to_string(), source.group_name().to_string())
}

/// File every repository with an organization into an organization group.
/// Returns the number of groups created.
fn derive_module_groups(data: &mut DefaultData, assigned: &HashMap<String, GroupKey>) -> usize {
    let mut by_organization: HashMap<&str, GroupKey> = HashMap::new();
    for source in &data.project_sources {
        by_organization
            .entry(source.organization.as_str())
            .or_insert_with(|| group_key(source));
    }

    let mut created = 0;
    for repo in &data.repos {
        let key = match (assigned.get(&repo.module), repo.organization.as_deref()) {
            (Some(key), _) => key.clone(),
            (None, Some(org)) => by_organization
                .get(org)
                .cloned()
                .unwrap_or_else(|| (org.to_string(), org.to_string())),
            (None, None) => continue,
        };

        let (id, name) = key;
        let pos = match data
            .module_groups
            .iter()
            .position(|g| g.id == id && g.is_organization_group())
        {
            Some(pos) => pos,
            None => {
                data.module_groups.push(ModuleGroup::organization(id, name));
                created += 1;
                data.module_groups.len() - 1
            }
        };
        data.module_groups[pos].add_module(&repo.module);
    }
    created
}

//! Structured log events for the default-data pipeline.
//!
//! Every stage reports through these helpers so log lines carry a stable
//! `event` field (`normalize.finished`, `reconcile.source_failed`, ...).
//! Use `RUST_LOG=ddmerge_core=debug` for per-record detail.

use tracing::{debug, info, warn};

/// RAII guard that enters a pipeline-run span for the duration of a run.
///
/// # Example
///
/// ```ignore
/// let _span = PipelineSpan::enter("nightly");
/// // every event below is tagged with run = "nightly"
/// ```
pub struct PipelineSpan {
    _span: tracing::span::EnteredSpan,
}

impl PipelineSpan {
    pub fn enter(run: &str) -> Self {
        Self {
            _span: pipeline_span(run).entered(),
        }
    }
}

/// Span for a pipeline run; async code attaches it with `Instrument`.
pub fn pipeline_span(run: &str) -> tracing::Span {
    tracing::info_span!("ddmerge.pipeline", run = %run)
}

pub fn emit_normalize_finished(repos: usize, users: usize, independent_added: usize) {
    info!(
        event = "normalize.finished",
        repos = repos,
        users = users,
        independent_added = independent_added,
    );
}

/// A user has no identity to derive `user_id` from.
pub fn emit_user_without_identity(user_name: Option<&str>) {
    warn!(
        event = "normalize.user_without_identity",
        user_name = user_name.unwrap_or("<unnamed>"),
    );
}

pub fn emit_source_retrieved(organization: &str, uri: &str, candidates: usize) {
    info!(
        event = "reconcile.source_retrieved",
        organization = %organization,
        uri = %uri,
        candidates = candidates,
    );
}

/// Configuration problem with a project source (warning level).
pub fn emit_source_skipped(organization: &str, uri: &str, reason: &dyn std::fmt::Display) {
    warn!(
        event = "reconcile.source_skipped",
        organization = %organization,
        uri = %uri,
        reason = %reason,
    );
}

/// Retrieval failure for a project source (warning level).
pub fn emit_source_failed(organization: &str, uri: &str, error: &dyn std::fmt::Display) {
    warn!(
        event = "reconcile.source_failed",
        organization = %organization,
        uri = %uri,
        error = %error,
    );
}

pub fn emit_reconcile_finished(sources: usize, added: usize, merged: usize, issues: usize) {
    info!(
        event = "reconcile.finished",
        sources = sources,
        repos_added = added,
        repos_merged = merged,
        issues = issues,
    );
}

pub fn emit_driver_dropped(driver: &str, module: &str) {
    debug!(event = "driverlog.driver_dropped", driver = %driver, module = %module);
}

pub fn emit_driverlog_failed(uri: &str, error: &dyn std::fmt::Display) {
    warn!(event = "driverlog.fetch_failed", uri = %uri, error = %error);
}

pub fn emit_driverlog_finished(attached: usize, dropped: usize, users_added: usize) {
    info!(
        event = "driverlog.finished",
        attached = attached,
        dropped = dropped,
        users_added = users_added,
    );
}

//! ddmerge core library
//!
//! Merges project metadata from several sources into one default-data set:
//!
//! 1. [`normalize`] fills in defaults and establishes per-record invariants;
//! 2. [`reconcile`] folds project lists from pluggable retrievers into
//!    `repos` and derives organization module groups;
//! 3. [`driverlog`] attaches CI driver records and registers CI users.
//!
//! [`pipeline::DefaultDataPipeline`] runs the three in order. Network access
//! goes exclusively through the traits in [`retrieval`].

pub mod dataset;
pub mod driverlog;
pub mod error;
pub mod fakes;
pub mod identity;
pub mod invariants;
pub mod normalize;
pub mod obs;
pub mod pipeline;
pub mod reconcile;
pub mod retrieval;
pub mod telemetry;

pub use dataset::{
    CiInfo, Company, CompanyEntry, DefaultData, Driver, EndDate, ModuleGroup, ProjectSource,
    Release, RepoRelease, Repository, User,
};
pub use driverlog::{apply_driverlog, update_with_driverlog_data, DriverReport};
pub use error::{DatasetError, DatasetResult};
pub use invariants::{check, Violation};
pub use normalize::{normalize_default_data, NormalizeReport};
pub use pipeline::{DefaultDataPipeline, PipelineOutcome, PipelineReport};
pub use reconcile::{update_project_list, ReconcileReport, SourceIssue, SourceIssueKind};
pub use retrieval::{JsonFetcher, RepoCandidate, RetrieverRegistry, SourceRetriever};
pub use telemetry::init_tracing;

/// ddmerge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

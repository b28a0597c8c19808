//! The default-data pipeline: normalize, reconcile project lists, integrate
//! DriverLog data, strictly in that order.

use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;

use crate::dataset::DefaultData;
use crate::driverlog::{update_with_driverlog_data, DriverReport};
use crate::normalize::{normalize_default_data, NormalizeReport};
use crate::obs;
use crate::reconcile::{update_project_list, ReconcileReport};
use crate::retrieval::{JsonFetcher, RetrieverRegistry};

/// Everything the pipeline did to a dataset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub normalize: NormalizeReport,
    pub reconcile: ReconcileReport,
    /// `None` when no DriverLog uri was configured or the fetch failed.
    pub driverlog: Option<DriverReport>,
    /// Set when the DriverLog document could not be fetched or read.
    pub driverlog_error: Option<String>,
}

impl PipelineReport {
    /// True when no source or fetch was skipped.
    pub fn is_complete(&self) -> bool {
        self.reconcile.is_clean() && self.driverlog_error.is_none()
    }
}

/// Merged dataset plus the report of how it was produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub data: DefaultData,
    pub report: PipelineReport,
}

/// Pipeline configured with its retrieval collaborators.
pub struct DefaultDataPipeline {
    retrievers: RetrieverRegistry,
    fetcher: Arc<dyn JsonFetcher>,
    driverlog_uri: Option<String>,
}

impl DefaultDataPipeline {
    pub fn new(retrievers: RetrieverRegistry, fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self {
            retrievers,
            fetcher,
            driverlog_uri: None,
        }
    }

    pub fn with_driverlog_uri(mut self, uri: impl Into<String>) -> Self {
        self.driverlog_uri = Some(uri.into());
        self
    }

    /// Run all stages over `data` and hand it back.
    ///
    /// Never fails as a whole: skipped sources and a failed DriverLog fetch
    /// are recorded in the report and the remaining stages still run.
    pub async fn run(&self, data: DefaultData) -> PipelineOutcome {
        self.run_stages(data)
            .instrument(obs::pipeline_span("default-data"))
            .await
    }

    async fn run_stages(&self, mut data: DefaultData) -> PipelineOutcome {
        let mut report = PipelineReport {
            normalize: normalize_default_data(&mut data),
            ..PipelineReport::default()
        };
        report.reconcile = update_project_list(&mut data, &self.retrievers).await;

        if let Some(uri) = &self.driverlog_uri {
            match update_with_driverlog_data(&mut data, self.fetcher.as_ref(), uri).await {
                Ok(driver_report) => report.driverlog = Some(driver_report),
                Err(err) => {
                    obs::emit_driverlog_failed(uri, &err);
                    report.driverlog_error = Some(err.to_string());
                }
            }
        }

        PipelineOutcome { data, report }
    }
}

impl std::fmt::Debug for DefaultDataPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultDataPipeline")
            .field("retrievers", &self.retrievers)
            .field("driverlog_uri", &self.driverlog_uri)
            .finish()
    }
}

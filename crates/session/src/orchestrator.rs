//! Hand-off from a completed upload to the two results views.
//!
//! Both result documents are fetched concurrently and analysed
//! independently. If either fetch fails, neither report is kept and the
//! orchestrator drops back to the capture stage with an error status.

use std::sync::Arc;

use serde::Serialize;
use sway_capture::error::CaptureError;
use sway_client::api::{AnalysisBackend, BackendError};
use sway_client::types::UploadReceipt;
use sway_core::report::{analyze, PostureReport};
use sway_core::status::ProcessingStatus;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to retrieve analysis results: {0}")]
    Retrieval(#[source] BackendError),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Which tab the results view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultsStage {
    #[default]
    Capture,
    Results,
}

/// Reports for the two videos of one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisPair {
    /// Eyes-open trial.
    pub first: PostureReport,
    /// Eyes-closed trial.
    pub second: PostureReport,
}

pub struct SessionOrchestrator {
    backend: Arc<dyn AnalysisBackend>,
    status: ProcessingStatus,
    stage: ResultsStage,
    results: Option<AnalysisPair>,
    last_error: Option<String>,
}

impl SessionOrchestrator {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            backend,
            status: ProcessingStatus::Idle,
            stage: ResultsStage::Capture,
            results: None,
            last_error: None,
        }
    }

    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    pub fn stage(&self) -> ResultsStage {
        self.stage
    }

    /// Both reports, present only after a fully successful load.
    pub fn results(&self) -> Option<&AnalysisPair> {
        match self.status {
            ProcessingStatus::Success => self.results.as_ref(),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fetch both result documents for `receipt` and analyse each.
    pub async fn load_results(
        &mut self,
        receipt: &UploadReceipt,
    ) -> Result<&AnalysisPair, SessionError> {
        self.status = ProcessingStatus::Processing;
        self.results = None;
        self.last_error = None;

        tracing::info!(json1 = %receipt.json1, json2 = %receipt.json2, "Fetching results");

        let fetched = futures::future::try_join(
            self.backend.fetch_trajectories(&receipt.json1),
            self.backend.fetch_trajectories(&receipt.json2),
        )
        .await;

        let (first, second) = match fetched {
            Ok(sets) => sets,
            Err(e) => {
                tracing::error!(error = %e, "Result retrieval failed");
                self.status = ProcessingStatus::Error;
                self.stage = ResultsStage::Capture;
                self.last_error = Some(e.to_string());
                return Err(SessionError::Retrieval(e));
            }
        };

        let pair = self.results.insert(AnalysisPair {
            first: analyze(&first),
            second: analyze(&second),
        });
        self.status = ProcessingStatus::Success;
        self.stage = ResultsStage::Results;

        tracing::info!(
            first_edges = first.len(),
            second_edges = second.len(),
            "Results analysed",
        );
        Ok(pair)
    }

    /// Switch tabs. The results tab is only reachable after success.
    pub fn show(&mut self, stage: ResultsStage) -> bool {
        if stage == ResultsStage::Results && self.status != ProcessingStatus::Success {
            return false;
        }
        self.stage = stage;
        true
    }

    /// Abandon the current results and go back to capture.
    pub fn retry(&mut self) {
        self.stage = ResultsStage::Capture;
        self.status = ProcessingStatus::Idle;
        self.results = None;
        self.last_error = None;
    }
}

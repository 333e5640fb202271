//! Balance-assessment session: capture two clips, upload them, fetch
//! both result documents, and produce one posture report per clip.

pub mod config;
pub mod orchestrator;

use std::sync::Arc;

use sway_capture::controller::CaptureController;
use sway_capture::device::UnavailableDevice;
use sway_capture::media::{ImportedFile, SlotIndex};
use sway_capture::session::CaptureSession;
use sway_client::api::AnalysisBackend;
use tokio_util::sync::CancellationToken;

use crate::orchestrator::{AnalysisPair, SessionError, SessionOrchestrator};

/// Run one headless session from two files on disk.
///
/// The clips are imported into the two slots of a capture session with
/// no camera, submitted in one upload, and the returned result documents
/// are fetched and analysed.
pub async fn run_session(
    backend: Arc<dyn AnalysisBackend>,
    first: ImportedFile,
    second: ImportedFile,
) -> Result<AnalysisPair, SessionError> {
    let cancel = CancellationToken::new();
    let session = CaptureSession::new(Arc::new(UnavailableDevice));
    let (capture, task) = CaptureController::spawn(session, Arc::clone(&backend), cancel.clone());

    let submitted = async {
        capture.select_slot(SlotIndex::First).await?;
        capture.import_file(first).await?;
        capture.select_slot(SlotIndex::Second).await?;
        capture.import_file(second).await?;
        capture.submit().await
    }
    .await;

    cancel.cancel();
    if let Err(e) = task.await {
        tracing::warn!(error = %e, "Capture task did not shut down cleanly");
    }
    let receipt = submitted?;

    let mut orchestrator = SessionOrchestrator::new(backend);
    let pair = orchestrator.load_results(&receipt).await?.clone();

    for (slot, report) in [(SlotIndex::First, &pair.first), (SlotIndex::Second, &pair.second)] {
        match (&report.diagnosis, &report.statistics) {
            (Some(diagnosis), Some(stats)) => tracing::info!(
                %slot,
                max_angle_deg = stats.max_angle_deg,
                avg_angle_deg = stats.avg_angle_deg,
                left_px = ?stats.left_displacement_px,
                right_px = ?stats.right_displacement_px,
                diagnosis = %diagnosis,
                "Posture analysed",
            ),
            _ => tracing::warn!(
                %slot,
                reason = ?report.unavailable,
                segments = report.segments.len(),
                "Midline unavailable",
            ),
        }
    }

    Ok(pair)
}

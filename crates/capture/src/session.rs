//! The capture session state machine.
//!
//! All mutable state lives in one [`CaptureSession`]: the camera (off,
//! live, or recording), the two clip slots, the active slot, the
//! countdown, and the submission outcome. Every operation takes
//! `&mut self`, so transitions are serialised by construction; callers
//! that need concurrent access go through
//! [`crate::controller::CaptureHandle`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sway_client::api::AnalysisBackend;
use sway_client::types::{UploadReceipt, VideoPart};
use sway_core::status::ProcessingStatus;
use tokio::sync::broadcast;

use crate::device::{CaptureConstraints, MediaDevice, MediaStream};
use crate::error::CaptureError;
use crate::events::{self, CaptureEvent};
use crate::media::{
    is_video_content_type, ClipSource, ImportedFile, MediaClip, PreviewRef, SlotIndex,
};
use crate::recording::{Recording, CLIP_CONTENT_TYPE, RECORDING_LIMIT_SECS};

/// Shown when the camera cannot be opened.
pub const CAMERA_ERROR_MESSAGE: &str =
    "Could not access the camera. Please check camera permissions.";

/// Shown when an imported file is not a video.
pub const NOT_A_VIDEO_MESSAGE: &str = "Please select a valid video file.";

/// Shown when submitting with an empty slot.
pub const BOTH_VIDEOS_REQUIRED_MESSAGE: &str = "Please record or upload both videos.";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

enum CameraState {
    Off,
    Live {
        stream: Box<dyn MediaStream>,
    },
    Recording {
        stream: Box<dyn MediaStream>,
        recording: Recording,
    },
}

#[derive(Debug, Clone, Default)]
enum Submission {
    #[default]
    NotSubmitted,
    InFlight,
    Accepted(UploadReceipt),
    Failed,
}

/// Summary of a filled slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSummary {
    pub bytes: usize,
    pub content_type: String,
    pub source: ClipSource,
    pub preview: PreviewRef,
    pub captured_at: DateTime<Utc>,
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureSnapshot {
    pub camera_on: bool,
    pub recording: bool,
    pub active_slot: SlotIndex,
    pub remaining_secs: u32,
    pub slots: [Option<SlotSummary>; 2],
    pub status: ProcessingStatus,
    pub last_error: Option<String>,
    pub receipt: Option<UploadReceipt>,
}

/// A two-slot capture-and-upload session.
pub struct CaptureSession {
    device: Arc<dyn MediaDevice>,
    constraints: CaptureConstraints,
    camera: CameraState,
    slots: [Option<MediaClip>; 2],
    active_slot: SlotIndex,
    remaining_secs: u32,
    submission: Submission,
    last_error: Option<String>,
    events: broadcast::Sender<CaptureEvent>,
}

impl CaptureSession {
    pub fn new(device: Arc<dyn MediaDevice>) -> Self {
        Self {
            device,
            constraints: CaptureConstraints::default(),
            camera: CameraState::Off,
            slots: [None, None],
            active_slot: SlotIndex::First,
            remaining_secs: RECORDING_LIMIT_SECS,
            submission: Submission::NotSubmitted,
            last_error: None,
            events: events::channel(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.events.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<CaptureEvent> {
        self.events.clone()
    }

    // ---- queries ----

    pub fn is_camera_on(&self) -> bool {
        !matches!(self.camera, CameraState::Off)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.camera, CameraState::Recording { .. })
    }

    pub fn active_slot(&self) -> SlotIndex {
        self.active_slot
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn clip(&self, slot: SlotIndex) -> Option<&MediaClip> {
        self.slots[slot.index()].as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn status(&self) -> ProcessingStatus {
        match self.submission {
            Submission::NotSubmitted => ProcessingStatus::Idle,
            Submission::InFlight => ProcessingStatus::Processing,
            Submission::Accepted(_) => ProcessingStatus::Success,
            Submission::Failed => ProcessingStatus::Error,
        }
    }

    /// Result locators of the last accepted upload.
    pub fn receipt(&self) -> Option<&UploadReceipt> {
        match &self.submission {
            Submission::Accepted(receipt) => Some(receipt),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> CaptureSnapshot {
        let summary = |slot: &Option<MediaClip>| {
            slot.as_ref().map(|clip| SlotSummary {
                bytes: clip.len(),
                content_type: clip.content_type.clone(),
                source: clip.source,
                preview: clip.preview.clone(),
                captured_at: clip.captured_at,
            })
        };
        CaptureSnapshot {
            camera_on: self.is_camera_on(),
            recording: self.is_recording(),
            active_slot: self.active_slot,
            remaining_secs: self.remaining_secs,
            slots: [summary(&self.slots[0]), summary(&self.slots[1])],
            status: self.status(),
            last_error: self.last_error.clone(),
            receipt: self.receipt().cloned(),
        }
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    // ---- camera ----

    /// Open the camera. A no-op when it is already on.
    pub async fn enable_camera(&mut self) -> Result<(), CaptureError> {
        if self.is_camera_on() {
            return Ok(());
        }

        match self.device.acquire(&self.constraints).await {
            Ok(stream) => {
                let settings = stream.settings();
                tracing::info!(
                    width = settings.width,
                    height = settings.height,
                    "Camera enabled",
                );
                self.camera = CameraState::Live { stream };
                self.last_error = None;
                self.emit(CaptureEvent::CameraEnabled {
                    width: settings.width,
                    height: settings.height,
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Camera acquisition failed");
                self.fail(CAMERA_ERROR_MESSAGE);
                Err(e.into())
            }
        }
    }

    /// Release the camera. An in-progress recording is finalized into
    /// the active slot first.
    pub async fn disable_camera(&mut self) -> Result<(), CaptureError> {
        let result = match std::mem::replace(&mut self.camera, CameraState::Off) {
            CameraState::Off => return Ok(()),
            CameraState::Live { mut stream } => {
                stream.stop_tracks();
                Ok(())
            }
            CameraState::Recording {
                mut stream,
                recording,
            } => {
                let finished = self.store_recording(recording).await;
                stream.stop_tracks();
                finished.map(|_| ())
            }
        };
        tracing::info!("Camera disabled");
        self.emit(CaptureEvent::CameraDisabled);
        result
    }

    // ---- recording ----

    /// Start recording into the active slot with a fresh buffer and a
    /// full countdown. A no-op when the camera is off or already
    /// recording.
    pub fn start_recording(&mut self) -> Result<(), CaptureError> {
        let mut stream = match std::mem::replace(&mut self.camera, CameraState::Off) {
            CameraState::Live { stream } => stream,
            other => {
                self.camera = other;
                return Ok(());
            }
        };

        let slot = self.active_slot;
        match Recording::start(stream.as_mut()) {
            Ok(recording) => {
                self.camera = CameraState::Recording { stream, recording };
                self.remaining_secs = RECORDING_LIMIT_SECS;
                tracing::info!(%slot, limit_secs = RECORDING_LIMIT_SECS, "Recording started");
                self.emit(CaptureEvent::RecordingStarted { slot });
                Ok(())
            }
            Err(e) => {
                self.camera = CameraState::Live { stream };
                self.fail(&e.to_string());
                Err(e)
            }
        }
    }

    /// Finalize the current recording into its slot.
    ///
    /// Returns the slot that was filled, or `None` when nothing was
    /// recording. Safe to call repeatedly.
    pub async fn stop_recording(&mut self) -> Result<Option<SlotIndex>, CaptureError> {
        let recording = match std::mem::replace(&mut self.camera, CameraState::Off) {
            CameraState::Recording { stream, recording } => {
                self.camera = CameraState::Live { stream };
                recording
            }
            other => {
                self.camera = other;
                return Ok(None);
            }
        };
        self.store_recording(recording).await.map(Some)
    }

    /// Advance the countdown by one second.
    ///
    /// Buffers any encoded chunks and stops the recording when the
    /// limit is reached. Ticks arriving while not recording are ignored.
    pub async fn countdown_tick(&mut self) -> Result<u32, CaptureError> {
        let CameraState::Recording { recording, .. } = &mut self.camera else {
            return Ok(self.remaining_secs);
        };
        recording.drain_pending();

        if self.remaining_secs <= 1 {
            self.remaining_secs = 0;
            self.emit(CaptureEvent::CountdownTick { remaining_secs: 0 });
            tracing::info!("Recording limit reached");
            self.stop_recording().await?;
            return Ok(0);
        }

        self.remaining_secs -= 1;
        self.emit(CaptureEvent::CountdownTick {
            remaining_secs: self.remaining_secs,
        });
        Ok(self.remaining_secs)
    }

    // ---- slots ----

    /// Load a video file into the active slot.
    pub async fn import_file(&mut self, file: ImportedFile) -> Result<SlotIndex, CaptureError> {
        if self.is_recording() {
            return Err(CaptureError::Validation(
                "Stop recording before importing a file.".into(),
            ));
        }

        let content_type = match file.resolved_content_type() {
            Some(ct) if is_video_content_type(&ct) => ct,
            _ => {
                self.fail(NOT_A_VIDEO_MESSAGE);
                return Err(CaptureError::Validation(NOT_A_VIDEO_MESSAGE.into()));
            }
        };

        let data = match tokio::fs::read(&file.path).await {
            Ok(data) => data,
            Err(e) => {
                self.fail(&format!("Could not read {}: {e}", file.path.display()));
                return Err(e.into());
            }
        };

        let slot = self.active_slot;
        let bytes = data.len();
        self.slots[slot.index()] = Some(MediaClip {
            data,
            content_type,
            file_name: file.file_name(),
            source: ClipSource::Imported,
            preview: PreviewRef::new(slot),
            captured_at: Utc::now(),
        });
        self.last_error = None;

        tracing::info!(%slot, bytes, path = %file.path.display(), "Clip imported");
        self.emit(CaptureEvent::ClipImported { slot, bytes });
        self.advance_after_fill(slot);
        Ok(slot)
    }

    /// Make `slot` the target of the next recording or import.
    ///
    /// A recording in progress is stored in whichever slot is active
    /// when it stops.
    pub fn select_slot(&mut self, slot: SlotIndex) {
        if self.active_slot != slot {
            self.active_slot = slot;
            self.emit(CaptureEvent::SlotSelected { slot });
        }
    }

    // ---- submission ----

    /// Upload both slots and record the resulting locators.
    ///
    /// Nothing is sent unless both slots are filled. On failure the
    /// clips stay in place so the submission can be retried.
    pub async fn submit(
        &mut self,
        backend: &dyn AnalysisBackend,
    ) -> Result<UploadReceipt, CaptureError> {
        if self.is_recording() {
            return Err(CaptureError::Validation(
                "Stop recording before submitting.".into(),
            ));
        }
        let (Some(first), Some(second)) = (&self.slots[0], &self.slots[1]) else {
            self.fail(BOTH_VIDEOS_REQUIRED_MESSAGE);
            return Err(CaptureError::Validation(BOTH_VIDEOS_REQUIRED_MESSAGE.into()));
        };

        let first = VideoPart::as_mp4(SlotIndex::First.upload_file_name(), first.data.clone());
        let second = VideoPart::as_mp4(SlotIndex::Second.upload_file_name(), second.data.clone());

        self.submission = Submission::InFlight;
        self.last_error = None;
        self.emit(CaptureEvent::SubmissionStarted);

        match backend.upload_videos(first, second).await {
            Ok(receipt) => {
                tracing::info!("Submission accepted");
                self.submission = Submission::Accepted(receipt.clone());
                self.emit(CaptureEvent::SubmissionSucceeded {
                    json1: receipt.json1.clone(),
                    json2: receipt.json2.clone(),
                });
                Ok(receipt)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(error = %message, "Submission failed");
                self.submission = Submission::Failed;
                self.last_error = Some(message.clone());
                self.emit(CaptureEvent::SubmissionFailed { message });
                Err(e.into())
            }
        }
    }

    // ---- private helpers ----

    /// Finalize `recording` into whichever slot is active now.
    async fn store_recording(&mut self, recording: Recording) -> Result<SlotIndex, CaptureError> {
        let slot = self.active_slot;
        let data = match recording.finish().await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(%slot, error = %e, "Failed to finalize recording");
                self.fail(&e.to_string());
                return Err(e);
            }
        };

        let bytes = data.len();
        self.slots[slot.index()] = Some(MediaClip {
            data,
            content_type: CLIP_CONTENT_TYPE.to_string(),
            file_name: None,
            source: ClipSource::Recorded,
            preview: PreviewRef::new(slot),
            captured_at: Utc::now(),
        });

        tracing::info!(%slot, bytes, "Recording finalized");
        self.emit(CaptureEvent::RecordingFinalized { slot, bytes });
        self.advance_after_fill(slot);
        Ok(slot)
    }

    /// After the first slot is filled, move on to the second if it is
    /// still empty.
    fn advance_after_fill(&mut self, filled: SlotIndex) {
        if filled == SlotIndex::First && self.slots[SlotIndex::Second.index()].is_none() {
            self.select_slot(SlotIndex::Second);
        }
    }

    fn fail(&mut self, message: &str) {
        self.last_error = Some(message.to_string());
        self.emit(CaptureEvent::Error {
            message: message.to_string(),
        });
    }

    fn emit(&self, event: CaptureEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::device::UnavailableDevice;

    fn session() -> CaptureSession {
        CaptureSession::new(Arc::new(UnavailableDevice))
    }

    #[tokio::test]
    async fn camera_failure_sets_error_and_stays_off() {
        let mut s = session();
        let mut events = s.subscribe();

        let err = s.enable_camera().await.unwrap_err();
        assert_matches!(err, CaptureError::DeviceAccess(_));
        assert!(!s.is_camera_on());
        assert_eq!(s.last_error(), Some(CAMERA_ERROR_MESSAGE));
        assert_matches!(events.try_recv(), Ok(CaptureEvent::Error { .. }));
    }

    #[tokio::test]
    async fn recording_without_camera_is_noop() {
        let mut s = session();
        s.start_recording().unwrap();
        assert!(!s.is_recording());
        assert_eq!(s.stop_recording().await.unwrap(), None);
        assert_eq!(s.countdown_tick().await.unwrap(), RECORDING_LIMIT_SECS);
    }

    #[tokio::test]
    async fn non_video_import_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let mut s = session();
        let err = s.import_file(ImportedFile::new(&path)).await.unwrap_err();
        assert_matches!(err, CaptureError::Validation(_));
        assert!(s.clip(SlotIndex::First).is_none());
        assert_eq!(s.last_error(), Some(NOT_A_VIDEO_MESSAGE));
    }

    #[tokio::test]
    async fn import_fills_first_then_advances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("open.mp4");
        std::fs::write(&path, b"mp4-bytes").unwrap();

        let mut s = session();
        let slot = s.import_file(ImportedFile::new(&path)).await.unwrap();
        assert_eq!(slot, SlotIndex::First);
        assert_eq!(s.active_slot(), SlotIndex::Second);

        let clip = s.clip(SlotIndex::First).unwrap();
        assert_eq!(clip.content_type, "video/mp4");
        assert_eq!(clip.file_name.as_deref(), Some("open.mp4"));
        assert_eq!(clip.source, ClipSource::Imported);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        let err = s
            .import_file(ImportedFile::new(dir.path().join("gone.mp4")))
            .await
            .unwrap_err();
        assert_matches!(err, CaptureError::Io(_));
        assert!(s.last_error().is_some());
    }

    #[test]
    fn select_slot_emits_only_on_change() {
        let mut s = session();
        let mut events = s.subscribe();
        s.select_slot(SlotIndex::First);
        assert!(events.try_recv().is_err());
        s.select_slot(SlotIndex::Second);
        assert_eq!(
            events.try_recv().unwrap(),
            CaptureEvent::SlotSelected {
                slot: SlotIndex::Second
            }
        );
    }

    #[test]
    fn clear_error_resets_message() {
        let mut s = session();
        s.fail("boom");
        assert_eq!(s.snapshot().last_error.as_deref(), Some("boom"));
        s.clear_error();
        assert!(s.snapshot().last_error.is_none());
        assert_eq!(s.snapshot().status, ProcessingStatus::Idle);
    }
}

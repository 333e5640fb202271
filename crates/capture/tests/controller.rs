//! [`CaptureController`] tests on a paused clock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use common::{FakeBackend, FakeDevice};
use sway_capture::controller::{CaptureController, CaptureHandle};
use sway_capture::error::CaptureError;
use sway_capture::events::CaptureEvent;
use sway_capture::media::SlotIndex;
use sway_capture::recording::RECORDING_LIMIT_SECS;
use sway_capture::session::CaptureSession;
use sway_core::status::ProcessingStatus;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Harness {
    handle: CaptureHandle,
    task: JoinHandle<CaptureSession>,
    cancel: CancellationToken,
    stats: Arc<common::DeviceStats>,
    backend: Arc<FakeBackend>,
}

fn start() -> Harness {
    let device = FakeDevice::new();
    let stats = Arc::clone(&device.stats);
    let backend = Arc::new(FakeBackend::default());
    let cancel = CancellationToken::new();
    let (handle, task) = CaptureController::spawn(
        CaptureSession::new(Arc::new(device)),
        backend.clone(),
        cancel.clone(),
    );
    Harness {
        handle,
        task,
        cancel,
        stats,
        backend,
    }
}

#[tokio::test(start_paused = true)]
async fn recording_stops_itself_at_the_limit() {
    let h = start();
    let mut events = h.handle.subscribe();

    h.handle.enable_camera().await.unwrap();
    let started = tokio::time::Instant::now();
    h.handle.start_recording().await.unwrap();

    let mut ticks = 0;
    loop {
        match events.recv().await.unwrap() {
            CaptureEvent::CountdownTick { .. } => ticks += 1,
            CaptureEvent::RecordingFinalized { slot, .. } => {
                assert_eq!(slot, SlotIndex::First);
                break;
            }
            _ => {}
        }
    }

    assert_eq!(ticks, RECORDING_LIMIT_SECS);
    assert_eq!(started.elapsed(), Duration::from_secs(RECORDING_LIMIT_SECS.into()));

    // Nothing else fires once the recording has stopped.
    tokio::time::sleep(Duration::from_secs(30)).await;
    let snap = h.handle.snapshot().await.unwrap();
    assert!(!snap.recording);
    assert_eq!(snap.remaining_secs, 0);
    assert_eq!(snap.active_slot, SlotIndex::Second);
    assert_eq!(h.stats.finalizes(), 1);
}

#[tokio::test(start_paused = true)]
async fn manual_stop_before_limit() {
    let h = start();
    h.handle.enable_camera().await.unwrap();
    h.handle.start_recording().await.unwrap();

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(h.handle.snapshot().await.unwrap().remaining_secs, 55);

    assert_eq!(
        h.handle.stop_recording().await.unwrap(),
        Some(SlotIndex::First)
    );
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(h.stats.finalizes(), 1);
    assert_eq!(h.handle.snapshot().await.unwrap().remaining_secs, 55);
}

#[tokio::test(start_paused = true)]
async fn cancel_flushes_recording_and_releases_camera() {
    let h = start();
    h.handle.enable_camera().await.unwrap();
    h.handle.start_recording().await.unwrap();

    h.cancel.cancel();
    let session = h.task.await.unwrap();

    assert!(!session.is_camera_on());
    assert!(session.clip(SlotIndex::First).is_some());
    assert_eq!(h.stats.finalizes(), 1);
    assert_eq!(h.stats.track_stops(), 1);

    assert!(h.handle.is_closed());
    assert_matches!(
        h.handle.snapshot().await,
        Err(CaptureError::ControllerClosed)
    );
}

#[tokio::test(start_paused = true)]
async fn submit_through_handle() {
    let h = start();
    h.handle.enable_camera().await.unwrap();
    for _ in 0..2 {
        h.handle.start_recording().await.unwrap();
        h.handle.stop_recording().await.unwrap();
    }

    let receipt = h.handle.submit().await.unwrap();
    assert_eq!(receipt.json2, "/results/json/b_result.json");
    assert_eq!(h.backend.upload_count(), 1);

    let snap = h.handle.snapshot().await.unwrap();
    assert_eq!(snap.status, ProcessingStatus::Success);
    assert!(snap.slots.iter().all(Option::is_some));
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_stops_the_task() {
    let h = start();
    h.handle.enable_camera().await.unwrap();
    drop(h.handle);

    let session = h.task.await.unwrap();
    assert!(!session.is_camera_on());
    assert_eq!(h.stats.track_stops(), 1);
}

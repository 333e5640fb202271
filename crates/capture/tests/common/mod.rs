//! Shared fakes for capture tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sway_capture::device::{
    CaptureConstraints, DeviceError, MediaDevice, MediaEncoder, MediaStream, StreamSettings,
};
use sway_client::api::{AnalysisBackend, BackendError};
use sway_client::types::{UploadReceipt, VideoPart};
use sway_core::trajectory::KeypointTrajectorySet;
use tokio::sync::mpsc;

/// Bytes every fake recording consists of.
pub const FRAME: &[u8] = b"frame";
pub const TAIL: &[u8] = b"-end";

/// Counters shared between a fake device and the streams it opens.
#[derive(Debug, Default)]
pub struct DeviceStats {
    pub acquisitions: AtomicUsize,
    pub encoders_started: AtomicUsize,
    pub finalizes: AtomicUsize,
    pub track_stops: AtomicUsize,
}

impl DeviceStats {
    pub fn finalizes(&self) -> usize {
        self.finalizes.load(Ordering::SeqCst)
    }

    pub fn track_stops(&self) -> usize {
        self.track_stops.load(Ordering::SeqCst)
    }
}

pub struct FakeDevice {
    pub stats: Arc<DeviceStats>,
    pub deny: bool,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self {
            stats: Arc::default(),
            deny: false,
        }
    }

    pub fn denied() -> Self {
        Self {
            stats: Arc::default(),
            deny: true,
        }
    }
}

#[async_trait]
impl MediaDevice for FakeDevice {
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn MediaStream>, DeviceError> {
        if self.deny {
            return Err(DeviceError::PermissionDenied("user said no".into()));
        }
        self.stats.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            stats: Arc::clone(&self.stats),
            settings: StreamSettings {
                width: constraints.ideal_width,
                height: constraints.ideal_height,
            },
            stopped: false,
        }))
    }
}

struct FakeStream {
    stats: Arc<DeviceStats>,
    settings: StreamSettings,
    stopped: bool,
}

impl MediaStream for FakeStream {
    fn settings(&self) -> StreamSettings {
        self.settings
    }

    fn stop_tracks(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.stats.track_stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn start_encoder(
        &mut self,
        _mime_type: &str,
        sink: mpsc::Sender<Vec<u8>>,
    ) -> Result<Box<dyn MediaEncoder>, DeviceError> {
        self.stats.encoders_started.fetch_add(1, Ordering::SeqCst);
        sink.try_send(FRAME.to_vec())
            .map_err(|e| DeviceError::Encoder(e.to_string()))?;
        Ok(Box::new(FakeEncoder {
            stats: Arc::clone(&self.stats),
            sink,
        }))
    }
}

struct FakeEncoder {
    stats: Arc<DeviceStats>,
    sink: mpsc::Sender<Vec<u8>>,
}

#[async_trait]
impl MediaEncoder for FakeEncoder {
    async fn finalize(self: Box<Self>) -> Result<(), DeviceError> {
        self.stats.finalizes.fetch_add(1, Ordering::SeqCst);
        self.sink
            .send(TAIL.to_vec())
            .await
            .map_err(|e| DeviceError::Encoder(e.to_string()))
    }
}

/// Backend double that records uploads and can be told to fail.
#[derive(Default)]
pub struct FakeBackend {
    pub uploads: Mutex<Vec<(VideoPart, VideoPart)>>,
    pub fail_with: Mutex<Option<String>>,
}

impl FakeBackend {
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn fail_next(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl AnalysisBackend for FakeBackend {
    async fn upload_videos(
        &self,
        first: VideoPart,
        second: VideoPart,
    ) -> Result<UploadReceipt, BackendError> {
        self.uploads.lock().unwrap().push((first, second));
        if let Some(message) = self.fail_with.lock().unwrap().take() {
            return Err(BackendError::Upload {
                status: 500,
                message,
            });
        }
        Ok(UploadReceipt {
            json1: "/results/json/a_result.json".into(),
            json2: "/results/json/b_result.json".into(),
            status: Some("success".into()),
            video1_id: Some("a".into()),
            video2_id: Some("b".into()),
        })
    }

    async fn fetch_trajectories(
        &self,
        locator: &str,
    ) -> Result<KeypointTrajectorySet, BackendError> {
        Err(BackendError::Retrieval {
            status: 404,
            body: format!("no document at {locator}"),
        })
    }
}

pub fn recorded_bytes() -> Vec<u8> {
    [FRAME, TAIL].concat()
}

//! Seam to the platform camera and media encoder.
//!
//! A [`MediaDevice`] hands out a live [`MediaStream`]; the stream can
//! start a [`MediaEncoder`] that pushes encoded chunks into an mpsc
//! sink owned by the recording. Implementations wrap whatever the host
//! platform offers; [`UnavailableDevice`] is used on hosts without a
//! camera so the session still works for file imports.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Preferred capture width; the device may negotiate lower.
pub const PREFERRED_WIDTH: u32 = 1280;

/// Preferred capture height; the device may negotiate lower.
pub const PREFERRED_HEIGHT: u32 = 720;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Front-facing camera.
    User,
    Environment,
}

/// What the session asks the device for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing: FacingMode,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            ideal_width: PREFERRED_WIDTH,
            ideal_height: PREFERRED_HEIGHT,
            facing: FacingMode::User,
        }
    }
}

/// Resolution the device actually granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No capture device: {0}")]
    NotFound(String),

    #[error("Device failure: {0}")]
    Failure(String),

    #[error("{0}")]
    Encoder(String),
}

/// A camera that can be opened exclusively.
#[async_trait]
pub trait MediaDevice: Send + Sync {
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn MediaStream>, DeviceError>;
}

/// A live, held-open video stream.
pub trait MediaStream: Send {
    fn settings(&self) -> StreamSettings;

    /// Stop every track and release the device. Must be idempotent.
    fn stop_tracks(&mut self);

    /// Begin encoding to `sink` using `mime_type`.
    ///
    /// The encoder owns the sender side and must drop it once
    /// [`MediaEncoder::finalize`] returns.
    fn start_encoder(
        &mut self,
        mime_type: &str,
        sink: mpsc::Sender<Vec<u8>>,
    ) -> Result<Box<dyn MediaEncoder>, DeviceError>;
}

/// An in-progress encode.
#[async_trait]
pub trait MediaEncoder: Send {
    /// Stop encoding and flush any buffered data into the sink.
    async fn finalize(self: Box<Self>) -> Result<(), DeviceError>;
}

/// Device for hosts with no camera; every acquisition fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableDevice;

#[async_trait]
impl MediaDevice for UnavailableDevice {
    async fn acquire(
        &self,
        _constraints: &CaptureConstraints,
    ) -> Result<Box<dyn MediaStream>, DeviceError> {
        Err(DeviceError::NotFound(
            "no camera is available on this host".into(),
        ))
    }
}

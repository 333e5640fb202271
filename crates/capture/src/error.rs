use sway_client::api::BackendError;

use crate::device::DeviceError;

/// Errors surfaced by the capture session.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The camera could not be opened (permissions, missing hardware).
    #[error("Camera unavailable: {0}")]
    DeviceAccess(String),

    /// Rejected before any I/O: wrong file type, missing slot, bad state.
    #[error("{0}")]
    Validation(String),

    /// The upload endpoint failed; recorded media is kept for a retry.
    #[error(transparent)]
    Upload(#[from] BackendError),

    #[error("Failed to read media file: {0}")]
    Io(#[from] std::io::Error),

    /// The recorder failed to start or finalize.
    #[error("Recorder error: {0}")]
    Encoder(String),

    /// The controller task has shut down.
    #[error("Capture controller is not running")]
    ControllerClosed,
}

impl From<DeviceError> for CaptureError {
    fn from(e: DeviceError) -> Self {
        match e {
            DeviceError::Encoder(msg) => CaptureError::Encoder(msg),
            other => CaptureError::DeviceAccess(other.to_string()),
        }
    }
}

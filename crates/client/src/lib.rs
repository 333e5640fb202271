//! HTTP client for the pose-estimation backend.
//!
//! The backend accepts two videos in one multipart upload, runs pose
//! estimation on each, and exposes a JSON trajectory document per video
//! at a backend-relative path. [`api::BackendClient`] wraps those
//! endpoints with [`reqwest`]; [`api::AnalysisBackend`] is the seam the
//! capture session and orchestrator depend on.

pub mod api;
pub mod types;

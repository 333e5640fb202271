//! REST client for the pose-estimation backend.
//!
//! Wraps the backend HTTP API (video upload, trajectory retrieval,
//! health check, result listing) using [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use sway_core::trajectory::KeypointTrajectorySet;

use crate::types::{
    ErrorBody, HealthStatus, ResultListing, ResultListingEnvelope, UploadReceipt, VideoPart,
    UPLOAD_FIELD_FIRST, UPLOAD_FIELD_SECOND,
};

/// Message used when an upload fails without a `detail` string.
pub const GENERIC_SERVER_ERROR: &str = "Server error";

/// Errors from the backend REST layer.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// `POST /upload_videos` returned a non-2xx status.
    #[error("{message}")]
    Upload {
        /// HTTP status code.
        status: u16,
        /// Server-provided `detail`, or [`GENERIC_SERVER_ERROR`].
        message: String,
    },

    /// A result document could not be fetched.
    #[error("Result retrieval failed ({status}): {body}")]
    Retrieval {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A result locator was not a backend-relative path.
    #[error("Invalid result locator: {0}")]
    InvalidLocator(String),

    /// A response body did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// The operations the capture session and orchestrator need from the
/// backend.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Upload both videos in one request and return the two result
    /// locators.
    async fn upload_videos(
        &self,
        first: VideoPart,
        second: VideoPart,
    ) -> Result<UploadReceipt, BackendError>;

    /// Fetch and parse the trajectory document at `locator`.
    async fn fetch_trajectories(
        &self,
        locator: &str,
    ) -> Result<KeypointTrajectorySet, BackendError>;
}

/// HTTP client for a single backend origin.
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for `base_url`, e.g. `http://host:8000`.
    ///
    /// A trailing slash is stripped so locators can be appended verbatim.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client with a per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Backend origin this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the backend is up.
    ///
    /// Sends `GET /`.
    pub async fn health(&self) -> Result<HealthStatus, BackendError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await?;
        let response = Self::ensure_retrieval_success(response).await?;
        Ok(response.json().await?)
    }

    /// List the artifacts stored on the backend.
    ///
    /// Sends `GET /list-results`.
    pub async fn list_results(&self) -> Result<ResultListing, BackendError> {
        let response = self
            .client
            .get(format!("{}/list-results", self.base_url))
            .send()
            .await?;
        let response = Self::ensure_retrieval_success(response).await?;
        let envelope: ResultListingEnvelope = response.json().await?;
        Ok(envelope.data)
    }

    // ---- private helpers ----

    fn result_url(&self, locator: &str) -> Result<String, BackendError> {
        if !locator.starts_with('/') || locator.starts_with("//") {
            return Err(BackendError::InvalidLocator(locator.to_string()));
        }
        Ok(format!("{}{}", self.base_url, locator))
    }

    fn part(video: VideoPart) -> Result<Part, BackendError> {
        Ok(Part::bytes(video.data)
            .file_name(video.file_name)
            .mime_str(&video.content_type)?)
    }

    /// Map a non-2xx upload response to [`BackendError::Upload`], taking
    /// the message from the body's `detail` string when present.
    async fn ensure_upload_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail_text().map(str::to_string))
            .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string());
        Err(BackendError::Upload {
            status: status.as_u16(),
            message,
        })
    }

    async fn ensure_retrieval_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(BackendError::Retrieval {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl AnalysisBackend for BackendClient {
    /// Sends `POST /upload_videos` with multipart fields `file1` and
    /// `file2`.
    async fn upload_videos(
        &self,
        first: VideoPart,
        second: VideoPart,
    ) -> Result<UploadReceipt, BackendError> {
        let first_len = first.data.len();
        let second_len = second.data.len();
        let form = Form::new()
            .part(UPLOAD_FIELD_FIRST, Self::part(first)?)
            .part(UPLOAD_FIELD_SECOND, Self::part(second)?);

        tracing::info!(
            base_url = %self.base_url,
            first_bytes = first_len,
            second_bytes = second_len,
            "Uploading videos for analysis",
        );

        let response = self
            .client
            .post(format!("{}/upload_videos", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let response = Self::ensure_upload_success(response).await?;
        let receipt: UploadReceipt = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        tracing::info!(json1 = %receipt.json1, json2 = %receipt.json2, "Upload accepted");
        Ok(receipt)
    }

    /// Sends `GET <locator>` against the same origin.
    async fn fetch_trajectories(
        &self,
        locator: &str,
    ) -> Result<KeypointTrajectorySet, BackendError> {
        let url = self.result_url(locator)?;
        let response = self.client.get(&url).send().await?;
        let response = Self::ensure_retrieval_success(response).await?;
        let text = response.text().await?;

        let set = KeypointTrajectorySet::from_json(&text)
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        tracing::debug!(locator, edges = set.len(), "Fetched trajectories");
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let c = BackendClient::new("http://localhost:8000/");
        assert_eq!(c.base_url(), "http://localhost:8000");
    }

    #[test]
    fn locator_is_appended_to_origin() {
        let c = BackendClient::new("http://localhost:8000");
        assert_eq!(
            c.result_url("/results/json/a.json").unwrap(),
            "http://localhost:8000/results/json/a.json"
        );
    }

    #[test]
    fn absolute_or_protocol_relative_locators_rejected() {
        let c = BackendClient::new("http://localhost:8000");
        assert_matches!(
            c.result_url("http://evil/x.json"),
            Err(BackendError::InvalidLocator(_))
        );
        assert_matches!(
            c.result_url("//evil/x.json"),
            Err(BackendError::InvalidLocator(_))
        );
        assert_matches!(c.result_url(""), Err(BackendError::InvalidLocator(_)));
    }

    #[test]
    fn upload_error_displays_message_only() {
        let e = BackendError::Upload {
            status: 400,
            message: "Files must be video".into(),
        };
        assert_eq!(e.to_string(), "Files must be video");
    }
}

//! Request and response payloads for the backend endpoints.

use serde::{Deserialize, Serialize};

/// Multipart field name of the first (eyes-open) video.
pub const UPLOAD_FIELD_FIRST: &str = "file1";

/// Multipart field name of the second (eyes-closed) video.
pub const UPLOAD_FIELD_SECOND: &str = "file2";

/// Container type both uploads are declared as.
pub const UPLOAD_CONTENT_TYPE: &str = "video/mp4";

/// One video payload for `POST /upload_videos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPart {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl VideoPart {
    /// Wrap raw media as an `.mp4` upload part, whatever it was recorded as.
    pub fn as_mp4(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: UPLOAD_CONTENT_TYPE.to_string(),
            data,
        }
    }
}

/// Successful response of `POST /upload_videos`.
///
/// `json1` / `json2` are backend-relative paths, e.g.
/// `/results/json/<uuid>_result.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub json1: String,
    pub json2: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub video1_id: Option<String>,
    #[serde(default)]
    pub video2_id: Option<String>,
}

/// Error body returned by the backend on non-2xx responses.
///
/// `detail` is usually a string but validation failures carry a list,
/// so it is kept as raw JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The `detail` text when it is a non-empty string.
    pub fn detail_text(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .and_then(|d| d.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// Response of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Stored artifacts reported by `GET /list-results`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultListing {
    #[serde(default)]
    pub plots: Vec<String>,
    #[serde(default)]
    pub elipsis: Vec<String>,
    #[serde(default)]
    pub analysis: Vec<String>,
    #[serde(default)]
    pub json_results: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultListingEnvelope {
    pub data: ResultListing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_tolerates_missing_optional_fields() {
        let r: UploadReceipt =
            serde_json::from_str(r#"{"json1":"/results/json/a.json","json2":"/results/json/b.json"}"#)
                .unwrap();
        assert_eq!(r.json1, "/results/json/a.json");
        assert!(r.video1_id.is_none());
    }

    #[test]
    fn receipt_requires_both_locators() {
        assert!(serde_json::from_str::<UploadReceipt>(r#"{"json1":"/a"}"#).is_err());
    }

    #[test]
    fn detail_text_only_for_strings() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"Files must be video"}"#).unwrap();
        assert_eq!(body.detail_text(), Some("Files must be video"));

        let body: ErrorBody = serde_json::from_str(r#"{"detail":[{"loc":["body"]}]}"#).unwrap();
        assert_eq!(body.detail_text(), None);

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.detail_text(), None);
    }

    #[test]
    fn mp4_part_is_retyped() {
        let part = VideoPart::as_mp4("video1.mp4", vec![1, 2, 3]);
        assert_eq!(part.content_type, "video/mp4");
        assert_eq!(part.data.len(), 3);
    }
}

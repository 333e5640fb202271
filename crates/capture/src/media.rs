//! Clips, slots, and imported-file handling.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One of the two capture slots.
///
/// By convention the first slot holds the eyes-open trial and the
/// second the eyes-closed trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotIndex {
    #[default]
    First,
    Second,
}

impl SlotIndex {
    pub const ALL: [SlotIndex; 2] = [SlotIndex::First, SlotIndex::Second];

    pub fn index(self) -> usize {
        match self {
            SlotIndex::First => 0,
            SlotIndex::Second => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(SlotIndex::First),
            1 => Some(SlotIndex::Second),
            _ => None,
        }
    }

    /// File name the slot is uploaded under.
    pub fn upload_file_name(self) -> &'static str {
        match self {
            SlotIndex::First => "video1.mp4",
            SlotIndex::Second => "video2.mp4",
        }
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "video {}", self.index() + 1)
    }
}

/// Opaque handle a UI can use to show a clip preview.
///
/// Issued once per stored clip and never reused, so a replaced clip's
/// preview is naturally invalidated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PreviewRef(String);

impl PreviewRef {
    pub fn new(slot: SlotIndex) -> Self {
        Self(format!("preview://slot-{}/{}", slot.index() + 1, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipSource {
    Recorded,
    Imported,
}

/// A finished video held in a slot.
#[derive(Debug, Clone)]
pub struct MediaClip {
    pub data: Vec<u8>,
    pub content_type: String,
    pub file_name: Option<String>,
    pub source: ClipSource,
    pub preview: PreviewRef,
    pub captured_at: DateTime<Utc>,
}

impl MediaClip {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A user-selected file to import into the active slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedFile {
    pub path: PathBuf,
    /// Declared MIME type; inferred from the extension when absent.
    pub content_type: Option<String>,
}

impl ImportedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Declared type if given, otherwise the type implied by the
    /// file extension.
    pub fn resolved_content_type(&self) -> Option<String> {
        self.content_type
            .clone()
            .or_else(|| content_type_for_path(&self.path).map(str::to_string))
    }

    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// MIME type for common video container extensions.
pub fn content_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "mp4" | "m4v" => Some("video/mp4"),
        "webm" => Some("video/webm"),
        "mov" => Some("video/quicktime"),
        "mkv" => Some("video/x-matroska"),
        "avi" => Some("video/x-msvideo"),
        _ => None,
    }
}

/// Whether a MIME type names a video.
pub fn is_video_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("video/")
}

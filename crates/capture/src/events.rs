//! Capture lifecycle notifications.
//!
//! The session publishes a [`CaptureEvent`] for every state change on a
//! `tokio::sync::broadcast` channel so UIs and logs can follow along
//! without polling. Slow subscribers lag and drop events; the session
//! itself never blocks on them.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::media::SlotIndex;

/// Capacity of the event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CaptureEvent {
    CameraEnabled { width: u32, height: u32 },
    CameraDisabled,
    RecordingStarted { slot: SlotIndex },
    CountdownTick { remaining_secs: u32 },
    RecordingFinalized { slot: SlotIndex, bytes: usize },
    ClipImported { slot: SlotIndex, bytes: usize },
    SlotSelected { slot: SlotIndex },
    SubmissionStarted,
    SubmissionSucceeded { json1: String, json2: String },
    SubmissionFailed { message: String },
    Error { message: String },
}

pub(crate) fn channel() -> broadcast::Sender<CaptureEvent> {
    broadcast::channel(EVENT_CHANNEL_CAPACITY).0
}

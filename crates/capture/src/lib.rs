//! Two-slot video capture and upload session.
//!
//! A [`session::CaptureSession`] owns the camera, the in-flight
//! recording, the two clip slots and the upload status. It is driven
//! either directly (tests, batch imports) or through a
//! [`controller::CaptureHandle`], whose background task serialises user
//! commands with the 1-second recording countdown.

pub mod controller;
pub mod device;
pub mod error;
pub mod events;
pub mod media;
pub mod recording;
pub mod session;

//! Keypoint catalog and posture analysis for the balance-test pipeline.
//!
//! Everything in this crate is pure: trajectories go in, body segments,
//! a trunk midline, sway statistics and a categorical diagnosis come
//! out. Network and device concerns live in `sway-client` and
//! `sway-capture`.

pub mod diagnosis;
pub mod error;
pub mod keypoints;
pub mod midline;
pub mod report;
pub mod segments;
pub mod status;
pub mod trajectory;

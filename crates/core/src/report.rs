//! One-call analysis of a single video's trajectories.

use serde::Serialize;

use crate::diagnosis::{diagnose, Diagnosis};
use crate::midline::{
    compute_midline_and_statistics, Midline, MidlineAnalysis, MidlineUnavailable, SwayStatistics,
};
use crate::segments::{extract_segments, Segment};
use crate::trajectory::KeypointTrajectorySet;

/// Everything the results view shows for one video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostureReport {
    pub segments: Vec<Segment>,
    pub midline: Option<Midline>,
    /// Rounded to 2 decimals.
    pub statistics: Option<SwayStatistics>,
    pub diagnosis: Option<Diagnosis>,
    /// Set when `midline` is `None`.
    pub unavailable: Option<MidlineUnavailable>,
}

/// Run the full analysis pipeline over one trajectory set.
pub fn analyze(trajectories: &KeypointTrajectorySet) -> PostureReport {
    let segments = extract_segments(trajectories);

    match compute_midline_and_statistics(trajectories) {
        MidlineAnalysis::Available {
            midline,
            statistics,
        } => PostureReport {
            segments,
            midline: Some(midline),
            statistics: Some(statistics.rounded()),
            diagnosis: Some(diagnose(&statistics)),
            unavailable: None,
        },
        MidlineAnalysis::Unavailable(reason) => PostureReport {
            segments,
            midline: None,
            statistics: None,
            diagnosis: None,
            unavailable: Some(reason),
        },
    }
}

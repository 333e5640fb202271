//! Trunk midline and sway statistics.
//!
//! The backend stores the shoulder edge (`5,6`) and hip edge (`11,12`)
//! as interleaved samples: index `2k` is the left landmark and `2k + 1`
//! the right landmark of frame `k`. For every frame the midline holds
//! the shoulder midpoint and the hip midpoint. Sway is measured against
//! frame 0: the angular deviation of the shoulder-hip line and the
//! horizontal drift of the trunk centre.

use serde::Serialize;

use crate::keypoints::EdgeKey;
use crate::trajectory::{EdgeTrajectory, KeypointTrajectorySet, Point};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Shoulder and hip midpoints for one sampled frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MidlinePair {
    pub shoulder: Point,
    pub hip: Point,
}

impl MidlinePair {
    /// Angle of the shoulder-to-hip vector, in degrees.
    pub fn angle_deg(&self) -> f64 {
        (self.hip.y - self.shoulder.y)
            .atan2(self.hip.x - self.shoulder.x)
            .to_degrees()
    }

    /// Horizontal position of the trunk centre.
    pub fn center_x(&self) -> f64 {
        (self.shoulder.x + self.hip.x) / 2.0
    }
}

/// Trunk trajectory, one pair per sampled frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Midline {
    pub pairs: Vec<MidlinePair>,
}

impl Midline {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Flattened polyline `shoulder0, hip0, shoulder1, hip1, ...` for plotting.
    pub fn polyline(&self) -> Vec<Point> {
        self.pairs.iter().flat_map(|p| [p.shoulder, p.hip]).collect()
    }
}

/// Why no midline could be derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MidlineUnavailable {
    /// The `5,6` edge is absent or empty.
    MissingShoulders,
    /// The `11,12` edge is absent or empty.
    MissingHips,
    /// Fewer than two usable coordinates, so not even frame 0 is complete.
    InsufficientSamples,
}

/// Sway measurements relative to the first frame.
///
/// Displacements are `None` when the trunk never moved in that
/// direction, since there is no sample to take a maximum over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SwayStatistics {
    /// Largest absolute angular deviation, degrees.
    pub max_angle_deg: f64,
    /// Mean signed angular deviation, degrees.
    pub avg_angle_deg: f64,
    /// Largest positive horizontal drift, pixels.
    pub left_displacement_px: Option<f64>,
    /// Magnitude of the most negative horizontal drift, pixels.
    pub right_displacement_px: Option<f64>,
}

impl SwayStatistics {
    /// Copy with every value rounded to 2 decimal places for presentation.
    pub fn rounded(&self) -> Self {
        Self {
            max_angle_deg: round2(self.max_angle_deg),
            avg_angle_deg: round2(self.avg_angle_deg),
            left_displacement_px: self.left_displacement_px.map(round2),
            right_displacement_px: self.right_displacement_px.map(round2),
        }
    }
}

/// Midline plus statistics, or the reason neither exists.
#[derive(Debug, Clone, PartialEq)]
pub enum MidlineAnalysis {
    Available {
        midline: Midline,
        statistics: SwayStatistics,
    },
    Unavailable(MidlineUnavailable),
}

/// Round half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Derive the midline and its sway statistics.
///
/// Never fails: missing or too-short shoulder/hip data yields
/// [`MidlineAnalysis::Unavailable`].
pub fn compute_midline_and_statistics(trajectories: &KeypointTrajectorySet) -> MidlineAnalysis {
    let shoulders = match trajectories.get(EdgeKey::SHOULDERS) {
        Some(t) if !t.xs.is_empty() => t,
        _ => return MidlineAnalysis::Unavailable(MidlineUnavailable::MissingShoulders),
    };
    let hips = match trajectories.get(EdgeKey::HIPS) {
        Some(t) if !t.xs.is_empty() => t,
        _ => return MidlineAnalysis::Unavailable(MidlineUnavailable::MissingHips),
    };

    let midline = build_midline(shoulders, hips);
    if midline.is_empty() {
        return MidlineAnalysis::Unavailable(MidlineUnavailable::InsufficientSamples);
    }

    let statistics = sway_statistics(&midline);
    MidlineAnalysis::Available {
        midline,
        statistics,
    }
}

/// Pair up even/odd samples into per-frame midpoints.
///
/// Produces `floor(min_len / 2)` pairs where `min_len` is the shortest of
/// the four coordinate sequences.
fn build_midline(shoulders: &EdgeTrajectory, hips: &EdgeTrajectory) -> Midline {
    let min_len = shoulders.len().min(hips.len());

    let pairs = (0..min_len / 2)
        .map(|frame| {
            let i = frame * 2;
            let shoulder = Point::new(shoulders.xs[i], shoulders.ys[i])
                .midpoint(Point::new(shoulders.xs[i + 1], shoulders.ys[i + 1]));
            let hip = Point::new(hips.xs[i], hips.ys[i])
                .midpoint(Point::new(hips.xs[i + 1], hips.ys[i + 1]));
            MidlinePair { shoulder, hip }
        })
        .collect();

    Midline { pairs }
}

/// Angles and drifts relative to the first pair. `midline` must be non-empty.
fn sway_statistics(midline: &Midline) -> SwayStatistics {
    let first = midline.pairs[0];
    let theta_first = first.angle_deg();
    let first_center = first.center_x();

    let angles: Vec<f64> = midline
        .pairs
        .iter()
        .map(|p| p.angle_deg() - theta_first)
        .collect();
    let displacements: Vec<f64> = midline
        .pairs
        .iter()
        .map(|p| p.center_x() - first_center)
        .collect();

    let max_angle_deg = angles.iter().map(|a| a.abs()).fold(0.0_f64, f64::max);
    let avg_angle_deg = angles.iter().sum::<f64>() / angles.len() as f64;

    let left_displacement_px = displacements
        .iter()
        .copied()
        .filter(|d| *d > 0.0)
        .reduce(f64::max);
    let right_displacement_px = displacements
        .iter()
        .copied()
        .filter(|d| *d < 0.0)
        .reduce(f64::min)
        .map(f64::abs);

    SwayStatistics {
        max_angle_deg,
        avg_angle_deg,
        left_displacement_px,
        right_displacement_px,
    }
}

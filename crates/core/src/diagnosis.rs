//! Categorical balance diagnosis from sway statistics.
//!
//! Classification depends only on `dif = left - right` displacement,
//! taken at the 2-decimal precision the statistics are presented with.
//! Bands are closed on their lower bound:
//!
//! | `|dif|`        | Severity         | Asymmetry |
//! |----------------|------------------|-----------|
//! | `< 4`          | no imbalance     | none      |
//! | `4 ..< 10`     | minor imbalance  | minor     |
//! | `>= 10`        | severe imbalance | moderate  |
//!
//! Direction is the sign of `dif` and is independent of the band.

use std::fmt;

use serde::Serialize;

use crate::midline::{round2, SwayStatistics};

/// Lower bound of the "minor" band, pixels.
pub const MINOR_THRESHOLD_PX: f64 = 4.0;

/// Lower bound of the "severe" band, pixels.
pub const SEVERE_THRESHOLD_PX: f64 = 10.0;

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    NoImbalance,
    MinorImbalance,
    SevereImbalance,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::NoImbalance => "no imbalance",
            Severity::MinorImbalance => "minor imbalance",
            Severity::SevereImbalance => "severe imbalance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Asymmetry {
    None,
    Minor,
    Moderate,
}

impl Asymmetry {
    pub fn label(self) -> &'static str {
        match self {
            Asymmetry::None => "none",
            Asymmetry::Minor => "minor",
            Asymmetry::Moderate => "moderate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    None,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::None => "none",
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnosis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub severity: Severity,
    pub asymmetry: Asymmetry,
    pub direction: Direction,
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, ", self.severity.label())?;
        match self.asymmetry {
            Asymmetry::None => f.write_str("no asymmetry")?,
            a => write!(f, "{} asymmetry", a.label())?,
        }
        match self.direction {
            Direction::None => Ok(()),
            d => write!(f, " to the {}", d.label()),
        }
    }
}

/// Classify a signed left-minus-right displacement difference.
pub fn classify(dif: f64) -> Diagnosis {
    let a = dif.abs();
    let (severity, asymmetry) = if a < MINOR_THRESHOLD_PX {
        (Severity::NoImbalance, Asymmetry::None)
    } else if a < SEVERE_THRESHOLD_PX {
        (Severity::MinorImbalance, Asymmetry::Minor)
    } else {
        (Severity::SevereImbalance, Asymmetry::Moderate)
    };

    let direction = if dif < 0.0 {
        Direction::Right
    } else if dif > 0.0 {
        Direction::Left
    } else {
        Direction::None
    };

    Diagnosis {
        severity,
        asymmetry,
        direction,
    }
}

/// Diagnose from sway statistics.
///
/// A side with no recorded drift contributes 0 px.
pub fn diagnose(stats: &SwayStatistics) -> Diagnosis {
    let left = stats.left_displacement_px.map(round2).unwrap_or(0.0);
    let right = stats.right_displacement_px.map(round2).unwrap_or(0.0);
    classify(left - right)
}

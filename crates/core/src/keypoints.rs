//! Fixed catalog of the 17 pose landmarks and the edges between them.
//!
//! Indices follow the COCO keypoint order used by the pose-estimation
//! backend. Edges are identified by an unordered [`EdgeKey`] whose wire
//! form is `"p1,p2"`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Keypoint
// ---------------------------------------------------------------------------

/// Number of landmarks in the catalog.
pub const KEYPOINT_COUNT: usize = 17;

/// An anatomical landmark reported by the pose-estimation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Keypoint {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Keypoint {
    /// Every landmark, in index order.
    pub const ALL: [Keypoint; KEYPOINT_COUNT] = [
        Keypoint::Nose,
        Keypoint::LeftEye,
        Keypoint::RightEye,
        Keypoint::LeftEar,
        Keypoint::RightEar,
        Keypoint::LeftShoulder,
        Keypoint::RightShoulder,
        Keypoint::LeftElbow,
        Keypoint::RightElbow,
        Keypoint::LeftWrist,
        Keypoint::RightWrist,
        Keypoint::LeftHip,
        Keypoint::RightHip,
        Keypoint::LeftKnee,
        Keypoint::RightKnee,
        Keypoint::LeftAnkle,
        Keypoint::RightAnkle,
    ];

    /// Backend index of this landmark (0-16).
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Look up a landmark by its backend index.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Human-readable anatomical name.
    pub fn name(self) -> &'static str {
        match self {
            Keypoint::Nose => "nose",
            Keypoint::LeftEye => "left eye",
            Keypoint::RightEye => "right eye",
            Keypoint::LeftEar => "left ear",
            Keypoint::RightEar => "right ear",
            Keypoint::LeftShoulder => "left shoulder",
            Keypoint::RightShoulder => "right shoulder",
            Keypoint::LeftElbow => "left elbow",
            Keypoint::RightElbow => "right elbow",
            Keypoint::LeftWrist => "left wrist",
            Keypoint::RightWrist => "right wrist",
            Keypoint::LeftHip => "left hip",
            Keypoint::RightHip => "right hip",
            Keypoint::LeftKnee => "left knee",
            Keypoint::RightKnee => "right knee",
            Keypoint::LeftAnkle => "left ankle",
            Keypoint::RightAnkle => "right ankle",
        }
    }
}

impl fmt::Display for Keypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// EdgeKey
// ---------------------------------------------------------------------------

/// Strict wire form: two decimal indices without leading zeros, one comma,
/// no whitespace.
static EDGE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0|[1-9]\d?),(0|[1-9]\d?)$").expect("edge key regex is valid"));

/// Unordered pair of landmarks identifying one body edge.
///
/// The pair is normalised so that `low() <= high()`; `"6,5"` and `"5,6"`
/// therefore name the same edge. Ordering is by `(low, high)`, which is
/// the order segments are listed and coloured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    low: Keypoint,
    high: Keypoint,
}

impl EdgeKey {
    /// Left shoulder to right shoulder.
    pub const SHOULDERS: EdgeKey = EdgeKey {
        low: Keypoint::LeftShoulder,
        high: Keypoint::RightShoulder,
    };

    /// Left hip to right hip.
    pub const HIPS: EdgeKey = EdgeKey {
        low: Keypoint::LeftHip,
        high: Keypoint::RightHip,
    };

    /// Build a key from two landmarks in either order.
    pub fn new(a: Keypoint, b: Keypoint) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Build a key from two backend indices.
    pub fn from_indices(a: u8, b: u8) -> Result<Self, CoreError> {
        let lookup = |i: u8| {
            Keypoint::from_index(i).ok_or_else(|| {
                CoreError::Validation(format!(
                    "Keypoint index {i} out of range 0-{}",
                    KEYPOINT_COUNT - 1
                ))
            })
        };
        if a == b {
            return Err(CoreError::Validation(format!(
                "Edge key '{a},{b}' joins a keypoint to itself"
            )));
        }
        Ok(Self::new(lookup(a)?, lookup(b)?))
    }

    pub fn low(self) -> Keypoint {
        self.low
    }

    pub fn high(self) -> Keypoint {
        self.high
    }

    /// `"left shoulder - right shoulder"`.
    pub fn display_name(self) -> String {
        format!("{} - {}", self.low.name(), self.high.name())
    }

    /// Whether this pair is one of the [`SKELETON_EDGES`].
    pub fn is_anatomical(self) -> bool {
        SKELETON_EDGES
            .iter()
            .any(|&(a, b)| EdgeKey::new(a, b) == self)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.low.index(), self.high.index())
    }
}

impl FromStr for EdgeKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = EDGE_KEY_RE.captures(s).ok_or_else(|| {
            CoreError::Validation(format!("Malformed edge key '{s}', expected \"p1,p2\""))
        })?;
        // Both groups are 1-2 ASCII digits, so they always fit in u8.
        let a: u8 = caps[1]
            .parse()
            .map_err(|_| CoreError::Validation(format!("Malformed edge key '{s}'")))?;
        let b: u8 = caps[2]
            .parse()
            .map_err(|_| CoreError::Validation(format!("Malformed edge key '{s}'")))?;
        Self::from_indices(a, b)
    }
}

impl Serialize for EdgeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EdgeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The anatomical edges of the 17-point skeleton.
pub const SKELETON_EDGES: [(Keypoint, Keypoint); 19] = [
    (Keypoint::Nose, Keypoint::LeftEye),
    (Keypoint::Nose, Keypoint::RightEye),
    (Keypoint::Nose, Keypoint::LeftEar),
    (Keypoint::Nose, Keypoint::RightEar),
    (Keypoint::LeftEar, Keypoint::LeftEye),
    (Keypoint::RightEar, Keypoint::RightEye),
    (Keypoint::LeftEye, Keypoint::RightEye),
    (Keypoint::LeftShoulder, Keypoint::RightShoulder),
    (Keypoint::LeftShoulder, Keypoint::LeftElbow),
    (Keypoint::LeftShoulder, Keypoint::LeftHip),
    (Keypoint::RightShoulder, Keypoint::RightElbow),
    (Keypoint::RightShoulder, Keypoint::RightHip),
    (Keypoint::LeftElbow, Keypoint::LeftWrist),
    (Keypoint::RightElbow, Keypoint::RightWrist),
    (Keypoint::LeftHip, Keypoint::RightHip),
    (Keypoint::LeftHip, Keypoint::LeftKnee),
    (Keypoint::RightHip, Keypoint::RightKnee),
    (Keypoint::LeftKnee, Keypoint::LeftAnkle),
    (Keypoint::RightKnee, Keypoint::RightAnkle),
];

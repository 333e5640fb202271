//! Per-edge coordinate trajectories returned by the pose backend.
//!
//! The backend serialises one results document per video as a JSON
//! object `{"p1,p2": [xs, ys], ...}`. Keys are normalised into
//! [`EdgeKey`]s and held in a `BTreeMap`, so iteration order is the
//! numeric edge order no matter how the backend ordered the object.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::keypoints::EdgeKey;

/// A 2-D sample in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between `self` and `other`.
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

// ---------------------------------------------------------------------------
// EdgeTrajectory
// ---------------------------------------------------------------------------

/// X and Y sample sequences for one edge.
///
/// The two axes can differ in length; [`len`](Self::len) is the shorter
/// of the two and is the only range consumers should index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Vec<f64>, Vec<f64>)", into = "(Vec<f64>, Vec<f64>)")]
pub struct EdgeTrajectory {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl EdgeTrajectory {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self { xs, ys }
    }

    /// Number of usable samples (`min(|xs|, |ys|)`).
    pub fn len(&self) -> usize {
        self.xs.len().min(self.ys.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `i`-th usable sample, if any.
    pub fn point(&self, i: usize) -> Option<Point> {
        if i < self.len() {
            Some(Point::new(self.xs[i], self.ys[i]))
        } else {
            None
        }
    }

    /// All usable samples in order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| Point::new(x, y))
    }
}

impl From<(Vec<f64>, Vec<f64>)> for EdgeTrajectory {
    fn from((xs, ys): (Vec<f64>, Vec<f64>)) -> Self {
        Self { xs, ys }
    }
}

impl From<EdgeTrajectory> for (Vec<f64>, Vec<f64>) {
    fn from(t: EdgeTrajectory) -> Self {
        (t.xs, t.ys)
    }
}

// ---------------------------------------------------------------------------
// KeypointTrajectorySet
// ---------------------------------------------------------------------------

/// All edge trajectories for one analysed video.
///
/// Immutable once received; analysis functions only borrow it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, EdgeTrajectory>",
    into = "BTreeMap<String, EdgeTrajectory>"
)]
pub struct KeypointTrajectorySet {
    edges: BTreeMap<EdgeKey, EdgeTrajectory>,
}

impl KeypointTrajectorySet {
    /// Build a set from already-typed edges.
    pub fn from_edges(edges: impl IntoIterator<Item = (EdgeKey, EdgeTrajectory)>) -> Self {
        Self {
            edges: edges.into_iter().collect(),
        }
    }

    /// Parse a backend results document.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        serde_json::from_str(text)
            .map_err(|e| CoreError::Validation(format!("Invalid trajectory document: {e}")))
    }

    pub fn get(&self, key: EdgeKey) -> Option<&EdgeTrajectory> {
        self.edges.get(&key)
    }

    /// Edges in ascending [`EdgeKey`] order.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeKey, &EdgeTrajectory)> {
        self.edges.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl TryFrom<BTreeMap<String, EdgeTrajectory>> for KeypointTrajectorySet {
    type Error = CoreError;

    fn try_from(raw: BTreeMap<String, EdgeTrajectory>) -> Result<Self, Self::Error> {
        let mut edges = BTreeMap::new();
        for (raw_key, trajectory) in raw {
            let key: EdgeKey = raw_key.parse()?;
            if edges.insert(key, trajectory).is_some() {
                return Err(CoreError::Validation(format!(
                    "Duplicate edge '{raw_key}' (normalises to {key})"
                )));
            }
        }
        Ok(Self { edges })
    }
}

impl From<KeypointTrajectorySet> for BTreeMap<String, EdgeTrajectory> {
    fn from(set: KeypointTrajectorySet) -> Self {
        set.edges
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }
}

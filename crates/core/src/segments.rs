//! Static body-segment summaries for rendering.
//!
//! Each edge is reduced to a two-point line from its first to its last
//! usable sample, coloured from a fixed palette by its position in edge
//! order.

use serde::Serialize;

use crate::keypoints::EdgeKey;
use crate::trajectory::{KeypointTrajectorySet, Point};

/// Ten-colour categorical palette, cycled modulo its length.
pub const SEGMENT_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Colour for the `index`-th segment.
pub fn palette_color(index: usize) -> &'static str {
    SEGMENT_PALETTE[index % SEGMENT_PALETTE.len()]
}

/// Renderable summary of one edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub id: EdgeKey,
    /// Joint-name pair, e.g. `"nose - left eye"`.
    pub name: String,
    pub color: &'static str,
    /// First and last sample; fewer when the edge has fewer than two.
    pub line: Vec<Point>,
}

/// Build one [`Segment`] per edge in `trajectories`, in edge order.
pub fn extract_segments(trajectories: &KeypointTrajectorySet) -> Vec<Segment> {
    trajectories
        .iter()
        .enumerate()
        .map(|(index, (key, trajectory))| {
            let line: Vec<Point> = match trajectory.len() {
                0 => Vec::new(),
                1 => trajectory.point(0).into_iter().collect(),
                n => [trajectory.point(0), trajectory.point(n - 1)]
                    .into_iter()
                    .flatten()
                    .collect(),
            };
            Segment {
                id: key,
                name: key.display_name(),
                color: palette_color(index),
                line,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::EdgeTrajectory;

    fn set(edges: &[(&str, Vec<f64>, Vec<f64>)]) -> KeypointTrajectorySet {
        KeypointTrajectorySet::from_edges(edges.iter().map(|(k, xs, ys)| {
            (
                k.parse::<EdgeKey>().unwrap(),
                EdgeTrajectory::new(xs.clone(), ys.clone()),
            )
        }))
    }

    #[test]
    fn line_is_first_and_last_sample() {
        let s = set(&[("0,1", vec![10.0, 20.0, 30.0], vec![5.0, 15.0, 25.0])]);
        let segments = extract_segments(&s);
        assert_eq!(segments.len(), 1);
        assert_eq!(
            segments[0].line,
            vec![Point::new(10.0, 5.0), Point::new(30.0, 25.0)]
        );
        assert_eq!(segments[0].name, "nose - left eye");
        assert_eq!(segments[0].id.to_string(), "0,1");
    }

    #[test]
    fn uses_shorter_axis_for_last_point() {
        let s = set(&[("5,6", vec![1.0, 2.0, 3.0], vec![7.0, 8.0])]);
        let segments = extract_segments(&s);
        assert_eq!(
            segments[0].line,
            vec![Point::new(1.0, 7.0), Point::new(2.0, 8.0)]
        );
    }

    #[test]
    fn degenerate_lines() {
        let s = set(&[
            ("0,1", vec![4.0], vec![9.0]),
            ("0,2", vec![], vec![]),
            ("1,2", vec![1.0], vec![]),
        ]);
        let segments = extract_segments(&s);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].line, vec![Point::new(4.0, 9.0)]);
        assert!(segments[1].line.is_empty());
        assert!(segments[2].line.is_empty());
    }

    #[test]
    fn one_segment_per_edge_with_cycling_colors() {
        let edges: Vec<(String, Vec<f64>, Vec<f64>)> = (1..=12u8)
            .map(|i| (format!("0,{i}"), vec![0.0, 1.0], vec![0.0, 1.0]))
            .collect();
        let borrowed: Vec<(&str, Vec<f64>, Vec<f64>)> = edges
            .iter()
            .map(|(k, x, y)| (k.as_str(), x.clone(), y.clone()))
            .collect();
        let segments = extract_segments(&set(&borrowed));

        assert_eq!(segments.len(), 12);
        assert_eq!(segments[0].color, "#1f77b4");
        assert_eq!(segments[9].color, "#17becf");
        assert_eq!(segments[10].color, "#1f77b4");
        assert_eq!(segments[11].color, "#ff7f0e");
    }

    #[test]
    fn colors_follow_edge_order_not_input_order() {
        let a = KeypointTrajectorySet::from_json(r#"{"11,12":[[1],[1]],"5,6":[[1],[1]]}"#)
            .unwrap();
        let b = KeypointTrajectorySet::from_json(r#"{"5,6":[[1],[1]],"11,12":[[1],[1]]}"#)
            .unwrap();
        assert_eq!(extract_segments(&a), extract_segments(&b));
        assert_eq!(extract_segments(&a)[0].id, EdgeKey::SHOULDERS);
    }

    #[test]
    fn empty_set_yields_no_segments() {
        assert!(extract_segments(&KeypointTrajectorySet::default()).is_empty());
    }
}

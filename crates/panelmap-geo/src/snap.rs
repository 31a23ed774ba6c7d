//! Snapping labels onto lines
//!
//! Projection happens in planar lng/lat space; distances are haversine meters.
//! Both are adequate at the scale of a single installation site.

use geo::algorithm::closest_point::ClosestPoint;
use geo::{Bearing, Closest, Distance, Haversine, Point};
use panelmap_core::models::{Geometry, Position};

use crate::models::{to_coord, GeometryExt};

/// Closest point of a line to a query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSnap {
    /// The projected position on the line
    pub point: Position,

    /// Haversine distance from the query point, in meters
    pub distance_meters: f64,

    /// Index of the segment the projection landed on (its start vertex)
    pub segment_index: usize,
}

fn to_point(position: &Position) -> Point {
    Point::from(to_coord(position))
}

/// Project a point onto the closest segment of a line.
///
/// The first segment wins when several are equally close. A single-vertex line
/// snaps to that vertex; an empty line yields `None`.
pub fn nearest_point_on_line(line: &[Position], point: Position) -> Option<LineSnap> {
    let query = to_point(&point);

    if let [only] = line {
        return Some(LineSnap {
            point: *only,
            distance_meters: Haversine.distance(query, to_point(only)),
            segment_index: 0,
        });
    }

    let mut best: Option<LineSnap> = None;
    for (index, segment) in line.windows(2).enumerate() {
        let segment = geo::Line::new(to_coord(&segment[0]), to_coord(&segment[1]));
        let projected = match segment.closest_point(&query) {
            Closest::Intersection(p) | Closest::SinglePoint(p) => p,
            Closest::Indeterminate => continue,
        };

        let distance = Haversine.distance(query, projected);
        if best.map_or(true, |b| distance < b.distance_meters) {
            best = Some(LineSnap {
                point: [projected.x(), projected.y()],
                distance_meters: distance,
                segment_index: index,
            });
        }
    }
    best
}

/// Great-circle bearing of a line segment, in degrees clockwise from north.
///
/// The index is clamped to the line's last segment. Lines with fewer than two
/// vertices have bearing 0.
pub fn segment_bearing(line: &[Position], segment_index: usize) -> f64 {
    if line.len() < 2 {
        return 0.0;
    }
    let start = segment_index.min(line.len() - 2);
    Haversine.bearing(to_point(&line[start]), to_point(&line[start + 1]))
}

/// Display center of a line.
///
/// A closed line with at least four vertices yields the area-weighted centroid
/// of the polygon it outlines. Otherwise, or when that centroid is not usable,
/// the center of the line's bounding box is returned.
pub fn line_center(line: &[Position]) -> Option<Position> {
    let first = line.first()?;
    let last = line.last()?;

    if first == last && line.len() >= 4 {
        match polygon_center_of_mass(line) {
            Some(center) => return Some(center),
            None => tracing::debug!("Polygon center failed for closed line, using midpoint"),
        }
    }

    Geometry::line_string(line.to_vec()).bounding_center()
}

fn polygon_center_of_mass(ring: &[Position]) -> Option<Position> {
    let [x, y] = Geometry::polygon(vec![ring.to_vec()]).centroid_coords()?;
    (x.is_finite() && y.is_finite()).then_some([x, y])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn test_nearest_point_picks_closest_segment() {
        // An L-shaped line around a small site near the equator
        let line = vec![[0.0, 0.0], [0.001, 0.0], [0.001, 0.001]];

        let snap = nearest_point_on_line(&line, [0.0012, 0.0005]).unwrap();
        assert_eq!(snap.segment_index, 1);
        assert!(approx(snap.point[0], 0.001, 1e-12));
        assert!(approx(snap.point[1], 0.0005, 1e-12));
        // 0.0002 degrees of longitude at the equator is about 22 meters
        assert!(approx(snap.distance_meters, 22.2, 0.5), "got {}", snap.distance_meters);

        let snap = nearest_point_on_line(&line, [0.0005, -0.0001]).unwrap();
        assert_eq!(snap.segment_index, 0);
    }

    #[test]
    fn test_nearest_point_tie_goes_to_first_segment() {
        let line = vec![[0.0, 0.0], [0.001, 0.0], [0.002, 0.0]];
        let snap = nearest_point_on_line(&line, [0.001, 0.0005]).unwrap();
        assert_eq!(snap.segment_index, 0);
    }

    #[test]
    fn test_nearest_point_degenerate_lines() {
        assert!(nearest_point_on_line(&[], [0.0, 0.0]).is_none());

        let snap = nearest_point_on_line(&[[1.0, 1.0]], [1.0, 1.0]).unwrap();
        assert_eq!(snap.segment_index, 0);
        assert!(snap.distance_meters < 1e-6);
    }

    #[test]
    fn test_segment_bearing_cardinal_directions() {
        let east = vec![[0.0, 0.0], [0.001, 0.0]];
        assert!(approx(segment_bearing(&east, 0), 90.0, 1e-6));

        let north_then_east = vec![[0.0, 0.0], [0.0, 0.001], [0.001, 0.001]];
        assert!(approx(segment_bearing(&north_then_east, 0), 0.0, 1e-6));
        assert!(approx(segment_bearing(&north_then_east, 1), 90.0, 1e-3));
    }

    #[test]
    fn test_segment_bearing_clamps_and_defaults() {
        let east = vec![[0.0, 0.0], [0.001, 0.0]];
        assert!(approx(segment_bearing(&east, 42), 90.0, 1e-6));
        assert_eq!(segment_bearing(&[[0.0, 0.0]], 0), 0.0);
        assert_eq!(segment_bearing(&[], 3), 0.0);
    }

    #[test]
    fn test_line_center_closed_uses_center_of_mass() {
        // An L-shaped outline whose centroid differs from its bbox center
        let outline = vec![
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [1.0, 2.0],
            [0.0, 2.0],
            [0.0, 0.0],
        ];
        let center = line_center(&outline).unwrap();
        let expected = 5.0 / 6.0;
        assert!(approx(center[0], expected, 1e-9));
        assert!(approx(center[1], expected, 1e-9));
    }

    #[test]
    fn test_line_center_open_uses_midpoint() {
        let open = vec![[0.0, 0.0], [4.0, 0.0], [4.0, 2.0]];
        assert_eq!(line_center(&open), Some([2.0, 1.0]));

        // Closed but too short to outline an area
        let closed_triangle = vec![[0.0, 0.0], [2.0, 0.0], [0.0, 0.0]];
        assert_eq!(line_center(&closed_triangle), Some([1.0, 0.0]));

        assert_eq!(line_center(&[]), None);
    }

    #[test]
    fn test_line_center_zero_area_ring_falls_back() {
        let collapsed = vec![[0.0, 0.0], [2.0, 0.0], [1.0, 0.0], [0.0, 0.0]];
        let center = line_center(&collapsed).unwrap();
        assert!(center[0].is_finite() && center[1].is_finite());
        assert!(approx(center[1], 0.0, 1e-12));
    }
}

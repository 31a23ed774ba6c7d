use panelmap_core::models::{Geometry, Position, Ring, SiteFeature};

/// Maximum per-axis difference for two ring endpoints to count as the same vertex
pub const RING_CLOSURE_EPSILON: f64 = 1e-12;

/// Minimum number of distinct vertices for a ring to enclose an area
const MIN_RING_VERTICES: usize = 3;

/// Even-odd ray-casting containment test.
///
/// Rings with fewer than three vertices contain nothing. The result for points
/// exactly on the boundary depends only on the inputs, never on call order.
pub fn point_in_ring(point: Position, ring: &[Position]) -> bool {
    if ring.len() < MIN_RING_VERTICES {
        return false;
    }

    let [px, py] = point;
    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        j = i;

        if (yi > py) == (yj > py) {
            continue;
        }
        let dy = yj - yi;
        if dy == 0.0 {
            continue;
        }
        if px < (xj - xi) * (py - yi) / dy + xi {
            inside = !inside;
        }
    }
    inside
}

/// Whether the point falls inside any ring with at least three vertices
pub fn point_in_any_ring(point: Position, rings: &[Ring]) -> bool {
    rings.iter().any(|ring| point_in_ring(point, ring))
}

/// Rings of a geometry.
///
/// Polygon rings, every ring of every member of a MultiPolygon, the path of a
/// LineString (open or not), one ring per MultiLineString member; nothing for
/// point geometries.
pub fn extract_rings(geometry: &Geometry) -> Vec<Ring> {
    match geometry {
        Geometry::Polygon { coordinates } => coordinates.clone(),
        Geometry::MultiPolygon { coordinates } => coordinates.iter().flatten().cloned().collect(),
        Geometry::LineString { coordinates } => vec![coordinates.clone()],
        Geometry::MultiLineString { coordinates } => coordinates.clone(),
        Geometry::Point { .. } | Geometry::MultiPoint { .. } => Vec::new(),
    }
}

/// Append the first vertex when the ring's endpoints differ.
pub fn close_ring(ring: &[Position]) -> Ring {
    let mut closed = ring.to_vec();
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        let open = (first[0] - last[0]).abs() > RING_CLOSURE_EPSILON
            || (first[1] - last[1]).abs() > RING_CLOSURE_EPSILON;
        if open {
            closed.push(*first);
        }
    }
    closed
}

/// Whether the path has at least three distinct vertices
fn encloses_area(path: &[Position]) -> bool {
    let mut distinct: Vec<Position> = Vec::with_capacity(MIN_RING_VERTICES);
    for position in path {
        if !distinct.contains(position) {
            distinct.push(*position);
            if distinct.len() == MIN_RING_VERTICES {
                return true;
            }
        }
    }
    false
}

/// Turn a LineString outline into a Polygon by closing its path.
///
/// Returns `None` for other geometry types and for paths with fewer than three
/// distinct vertices.
pub fn line_to_polygon(feature: &SiteFeature) -> Option<SiteFeature> {
    let Some(Geometry::LineString { coordinates }) = &feature.geometry else {
        return None;
    };
    if !encloses_area(coordinates) {
        return None;
    }

    Some(SiteFeature {
        geometry: Some(Geometry::Polygon { coordinates: vec![close_ring(coordinates)] }),
        properties: feature.properties.clone(),
    })
}

/// Turn a MultiLineString outline into a MultiPolygon, one polygon per line.
///
/// Lines that cannot enclose an area are dropped; returns `None` when none remain.
pub fn multi_line_to_polygon(feature: &SiteFeature) -> Option<SiteFeature> {
    let Some(Geometry::MultiLineString { coordinates }) = &feature.geometry else {
        return None;
    };

    let polygons: Vec<Vec<Ring>> = coordinates
        .iter()
        .filter(|line| encloses_area(line))
        .map(|line| vec![close_ring(line)])
        .collect();

    if polygons.is_empty() {
        return None;
    }

    Some(SiteFeature {
        geometry: Some(Geometry::MultiPolygon { coordinates: polygons }),
        properties: feature.properties.clone(),
    })
}

/// Convert a table outline feature to an areal geometry.
///
/// Line geometries are closed into polygons, other geometries pass through
/// unchanged. Returns `None` for features without geometry and for lines that
/// cannot be closed into a polygon.
pub fn table_to_polygon(feature: &SiteFeature) -> Option<SiteFeature> {
    match feature.geometry.as_ref()? {
        Geometry::LineString { .. } => line_to_polygon(feature),
        Geometry::MultiLineString { .. } => multi_line_to_polygon(feature),
        _ => Some(feature.clone()),
    }
}

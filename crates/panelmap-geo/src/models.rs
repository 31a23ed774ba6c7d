//! Geometry models for panelmap-geo.
//!
//! Conversions from the canonical `panelmap-core` geometry to the `geo` crate.

use geo::Geometry as GeoGeometry;
use panelmap_core::models::{Geometry, Position, Ring};

/// Convert a position to a geo::Coord
pub fn to_coord(position: &Position) -> geo::Coord {
    geo::Coord { x: position[0], y: position[1] }
}

/// Convert a path of positions to a geo::LineString
pub fn to_line_string(path: &[Position]) -> geo::LineString {
    geo::LineString::new(path.iter().map(to_coord).collect())
}

fn to_polygon(rings: &[Ring]) -> geo::Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => geo::Polygon::new(
            to_line_string(exterior),
            interiors.iter().map(|ring| to_line_string(ring)).collect(),
        ),
        None => geo::Polygon::new(geo::LineString::new(vec![]), vec![]),
    }
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(geo::Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::LineString { coordinates } => GeoGeometry::LineString(to_line_string(coordinates)),
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(to_polygon(coordinates)),
        Geometry::MultiPoint { coordinates } => GeoGeometry::MultiPoint(geo::MultiPoint::new(
            coordinates.iter().map(|c| geo::Point::new(c[0], c[1])).collect(),
        )),
        Geometry::MultiLineString { coordinates } => GeoGeometry::MultiLineString(
            geo::MultiLineString::new(coordinates.iter().map(|line| to_line_string(line)).collect()),
        ),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(geo::MultiPolygon::new(
            coordinates.iter().map(|poly| to_polygon(poly)).collect(),
        )),
    }
}

/// Extension trait for Geometry with geo-crate operations
pub trait GeometryExt {
    /// Convert to geo::Geometry
    fn to_geo(&self) -> GeoGeometry;

    /// Get the centroid as coordinates
    fn centroid_coords(&self) -> Option<Position>;

    /// Center of the bounding box
    fn bounding_center(&self) -> Option<Position>;
}

impl GeometryExt for Geometry {
    fn to_geo(&self) -> GeoGeometry {
        to_geo_geometry(self)
    }

    fn centroid_coords(&self) -> Option<Position> {
        use geo::algorithm::centroid::Centroid;
        self.to_geo().centroid().map(|p| [p.x(), p.y()])
    }

    fn bounding_center(&self) -> Option<Position> {
        use geo::algorithm::bounding_rect::BoundingRect;
        self.to_geo().bounding_rect().map(|rect| {
            let center = rect.center();
            [center.x, center.y]
        })
    }
}

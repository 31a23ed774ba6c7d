//! Canonical geometry types used across all panelmap crates.
//!
//! These types provide a bridge between GeoJSON serialization and the
//! computational geo crate types.

use serde::{Deserialize, Serialize};

/// A `[lng, lat]` position
pub type Position = [f64; 2];

/// An ordered sequence of positions: one polygon boundary or one line path
pub type Ring = Vec<Position>;

/// GeoJSON-compatible geometry representation
///
/// This enum directly maps to GeoJSON geometry types with coordinate arrays.
/// It can be serialized/deserialized as GeoJSON and converted to/from `geo` crate types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Position,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    Polygon {
        coordinates: Vec<Ring>,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Ring>>,
    },
}

impl Geometry {
    /// Create a Point geometry
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point { coordinates: [x, y] }
    }

    /// Create a LineString geometry
    pub fn line_string(coords: Vec<Position>) -> Self {
        Geometry::LineString { coordinates: coords }
    }

    /// Create a Polygon geometry
    pub fn polygon(rings: Vec<Ring>) -> Self {
        Geometry::Polygon { coordinates: rings }
    }

    /// Point coordinates, if this is a Point
    pub fn as_point(&self) -> Option<Position> {
        match self {
            Geometry::Point { coordinates } => Some(*coordinates),
            _ => None,
        }
    }

    /// Convert from a parsed GeoJSON geometry.
    ///
    /// Positions with fewer than two ordinates are dropped. Returns `None` for a
    /// Point without a usable position and for GeometryCollection.
    pub fn from_geojson(geometry: &geojson::Geometry) -> Option<Self> {
        use geojson::Value;

        let geometry = match &geometry.value {
            Value::Point(position) => Geometry::Point { coordinates: to_position(position)? },
            Value::MultiPoint(positions) => Geometry::MultiPoint { coordinates: to_path(positions) },
            Value::LineString(positions) => Geometry::LineString { coordinates: to_path(positions) },
            Value::MultiLineString(lines) => Geometry::MultiLineString {
                coordinates: lines.iter().map(|line| to_path(line)).collect(),
            },
            Value::Polygon(rings) => Geometry::Polygon {
                coordinates: rings.iter().map(|ring| to_path(ring)).collect(),
            },
            Value::MultiPolygon(polygons) => Geometry::MultiPolygon {
                coordinates: polygons
                    .iter()
                    .map(|rings| rings.iter().map(|ring| to_path(ring)).collect())
                    .collect(),
            },
            Value::GeometryCollection(_) => return None,
        };
        Some(geometry)
    }

    /// Convert to a GeoJSON geometry
    pub fn to_geojson(&self) -> geojson::Geometry {
        use geojson::Value;

        let value = match self {
            Geometry::Point { coordinates } => Value::Point(coordinates.to_vec()),
            Geometry::MultiPoint { coordinates } => Value::MultiPoint(from_path(coordinates)),
            Geometry::LineString { coordinates } => Value::LineString(from_path(coordinates)),
            Geometry::MultiLineString { coordinates } => {
                Value::MultiLineString(coordinates.iter().map(|line| from_path(line)).collect())
            }
            Geometry::Polygon { coordinates } => {
                Value::Polygon(coordinates.iter().map(|ring| from_path(ring)).collect())
            }
            Geometry::MultiPolygon { coordinates } => Value::MultiPolygon(
                coordinates
                    .iter()
                    .map(|rings| rings.iter().map(|ring| from_path(ring)).collect())
                    .collect(),
            ),
        };
        geojson::Geometry::new(value)
    }
}

fn to_position(position: &[f64]) -> Option<Position> {
    match position {
        [x, y, ..] => Some([*x, *y]),
        _ => None,
    }
}

fn to_path(positions: &[Vec<f64>]) -> Vec<Position> {
    positions.iter().filter_map(|p| to_position(p)).collect()
}

fn from_path(positions: &[Position]) -> Vec<Vec<f64>> {
    positions.iter().map(|p| p.to_vec()).collect()
}

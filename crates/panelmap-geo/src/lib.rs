//! PanelMap Geo - Ring handling, containment, and line snapping
//!
//! This crate handles the geometric half of the correlation pipeline:
//! extracting and closing rings, point-in-ring tests, and projecting labels
//! onto their nearest line.

pub mod models;
pub mod snap;
pub mod spatial;

pub use models::{to_geo_geometry, to_line_string, GeometryExt};
pub use snap::{line_center, nearest_point_on_line, segment_bearing, LineSnap};
pub use spatial::{
    close_ring, extract_rings, line_to_polygon, multi_line_to_polygon, point_in_any_ring,
    point_in_ring, table_to_polygon,
};

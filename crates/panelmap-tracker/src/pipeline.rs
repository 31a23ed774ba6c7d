//! Feature enrichment pipeline
//!
//! Correlates the cable length table, the label layer and the table outline
//! layer into enriched inverter features and labelled table polygons. Every
//! step produces new values; inputs are never modified.

use panelmap_core::classify::{is_table_label_id, Role};
use panelmap_core::config::LayeredConfig;
use panelmap_core::error::{Error, Result};
use panelmap_core::lengths::{parse_lengths, LengthTable};
use panelmap_core::models::{
    feature_collection, EnrichedFeature, Geometry, Position, SiteFeature, Status, TableLabelPoint,
    TableOutline,
};
use panelmap_core::normalize::normalize_id;
use panelmap_geo::{
    extract_rings, line_center, nearest_point_on_line, point_in_any_ring, segment_bearing,
    table_to_polygon, LineSnap,
};
use serde_json::Value;

use crate::loader::SiteData;

/// Property carrying the display rotation of a repositioned label
pub const COMPUTED_ANGLE_PROPERTY: &str = "computedAngle";

/// Label layer split by role
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelPartition {
    /// Point features naming an inverter
    pub inverters: Vec<SiteFeature>,

    /// Table/panel-string labels reduced to identity and location
    pub table_labels: Vec<TableLabelPoint>,

    /// Features dropped for lacking a point geometry or an identifier
    pub skipped: usize,
}

/// Split the label layer into inverter features and table label points.
///
/// Only Point features with a non-empty identifier are kept. A feature whose
/// identifier ends in `-STR<digits>` is a table label, every other one an
/// inverter.
pub fn partition_labels(labels: &[SiteFeature]) -> LabelPartition {
    let mut partition = LabelPartition::default();

    for feature in labels {
        let (Some(coordinates), Some(id)) = (feature.point(), feature.label_id()) else {
            partition.skipped += 1;
            continue;
        };

        if is_table_label_id(&id) {
            partition.table_labels.push(TableLabelPoint { id, coordinates });
        } else {
            partition.inverters.push(feature.clone());
        }
    }

    tracing::debug!(
        "Partitioned labels: {} inverters, {} table labels, {} skipped",
        partition.inverters.len(),
        partition.table_labels.len(),
        partition.skipped
    );
    partition
}

/// Close line outlines into polygons.
///
/// Returns the outlines and the number of features dropped because they had
/// no geometry or could not enclose an area.
pub fn convert_tables_to_polygons(tables: &[SiteFeature]) -> (Vec<TableOutline>, usize) {
    let mut outlines = Vec::with_capacity(tables.len());
    let mut skipped = 0;

    for feature in tables {
        match table_to_polygon(feature) {
            Some(SiteFeature { geometry: Some(geometry), properties }) => {
                outlines.push(TableOutline::new(geometry, properties));
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!("Dropped {} table outlines with degenerate geometry", skipped);
    }
    (outlines, skipped)
}

/// Panels attributed to a cable length, never less than one
pub fn panels_for_length(meters: f64, panels_per_meter: f64) -> u32 {
    let panels = (meters * panels_per_meter).round();
    if panels >= 1.0 {
        panels.min(u32::MAX as f64) as u32
    } else {
        1
    }
}

/// Join inverter features with their cable lengths.
///
/// Inverters without a length record get 0 meters and therefore one panel.
pub fn enrich_inverters(
    features: &[SiteFeature],
    lengths: &LengthTable,
    panels_per_meter: f64,
) -> Vec<EnrichedFeature> {
    let mut unmatched = 0;
    let enriched: Vec<EnrichedFeature> = features
        .iter()
        .filter_map(|feature| {
            let coordinates = feature.point()?;
            let inverter_id = feature.label_id()?;
            let normalized_id = normalize_id(&inverter_id);

            let meters = lengths.get(&normalized_id).unwrap_or_else(|| {
                unmatched += 1;
                0.0
            });

            Some(EnrichedFeature {
                coordinates,
                total_panels: panels_for_length(meters, panels_per_meter),
                inverter_id,
                normalized_id,
                status: Status::Pending,
                properties: feature.properties.clone(),
            })
        })
        .collect();

    if unmatched > 0 {
        tracing::debug!("{} of {} inverters have no cable length", unmatched, enriched.len());
    }
    enriched
}

/// Attach to each outline the table labels lying inside any of its rings.
///
/// Labels keep the order in which they were supplied.
pub fn associate_table_labels(
    outlines: Vec<TableOutline>,
    labels: &[TableLabelPoint],
) -> Vec<TableOutline> {
    outlines
        .into_iter()
        .map(|mut outline| {
            let rings = extract_rings(&outline.geometry);
            outline.labels = labels
                .iter()
                .filter(|label| point_in_any_ring(label.coordinates, &rings))
                .map(|label| label.id.clone())
                .collect();
            outline
        })
        .collect()
}

/// The path of a LineString eligible for label snapping
fn panel_line<'a>(feature: &'a SiteFeature, panel_layers: &[String]) -> Option<&'a [Position]> {
    let Some(Geometry::LineString { coordinates }) = &feature.geometry else {
        return None;
    };

    match feature.layer() {
        None | Some("") => Some(coordinates),
        Some(layer) if panel_layers.iter().any(|l| l == layer) => Some(coordinates),
        Some(_) => None,
    }
}

fn nearest_line<'a>(lines: &[&'a [Position]], point: Position) -> Option<(&'a [Position], LineSnap)> {
    let mut best: Option<(&[Position], LineSnap)> = None;
    for &line in lines {
        let Some(snap) = nearest_point_on_line(line, point) else {
            continue;
        };
        if best.map_or(true, |(_, b)| snap.distance_meters < b.distance_meters) {
            best = Some((line, snap));
        }
    }
    best
}

fn snap_label(feature: &SiteFeature, lines: &[&[Position]]) -> Option<SiteFeature> {
    let point = feature.point()?;
    if !Role::classify_text(feature.text()).is_label() {
        return None;
    }

    let (line, snap) = nearest_line(lines, point)?;
    let angle = segment_bearing(line, snap.segment_index);

    let mut snapped = feature.clone();
    snapped.properties.insert(COMPUTED_ANGLE_PROPERTY.to_string(), Value::from(angle));
    if let Some(center) = line_center(line) {
        snapped.geometry = Some(Geometry::Point { coordinates: center });
    }
    Some(snapped)
}

/// Align inverter and table labels with the panel lines they annotate.
///
/// Each labelled point is moved to the center of its nearest panel line and
/// given a `computedAngle` property holding the bearing of the segment it
/// snapped to. Panel lines are LineStrings without a layer or on one of
/// `panel_layers`. When several lines are equally near, the first one wins.
pub fn reposition_labels(features: &[SiteFeature], panel_layers: &[String]) -> Vec<SiteFeature> {
    let lines: Vec<&[Position]> =
        features.iter().filter_map(|feature| panel_line(feature, panel_layers)).collect();

    if lines.is_empty() {
        tracing::debug!("No panel lines found, labels left in place");
        return features.to_vec();
    }

    let mut moved = 0;
    let repositioned = features
        .iter()
        .map(|feature| match snap_label(feature, &lines) {
            Some(snapped) => {
                moved += 1;
                snapped
            }
            None => feature.clone(),
        })
        .collect();

    tracing::debug!("Repositioned {} labels onto {} panel lines", moved, lines.len());
    repositioned
}

/// Diagnostics of a site build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Sources that could not be used, as human-readable messages
    pub warnings: Vec<String>,

    pub skipped_rows: usize,
    pub skipped_labels: usize,
    pub skipped_tables: usize,
}

impl LoadReport {
    /// Whether some data was missing and the result is partial
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// The correlated site, ready for tracking
#[derive(Debug, Clone, Default)]
pub struct Site {
    pub inverters: Vec<EnrichedFeature>,
    pub tables: Vec<TableOutline>,
    pub table_labels: Vec<TableLabelPoint>,
    pub lengths: LengthTable,
    pub report: LoadReport,
}

impl Site {
    /// Enriched inverters as a Point FeatureCollection
    pub fn inverters_geojson(&self) -> geojson::FeatureCollection {
        feature_collection(self.inverters.iter().map(EnrichedFeature::to_geojson).collect())
    }

    /// Table outlines as a Polygon/MultiPolygon FeatureCollection
    pub fn tables_geojson(&self) -> geojson::FeatureCollection {
        feature_collection(self.tables.iter().map(TableOutline::to_geojson).collect())
    }
}

fn site_features(collection: Option<&geojson::FeatureCollection>) -> Vec<SiteFeature> {
    collection
        .map(|fc| fc.features.iter().map(SiteFeature::from_geojson).collect())
        .unwrap_or_default()
}

/// Run the whole pipeline over loaded site data.
///
/// Fails with [`Error::NoData`] only when none of the sources was read. Any
/// missing source is reported as a warning and replaced by an empty default.
pub fn build_site(data: &SiteData, config: &LayeredConfig) -> Result<Site> {
    if data.is_empty() {
        return Err(Error::NoData {
            tried: data.failures.iter().map(ToString::to_string).collect(),
        });
    }

    let mut report = LoadReport {
        warnings: data.failures.iter().map(ToString::to_string).collect(),
        ..Default::default()
    };

    let lengths = data.lengths.as_deref().map(parse_lengths).unwrap_or_default();
    report.skipped_rows = lengths.skipped_rows;
    if data.lengths.is_some() && lengths.is_empty() {
        report.warnings.push("Cable length table has no usable rows".to_string());
    }

    let partition = partition_labels(&site_features(data.labels.as_ref()));
    report.skipped_labels = partition.skipped;

    let (outlines, skipped_tables) = convert_tables_to_polygons(&site_features(data.tables.as_ref()));
    report.skipped_tables = skipped_tables;

    let tables = associate_table_labels(outlines, &partition.table_labels);
    let inverters = enrich_inverters(&partition.inverters, &lengths, config.panels_per_meter.value);

    tracing::info!(
        "Built site: {} inverters, {} tables, {} table labels, {} cable lengths",
        inverters.len(),
        tables.len(),
        partition.table_labels.len(),
        lengths.len()
    );
    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }

    Ok(Site { inverters, tables, table_labels: partition.table_labels, lengths, report })
}

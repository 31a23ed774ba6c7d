use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::geometry::{Geometry, Position};

/// Properties consulted, in order, for a feature's identifier
pub const ID_PROPERTIES: [&str; 3] = ["name", "text", "id"];

/// A feature as read from one of the GeoJSON layers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiteFeature {
    /// Geometry, None when absent or of an unsupported type
    pub geometry: Option<Geometry>,

    /// Properties as authored in the source layer
    pub properties: Map<String, Value>,
}

impl SiteFeature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self { geometry: Some(geometry), properties }
    }

    /// Convert from a parsed GeoJSON feature
    pub fn from_geojson(feature: &geojson::Feature) -> Self {
        Self {
            geometry: feature.geometry.as_ref().and_then(Geometry::from_geojson),
            properties: feature.properties.clone().unwrap_or_default(),
        }
    }

    /// Convert to a GeoJSON feature
    pub fn to_geojson(&self) -> geojson::Feature {
        geojson::Feature {
            bbox: None,
            geometry: self.geometry.as_ref().map(Geometry::to_geojson),
            id: None,
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }

    /// Identifier of the feature: the first non-empty of `name`, `text`, `id`.
    ///
    /// Numeric values are rendered as text.
    pub fn label_id(&self) -> Option<String> {
        ID_PROPERTIES.iter().find_map(|key| match self.properties.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    /// The `text` property, used by role classification
    pub fn text(&self) -> Option<&str> {
        self.properties.get("text").and_then(Value::as_str)
    }

    /// The CAD layer name, if the source carried one
    pub fn layer(&self) -> Option<&str> {
        self.properties.get("layer").and_then(Value::as_str)
    }

    /// Point coordinates, if this feature is a Point
    pub fn point(&self) -> Option<Position> {
        self.geometry.as_ref().and_then(Geometry::as_point)
    }
}

/// A table/panel-string label reduced to its identity and location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLabelPoint {
    pub id: String,
    pub coordinates: Position,
}

/// A table footprint after line-to-polygon conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOutline {
    pub geometry: Geometry,
    pub properties: Map<String, Value>,

    /// Table labels located inside the outline, in the order they were supplied
    pub labels: Vec<String>,
}

impl TableOutline {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self { geometry, properties, labels: Vec::new() }
    }

    /// Convert to a GeoJSON feature; matched labels are exposed as a `labels` property
    pub fn to_geojson(&self) -> geojson::Feature {
        let mut properties = self.properties.clone();
        if !self.labels.is_empty() {
            properties.insert(
                "labels".to_string(),
                Value::Array(self.labels.iter().cloned().map(Value::String).collect()),
            );
        }
        geojson::Feature {
            bbox: None,
            geometry: Some(self.geometry.to_geojson()),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Installation status of an inverter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Done,
}

impl Status {
    pub fn toggled(self) -> Self {
        match self {
            Status::Pending => Status::Done,
            Status::Done => Status::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Done => "done",
        }
    }
}

/// An inverter label joined with its cable length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedFeature {
    pub coordinates: Position,

    /// Identifier as authored in the label layer
    pub inverter_id: String,

    /// Join key into the cable length table
    pub normalized_id: String,

    /// Panels attributed to this inverter, at least 1
    pub total_panels: u32,

    pub status: Status,

    /// Remaining source properties, carried through untouched
    pub properties: Map<String, Value>,
}

impl EnrichedFeature {
    /// Copy of this feature with the status flipped
    pub fn with_status_toggled(&self) -> Self {
        Self { status: self.status.toggled(), ..self.clone() }
    }

    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }

    /// Convert to a GeoJSON Point feature carrying the derived properties
    pub fn to_geojson(&self) -> geojson::Feature {
        let mut properties = self.properties.clone();
        properties.insert("inverter_id".to_string(), Value::from(self.inverter_id.clone()));
        properties.insert("normalizedId".to_string(), Value::from(self.normalized_id.clone()));
        properties.insert("total_panels".to_string(), Value::from(self.total_panels));
        properties.insert("status".to_string(), Value::from(self.status.as_str()));

        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(
                self.coordinates.to_vec(),
            ))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Build a FeatureCollection from GeoJSON features
pub fn feature_collection(features: Vec<geojson::Feature>) -> geojson::FeatureCollection {
    geojson::FeatureCollection { bbox: None, features, foreign_members: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_label_id_priority() {
        let feature = SiteFeature::new(
            Geometry::point(0.0, 0.0),
            props(json!({"name": "", "text": "INV 01", "id": "other"})),
        );
        assert_eq!(feature.label_id().as_deref(), Some("INV 01"));

        let numeric = SiteFeature::new(Geometry::point(0.0, 0.0), props(json!({"id": 7})));
        assert_eq!(numeric.label_id().as_deref(), Some("7"));

        let none = SiteFeature::new(Geometry::point(0.0, 0.0), props(json!({"layer": "x"})));
        assert!(none.label_id().is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Done).unwrap(), "\"done\"");
        assert_eq!(Status::Pending.toggled(), Status::Done);
        assert_eq!(Status::Done.toggled(), Status::Pending);
    }

    #[test]
    fn test_enriched_feature_geojson_properties() {
        let feature = EnrichedFeature {
            coordinates: [1.0, 2.0],
            inverter_id: "INV 01".to_string(),
            normalized_id: "INV1".to_string(),
            total_panels: 30,
            status: Status::Pending,
            properties: props(json!({"text": "INV 01", "height": 1.5})),
        };

        let geojson = feature.to_geojson();
        let properties = geojson.properties.unwrap();
        assert_eq!(properties["normalizedId"], json!("INV1"));
        assert_eq!(properties["total_panels"], json!(30));
        assert_eq!(properties["status"], json!("pending"));
        assert_eq!(properties["height"], json!(1.5));
    }

    #[test]
    fn test_outline_labels_property_only_when_matched() {
        let mut outline = TableOutline::new(
            Geometry::polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]),
            Map::new(),
        );
        assert!(!outline.to_geojson().properties.unwrap().contains_key("labels"));

        outline.labels.push("T-STR1".to_string());
        let properties = outline.to_geojson().properties.unwrap();
        assert_eq!(properties["labels"], json!(["T-STR1"]));
    }
}

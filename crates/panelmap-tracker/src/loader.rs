//! Site data loading
//!
//! The three sources are read concurrently. A source that is missing or
//! unreadable is recorded as a failure and never prevents the others from
//! being used.

use async_trait::async_trait;
use panelmap_core::config::LayeredConfig;
use panelmap_core::error::{Error, Result};
use panelmap_core::ports::SourceReader;
use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads sources from files in a data directory
#[derive(Debug, Clone)]
pub struct FsSourceReader {
    root: PathBuf,
}

impl FsSourceReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a reader over an existing directory
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        match tokio::fs::metadata(&root).await {
            Ok(metadata) if metadata.is_dir() => Ok(Self::new(root)),
            _ => Err(Error::DataDirNotFound { path: root }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl SourceReader for FsSourceReader {
    async fn read_text(&self, name: &str) -> Result<Option<String>> {
        let path = self.root.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::SourceUnavailable {
                name: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn describe(&self, name: &str) -> String {
        self.root.join(name).display().to_string()
    }
}

/// Serves sources from memory
#[derive(Debug, Clone, Default)]
pub struct MemorySourceReader {
    sources: HashMap<String, String>,
}

impl MemorySourceReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source, replacing any previous one with the same name
    pub fn with_source(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.sources.insert(name.into(), text.into());
        self
    }
}

#[async_trait]
impl SourceReader for MemorySourceReader {
    async fn read_text(&self, name: &str) -> Result<Option<String>> {
        Ok(self.sources.get(name).cloned())
    }
}

/// A source that could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub name: String,
    pub reason: String,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.reason)
    }
}

/// Raw site data, each source present only if it was read successfully
#[derive(Debug, Clone, Default)]
pub struct SiteData {
    /// Cable length table text
    pub lengths: Option<String>,
    pub labels: Option<geojson::FeatureCollection>,
    pub tables: Option<geojson::FeatureCollection>,
    pub failures: Vec<SourceFailure>,
}

impl SiteData {
    /// Whether no source at all was read
    pub fn is_empty(&self) -> bool {
        self.lengths.is_none() && self.labels.is_none() && self.tables.is_none()
    }
}

/// Parse text as a GeoJSON FeatureCollection
pub fn parse_feature_collection(name: &str, text: &str) -> Result<geojson::FeatureCollection> {
    let geojson = text.parse::<geojson::GeoJson>().map_err(|e| Error::InvalidGeoJson {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    match geojson {
        geojson::GeoJson::FeatureCollection(collection) => Ok(collection),
        geojson::GeoJson::Feature(_) => Err(Error::InvalidGeoJson {
            name: name.to_string(),
            reason: "found a single Feature".to_string(),
        }),
        geojson::GeoJson::Geometry(_) => Err(Error::InvalidGeoJson {
            name: name.to_string(),
            reason: "found a bare Geometry".to_string(),
        }),
    }
}

/// Loads the three site sources through a [`SourceReader`]
pub struct SiteLoader<R: SourceReader> {
    reader: R,
    length_files: Vec<String>,
    labels_file: String,
    tables_file: String,
}

impl<R: SourceReader> SiteLoader<R> {
    /// Create a loader reading the source names configured in `config`
    pub fn new(reader: R, config: &LayeredConfig) -> Self {
        Self {
            reader,
            length_files: config.length_files.value.clone(),
            labels_file: config.labels_file.value.clone(),
            tables_file: config.tables_file.value.clone(),
        }
    }

    /// Read every source, waiting for all of them to settle
    pub async fn load(&self) -> SiteData {
        let (lengths, labels, tables) = tokio::join!(
            self.load_lengths(),
            self.load_collection(&self.labels_file),
            self.load_collection(&self.tables_file),
        );

        let mut data = SiteData::default();
        match lengths {
            Ok(text) => data.lengths = Some(text),
            Err(failure) => data.failures.push(failure),
        }
        match labels {
            Ok(collection) => data.labels = Some(collection),
            Err(failure) => data.failures.push(failure),
        }
        match tables {
            Ok(collection) => data.tables = Some(collection),
            Err(failure) => data.failures.push(failure),
        }

        for failure in &data.failures {
            tracing::warn!("Source unavailable: {}", failure);
        }
        data
    }

    /// Try each length candidate in order; the first one found is used
    async fn load_lengths(&self) -> std::result::Result<String, SourceFailure> {
        let mut reasons = Vec::new();

        for name in &self.length_files {
            match self.reader.read_text(name).await {
                Ok(Some(text)) => {
                    tracing::debug!("Read cable lengths from {}", self.reader.describe(name));
                    return Ok(text);
                }
                Ok(None) => reasons.push(format!("{} not found", self.reader.describe(name))),
                Err(e) => reasons.push(e.to_string()),
            }
        }

        if reasons.is_empty() {
            reasons.push("no length files configured".to_string());
        }
        Err(SourceFailure { name: "cable lengths".to_string(), reason: reasons.join("; ") })
    }

    async fn load_collection(
        &self,
        name: &str,
    ) -> std::result::Result<geojson::FeatureCollection, SourceFailure> {
        let location = self.reader.describe(name);
        let failure = |reason: String| SourceFailure { name: name.to_string(), reason };

        let text = match self.reader.read_text(name).await {
            Ok(Some(text)) => text,
            Ok(None) => return Err(failure(format!("{} not found", location))),
            Err(e) => return Err(failure(e.to_string())),
        };

        let collection = parse_feature_collection(&location, &text).map_err(|e| failure(e.to_string()))?;
        tracing::debug!("Read {} features from {}", collection.features.len(), location);
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_COLLECTION: &str = r#"{"type": "FeatureCollection", "features": []}"#;

    #[test]
    fn test_parse_feature_collection_rejects_other_objects() {
        assert!(parse_feature_collection("a", EMPTY_COLLECTION).is_ok());

        let point = r#"{"type": "Point", "coordinates": [0, 0]}"#;
        assert!(matches!(
            parse_feature_collection("a", point),
            Err(Error::InvalidGeoJson { .. })
        ));
        assert!(parse_feature_collection("a", "not json").is_err());
    }

    #[tokio::test]
    async fn test_open_requires_a_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let reader = FsSourceReader::open(dir.path()).await.unwrap();
        assert_eq!(reader.root(), dir.path());

        let missing = dir.path().join("missing");
        assert!(matches!(
            FsSourceReader::open(&missing).await,
            Err(Error::DataDirNotFound { path }) if path == missing
        ));

        let file = dir.path().join("LV.CSV");
        std::fs::write(&file, "id,length\n").unwrap();
        assert!(matches!(FsSourceReader::open(&file).await, Err(Error::DataDirNotFound { .. })));
    }

    #[tokio::test]
    async fn test_length_candidates_tried_in_order() {
        let reader = MemorySourceReader::new()
            .with_source("lv.csv", "id,length\nINV1,4\n")
            .with_source("text.geojson", EMPTY_COLLECTION)
            .with_source("file.geojson", EMPTY_COLLECTION);

        let data = SiteLoader::new(reader, &LayeredConfig::with_defaults()).load().await;
        assert_eq!(data.lengths.as_deref(), Some("id,length\nINV1,4\n"));
        assert!(data.failures.is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_other_sources() {
        let reader = MemorySourceReader::new()
            .with_source("text.geojson", EMPTY_COLLECTION)
            .with_source("file.geojson", "{ broken");

        let data = SiteLoader::new(reader, &LayeredConfig::with_defaults()).load().await;
        assert!(data.labels.is_some());
        assert!(data.tables.is_none());
        assert!(data.lengths.is_none());
        assert_eq!(data.failures.len(), 2);
        assert_eq!(data.failures[0].name, "cable lengths");
        assert!(data.failures[0].reason.contains("LV.CSV not found"));
        assert!(!data.is_empty());
    }

    #[tokio::test]
    async fn test_nothing_loaded() {
        let data = SiteLoader::new(MemorySourceReader::new(), &LayeredConfig::with_defaults())
            .load()
            .await;
        assert!(data.is_empty());
        assert_eq!(data.failures.len(), 3);
    }
}

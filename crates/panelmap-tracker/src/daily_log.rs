//! Daily work log storage
//!
//! The log is append-only: each submission adds one record and the only
//! other mutation is a full reset.

use async_trait::async_trait;
use panelmap_core::error::{Error, Result};
use panelmap_core::models::{DailyRecord, DailySubmission, EnrichedFeature};
use panelmap_core::ports::DailyLogStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// Log stored as one JSON object per line
#[derive(Debug, Clone)]
pub struct JsonLinesLogStore {
    path: PathBuf,
}

impl JsonLinesLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DailyLogStore for JsonLinesLogStore {
    async fn append(&self, record: &DailyRecord) -> Result<()> {
        let mut line = serde_json::to_string(record).map_err(|e| Error::Serialization(e.to_string()))?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file =
            tokio::fs::OpenOptions::new().create(true).append(true).open(&self.path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DailyRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    "Skipping corrupt daily log line {} in {}: {}",
                    index + 1,
                    self.path.display(),
                    e
                ),
            }
        }
        Ok(records)
    }

    async fn reset(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory log for development and testing
#[derive(Debug, Clone, Default)]
pub struct MemoryLogStore {
    records: Arc<RwLock<Vec<DailyRecord>>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DailyLogStore for MemoryLogStore {
    async fn append(&self, record: &DailyRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DailyRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn reset(&self) -> Result<()> {
        self.records.write().await.clear();
        Ok(())
    }
}

/// Panels installed so far: the sum of `total_panels` over done features
pub fn installed_panels(features: &[EnrichedFeature]) -> u64 {
    features.iter().filter(|f| f.is_done()).map(|f| u64::from(f.total_panels)).sum()
}

/// Record a submission against the current feature set and append it to the log
pub async fn submit<S>(
    store: &S,
    submission: DailySubmission,
    features: &[EnrichedFeature],
) -> Result<DailyRecord>
where
    S: DailyLogStore + ?Sized,
{
    let record = DailyRecord::from_submission(submission, installed_panels(features));
    store.append(&record).await?;
    tracing::info!(
        "Logged {} installed panels for {} on {}",
        record.installed_panels,
        record.subcontractor,
        record.date
    );
    Ok(record)
}

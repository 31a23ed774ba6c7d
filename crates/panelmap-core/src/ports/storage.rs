use async_trait::async_trait;

use crate::error::Result;
use crate::models::DailyRecord;

/// Port for reading the raw site data sources
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Read a source as UTF-8 text.
    ///
    /// Returns `Ok(None)` when the source does not exist, and an error when it
    /// exists but cannot be read.
    async fn read_text(&self, name: &str) -> Result<Option<String>>;

    /// Human-readable location of a source, used in messages
    fn describe(&self, name: &str) -> String {
        name.to_string()
    }
}

/// Port for the append-only daily work log
#[async_trait]
pub trait DailyLogStore: Send + Sync {
    /// Append one record to the end of the log
    async fn append(&self, record: &DailyRecord) -> Result<()>;

    /// All records in submission order
    async fn list(&self) -> Result<Vec<DailyRecord>>;

    /// Discard every record
    async fn reset(&self) -> Result<()>;
}

use chrono::NaiveDate;
use panelmap_core::lengths::LengthTable;
use panelmap_core::models::{DailyRecord, EnrichedFeature};
use panelmap_tracker::{HistoryState, ProgressStats};
use serde::Serialize;
use tabled::Tabled;

/// Output for enrich command
#[derive(Debug, Serialize)]
pub struct EnrichOutput {
    pub data_dir: String,
    pub inverters: usize,
    pub tables: usize,
    pub table_labels: usize,
    pub cable_lengths: usize,
    pub skipped_rows: usize,
    pub skipped_labels: usize,
    pub skipped_tables: usize,
    pub warnings: Vec<String>,
    pub written: Vec<String>,
}

/// Output for labels command when writing to a file
#[derive(Debug, Serialize)]
pub struct LabelsOutput {
    pub features: usize,
    pub repositioned: usize,
    pub path: String,
}

/// Output of a tracking session step
#[derive(Debug, Serialize)]
pub struct HistoryOutput {
    pub action: String,
    #[serde(flatten)]
    pub state: HistoryState,
}

/// Output for the stats session command
#[derive(Debug, Serialize)]
pub struct StatsOutput {
    #[serde(flatten)]
    pub progress: ProgressStats,
    pub done: usize,
    pub inverters: usize,
}

#[derive(Debug, Serialize, Tabled)]
pub struct InverterRow {
    #[tabled(rename = "Inverter")]
    pub inverter_id: String,
    #[tabled(rename = "Normalized")]
    pub normalized_id: String,
    #[tabled(rename = "Cable (m)")]
    pub meters: f64,
    #[tabled(rename = "Panels")]
    pub total_panels: u32,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl InverterRow {
    pub fn from_feature(feature: &EnrichedFeature, lengths: &LengthTable) -> Self {
        Self {
            inverter_id: feature.inverter_id.clone(),
            normalized_id: feature.normalized_id.clone(),
            meters: lengths.get(&feature.normalized_id).unwrap_or(0.0),
            total_panels: feature.total_panels,
            status: feature.status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct LogRow {
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[tabled(rename = "Subcontractor")]
    pub subcontractor: String,
    #[tabled(rename = "Workers")]
    pub workers: u32,
    #[tabled(rename = "Installed panels")]
    pub installed_panels: u64,
}

impl From<DailyRecord> for LogRow {
    fn from(record: DailyRecord) -> Self {
        Self {
            date: record.date,
            subcontractor: record.subcontractor,
            workers: record.workers,
            installed_panels: record.installed_panels,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

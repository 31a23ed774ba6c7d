//! PanelMap Tracker - Enrichment pipeline and progress tracking
//!
//! This crate loads the three site data sources, correlates them into an
//! enriched feature set and governs status edits on that set.

pub mod daily_log;
pub mod history;
pub mod loader;
pub mod pipeline;
pub mod progress;

pub use daily_log::{installed_panels, submit, JsonLinesLogStore, MemoryLogStore};
pub use history::{HistoryState, StatusHistory};
pub use loader::{FsSourceReader, MemorySourceReader, SiteData, SiteLoader, SourceFailure};
pub use pipeline::{
    associate_table_labels, build_site, convert_tables_to_polygons, enrich_inverters,
    panels_for_length, partition_labels, reposition_labels, LabelPartition, LoadReport, Site,
};
pub use progress::ProgressStats;

use panelmap_core::lengths::LengthTable;
use panelmap_core::models::EnrichedFeature;
use serde::{Deserialize, Serialize};

/// Installation progress measured in cable meters and panels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressStats {
    pub total_meters: f64,
    pub completed_meters: f64,
    /// Rounded to the nearest whole percent
    pub completion_percentage: u32,
    pub remaining_meters: f64,
    pub installed_panels: u64,
}

impl ProgressStats {
    /// Compute progress of the `done` features against the whole length table
    pub fn compute(lengths: &LengthTable, features: &[EnrichedFeature]) -> Self {
        let total_meters = lengths.total_meters();
        let done = || features.iter().filter(|feature| feature.is_done());

        let completed_meters: f64 =
            done().map(|feature| lengths.get(&feature.normalized_id).unwrap_or(0.0)).sum();
        let installed_panels: u64 = done().map(|feature| u64::from(feature.total_panels)).sum();

        let completion_percentage = if total_meters > 0.0 {
            (completed_meters / total_meters * 100.0).round() as u32
        } else {
            0
        };

        Self {
            total_meters,
            completed_meters,
            completion_percentage,
            remaining_meters: total_meters - completed_meters,
            installed_panels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelmap_core::models::Status;
    use serde_json::Map;

    fn feature(normalized_id: &str, total_panels: u32, status: Status) -> EnrichedFeature {
        EnrichedFeature {
            coordinates: [0.0, 0.0],
            inverter_id: normalized_id.to_string(),
            normalized_id: normalized_id.to_string(),
            total_panels,
            status,
            properties: Map::new(),
        }
    }

    #[test]
    fn test_progress_of_partially_done_site() {
        let lengths: LengthTable =
            [("INV1".to_string(), 10.0), ("INV2".to_string(), 20.0), ("INV3".to_string(), 30.0)]
                .into_iter()
                .collect();
        let features = vec![
            feature("INV1", 30, Status::Done),
            feature("INV2", 60, Status::Pending),
            feature("INV3", 90, Status::Done),
            // Done but without a cable length
            feature("INV4", 1, Status::Done),
        ];

        let stats = ProgressStats::compute(&lengths, &features);
        assert_eq!(stats.total_meters, 60.0);
        assert_eq!(stats.completed_meters, 40.0);
        assert_eq!(stats.completion_percentage, 67);
        assert_eq!(stats.remaining_meters, 20.0);
        assert_eq!(stats.installed_panels, 121);
    }

    #[test]
    fn test_progress_without_lengths() {
        let stats = ProgressStats::compute(&LengthTable::default(), &[feature("INV1", 5, Status::Done)]);
        assert_eq!(stats.completion_percentage, 0);
        assert_eq!(stats.installed_panels, 5);
    }
}

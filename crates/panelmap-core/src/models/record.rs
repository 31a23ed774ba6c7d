use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What a user submits at the end of a working day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySubmission {
    pub date: NaiveDate,
    pub subcontractor: String,
    pub workers: u32,
}

/// One entry of the append-only daily log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub subcontractor: String,
    pub workers: u32,

    /// Sum of `total_panels` over the features marked done at submission time
    pub installed_panels: u64,
}

impl DailyRecord {
    /// Build a record from a submission and the currently installed panel count
    pub fn from_submission(submission: DailySubmission, installed_panels: u64) -> Self {
        Self {
            date: submission.date,
            subcontractor: submission.subcontractor.trim().to_string(),
            workers: submission.workers,
            installed_panels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_submission_trims_subcontractor() {
        let submission = DailySubmission {
            date: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            subcontractor: "  ENEL ".to_string(),
            workers: 6,
        };

        let record = DailyRecord::from_submission(submission, 120);
        assert_eq!(record.subcontractor, "ENEL");
        assert_eq!(record.installed_panels, 120);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"date\":\"2024-05-17\""));
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One uploaded report after extraction has finished. Owns zero or more
/// metric records and (inside `raw_extraction`) zero-or-one imaging payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub report_type: Option<String>,
    /// Clinically relevant date as extracted from the document.
    pub report_date: Option<NaiveDate>,
    /// Upload time.
    pub created_at: DateTime<Utc>,
    /// Raw extraction payload as produced by the extraction model.
    pub raw_extraction: Option<serde_json::Value>,
}

impl ReportRecord {
    /// Date a measurement from this report is plotted at: the extracted
    /// report date when present, else the upload date.
    pub fn effective_date(&self) -> NaiveDate {
        self.report_date
            .unwrap_or_else(|| self.created_at.date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn effective_date_prefers_report_date() {
        let report = ReportRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            report_type: None,
            report_date: Some(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()),
            created_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 30, 0).unwrap(),
            raw_extraction: None,
        };
        assert_eq!(
            report.effective_date(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
    }

    #[test]
    fn effective_date_falls_back_to_upload() {
        let report = ReportRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            report_type: None,
            report_date: None,
            created_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 30, 0).unwrap(),
            raw_extraction: None,
        };
        assert_eq!(
            report.effective_date(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
    }
}

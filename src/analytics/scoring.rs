use std::collections::HashMap;

use uuid::Uuid;

use super::series::latest_point;
use super::AnalyticsError;
use crate::db::MetricStore;
use crate::models::CanonicalMetric;

/// Metrics the MELD-Na formula needs.
pub const MELD_INPUTS: [CanonicalMetric; 4] = [
    CanonicalMetric::Bilirubin,
    CanonicalMetric::Inr,
    CanonicalMetric::Creatinine,
    CanonicalMetric::Sodium,
];

/// Metrics the APRI formula needs.
pub const APRI_INPUTS: [CanonicalMetric; 2] = [CanonicalMetric::Ast, CanonicalMetric::Platelets];

/// Metrics the FIB-4 formula needs (age comes from the profile, not labs).
pub const FIB4_INPUTS: [CanonicalMetric; 3] = [
    CanonicalMetric::Alt,
    CanonicalMetric::Ast,
    CanonicalMetric::Platelets,
];

/// Gather the latest canonical value of each metric a score formula needs.
/// Metrics never recorded for the user are absent from the map; partial
/// inputs are valid, and handling the gaps is the score calculator's job.
pub fn scoring_inputs(
    store: &dyn MetricStore,
    user_id: Uuid,
    required: &[CanonicalMetric],
) -> Result<HashMap<CanonicalMetric, f64>, AnalyticsError> {
    let mut inputs = HashMap::new();
    for &metric in required {
        if let Some(point) = latest_point(store, user_id, metric)? {
            inputs.insert(metric, point.value);
        }
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::ingest::ingest_report;
    use crate::models::ReportRecord;
    use chrono::Utc;
    use serde_json::json;

    fn seed_panel(store: &SqliteStore, user_id: Uuid, metrics: serde_json::Value) {
        let report = ReportRecord {
            id: Uuid::new_v4(),
            user_id,
            report_type: Some("Blood Panel".into()),
            report_date: Some("2024-01-10".parse().unwrap()),
            created_at: Utc::now(),
            raw_extraction: Some(json!({ "metrics": metrics })),
        };
        store.insert_report(&report).unwrap();
        ingest_report(store, &report).unwrap();
    }

    #[test]
    fn partial_inputs_are_valid() {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = Uuid::new_v4();
        seed_panel(
            &store,
            user,
            json!({
                "Bilirubin": {"value": 1.1, "unit": "mg/dL"},
                "INR": {"value": 1.3, "unit": "ratio"}
                // creatinine and sodium never recorded
            }),
        );

        let inputs = scoring_inputs(&store, user, &MELD_INPUTS).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[&CanonicalMetric::Bilirubin], 1.1);
        assert_eq!(inputs[&CanonicalMetric::Inr], 1.3);
        assert!(!inputs.contains_key(&CanonicalMetric::Creatinine));
    }

    #[test]
    fn inputs_use_canonical_values() {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = Uuid::new_v4();
        seed_panel(
            &store,
            user,
            json!({
                "AST": {"value": 31.0, "unit": "U/L"},
                "Platelets": {"value": 250000.0, "unit": "/uL"}
            }),
        );

        let inputs = scoring_inputs(&store, user, &APRI_INPUTS).unwrap();
        assert_eq!(inputs[&CanonicalMetric::Ast], 31.0);
        // Converted to the canonical 10^9/L scale at ingestion
        assert!((inputs[&CanonicalMetric::Platelets] - 250.0).abs() < 1e-9);
    }

    #[test]
    fn empty_history_yields_empty_map() {
        let store = SqliteStore::open_in_memory().unwrap();
        let inputs = scoring_inputs(&store, Uuid::new_v4(), &FIB4_INPUTS).unwrap();
        assert!(inputs.is_empty());
    }
}

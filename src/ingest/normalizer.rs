use std::str::FromStr;

use uuid::Uuid;

use super::payload::{parse_extraction, RawMeasurement, Section};
use super::IngestError;
use crate::db::MetricStore;
use crate::models::{MetricCategory, MetricRecord, ReportRecord};
use crate::registry::{convert, resolve_name};

/// Build canonical metric records from a report's raw extraction. Pure and
/// deterministic: the same payload always yields the same values and units.
///
/// Fixed-panel entries are normalized before the `metricsAll` sweep, and
/// duplicates are retained (deduplication is a read-time concern).
pub fn normalize_report(report: &ReportRecord) -> Vec<MetricRecord> {
    let Some(raw) = report.raw_extraction.as_ref() else {
        return Vec::new();
    };
    let extraction = parse_extraction(raw);
    let mut records = Vec::new();

    if let Section::Present(metrics) = &extraction.metrics {
        for (name, measurement) in metrics {
            let measurement = measurement.clone().unwrap_or_default();
            records.push(build_record(report.id, name, &measurement, None));
        }
    }

    if let Section::Present(analytes) = &extraction.metrics_all {
        for analyte in analytes {
            let measurement = RawMeasurement {
                value: analyte.value,
                unit: analyte.unit.clone(),
                text: analyte.text.clone(),
            };
            records.push(build_record(
                report.id,
                &analyte.name,
                &measurement,
                analyte.category.as_deref(),
            ));
        }
    }

    records
}

/// Normalize and persist in one step. The write is atomic per report; on
/// failure no partial panel is left behind and previously ingested reports
/// are untouched.
pub fn ingest_report(
    store: &dyn MetricStore,
    report: &ReportRecord,
) -> Result<Vec<MetricRecord>, IngestError> {
    let records = normalize_report(report);
    store
        .save_metrics(report.id, &records)
        .map_err(|source| IngestError::Storage {
            report_id: report.id,
            source,
        })?;
    tracing::info!(
        report_id = %report.id,
        count = records.len(),
        "persisted metric records"
    );
    Ok(records)
}

fn build_record(
    report_id: Uuid,
    name: &str,
    measurement: &RawMeasurement,
    reported_category: Option<&str>,
) -> MetricRecord {
    let canonical = resolve_name(name);
    let category = reported_category
        .map(|s| MetricCategory::from_str(s).unwrap_or(MetricCategory::Other))
        .or_else(|| canonical.map(|m| m.category()));

    let mut record = MetricRecord {
        id: Uuid::new_v4(),
        report_id,
        name: name.to_string(),
        canonical,
        value: measurement.value,
        unit: measurement.unit.clone(),
        original_value: measurement.value,
        original_unit: measurement.unit.clone(),
        was_converted: false,
        conversion_factor: None,
        conversion_rule: None,
        category,
        text_value: measurement.text.clone(),
        validation_status: None,
    };

    // Unit conversion only makes sense for a recognized metric with a
    // numeric value and a reported unit; everything else passes through.
    if let (Some(metric), Some(value), Some(unit)) =
        (canonical, measurement.value, measurement.unit.as_deref())
    {
        let conversion = convert(metric, value, unit);
        record.value = Some(conversion.value);
        record.unit = Some(conversion.unit);
        record.was_converted = conversion.applied;
        record.conversion_factor = conversion.factor;
        record.conversion_rule = conversion.rule;
        record.validation_status = Some(conversion.status);
    }

    record
}

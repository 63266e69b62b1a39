use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{CanonicalMetric, MetricCategory, MetricRecord, ValidationStatus};

/// Writes the full metric batch for a report in one transaction, replacing
/// whatever was there before. Either every record lands or none do; a
/// report must never end up with half its panel missing. Replacement also
/// makes this the re-normalization path.
pub fn save_metrics(
    conn: &mut Connection,
    report_id: Uuid,
    records: &[MetricRecord],
) -> Result<(), DatabaseError> {
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM report_metrics WHERE report_id = ?1",
        params![report_id.to_string()],
    )?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO report_metrics (id, report_id, name, canonical, value, unit,
             original_value, original_unit, was_converted, conversion_factor,
             conversion_rule, category, text_value, validation_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )?;
        for record in records {
            stmt.execute(params![
                record.id.to_string(),
                report_id.to_string(),
                record.name,
                record.canonical.map(|m| m.as_str()),
                record.value,
                record.unit,
                record.original_value,
                record.original_unit,
                record.was_converted,
                record.conversion_factor,
                record.conversion_rule,
                record.category.map(|c| c.as_str()),
                record.text_value,
                record.validation_status.map(|s| s.as_str()),
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Metric records for one report, in insertion order.
pub fn find_metrics_by_report(
    conn: &Connection,
    report_id: Uuid,
) -> Result<Vec<MetricRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, report_id, name, canonical, value, unit, original_value,
         original_unit, was_converted, conversion_factor, conversion_rule,
         category, text_value, validation_status
         FROM report_metrics WHERE report_id = ?1 ORDER BY rowid",
    )?;

    let rows = stmt.query_map(params![report_id.to_string()], |row| {
        Ok(metric_row_from_rusqlite(row))
    })?;

    let mut metrics = Vec::new();
    for row in rows {
        metrics.push(metric_from_row(row??)?);
    }
    Ok(metrics)
}

// Internal row type for MetricRecord mapping
struct MetricRow {
    id: String,
    report_id: String,
    name: String,
    canonical: Option<String>,
    value: Option<f64>,
    unit: Option<String>,
    original_value: Option<f64>,
    original_unit: Option<String>,
    was_converted: bool,
    conversion_factor: Option<f64>,
    conversion_rule: Option<String>,
    category: Option<String>,
    text_value: Option<String>,
    validation_status: Option<String>,
}

fn metric_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<MetricRow, rusqlite::Error> {
    Ok(MetricRow {
        id: row.get(0)?,
        report_id: row.get(1)?,
        name: row.get(2)?,
        canonical: row.get(3)?,
        value: row.get(4)?,
        unit: row.get(5)?,
        original_value: row.get(6)?,
        original_unit: row.get(7)?,
        was_converted: row.get(8)?,
        conversion_factor: row.get(9)?,
        conversion_rule: row.get(10)?,
        category: row.get(11)?,
        text_value: row.get(12)?,
        validation_status: row.get(13)?,
    })
}

fn metric_from_row(row: MetricRow) -> Result<MetricRecord, DatabaseError> {
    Ok(MetricRecord {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        report_id: Uuid::parse_str(&row.report_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name: row.name,
        canonical: row
            .canonical
            .map(|s| CanonicalMetric::from_str(&s))
            .transpose()?,
        value: row.value,
        unit: row.unit,
        original_value: row.original_value,
        original_unit: row.original_unit,
        was_converted: row.was_converted,
        conversion_factor: row.conversion_factor,
        conversion_rule: row.conversion_rule,
        category: row
            .category
            .map(|s| MetricCategory::from_str(&s))
            .transpose()?,
        text_value: row.text_value,
        validation_status: row
            .validation_status
            .map(|s| ValidationStatus::from_str(&s))
            .transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::{delete_report, insert_report};
    use crate::models::ReportRecord;
    use chrono::Utc;

    fn seed_report(conn: &Connection) -> Uuid {
        let report = ReportRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            report_type: None,
            report_date: None,
            created_at: Utc::now(),
            raw_extraction: None,
        };
        insert_report(conn, &report).unwrap();
        report.id
    }

    fn sample_metric(report_id: Uuid, name: &str, value: Option<f64>) -> MetricRecord {
        MetricRecord {
            id: Uuid::new_v4(),
            report_id,
            name: name.into(),
            canonical: CanonicalMetric::from_str(&name.to_lowercase()).ok(),
            value,
            unit: value.map(|_| "U/L".into()),
            original_value: value,
            original_unit: value.map(|_| "U/L".into()),
            was_converted: false,
            conversion_factor: value.map(|_| 1.0),
            conversion_rule: None,
            category: Some(MetricCategory::Liver),
            text_value: None,
            validation_status: Some(ValidationStatus::Verified),
        }
    }

    #[test]
    fn save_and_read_round_trip() {
        let mut conn = open_memory_database().unwrap();
        let report_id = seed_report(&conn);

        let records = vec![
            sample_metric(report_id, "alt", Some(42.0)),
            sample_metric(report_id, "ast", Some(31.0)),
        ];
        save_metrics(&mut conn, report_id, &records).unwrap();

        let found = find_metrics_by_report(&conn, report_id).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].canonical, Some(CanonicalMetric::Alt));
        assert_eq!(found[0].value, Some(42.0));
        assert_eq!(found[1].canonical, Some(CanonicalMetric::Ast));
        assert_eq!(found[0].validation_status, Some(ValidationStatus::Verified));
    }

    #[test]
    fn save_replaces_previous_batch() {
        let mut conn = open_memory_database().unwrap();
        let report_id = seed_report(&conn);

        save_metrics(
            &mut conn,
            report_id,
            &[sample_metric(report_id, "alt", Some(42.0))],
        )
        .unwrap();
        save_metrics(
            &mut conn,
            report_id,
            &[
                sample_metric(report_id, "alt", Some(45.0)),
                sample_metric(report_id, "ast", Some(30.0)),
            ],
        )
        .unwrap();

        let found = find_metrics_by_report(&conn, report_id).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value, Some(45.0));
    }

    #[test]
    fn write_is_atomic_per_report() {
        let mut conn = open_memory_database().unwrap();
        let report_id = seed_report(&conn);

        save_metrics(
            &mut conn,
            report_id,
            &[sample_metric(report_id, "alt", Some(42.0))],
        )
        .unwrap();

        // Duplicate primary key in the second record aborts the batch; the
        // original batch must survive intact.
        let good = sample_metric(report_id, "ast", Some(30.0));
        let mut clash = sample_metric(report_id, "ggt", Some(22.0));
        clash.id = good.id;
        let result = save_metrics(&mut conn, report_id, &[good, clash]);
        assert!(result.is_err());

        let found = find_metrics_by_report(&conn, report_id).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].canonical, Some(CanonicalMetric::Alt));
    }

    #[test]
    fn metrics_preserve_null_value() {
        let mut conn = open_memory_database().unwrap();
        let report_id = seed_report(&conn);
        save_metrics(
            &mut conn,
            report_id,
            &[sample_metric(report_id, "alt", None)],
        )
        .unwrap();

        let found = find_metrics_by_report(&conn, report_id).unwrap();
        assert_eq!(found[0].value, None);
        assert_eq!(found[0].unit, None);
    }

    #[test]
    fn report_delete_cascades_to_metrics() {
        let mut conn = open_memory_database().unwrap();
        let report_id = seed_report(&conn);
        save_metrics(
            &mut conn,
            report_id,
            &[sample_metric(report_id, "alt", Some(42.0))],
        )
        .unwrap();

        delete_report(&conn, report_id).unwrap();
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM report_metrics", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }
}

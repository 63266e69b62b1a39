use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::ReportRecord;

pub fn insert_report(conn: &Connection, report: &ReportRecord) -> Result<(), DatabaseError> {
    let raw = report
        .raw_extraction
        .as_ref()
        .map(|v| v.to_string());
    conn.execute(
        "INSERT INTO reports (id, user_id, report_type, report_date, created_at, raw_extraction)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            report.id.to_string(),
            report.user_id.to_string(),
            report.report_type,
            report.report_date.map(|d| d.to_string()),
            report.created_at.to_rfc3339(),
            raw,
        ],
    )?;
    Ok(())
}

pub fn find_report(conn: &Connection, report_id: Uuid) -> Result<ReportRecord, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, report_type, report_date, created_at, raw_extraction
         FROM reports WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![report_id.to_string()], |row| {
        Ok(report_row_from_rusqlite(row))
    })?;

    match rows.next() {
        Some(row) => report_from_row(row??),
        None => Err(DatabaseError::NotFound {
            entity_type: "report".into(),
            id: report_id.to_string(),
        }),
    }
}

pub fn find_reports_by_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<Vec<ReportRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, report_type, report_date, created_at, raw_extraction
         FROM reports WHERE user_id = ?1 ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![user_id.to_string()], |row| {
        Ok(report_row_from_rusqlite(row))
    })?;

    let mut reports = Vec::new();
    for row in rows {
        reports.push(report_from_row(row??)?);
    }
    Ok(reports)
}

/// Deletes a report; `report_metrics` rows cascade via foreign key.
pub fn delete_report(conn: &Connection, report_id: Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM reports WHERE id = ?1",
        params![report_id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "report".into(),
            id: report_id.to_string(),
        });
    }
    Ok(())
}

// Internal row type for ReportRecord mapping
struct ReportRow {
    id: String,
    user_id: String,
    report_type: Option<String>,
    report_date: Option<String>,
    created_at: String,
    raw_extraction: Option<String>,
}

fn report_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ReportRow, rusqlite::Error> {
    Ok(ReportRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        report_type: row.get(2)?,
        report_date: row.get(3)?,
        created_at: row.get(4)?,
        raw_extraction: row.get(5)?,
    })
}

fn report_from_row(row: ReportRow) -> Result<ReportRecord, DatabaseError> {
    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&row.created_at)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?
        .with_timezone(&Utc);

    Ok(ReportRecord {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        user_id: Uuid::parse_str(&row.user_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        report_type: row.report_type,
        report_date: row
            .report_date
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        created_at,
        // A malformed stored payload degrades to "no extraction", it never
        // poisons reads.
        raw_extraction: row
            .raw_extraction
            .and_then(|s| serde_json::from_str(&s).ok()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use chrono::TimeZone;

    fn sample_report(user_id: Uuid) -> ReportRecord {
        ReportRecord {
            id: Uuid::new_v4(),
            user_id,
            report_type: Some("Blood Panel".into()),
            report_date: Some(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 6, 8, 0, 0).unwrap(),
            raw_extraction: Some(serde_json::json!({"metrics": {"ALT": {"value": 42.0, "unit": "U/L"}}})),
        }
    }

    #[test]
    fn insert_and_find_round_trip() {
        let conn = open_memory_database().unwrap();
        let user_id = Uuid::new_v4();
        let report = sample_report(user_id);
        insert_report(&conn, &report).unwrap();

        let found = find_reports_by_user(&conn, user_id).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, report.id);
        assert_eq!(found[0].report_type.as_deref(), Some("Blood Panel"));
        assert_eq!(found[0].report_date, report.report_date);
        assert_eq!(found[0].created_at, report.created_at);
        assert!(found[0].raw_extraction.is_some());
    }

    #[test]
    fn find_scoped_to_user() {
        let conn = open_memory_database().unwrap();
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        insert_report(&conn, &sample_report(user_a)).unwrap();
        insert_report(&conn, &sample_report(user_b)).unwrap();

        assert_eq!(find_reports_by_user(&conn, user_a).unwrap().len(), 1);
    }

    #[test]
    fn delete_missing_report_is_not_found() {
        let conn = open_memory_database().unwrap();
        let result = delete_report(&conn, Uuid::new_v4());
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn find_report_by_id() {
        let conn = open_memory_database().unwrap();
        let report = sample_report(Uuid::new_v4());
        insert_report(&conn, &report).unwrap();
        assert_eq!(find_report(&conn, report.id).unwrap().id, report.id);
        assert!(find_report(&conn, Uuid::new_v4()).is_err());
    }
}

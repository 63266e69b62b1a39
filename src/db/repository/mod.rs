//! Persistence interface for reports and their metric records.
//!
//! Free functions over `&Connection` do the actual SQL (one module per
//! table); `MetricStore` is the seam the analytics layer depends on, so unit
//! tests can run against an in-memory database and the correlation engine
//! can share one handle across worker tasks.

mod report;
mod metric;

pub use report::*;
pub use metric::*;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use uuid::Uuid;

use super::sqlite::{open_database, open_memory_database};
use super::DatabaseError;
use crate::models::{MetricRecord, ReportRecord};

/// Read/write interface consumed by the normalizer and analytics layers.
/// Metric writes are atomic per report.
pub trait MetricStore: Send + Sync {
    fn reports_for_user(&self, user_id: Uuid) -> Result<Vec<ReportRecord>, DatabaseError>;
    fn metrics_for_report(&self, report_id: Uuid) -> Result<Vec<MetricRecord>, DatabaseError>;
    fn save_metrics(&self, report_id: Uuid, records: &[MetricRecord]) -> Result<(), DatabaseError>;
}

/// SQLite-backed store. The connection sits behind a mutex so the store can
/// be shared across the correlation engine's worker tasks.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::new(open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::new(open_memory_database()?))
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock only means a panicked reader; the connection itself
        // is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Report bookkeeping lives outside the `MetricStore` contract: upload
    /// flows create reports before normalization runs.
    pub fn insert_report(&self, report: &ReportRecord) -> Result<(), DatabaseError> {
        insert_report(&self.conn(), report)
    }

    /// Deletes a report; metric records cascade.
    pub fn delete_report(&self, report_id: Uuid) -> Result<(), DatabaseError> {
        delete_report(&self.conn(), report_id)
    }

    pub fn find_report(&self, report_id: Uuid) -> Result<ReportRecord, DatabaseError> {
        find_report(&self.conn(), report_id)
    }
}

impl MetricStore for SqliteStore {
    fn reports_for_user(&self, user_id: Uuid) -> Result<Vec<ReportRecord>, DatabaseError> {
        find_reports_by_user(&self.conn(), user_id)
    }

    fn metrics_for_report(&self, report_id: Uuid) -> Result<Vec<MetricRecord>, DatabaseError> {
        find_metrics_by_report(&self.conn(), report_id)
    }

    fn save_metrics(&self, report_id: Uuid, records: &[MetricRecord]) -> Result<(), DatabaseError> {
        save_metrics(&mut self.conn(), report_id, records)
    }
}

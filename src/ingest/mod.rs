//! Ingestion: one report's raw extraction payload in, canonical metric
//! records out, persisted atomically per report.
//!
//! Nothing in here raises on malformed upstream data: a bad section parses
//! to absent, a bad entry is skipped, an unknown unit is flagged and passed
//! through. The only failure mode is the storage write itself.

pub mod payload;
pub mod normalizer;

pub use payload::*;
pub use normalizer::*;

use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("ingestion failed for report {report_id}: {source}")]
    Storage {
        report_id: Uuid,
        source: DatabaseError,
    },
}

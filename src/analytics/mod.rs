//! Read-side analytics over persisted metric records: per-metric time
//! series, latest-value maps, imaging-to-lab correlation, and score
//! calculator inputs. Everything here is recomputed fresh per call from the
//! store; there is no derived state to invalidate.

pub mod series;
pub mod correlation;
pub mod scoring;

pub use series::*;
pub use correlation::*;
pub use scoring::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

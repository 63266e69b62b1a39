//! Hepatrace — normalization and correlation core for AI-extracted medical data.
//!
//! Ingests heterogeneous lab and imaging measurements (arbitrary units,
//! inconsistent naming, partial data) and turns them into canonical,
//! comparable time series: trend charts, latest-value maps, score-calculator
//! inputs, and imaging-to-lab correlations. Upload handling, the extraction
//! model itself, and HTTP surfaces live with external collaborators.

pub mod config;
pub mod models;
pub mod db;
pub mod registry; // canonical metric vocabulary + unit conversion
pub mod reference; // clinical reference ranges + classification
pub mod ingest; // raw extraction payload -> persisted metric records
pub mod analytics; // series resolution, correlation, scoring inputs

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and integration harnesses embedding this
/// crate. Respects `RUST_LOG`; falls back to the crate default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

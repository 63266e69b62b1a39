use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{CanonicalMetric, MetricCategory, ValidationStatus};

/// One measurement belonging to one report. Created once by the normalizer
/// at ingestion time; rewritten only by a re-normalization pass.
///
/// `value`/`unit` hold the canonical, already-converted measurement;
/// `original_value`/`original_unit` preserve provenance. Invariant: when
/// `was_converted` is set, `conversion_factor` and `conversion_rule` are
/// present and `value == original_value * conversion_factor` (within floating
/// tolerance for linear-scale units).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub id: Uuid,
    pub report_id: Uuid,
    /// Name as reported by the extractor, kept verbatim.
    pub name: String,
    /// Resolved vocabulary entry; `None` keeps the analyte flowing through
    /// the pipeline uncategorized rather than dropped.
    pub canonical: Option<CanonicalMetric>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub original_value: Option<f64>,
    pub original_unit: Option<String>,
    pub was_converted: bool,
    pub conversion_factor: Option<f64>,
    pub conversion_rule: Option<String>,
    pub category: Option<MetricCategory>,
    pub text_value: Option<String>,
    pub validation_status: Option<ValidationStatus>,
}

//! Clinical reference ranges and value classification.
//!
//! Ranges are stated in each metric's canonical unit. Classification keeps a
//! 20% margin around the hard boundary: "out of range" (borderline) and
//! "materially out of range" (abnormal) are different findings, and the
//! margins are asymmetric absolutes (`low * 0.8`, `high * 1.2`), not
//! percentages of the range width.

use serde::Serialize;

use crate::models::{CanonicalMetric, RangeStatus};
use crate::registry::canonical_unit;

/// Clinically defined normal interval for a metric in its canonical unit.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
    pub unit: &'static str,
}

/// Static lookup; absence of an entry is a valid state (no classification).
pub fn reference_range(metric: CanonicalMetric) -> Option<ReferenceRange> {
    let (low, high) = match metric {
        CanonicalMetric::Alt => (7.0, 56.0),
        CanonicalMetric::Ast => (10.0, 40.0),
        CanonicalMetric::Alp => (44.0, 147.0),
        CanonicalMetric::Ggt => (9.0, 48.0),
        CanonicalMetric::Bilirubin => (0.1, 1.2),
        CanonicalMetric::Albumin => (3.5, 5.0),
        CanonicalMetric::TotalProtein => (6.0, 8.3),
        CanonicalMetric::Platelets => (150.0, 400.0),
        CanonicalMetric::Creatinine => (0.7, 1.3),
        CanonicalMetric::Inr => (0.8, 1.1),
        CanonicalMetric::Sodium => (135.0, 145.0),
        CanonicalMetric::Potassium => (3.5, 5.0),
    };
    Some(ReferenceRange {
        low,
        high,
        unit: canonical_unit(metric),
    })
}

/// Classify a canonical-unit value against a range.
pub fn classify_against(range: &ReferenceRange, value: f64) -> RangeStatus {
    if value < range.low * 0.8 || value > range.high * 1.2 {
        RangeStatus::Abnormal
    } else if value < range.low || value > range.high {
        RangeStatus::Borderline
    } else {
        RangeStatus::Normal
    }
}

/// Classify a value for a metric. `None` when no range is defined: callers
/// decide what an unclassified value means, it is never silently "normal".
pub fn classify(metric: CanonicalMetric, value: f64) -> Option<RangeStatus> {
    reference_range(metric).map(|range| classify_against(&range, value))
}

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::series::{resolve_points, ResolvedPoint};
use super::AnalyticsError;
use crate::db::MetricStore;
use crate::ingest::parse_extraction;
use crate::models::{
    CanonicalMetric, EnzymeStatus, Modality, OverallTrend, RangeStatus, SyntheticStatus,
    Timeframe,
};
use crate::reference::classify;

/// A lab value pairs with an imaging event when it lies within this many
/// days of it, in either direction.
pub const CORRELATION_WINDOW_DAYS: i64 = 30;

/// The liver panel correlated against imaging: enzymes plus the synthetic
/// function proxies.
pub const CORRELATION_METRICS: [CanonicalMetric; 5] = [
    CanonicalMetric::Alt,
    CanonicalMetric::Ast,
    CanonicalMetric::Bilirubin,
    CanonicalMetric::Albumin,
    CanonicalMetric::Platelets,
];

/// One lab value matched to an imaging event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelatedLab {
    pub metric: CanonicalMetric,
    pub value: f64,
    pub unit: Option<String>,
    pub status: Option<RangeStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationSummary {
    pub liver_enzymes: EnzymeStatus,
    pub synthetic_function: SyntheticStatus,
    pub overall_trend: OverallTrend,
}

/// One imaging event joined with its temporally nearby lab values.
/// Computed on demand; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationRecord {
    pub imaging_date: NaiveDate,
    pub organ_size: f64,
    pub organ_unit: String,
    pub lab_values: Vec<CorrelatedLab>,
    pub correlation: CorrelationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationResponse {
    pub correlations: Vec<CorrelationRecord>,
    pub count: usize,
}

struct ImagingCandidate {
    date: NaiveDate,
    size: f64,
    unit: String,
}

/// Join the user's imaging events against the liver lab panel.
///
/// The five series lookups are independent, side-effect-free reads and run
/// as a concurrent fan-out; a failed lookup degrades to an empty series with
/// a logged warning instead of aborting the pass.
pub async fn correlate(
    store: Arc<dyn MetricStore>,
    user_id: Uuid,
    timeframe: Timeframe,
) -> Result<CorrelationResponse, AnalyticsError> {
    let candidates = imaging_candidates(store.as_ref(), user_id)?;
    if candidates.is_empty() {
        return Ok(CorrelationResponse {
            correlations: Vec::new(),
            count: 0,
        });
    }

    let handles: Vec<_> = CORRELATION_METRICS
        .iter()
        .map(|&metric| {
            let store = Arc::clone(&store);
            tokio::task::spawn_blocking(move || {
                (metric, resolve_points(store.as_ref(), user_id, metric))
            })
        })
        .collect();

    let mut series_by_metric: HashMap<CanonicalMetric, Vec<ResolvedPoint>> = HashMap::new();
    for joined in join_all(handles).await {
        match joined {
            Ok((metric, Ok(points))) => {
                series_by_metric.insert(metric, points);
            }
            Ok((metric, Err(error))) => {
                tracing::warn!(
                    metric = metric.as_str(),
                    %error,
                    "series lookup failed, degrading to empty series"
                );
                series_by_metric.insert(metric, Vec::new());
            }
            Err(error) => {
                tracing::warn!(%error, "series lookup task did not complete");
            }
        }
    }

    let mut correlations: Vec<CorrelationRecord> = candidates
        .into_iter()
        .filter_map(|candidate| correlate_one(&candidate, &series_by_metric))
        .collect();

    let cutoff = timeframe
        .days()
        .map(|days| Utc::now().date_naive() - chrono::Duration::days(days));
    if let Some(cutoff) = cutoff {
        correlations.retain(|record| record.imaging_date >= cutoff);
    }
    correlations.sort_by(|a, b| b.imaging_date.cmp(&a.imaging_date));

    let count = correlations.len();
    Ok(CorrelationResponse {
        correlations,
        count,
    })
}

/// Reports carrying imaging evidence with a measured liver. A report
/// qualifies through its type text or a non-empty imaging payload; without
/// a measured liver organ it contributes nothing.
fn imaging_candidates(
    store: &dyn MetricStore,
    user_id: Uuid,
) -> Result<Vec<ImagingCandidate>, AnalyticsError> {
    let mut candidates = Vec::new();
    for report in store.reports_for_user(user_id)? {
        let extraction = report.raw_extraction.as_ref().map(parse_extraction);
        let study = extraction.as_ref().and_then(|e| e.imaging.as_option());

        let type_modality = report.report_type.as_deref().and_then(Modality::detect);
        let has_imaging_content = study.map(|s| !s.is_empty()).unwrap_or(false);
        if !has_imaging_content && type_modality.is_none() {
            continue;
        }

        let Some(liver) = study.and_then(|s| s.liver()) else {
            continue;
        };
        let Some(size) = liver.size.as_ref() else {
            continue;
        };
        candidates.push(ImagingCandidate {
            date: report.effective_date(),
            size: size.value,
            unit: size.unit.clone(),
        });
    }
    Ok(candidates)
}

fn correlate_one(
    candidate: &ImagingCandidate,
    series_by_metric: &HashMap<CanonicalMetric, Vec<ResolvedPoint>>,
) -> Option<CorrelationRecord> {
    let mut lab_values = Vec::new();
    for metric in CORRELATION_METRICS {
        let points = series_by_metric
            .get(&metric)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let Some(point) = nearest_within(points, candidate.date, CORRELATION_WINDOW_DAYS) else {
            continue;
        };
        lab_values.push(CorrelatedLab {
            metric,
            value: point.value,
            unit: point.unit.clone(),
            status: classify(metric, point.value),
        });
    }

    // An imaging event with no lab value in the window yields no record.
    if lab_values.is_empty() {
        return None;
    }

    let abnormal = |metric: CanonicalMetric| {
        lab_values
            .iter()
            .any(|lab| lab.metric == metric && lab.status == Some(RangeStatus::Abnormal))
    };

    // Borderline enzymes do not count as elevated; only abnormal does.
    let liver_enzymes = if abnormal(CanonicalMetric::Alt) || abnormal(CanonicalMetric::Ast) {
        EnzymeStatus::Elevated
    } else {
        EnzymeStatus::Normal
    };
    let synthetic_function =
        if abnormal(CanonicalMetric::Albumin) || abnormal(CanonicalMetric::Platelets) {
            SyntheticStatus::Impaired
        } else {
            SyntheticStatus::Normal
        };
    let overall_trend = if liver_enzymes == EnzymeStatus::Elevated
        || synthetic_function == SyntheticStatus::Impaired
    {
        OverallTrend::Concerning
    } else {
        OverallTrend::Stable
    };

    Some(CorrelationRecord {
        imaging_date: candidate.date,
        organ_size: candidate.size,
        organ_unit: candidate.unit.clone(),
        lab_values,
        correlation: CorrelationSummary {
            liver_enzymes,
            synthetic_function,
            overall_trend,
        },
    })
}

/// The point with the smallest absolute day-difference from `target`, if
/// any lies within the window (inclusive). Equidistant points resolve to
/// the more recent one.
fn nearest_within(
    points: &[ResolvedPoint],
    target: NaiveDate,
    window_days: i64,
) -> Option<&ResolvedPoint> {
    let mut best: Option<(&ResolvedPoint, i64)> = None;
    for point in points {
        let diff = (point.date - target).num_days().abs();
        if diff > window_days {
            continue;
        }
        let better = match best {
            None => true,
            Some((current, current_diff)) => {
                diff < current_diff || (diff == current_diff && point.date > current.date)
            }
        };
        if better {
            best = Some((point, diff));
        }
    }
    best.map(|(point, _)| point)
}

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AnalyticsError;
use crate::db::MetricStore;
use crate::models::{CanonicalMetric, RangeStatus};
use crate::reference::classify;

/// One chartable measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Internal resolution carries upload time (for tie-breaks) and the
/// canonical unit (for latest-value views and correlation output).
#[derive(Debug, Clone)]
pub(crate) struct ResolvedPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub unit: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// All of a user's points for one metric, ascending by date (upload time as
/// secondary key, so same-dated points order deterministically).
///
/// One point per report: a report carrying the same analyte twice (fixed
/// panel plus sweep) contributes its first record in normalization order.
pub(crate) fn resolve_points(
    store: &dyn MetricStore,
    user_id: Uuid,
    metric: CanonicalMetric,
) -> Result<Vec<ResolvedPoint>, AnalyticsError> {
    let mut points = Vec::new();
    for report in store.reports_for_user(user_id)? {
        let records = store.metrics_for_report(report.id)?;
        let Some(record) = records
            .iter()
            .find(|r| r.canonical == Some(metric) && r.value.is_some())
        else {
            continue;
        };
        points.push(ResolvedPoint {
            date: report.effective_date(),
            value: record.value.unwrap_or_default(),
            unit: record.unit.clone(),
            created_at: report.created_at,
        });
    }
    points.sort_by(|a, b| (a.date, a.created_at).cmp(&(b.date, b.created_at)));
    Ok(points)
}

/// Ordered series for charting, ascending by date.
pub fn resolve_series(
    store: &dyn MetricStore,
    user_id: Uuid,
    metric: CanonicalMetric,
) -> Result<Vec<SeriesPoint>, AnalyticsError> {
    Ok(resolve_points(store, user_id, metric)?
        .into_iter()
        .map(|p| SeriesPoint {
            date: p.date,
            value: p.value,
        })
        .collect())
}

pub(crate) fn latest_resolved(
    store: &dyn MetricStore,
    user_id: Uuid,
    metric: CanonicalMetric,
) -> Result<Option<ResolvedPoint>, AnalyticsError> {
    // Points are sorted by (date, created_at), so the most recent upload
    // wins among same-dated reports.
    Ok(resolve_points(store, user_id, metric)?.pop())
}

/// The point with the maximum date; among same-dated points the one from
/// the most recently uploaded report wins.
pub fn latest_point(
    store: &dyn MetricStore,
    user_id: Uuid,
    metric: CanonicalMetric,
) -> Result<Option<SeriesPoint>, AnalyticsError> {
    Ok(latest_resolved(store, user_id, metric)?.map(|p| SeriesPoint {
        date: p.date,
        value: p.value,
    }))
}

/// Chart payload for UI collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries {
    pub metric: String,
    pub data: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub value: f64,
}

pub fn chart_series(
    store: &dyn MetricStore,
    user_id: Uuid,
    metric: CanonicalMetric,
) -> Result<ChartSeries, AnalyticsError> {
    let data = resolve_series(store, user_id, metric)?
        .into_iter()
        .map(|p| ChartPoint {
            date: p.date.format("%Y-%m-%d").to_string(),
            value: p.value,
        })
        .collect();
    Ok(ChartSeries {
        metric: metric.label().to_string(),
        data,
    })
}

/// Latest value of one metric with its classification, for dashboard tiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestValue {
    pub value: f64,
    pub unit: Option<String>,
    pub classification: Option<RangeStatus>,
}

/// Latest-values map for a set of metrics. Metrics never recorded for the
/// user are simply absent.
pub fn latest_values(
    store: &dyn MetricStore,
    user_id: Uuid,
    metrics: &[CanonicalMetric],
) -> Result<HashMap<CanonicalMetric, LatestValue>, AnalyticsError> {
    let mut out = HashMap::new();
    for &metric in metrics {
        if let Some(point) = latest_resolved(store, user_id, metric)? {
            out.insert(
                metric,
                LatestValue {
                    value: point.value,
                    unit: point.unit,
                    classification: classify(metric, point.value),
                },
            );
        }
    }
    Ok(out)
}

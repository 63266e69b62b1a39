use chrono::NaiveDate;
use serde_json::Value;

use crate::models::{ImagingOrgan, ImagingStudy, OrganSize};

/// One optional section of the extraction payload. Consumers pattern-match
/// instead of probing for field existence.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Present(T),
    Absent,
}

impl<T> Section<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Section::Present(value) => Some(value),
            Section::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Section::Present(_))
    }
}

/// One measurement under the fixed `metrics` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMeasurement {
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub text: Option<String>,
}

/// One entry of the open-ended `metricsAll` sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnalyte {
    pub name: String,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub text: Option<String>,
}

/// Typed view of a report's raw extraction payload.
#[derive(Debug, Clone)]
pub struct RawExtraction {
    pub report_type: Option<String>,
    pub report_date: Option<NaiveDate>,
    /// Named panel entries, in deterministic (sorted-key) order. A `None`
    /// measurement means the extractor reported the metric as null.
    pub metrics: Section<Vec<(String, Option<RawMeasurement>)>>,
    pub metrics_all: Section<Vec<RawAnalyte>>,
    pub imaging: Section<ImagingStudy>,
}

impl RawExtraction {
    fn empty() -> Self {
        Self {
            report_type: None,
            report_date: None,
            metrics: Section::Absent,
            metrics_all: Section::Absent,
            imaging: Section::Absent,
        }
    }
}

/// Parse a raw extraction payload. Never fails: a missing or malformed
/// section is treated as absent, a malformed entry is skipped.
pub fn parse_extraction(raw: &Value) -> RawExtraction {
    let Some(obj) = raw.as_object() else {
        if !raw.is_null() {
            tracing::warn!("extraction payload is not an object, treating as empty");
        }
        return RawExtraction::empty();
    };

    let field = |name: &str, alias: &str| obj.get(name).or_else(|| obj.get(alias));

    RawExtraction {
        report_type: field("reportType", "report_type")
            .and_then(Value::as_str)
            .map(str::to_string),
        report_date: field("reportDate", "report_date")
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
        metrics: parse_metrics(obj.get("metrics")),
        metrics_all: parse_metrics_all(field("metricsAll", "metrics_all")),
        imaging: parse_imaging(obj.get("imaging")),
    }
}

fn parse_metrics(section: Option<&Value>) -> Section<Vec<(String, Option<RawMeasurement>)>> {
    let Some(value) = section else {
        return Section::Absent;
    };
    let Some(map) = value.as_object() else {
        if !value.is_null() {
            tracing::warn!("metrics section is not an object, treating as absent");
        }
        return Section::Absent;
    };

    let entries = map
        .iter()
        .map(|(name, entry)| (name.clone(), parse_measurement(entry)))
        .collect();
    Section::Present(entries)
}

fn parse_measurement(entry: &Value) -> Option<RawMeasurement> {
    match entry {
        Value::Null => None,
        Value::Object(fields) => Some(RawMeasurement {
            value: fields.get("value").and_then(numeric),
            unit: fields
                .get("unit")
                .and_then(Value::as_str)
                .map(str::to_string),
            text: fields
                .get("text")
                .or_else(|| fields.get("textValue"))
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        // Extractors occasionally flatten a measurement to a bare scalar.
        Value::Number(_) => Some(RawMeasurement {
            value: numeric(entry),
            ..Default::default()
        }),
        Value::String(s) => Some(RawMeasurement {
            text: Some(s.clone()),
            ..Default::default()
        }),
        _ => {
            tracing::warn!("unparseable metric entry, skipping");
            None
        }
    }
}

fn parse_metrics_all(section: Option<&Value>) -> Section<Vec<RawAnalyte>> {
    let Some(value) = section else {
        return Section::Absent;
    };
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            tracing::warn!("metricsAll section is not an array, treating as absent");
        }
        return Section::Absent;
    };

    // Skip entries that fail to parse, keep the rest.
    let analytes = items
        .iter()
        .filter_map(|item| {
            let fields = item.as_object()?;
            let name = fields.get("name")?.as_str()?.to_string();
            Some(RawAnalyte {
                name,
                value: fields.get("value").and_then(numeric),
                unit: fields
                    .get("unit")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                category: fields
                    .get("category")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                text: fields
                    .get("text")
                    .or_else(|| fields.get("textValue"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect();
    Section::Present(analytes)
}

fn parse_imaging(section: Option<&Value>) -> Section<ImagingStudy> {
    let Some(value) = section else {
        return Section::Absent;
    };
    let Some(fields) = value.as_object() else {
        if !value.is_null() {
            tracing::warn!("imaging section is not an object, treating as absent");
        }
        return Section::Absent;
    };

    let organs = fields
        .get("organs")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(parse_organ)
                .collect::<Vec<ImagingOrgan>>()
        })
        .unwrap_or_default();

    let findings = fields
        .get("findings")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<String>>()
        })
        .unwrap_or_default();

    Section::Present(ImagingStudy {
        modality: fields
            .get("modality")
            .and_then(Value::as_str)
            .map(str::to_string),
        organs,
        findings,
    })
}

fn parse_organ(entry: &Value) -> Option<ImagingOrgan> {
    let fields = entry.as_object()?;
    let name = fields.get("name")?.as_str()?.to_string();
    let size = fields.get("size").and_then(|size| {
        let size = size.as_object()?;
        Some(OrganSize {
            value: size.get("value").and_then(numeric)?,
            unit: size.get("unit").and_then(Value::as_str)?.to_string(),
        })
    });
    Some(ImagingOrgan {
        name,
        size,
        notes: fields
            .get("notes")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Numbers, plus numeric strings ("42.5") which extractors emit now and then.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

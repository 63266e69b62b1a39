use crate::models::{CanonicalMetric, ValidationStatus};

/// Outcome of normalizing one reported measurement onto its metric's
/// canonical scale. Carries the provenance the metric record persists.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub value: f64,
    pub unit: String,
    /// True only when the value was actually rescaled.
    pub applied: bool,
    pub factor: Option<f64>,
    pub rule: Option<String>,
    pub status: ValidationStatus,
}

/// Canonical unit per metric. INR is a dimensionless ratio.
pub fn canonical_unit(metric: CanonicalMetric) -> &'static str {
    match metric {
        CanonicalMetric::Alt
        | CanonicalMetric::Ast
        | CanonicalMetric::Alp
        | CanonicalMetric::Ggt => "U/L",
        CanonicalMetric::Bilirubin | CanonicalMetric::Creatinine => "mg/dL",
        CanonicalMetric::Albumin | CanonicalMetric::TotalProtein => "g/dL",
        CanonicalMetric::Platelets => "10^9/L",
        CanonicalMetric::Inr => "ratio",
        CanonicalMetric::Sodium | CanonicalMetric::Potassium => "mmol/L",
    }
}

// Accepted unit spellings per metric, keyed by normalized form. A factor of
// 1.0 with no rule is an equivalent scale (no conversion applied); anything
// else rescales the value and records how.
const BILIRUBIN_UMOL_PER_MGDL: f64 = 17.104;
const CREATININE_UMOL_PER_MGDL: f64 = 88.4;

fn accepted_units(metric: CanonicalMetric) -> &'static [(&'static str, f64, Option<&'static str>)] {
    match metric {
        CanonicalMetric::Alt
        | CanonicalMetric::Ast
        | CanonicalMetric::Alp
        | CanonicalMetric::Ggt => &[("u/l", 1.0, None), ("iu/l", 1.0, None)],
        CanonicalMetric::Bilirubin => &[
            ("mg/dl", 1.0, None),
            (
                "umol/l",
                1.0 / BILIRUBIN_UMOL_PER_MGDL,
                Some("umol/L -> mg/dL (/ 17.104)"),
            ),
        ],
        CanonicalMetric::Creatinine => &[
            ("mg/dl", 1.0, None),
            (
                "umol/l",
                1.0 / CREATININE_UMOL_PER_MGDL,
                Some("umol/L -> mg/dL (/ 88.4)"),
            ),
        ],
        CanonicalMetric::Albumin | CanonicalMetric::TotalProtein => &[
            ("g/dl", 1.0, None),
            ("g/l", 0.1, Some("g/L -> g/dL (x 0.1)")),
        ],
        CanonicalMetric::Platelets => &[
            ("10^9/l", 1.0, None),
            ("x10^9/l", 1.0, None),
            ("giga/l", 1.0, None),
            ("10^3/ul", 1.0, None),
            ("x10^3/ul", 1.0, None),
            ("k/ul", 1.0, None),
            ("/ul", 0.001, Some("/uL -> 10^9/L (x 0.001)")),
            ("cells/ul", 0.001, Some("/uL -> 10^9/L (x 0.001)")),
        ],
        CanonicalMetric::Inr => &[("ratio", 1.0, None), ("", 1.0, None)],
        CanonicalMetric::Sodium | CanonicalMetric::Potassium => {
            &[("mmol/l", 1.0, None), ("meq/l", 1.0, None)]
        }
    }
}

/// Collapse a reported unit to its comparison key: "×10³/μL", "x10^3/uL" and
/// "X 10^3 / UL" all become "x10^3/ul".
fn normalize_unit(unit: &str) -> String {
    unit.to_lowercase()
        .replace(['µ', 'μ'], "u")
        .replace('×', "x")
        .replace('³', "^3")
        .replace('⁹', "^9")
        .replace('*', "^")
        .replace(char::is_whitespace, "")
}

/// Normalize a reported measurement onto the metric's canonical scale.
///
/// Unrecognized units pass the value through unconverted and flag the record
/// `unverified_unit`; ingestion never fails on unit ambiguity.
pub fn convert(metric: CanonicalMetric, value: f64, unit: &str) -> Conversion {
    let key = normalize_unit(unit);
    let canonical = canonical_unit(metric);

    if key == normalize_unit(canonical) {
        return Conversion {
            value,
            unit: canonical.to_string(),
            applied: false,
            factor: Some(1.0),
            rule: None,
            status: ValidationStatus::Verified,
        };
    }

    if let Some((_, factor, rule)) = accepted_units(metric)
        .iter()
        .find(|(accepted, _, _)| *accepted == key)
    {
        if let Some(rule) = rule {
            return Conversion {
                value: value * factor,
                unit: canonical.to_string(),
                applied: true,
                factor: Some(*factor),
                rule: Some((*rule).to_string()),
                status: ValidationStatus::Verified,
            };
        }
        // Equivalent scale under a different spelling: no conversion.
        return Conversion {
            value,
            unit: canonical.to_string(),
            applied: false,
            factor: Some(1.0),
            rule: None,
            status: ValidationStatus::Verified,
        };
    }

    Conversion {
        value,
        unit: unit.to_string(),
        applied: false,
        factor: None,
        rule: None,
        status: ValidationStatus::UnverifiedUnit,
    }
}

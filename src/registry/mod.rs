//! Canonical metric vocabulary: maps the noisy analyte names extraction
//! models report ("Serum Creatinine", "SCr", "γ-GT") onto the fixed metric
//! set, and converts reported units onto each metric's canonical scale.

mod units;

pub use units::*;

use std::sync::OnceLock;

use regex::Regex;

use crate::models::CanonicalMetric;

/// Documented synonyms, keyed by normalized form (lowercase, alphanumerics
/// only, γ spelled out). Matching is exact on the normalized key: substring
/// matching would let "alt" fire inside "alkaline phosphatase".
const SYNONYMS: &[(&str, CanonicalMetric)] = &[
    ("alt", CanonicalMetric::Alt),
    ("alanineaminotransferase", CanonicalMetric::Alt),
    ("alaninetransaminase", CanonicalMetric::Alt),
    ("sgpt", CanonicalMetric::Alt),
    ("ast", CanonicalMetric::Ast),
    ("aspartateaminotransferase", CanonicalMetric::Ast),
    ("aspartatetransaminase", CanonicalMetric::Ast),
    ("sgot", CanonicalMetric::Ast),
    ("alp", CanonicalMetric::Alp),
    ("alkphos", CanonicalMetric::Alp),
    ("alkalinephosphatase", CanonicalMetric::Alp),
    ("ggt", CanonicalMetric::Ggt),
    ("ggtp", CanonicalMetric::Ggt),
    ("gammagt", CanonicalMetric::Ggt),
    ("gammaglutamyltransferase", CanonicalMetric::Ggt),
    ("gammaglutamyltranspeptidase", CanonicalMetric::Ggt),
    ("bilirubin", CanonicalMetric::Bilirubin),
    ("totalbilirubin", CanonicalMetric::Bilirubin),
    ("bilirubintotal", CanonicalMetric::Bilirubin),
    ("tbil", CanonicalMetric::Bilirubin),
    ("bili", CanonicalMetric::Bilirubin),
    ("albumin", CanonicalMetric::Albumin),
    ("serumalbumin", CanonicalMetric::Albumin),
    ("alb", CanonicalMetric::Albumin),
    ("totalprotein", CanonicalMetric::TotalProtein),
    ("serumtotalprotein", CanonicalMetric::TotalProtein),
    ("proteintotal", CanonicalMetric::TotalProtein),
    ("platelets", CanonicalMetric::Platelets),
    ("plateletcount", CanonicalMetric::Platelets),
    ("plt", CanonicalMetric::Platelets),
    ("thrombocytes", CanonicalMetric::Platelets),
    ("creatinine", CanonicalMetric::Creatinine),
    ("serumcreatinine", CanonicalMetric::Creatinine),
    ("scr", CanonicalMetric::Creatinine),
    ("creat", CanonicalMetric::Creatinine),
    ("inr", CanonicalMetric::Inr),
    ("ptinr", CanonicalMetric::Inr),
    ("internationalnormalizedratio", CanonicalMetric::Inr),
    ("sodium", CanonicalMetric::Sodium),
    ("serumsodium", CanonicalMetric::Sodium),
    ("na", CanonicalMetric::Sodium),
    ("potassium", CanonicalMetric::Potassium),
    ("serumpotassium", CanonicalMetric::Potassium),
    ("k", CanonicalMetric::Potassium),
];

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static regex"))
}

/// Collapse an analyte name to its comparison key: "Serum Creatinine" and
/// "serum-creatinine" both become "serumcreatinine".
fn normalize_name(name: &str) -> String {
    let lower = name.to_lowercase().replace(['γ', 'ɣ'], "gamma");
    non_alphanumeric().replace_all(&lower, "").into_owned()
}

/// Resolve a reported analyte name to its vocabulary entry. Unmatched names
/// return `None` and flow through the pipeline as uncategorized analytes.
pub fn resolve_name(name: &str) -> Option<CanonicalMetric> {
    let key = normalize_name(name);
    if key.is_empty() {
        return None;
    }
    SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, metric)| *metric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_documented_synonyms() {
        for (name, expected) in [
            ("Serum Creatinine", CanonicalMetric::Creatinine),
            ("SCr", CanonicalMetric::Creatinine),
            ("Creat", CanonicalMetric::Creatinine),
            ("PT INR", CanonicalMetric::Inr),
            ("Alk Phos", CanonicalMetric::Alp),
            ("Gamma GT", CanonicalMetric::Ggt),
            ("γ-GT", CanonicalMetric::Ggt),
            ("SGPT", CanonicalMetric::Alt),
            ("SGOT", CanonicalMetric::Ast),
            ("Total Bilirubin", CanonicalMetric::Bilirubin),
            ("Platelet Count", CanonicalMetric::Platelets),
        ] {
            assert_eq!(resolve_name(name), Some(expected), "name: {name}");
        }
    }

    #[test]
    fn resolution_is_case_insensitive() {
        assert_eq!(resolve_name("albumin"), Some(CanonicalMetric::Albumin));
        assert_eq!(resolve_name("ALBUMIN"), Some(CanonicalMetric::Albumin));
        assert_eq!(resolve_name("AlBuMiN"), Some(CanonicalMetric::Albumin));
    }

    #[test]
    fn punctuation_and_spacing_ignored() {
        assert_eq!(resolve_name("alanine amino-transferase"), Some(CanonicalMetric::Alt));
        assert_eq!(resolve_name("platelet  count"), Some(CanonicalMetric::Platelets));
    }

    #[test]
    fn no_substring_false_positives() {
        // Contains "alt" but is its own analyte
        assert_eq!(resolve_name("Alkaline Phosphatase"), Some(CanonicalMetric::Alp));
        assert_eq!(resolve_name("maltase"), None);
    }

    #[test]
    fn unknown_names_stay_unresolved() {
        assert_eq!(resolve_name("Glucose"), None);
        assert_eq!(resolve_name("HbA1c"), None);
        assert_eq!(resolve_name(""), None);
        assert_eq!(resolve_name("--"), None);
    }
}

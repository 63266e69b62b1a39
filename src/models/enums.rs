use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(CanonicalMetric {
    Alt => "alt",
    Ast => "ast",
    Alp => "alp",
    Ggt => "ggt",
    Bilirubin => "bilirubin",
    Albumin => "albumin",
    TotalProtein => "total_protein",
    Platelets => "platelets",
    Creatinine => "creatinine",
    Inr => "inr",
    Sodium => "sodium",
    Potassium => "potassium",
});

impl CanonicalMetric {
    pub const ALL: [CanonicalMetric; 12] = [
        Self::Alt,
        Self::Ast,
        Self::Alp,
        Self::Ggt,
        Self::Bilirubin,
        Self::Albumin,
        Self::TotalProtein,
        Self::Platelets,
        Self::Creatinine,
        Self::Inr,
        Self::Sodium,
        Self::Potassium,
    ];

    /// Human-facing label used in chart payloads.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Alt => "ALT",
            Self::Ast => "AST",
            Self::Alp => "ALP",
            Self::Ggt => "GGT",
            Self::Bilirubin => "Bilirubin",
            Self::Albumin => "Albumin",
            Self::TotalProtein => "Total Protein",
            Self::Platelets => "Platelets",
            Self::Creatinine => "Creatinine",
            Self::Inr => "INR",
            Self::Sodium => "Sodium",
            Self::Potassium => "Potassium",
        }
    }

    pub fn category(&self) -> MetricCategory {
        match self {
            Self::Alt | Self::Ast | Self::Alp | Self::Ggt | Self::Bilirubin => {
                MetricCategory::Liver
            }
            Self::Albumin | Self::TotalProtein => MetricCategory::Protein,
            Self::Platelets => MetricCategory::Hematology,
            Self::Creatinine => MetricCategory::Kidney,
            Self::Inr => MetricCategory::Coagulation,
            Self::Sodium | Self::Potassium => MetricCategory::Electrolyte,
        }
    }
}

str_enum!(MetricCategory {
    Liver => "liver",
    Kidney => "kidney",
    Hematology => "hematology",
    Electrolyte => "electrolyte",
    Protein => "protein",
    Coagulation => "coagulation",
    Other => "other",
});

str_enum!(ValidationStatus {
    Verified => "verified",
    UnverifiedUnit => "unverified_unit",
});

str_enum!(RangeStatus {
    Normal => "normal",
    Borderline => "borderline",
    Abnormal => "abnormal",
});

str_enum!(EnzymeStatus {
    Elevated => "elevated",
    Normal => "normal",
});

str_enum!(SyntheticStatus {
    Impaired => "impaired",
    Normal => "normal",
});

str_enum!(OverallTrend {
    Concerning => "concerning",
    Stable => "stable",
});

str_enum!(Timeframe {
    ThreeMonths => "3m",
    SixMonths => "6m",
    OneYear => "1y",
    All => "all",
});

impl Timeframe {
    /// Lookback horizon in days; `None` means unbounded.
    pub fn days(&self) -> Option<i64> {
        match self {
            Self::ThreeMonths => Some(90),
            Self::SixMonths => Some(180),
            Self::OneYear => Some(365),
            Self::All => None,
        }
    }
}

str_enum!(Modality {
    Ultrasound => "ultrasound",
    Ct => "ct",
    Mri => "mri",
});

impl Modality {
    /// Detect a modality mention in free text (report types come through as
    /// e.g. "Abdominal Ultrasound" or "CT abdomen/pelvis").
    pub fn detect(text: &str) -> Option<Modality> {
        let lower = text.to_lowercase();
        if lower.contains("ultrasound") {
            Some(Self::Ultrasound)
        } else if lower.contains("mri") {
            Some(Self::Mri)
        } else if lower.contains("ct") {
            Some(Self::Ct)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn canonical_metric_round_trip() {
        for metric in CanonicalMetric::ALL {
            assert_eq!(CanonicalMetric::from_str(metric.as_str()).unwrap(), metric);
        }
    }

    #[test]
    fn range_status_round_trip() {
        for (variant, s) in [
            (RangeStatus::Normal, "normal"),
            (RangeStatus::Borderline, "borderline"),
            (RangeStatus::Abnormal, "abnormal"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(RangeStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn timeframe_round_trip() {
        for (variant, s) in [
            (Timeframe::ThreeMonths, "3m"),
            (Timeframe::SixMonths, "6m"),
            (Timeframe::OneYear, "1y"),
            (Timeframe::All, "all"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Timeframe::from_str(s).unwrap(), variant);
        }
        assert_eq!(Timeframe::SixMonths.days(), Some(180));
        assert_eq!(Timeframe::All.days(), None);
    }

    #[test]
    fn modality_detection() {
        assert_eq!(
            Modality::detect("Abdominal Ultrasound"),
            Some(Modality::Ultrasound)
        );
        assert_eq!(Modality::detect("CT abdomen/pelvis"), Some(Modality::Ct));
        assert_eq!(Modality::detect("MRI liver protocol"), Some(Modality::Mri));
        assert_eq!(Modality::detect("Blood panel"), None);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(CanonicalMetric::from_str("glucose").is_err());
        assert!(RangeStatus::from_str("unknown").is_err());
        assert!(Timeframe::from_str("2w").is_err());
    }

    #[test]
    fn category_assignment() {
        assert_eq!(CanonicalMetric::Alt.category(), MetricCategory::Liver);
        assert_eq!(CanonicalMetric::Platelets.category(), MetricCategory::Hematology);
        assert_eq!(CanonicalMetric::Inr.category(), MetricCategory::Coagulation);
        assert_eq!(CanonicalMetric::Sodium.category(), MetricCategory::Electrolyte);
    }
}

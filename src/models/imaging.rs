use serde::{Deserialize, Serialize};

/// Measured organ dimension, unit as reported (typically cm).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganSize {
    pub value: f64,
    pub unit: String,
}

/// One organ entry from an imaging report's extraction payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagingOrgan {
    pub name: String,
    pub size: Option<OrganSize>,
    pub notes: Option<String>,
}

/// Imaging content of a report, derived from its raw extraction at read
/// time. Never persisted separately.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagingStudy {
    pub modality: Option<String>,
    pub organs: Vec<ImagingOrgan>,
    pub findings: Vec<String>,
}

impl ImagingStudy {
    /// True when parsing yielded neither a modality, an organ, nor a finding.
    pub fn is_empty(&self) -> bool {
        self.modality.is_none() && self.organs.is_empty() && self.findings.is_empty()
    }

    /// The liver entry with a measured size, if any.
    pub fn liver(&self) -> Option<&ImagingOrgan> {
        self.organs
            .iter()
            .find(|o| o.name.to_lowercase().contains("liver") && o.size.is_some())
    }
}

//! Pest, disease and weed monitoring models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Polygon;

/// Category of an occurrence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InfestationKind {
    Pest,
    Disease,
    Weed,
}

impl InfestationKind {
    /// Parse free text, accepting Portuguese labels. Unknown text is a pest.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "disease" | "doenca" | "doença" | "doencas" | "doenças" => InfestationKind::Disease,
            "weed" | "daninha" | "planta_daninha" | "planta daninha" | "plantas daninhas"
            | "invasora" => InfestationKind::Weed,
            _ => InfestationKind::Pest,
        }
    }
}

impl std::fmt::Display for InfestationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfestationKind::Pest => write!(f, "Praga"),
            InfestationKind::Disease => write!(f, "Doença"),
            InfestationKind::Weed => write!(f, "Planta daninha"),
        }
    }
}

/// A single occurrence recorded at a sampling point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Infestation {
    pub id: String,
    pub kind: InfestationKind,
    pub name: String,
    /// Canopy third where it was observed (lower, middle, upper)
    pub third: String,
    pub quantity: Option<f64>,
    /// Normalized 0-100 score
    pub severity: f64,
    pub note: Option<String>,
    pub image: Option<String>,
}

/// A georeferenced sampling point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoringPoint {
    pub id: String,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub infestations: Vec<Infestation>,
}

impl MonitoringPoint {
    pub fn has_infestation(&self) -> bool {
        !self.infestations.is_empty()
    }
}

/// A field (talhão) with its sampling points
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    pub id: String,
    pub name: String,
    pub crop: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub area_ha: Decimal,
    pub polygon: Polygon,
    pub points: Vec<MonitoringPoint>,
}

/// Pest and disease monitoring report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoringReport {
    pub id: String,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub farm: String,
    pub technician: String,
    /// Phenology reference such as "V4" or "35 DAE"
    pub crop_stage: Option<String>,
    pub talhao: Field,
    pub notes: Option<String>,
}

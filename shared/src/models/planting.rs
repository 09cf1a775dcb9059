//! Planting quality models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Field;

/// Stand count taken at one place in the field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantingSample {
    pub id: String,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub plants_per_meter: f64,
    pub doubles_pct: f64,
    pub failures_pct: f64,
    pub spacing_cv_pct: Option<f64>,
    pub depth_cm: Option<f64>,
}

/// Averages over all samples
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantingSummary {
    pub samples: usize,
    pub avg_plants_per_meter: f64,
    pub population_per_ha: f64,
    pub avg_doubles_pct: f64,
    pub avg_failures_pct: f64,
    pub avg_spacing_cv_pct: Option<f64>,
}

/// Planting quality report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantingReport {
    pub id: String,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub farm: String,
    pub talhao: Field,
    pub variety: Option<String>,
    pub row_spacing_m: f64,
    pub seeds_per_meter_target: Option<f64>,
    pub samples: Vec<PlantingSample>,
    pub summary: PlantingSummary,
}

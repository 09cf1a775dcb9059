//! Side-by-side trial comparison models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Field;

/// One arm of a trial
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Treatment {
    pub id: String,
    pub name: String,
    pub product: Option<String>,
    pub description: Option<String>,
}

/// An attribute measured on every treatment.
///
/// `values` is aligned with the report's treatments; `None` means not measured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparedAttribute {
    pub name: String,
    pub unit: Option<String>,
    pub higher_is_better: bool,
    pub values: Vec<Option<f64>>,
    /// Id of the best treatment for this attribute
    pub best_treatment: Option<String>,
}

/// Side-by-side trial report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SideBySideReport {
    pub id: String,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub farm: String,
    pub talhao: Field,
    pub treatments: Vec<Treatment>,
    pub attributes: Vec<ComparedAttribute>,
}

//! Technical visit models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Field;

/// Visit header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitMeta {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub technician: String,
    pub crop_stage: Option<String>,
}

/// Farm (propriedade) visited
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub name: String,
    pub owner: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Photo {
    pub url: String,
    pub caption: Option<String>,
}

/// Technical visit report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitReport {
    pub id: String,
    pub meta: VisitMeta,
    pub propriedade: Property,
    pub talhao: Field,
    pub observations: Vec<String>,
    pub recommendations: Vec<String>,
    pub photos: Vec<Photo>,
}

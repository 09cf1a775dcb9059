//! Report sum type

use serde::{Deserialize, Serialize};

use super::{Field, MonitoringReport, PlantingReport, SideBySideReport, VisitReport};

/// Report kinds known to the platform
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Monitoring,
    Planting,
    Visit,
    SideBySide,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Monitoring => "monitoring",
            ReportKind::Planting => "planting",
            ReportKind::Visit => "visit",
            ReportKind::SideBySide => "side_by_side",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            ReportKind::Monitoring => "Relatório de Monitoramento",
            ReportKind::Planting => "Relatório de Qualidade de Plantio",
            ReportKind::Visit => "Relatório de Visita Técnica",
            ReportKind::SideBySide => "Relatório Lado a Lado",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "monitoring" | "monitoramento" | "pest_monitoring" | "mip" => Ok(ReportKind::Monitoring),
            "planting" | "plantio" | "planting_quality" | "qualidade_plantio"
            | "qualidade_de_plantio" => Ok(ReportKind::Planting),
            "visit" | "visita" | "visita_tecnica" | "technical_visit" => Ok(ReportKind::Visit),
            "side_by_side" | "sidebyside" | "lado_a_lado" | "comparativo" => {
                Ok(ReportKind::SideBySide)
            }
            other => Err(format!("Unknown report kind: {}", other)),
        }
    }
}

/// A normalized report, tagged by kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Report {
    Monitoring(MonitoringReport),
    Planting(PlantingReport),
    Visit(VisitReport),
    SideBySide(SideBySideReport),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Monitoring(_) => ReportKind::Monitoring,
            Report::Planting(_) => ReportKind::Planting,
            Report::Visit(_) => ReportKind::Visit,
            Report::SideBySide(_) => ReportKind::SideBySide,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Report::Monitoring(r) => &r.id,
            Report::Planting(r) => &r.id,
            Report::Visit(r) => &r.id,
            Report::SideBySide(r) => &r.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Report::Monitoring(r) => &r.title,
            Report::Planting(r) => &r.title,
            Report::Visit(r) => &r.meta.title,
            Report::SideBySide(r) => &r.title,
        }
    }

    /// The field the report is about
    pub fn talhao(&self) -> &Field {
        match self {
            Report::Monitoring(r) => &r.talhao,
            Report::Planting(r) => &r.talhao,
            Report::Visit(r) => &r.talhao,
            Report::SideBySide(r) => &r.talhao,
        }
    }
}

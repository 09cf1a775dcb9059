//! Recommendation engine
//!
//! Groups every occurrence in a field by organism, scores each organism by
//! its mean severity and attaches product guidance from the knowledge table.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::knowledge::{organism_key, KnowledgeBase};
use crate::models::{InfestationKind, MonitoringPoint};
use crate::validation::{coerce_finite, mean};

/// Label used for occurrences recorded without an organism name
pub const UNNAMED_ORGANISM: &str = "—";

/// Urgency of a recommendation.
///
/// Variant order is the display order: most urgent first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationLevel {
    ImmediateAction,
    HighRisk,
    Monitor,
    Preventive,
}

impl RecommendationLevel {
    /// Level for an unrounded mean severity
    pub fn from_severity(mean_severity: f64) -> Self {
        let severity = coerce_finite(mean_severity);
        if severity >= 40.0 {
            RecommendationLevel::ImmediateAction
        } else if severity >= 25.0 {
            RecommendationLevel::HighRisk
        } else if severity >= 10.0 {
            RecommendationLevel::Monitor
        } else {
            RecommendationLevel::Preventive
        }
    }
}

impl std::fmt::Display for RecommendationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationLevel::ImmediateAction => write!(f, "Ação imediata"),
            RecommendationLevel::HighRisk => write!(f, "Alto risco"),
            RecommendationLevel::Monitor => write!(f, "Monitorar"),
            RecommendationLevel::Preventive => write!(f, "Preventivo"),
        }
    }
}

/// Intervention suggested for one organism
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub level: RecommendationLevel,
    pub organism: String,
    pub kind: InfestationKind,
    pub product: String,
    pub dose: String,
    pub action_text: String,
    /// Distinct point labels where the organism was recorded
    pub points: Vec<String>,
    pub severity: u32,
}

struct OrganismGroup {
    organism: String,
    kind: InfestationKind,
    severities: Vec<f64>,
    labels: Vec<String>,
}

/// Builds recommendations from sampling points using an injected knowledge table
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    knowledge: Arc<KnowledgeBase>,
}

impl RecommendationEngine {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// Engine backed by the built-in table
    pub fn with_builtin() -> Self {
        Self::new(Arc::new(KnowledgeBase::builtin()))
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// One recommendation per distinct organism (case-insensitive), most urgent first
    pub fn recommend(&self, points: &[MonitoringPoint]) -> Vec<Recommendation> {
        let mut groups: Vec<OrganismGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for point in points {
            for infestation in &point.infestations {
                let name = if infestation.name.trim().is_empty() {
                    UNNAMED_ORGANISM
                } else {
                    infestation.name.as_str()
                };
                let position = *index.entry(organism_key(name)).or_insert_with(|| {
                    groups.push(OrganismGroup {
                        organism: name.to_string(),
                        kind: infestation.kind,
                        severities: Vec::new(),
                        labels: Vec::new(),
                    });
                    groups.len() - 1
                });

                let group = &mut groups[position];
                group.severities.push(coerce_finite(infestation.severity));
                if !group.labels.contains(&point.label) {
                    group.labels.push(point.label.clone());
                }
            }
        }

        let mut recommendations: Vec<Recommendation> = groups
            .into_iter()
            .map(|group| self.build(group))
            .collect();

        // Stable: equal levels keep grouping order
        recommendations.sort_by_key(|r| r.level);
        recommendations
    }

    fn build(&self, group: OrganismGroup) -> Recommendation {
        let mean_severity = mean(&group.severities).unwrap_or(0.0);
        let entry = self
            .knowledge
            .lookup(&group.organism)
            .cloned()
            .unwrap_or_else(|| KnowledgeBase::fallback(group.kind));

        Recommendation {
            level: RecommendationLevel::from_severity(mean_severity),
            organism: group.organism,
            kind: group.kind,
            product: entry.product,
            dose: entry.dose,
            action_text: entry.action,
            points: group.labels,
            severity: mean_severity.round().max(0.0) as u32,
        }
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::with_builtin()
    }
}

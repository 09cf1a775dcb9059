//! Monitoring metrics: severity tiers, field roll-ups and per-point summaries
//!
//! Every function here is total. Empty inputs produce zeroed metrics and
//! denominators are guarded instead of failing.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{InfestationKind, MonitoringPoint};
use crate::validation::{coerce_finite, rounded_mean, rounded_percent};

/// Number of organisms kept in the field ranking
pub const TOP_ORGANISMS: usize = 5;

/// Risk tier derived from a severity score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityTier {
    /// Below 10
    Controlled,
    /// 10-24.99
    Attention,
    /// 25-39.99
    HighRisk,
    /// 40 and above
    Critical,
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityTier::Controlled => write!(f, "Controlado"),
            SeverityTier::Attention => write!(f, "Atenção"),
            SeverityTier::HighRisk => write!(f, "Alto risco"),
            SeverityTier::Critical => write!(f, "Crítico"),
        }
    }
}

/// Classify a severity score. Lower bounds are inclusive.
pub fn classify_severity(severity: f64) -> SeverityTier {
    let severity = coerce_finite(severity);
    if severity >= 40.0 {
        SeverityTier::Critical
    } else if severity >= 25.0 {
        SeverityTier::HighRisk
    } else if severity >= 10.0 {
        SeverityTier::Attention
    } else {
        SeverityTier::Controlled
    }
}

/// Share of sampling points affected by one organism
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrganismShare {
    pub name: String,
    pub kind: InfestationKind,
    /// Points where the organism was recorded at least once
    pub points: usize,
    pub percentage: u32,
}

/// Field-level summary of a monitoring
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TalhaoMetrics {
    pub total_points: usize,
    pub points_with_infestation: usize,
    pub total_occurrences: usize,
    /// Percent of points with at least one occurrence
    pub occurrence_index: u32,
    pub average_severity: u32,
    pub classification: SeverityTier,
    pub pest_pct: u32,
    pub disease_pct: u32,
    pub weed_pct: u32,
    pub top5: Vec<OrganismShare>,
}

/// Compute the field summary for a set of sampling points.
///
/// Kind percentages are rounded independently, so their sum may drift from
/// 100 by one or two points. The organism ranking keys on the name exactly
/// as recorded.
pub fn compute_talhao_metrics(points: &[MonitoringPoint]) -> TalhaoMetrics {
    let total_points = points.len();
    let mut points_with_infestation = 0;
    let mut severities = Vec::new();
    let (mut pest, mut disease, mut weed) = (0usize, 0usize, 0usize);

    // Insertion-ordered organism counts
    let mut order: Vec<OrganismShare> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for point in points {
        if point.has_infestation() {
            points_with_infestation += 1;
        }

        let mut seen_here: HashSet<&str> = HashSet::new();
        for infestation in &point.infestations {
            severities.push(coerce_finite(infestation.severity));
            match infestation.kind {
                InfestationKind::Pest => pest += 1,
                InfestationKind::Disease => disease += 1,
                InfestationKind::Weed => weed += 1,
            }

            let name = infestation.name.as_str();
            if !seen_here.insert(name) {
                continue;
            }
            match index.get(name) {
                Some(&i) => order[i].points += 1,
                None => {
                    index.insert(name, order.len());
                    order.push(OrganismShare {
                        name: name.to_string(),
                        kind: infestation.kind,
                        points: 1,
                        percentage: 0,
                    });
                }
            }
        }
    }

    for share in &mut order {
        share.percentage = rounded_percent(share.points, total_points);
    }
    // sort_by is stable: ties keep first-seen order
    order.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    order.truncate(TOP_ORGANISMS);

    let average_severity = rounded_mean(&severities);
    let kind_total = (pest + disease + weed).max(1);

    TalhaoMetrics {
        total_points,
        points_with_infestation,
        total_occurrences: severities.len(),
        occurrence_index: rounded_percent(points_with_infestation, total_points),
        average_severity,
        classification: classify_severity(average_severity as f64),
        pest_pct: rounded_percent(pest, kind_total),
        disease_pct: rounded_percent(disease, kind_total),
        weed_pct: rounded_percent(weed, kind_total),
        top5: order,
    }
}

/// Summary of a single sampling point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointMetrics {
    pub point_id: String,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub num_occurrences: usize,
    pub average_severity: u32,
    pub classification: SeverityTier,
}

/// One summary per point, in input order
pub fn compute_point_metrics(points: &[MonitoringPoint]) -> Vec<PointMetrics> {
    points
        .iter()
        .map(|point| {
            let severities: Vec<f64> = point.infestations.iter().map(|i| i.severity).collect();
            let average_severity = rounded_mean(&severities);
            PointMetrics {
                point_id: point.id.clone(),
                label: point.label.clone(),
                latitude: point.latitude,
                longitude: point.longitude,
                num_occurrences: point.infestations.len(),
                average_severity,
                classification: classify_severity(average_severity as f64),
            }
        })
        .collect()
}

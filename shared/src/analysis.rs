//! Monitoring analysis bundle handed to the rendering layer

use serde::{Deserialize, Serialize};

use crate::metrics::{compute_point_metrics, compute_talhao_metrics, PointMetrics, TalhaoMetrics};
use crate::models::Field;
use crate::recommendation::{Recommendation, RecommendationEngine};

/// Everything derived from a field's sampling points.
///
/// Recomputed on every render; never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoringAnalysis {
    pub metrics: TalhaoMetrics,
    pub points: Vec<PointMetrics>,
    pub recommendations: Vec<Recommendation>,
}

impl MonitoringAnalysis {
    pub fn compute(field: &Field, engine: &RecommendationEngine) -> Self {
        Self {
            metrics: compute_talhao_metrics(&field.points),
            points: compute_point_metrics(&field.points),
            recommendations: engine.recommend(&field.points),
        }
    }
}

//! Monitoring metrics tests
//!
//! Tests for severity classification and field roll-ups including:
//! - Property 1: Tier monotonicity
//! - Property 2: Empty field guards
//! - Property 3: Kind percentage drift
//! - Property 4: Top-5 bounds and ordering
//! - Property 7: Two-point scenario

use proptest::prelude::*;
use shared::{
    classify_severity, compute_point_metrics, compute_talhao_metrics, Infestation,
    InfestationKind, MonitoringPoint, SeverityTier,
};

fn infestation(kind: InfestationKind, name: &str, severity: f64) -> Infestation {
    Infestation {
        id: format!("{}-{}", name, severity),
        kind,
        name: name.to_string(),
        third: "médio".to_string(),
        quantity: None,
        severity,
        note: None,
        image: None,
    }
}

fn point(label: &str, infestations: Vec<Infestation>) -> MonitoringPoint {
    MonitoringPoint {
        id: label.to_lowercase(),
        label: label.to_string(),
        latitude: -12.55,
        longitude: -55.72,
        infestations,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Boundary values belong to the upper tier
    #[test]
    fn test_tier_boundaries() {
        assert_eq!(classify_severity(10.0), SeverityTier::Attention);
        assert_eq!(classify_severity(25.0), SeverityTier::HighRisk);
        assert_eq!(classify_severity(40.0), SeverityTier::Critical);
        assert_eq!(classify_severity(-5.0), SeverityTier::Controlled);
    }

    /// Property 2: no points means zeroed metrics
    #[test]
    fn test_zero_points() {
        let metrics = compute_talhao_metrics(&[]);
        assert_eq!(metrics.occurrence_index, 0);
        assert_eq!(metrics.average_severity, 0);
        assert_eq!(metrics.total_occurrences, 0);
        assert!(compute_point_metrics(&[]).is_empty());
    }

    /// Points without occurrences still count towards the index
    #[test]
    fn test_points_without_occurrences() {
        let metrics = compute_talhao_metrics(&[point("P1", vec![]), point("P2", vec![])]);
        assert_eq!(metrics.total_points, 2);
        assert_eq!(metrics.occurrence_index, 0);
        assert_eq!((metrics.pest_pct, metrics.disease_pct, metrics.weed_pct), (0, 0, 0));
        assert_eq!(metrics.classification, SeverityTier::Controlled);
    }

    /// Property 7: end-to-end two-point scenario
    #[test]
    fn test_two_point_scenario() {
        let points = vec![
            point("A", vec![infestation(InfestationKind::Pest, "Lagarta-do-cartucho", 45.0)]),
            point("B", vec![]),
        ];
        let metrics = compute_talhao_metrics(&points);
        assert_eq!(metrics.occurrence_index, 50);
        assert_eq!(metrics.average_severity, 45);
        assert_eq!(metrics.classification, SeverityTier::Critical);
        assert_eq!(metrics.pest_pct, 100);
        assert_eq!(metrics.top5.len(), 1);

        let per_point = compute_point_metrics(&points);
        assert_eq!(per_point[0].classification, SeverityTier::Critical);
        assert_eq!(per_point[1].num_occurrences, 0);
    }

    /// Classification is taken from the rounded field average
    #[test]
    fn test_classification_uses_rounded_average() {
        // mean 24.5 rounds to 25
        let points = vec![point(
            "A",
            vec![
                infestation(InfestationKind::Disease, "Mancha-alvo", 24.0),
                infestation(InfestationKind::Disease, "Mancha-alvo", 25.0),
            ],
        )];
        let metrics = compute_talhao_metrics(&points);
        assert_eq!(metrics.average_severity, 25);
        assert_eq!(metrics.classification, SeverityTier::HighRisk);
    }

    /// Non-finite severities count as zero
    #[test]
    fn test_non_finite_severity_is_coerced() {
        let points = vec![point(
            "A",
            vec![
                infestation(InfestationKind::Pest, "Tripes", f64::NAN),
                infestation(InfestationKind::Pest, "Tripes", 30.0),
            ],
        )];
        assert_eq!(compute_talhao_metrics(&points).average_severity, 15);
        assert_eq!(compute_point_metrics(&points)[0].average_severity, 15);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    const NAMES: &[&str] = &["Ferrugem Asiática", "ferrugem asiática", "Buva", "Percevejo-marrom", "Tripes", "Caruru", "Mancha-alvo"];

    fn kind_strategy() -> impl Strategy<Value = InfestationKind> {
        prop_oneof![
            Just(InfestationKind::Pest),
            Just(InfestationKind::Disease),
            Just(InfestationKind::Weed),
        ]
    }

    fn infestation_strategy() -> impl Strategy<Value = Infestation> {
        (kind_strategy(), 0..NAMES.len(), 0.0f64..=100.0)
            .prop_map(|(kind, name, severity)| infestation(kind, NAMES[name], severity))
    }

    fn points_strategy() -> impl Strategy<Value = Vec<MonitoringPoint>> {
        prop::collection::vec(prop::collection::vec(infestation_strategy(), 0..6), 0..12).prop_map(
            |points| {
                points
                    .into_iter()
                    .enumerate()
                    .map(|(i, infestations)| point(&format!("P{}", i + 1), infestations))
                    .collect()
            },
        )
    }

    fn tier_rank(tier: SeverityTier) -> u8 {
        match tier {
            SeverityTier::Controlled => 0,
            SeverityTier::Attention => 1,
            SeverityTier::HighRisk => 2,
            SeverityTier::Critical => 3,
        }
    }

    proptest! {
        /// Property 1: Classification never decreases as severity grows
        #[test]
        fn prop_classification_is_monotone(a in 0.0f64..200.0, b in 0.0f64..200.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(tier_rank(classify_severity(low)) <= tier_rank(classify_severity(high)));
        }

        /// Property 3: Kind percentages sum to 100 within rounding drift
        #[test]
        fn prop_kind_percentages_near_100(points in points_strategy()) {
            let metrics = compute_talhao_metrics(&points);
            let sum = metrics.pest_pct + metrics.disease_pct + metrics.weed_pct;
            if metrics.total_occurrences > 0 {
                prop_assert!((98..=102).contains(&sum), "sum was {}", sum);
            } else {
                prop_assert_eq!(sum, 0);
            }
        }

        /// Property 4: Top-5 is bounded and sorted by percentage
        #[test]
        fn prop_top5_bounded_and_sorted(points in points_strategy()) {
            let metrics = compute_talhao_metrics(&points);
            prop_assert!(metrics.top5.len() <= 5);
            prop_assert!(metrics.top5.windows(2).all(|w| w[0].percentage >= w[1].percentage));
            for share in &metrics.top5 {
                prop_assert!(share.points <= metrics.total_points);
                prop_assert!(share.percentage <= 100);
            }
        }

        /// Occurrence index and counts agree with the points
        #[test]
        fn prop_counts_are_consistent(points in points_strategy()) {
            let metrics = compute_talhao_metrics(&points);
            let occurrences: usize = points.iter().map(|p| p.infestations.len()).sum();
            prop_assert_eq!(metrics.total_points, points.len());
            prop_assert_eq!(metrics.total_occurrences, occurrences);
            prop_assert!(metrics.points_with_infestation <= metrics.total_points);
            prop_assert!(metrics.occurrence_index <= 100);
            prop_assert!(metrics.average_severity <= 100);
        }

        /// Per-point metrics keep input order and length
        #[test]
        fn prop_point_metrics_follow_input(points in points_strategy()) {
            let per_point = compute_point_metrics(&points);
            prop_assert_eq!(per_point.len(), points.len());
            for (summary, point) in per_point.iter().zip(&points) {
                prop_assert_eq!(&summary.label, &point.label);
                prop_assert_eq!(summary.num_occurrences, point.infestations.len());
                prop_assert_eq!(summary.classification, classify_severity(summary.average_severity as f64));
            }
        }
    }
}

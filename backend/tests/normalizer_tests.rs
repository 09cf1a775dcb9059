//! Report normalizer tests
//!
//! Tests for payload shape detection and normalization including:
//! - Property 8: Normalization is idempotent for every report kind
//! - Payloads matching no known shape are rejected
//! - Kind detection prefers an explicit type

use proptest::prelude::*;
use serde_json::{json, Value};
use shared::{detect_kind, normalize_report, NormalizeError, Report, ReportKind};

/// Normalize, serialize the result and normalize again
fn renormalize(report: &Report) -> Report {
    let serialized = serde_json::to_value(report).expect("report serializes");
    normalize_report(&serialized, None).expect("serialized report normalizes")
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_portuguese_monitoring_payload() {
        let payload = json!({
            "titulo": "MIP Safra 25/26",
            "data": "2025-11-14",
            "fazenda": "Fazenda Santa Rita",
            "talhao": {
                "nome": "T-07",
                "cultura": "Soja",
                "area": 84.2,
                "pontos": [
                    {"lat": -12.551, "lng": -55.721, "ocorrencias": [
                        {"tipo": "doença", "nome": "Ferrugem Asiática", "severidade": 32}
                    ]},
                    {"lat": -12.552, "lng": -55.722}
                ]
            }
        });
        let Report::Monitoring(report) = normalize_report(&payload, None).unwrap() else {
            panic!("expected a monitoring report");
        };
        assert_eq!(report.title, "MIP Safra 25/26");
        assert_eq!(report.farm, "Fazenda Santa Rita");
        assert_eq!(report.talhao.points.len(), 2);
        assert_eq!(report.talhao.points[0].label, "P1");
        assert_eq!(report.talhao.points[0].infestations[0].severity, 32.0);
        assert_eq!(report.talhao.polygon.geometry.geometry_type, "Polygon");
    }

    #[test]
    fn test_rejects_unknown_shape() {
        let err = normalize_report(&json!({"foo": 1, "bar": 2}), None).unwrap_err();
        assert!(matches!(err, NormalizeError::UnrecognizedShape { .. }));
    }

    #[test]
    fn test_rejects_non_object() {
        assert_eq!(normalize_report(&json!([1, 2]), None), Err(NormalizeError::NotAnObject));
        assert_eq!(normalize_report(&Value::Null, Some(ReportKind::Visit)), Err(NormalizeError::NotAnObject));
    }

    #[test]
    fn test_hint_resolves_sparse_payload() {
        let report = normalize_report(&json!({"titulo": "Visita"}), Some(ReportKind::Visit)).unwrap();
        assert_eq!(report.kind(), ReportKind::Visit);
        assert_eq!(report.title(), "Visita");
    }

    #[test]
    fn test_empty_object_defaults_with_hint() {
        let report = normalize_report(&json!({}), Some(ReportKind::Planting)).unwrap();
        assert_eq!(report.title(), ReportKind::Planting.default_title());
        assert_eq!(report.id(), "");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    const ORGANISMS: &[&str] = &["Ferrugem Asiática", "Percevejo-marrom", "Buva", "Mancha-alvo"];
    const KINDS: &[&str] = &["praga", "doença", "daninha"];

    /// Coordinates in the Mato Grosso soybean belt, four decimal places
    fn coordinate_strategy() -> impl Strategy<Value = (f64, f64)> {
        (-140000i32..-100000, -580000i32..-540000)
            .prop_map(|(lat, lng)| (lat as f64 / 10000.0, lng as f64 / 10000.0))
    }

    fn occurrence_strategy() -> impl Strategy<Value = Value> {
        (0..ORGANISMS.len(), 0..KINDS.len(), 0u32..=100).prop_map(|(name, kind, severity)| {
            json!({"nome": ORGANISMS[name], "tipo": KINDS[kind], "severidade": severity})
        })
    }

    fn point_strategy() -> impl Strategy<Value = Value> {
        (coordinate_strategy(), prop::collection::vec(occurrence_strategy(), 0..4)).prop_map(
            |((lat, lng), occurrences)| json!({"lat": lat, "lng": lng, "ocorrencias": occurrences}),
        )
    }

    fn talhao_strategy() -> impl Strategy<Value = Value> {
        ("T-[0-9]{2}", 0u32..5000, prop::collection::vec(point_strategy(), 0..6)).prop_map(
            |(name, area, points)| {
                json!({"nome": name, "cultura": "Soja", "area": area as f64 / 10.0, "pontos": points})
            },
        )
    }

    fn monitoring_strategy() -> impl Strategy<Value = Value> {
        (talhao_strategy(), "[A-Za-z ]{1,20}").prop_map(|(talhao, technician)| {
            json!({"titulo": "Monitoramento", "data": "2025-12-01", "tecnico": technician, "talhao": talhao})
        })
    }

    fn planting_strategy() -> impl Strategy<Value = Value> {
        let sample = (coordinate_strategy(), 0u32..300, 0u32..200, 0u32..200).prop_map(
            |((lat, lng), plants, doubles, failures)| {
                json!({
                    "lat": lat,
                    "lng": lng,
                    "plantas_metro": plants as f64 / 10.0,
                    "duplas": doubles as f64 / 10.0,
                    "falhas": failures as f64 / 10.0
                })
            },
        );
        (prop::collection::vec(sample, 0..6), prop::option::of(40u32..=90)).prop_map(
            |(samples, spacing)| {
                let mut payload = json!({"talhao": {"nome": "T-03"}, "amostras": samples});
                if let Some(spacing) = spacing {
                    payload["espacamento"] = json!(spacing as f64 / 100.0);
                }
                payload
            },
        )
    }

    fn visit_strategy() -> impl Strategy<Value = Value> {
        (
            prop::collection::vec("[a-z ]{1,30}", 0..4),
            prop::collection::vec("[a-z ]{1,30}", 0..4),
            prop::option::of("[A-Za-z]{3,12}"),
        )
            .prop_map(|(observations, recommendations, owner)| {
                json!({
                    "meta": {"titulo": "Visita técnica", "data": "2025-10-20", "tecnico": "Eng. Agr. Souza"},
                    "propriedade": {"nome": "Fazenda Boa Esperança", "proprietario": owner, "uf": "MT"},
                    "talhao": {"nome": "T-12"},
                    "observacoes": observations,
                    "recomendacoes": recommendations,
                    "fotos": [{"url": "https://cdn.example.com/f1.jpg", "legenda": "Folhas"}]
                })
            })
    }

    fn side_by_side_strategy() -> impl Strategy<Value = Value> {
        (2usize..4).prop_flat_map(|count| {
            let attribute = (
                prop::bool::ANY,
                prop::collection::vec(prop::option::of(0u32..10000), count),
            )
                .prop_map(|(higher, values)| {
                    let values: Vec<Value> = values
                        .into_iter()
                        .map(|v| v.map(|v| json!(v as f64 / 10.0)).unwrap_or(Value::Null))
                        .collect();
                    json!({"atributo": "Produtividade", "unidade": "sc/ha", "maior_melhor": higher, "valores": values})
                });
            (Just(count), prop::collection::vec(attribute, 0..4)).prop_map(|(count, attributes)| {
                let treatments: Vec<Value> = (1..=count)
                    .map(|i| json!({"nome": format!("Tratamento {}", i), "produto": "Produto"}))
                    .collect();
                json!({"talhao": {"nome": "T-01"}, "tratamentos": treatments, "atributos": attributes})
            })
        })
    }

    fn any_payload_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            monitoring_strategy(),
            planting_strategy(),
            visit_strategy(),
            side_by_side_strategy(),
        ]
    }

    proptest! {
        /// Property 8: Normalization is idempotent for every report kind
        #[test]
        fn prop_normalization_is_idempotent(payload in any_payload_strategy()) {
            let report = normalize_report(&payload, None).expect("known shape");
            prop_assert_eq!(renormalize(&report), report);
        }

        /// Heuristic kind survives a round through the serialized form
        #[test]
        fn prop_kind_is_stable(payload in any_payload_strategy()) {
            let detected = detect_kind(&payload).expect("known shape");
            let report = normalize_report(&payload, None).expect("known shape");
            prop_assert_eq!(report.kind(), detected);
            prop_assert_eq!(renormalize(&report).kind(), detected);
        }

        /// Objects with none of the recognized keys are rejected
        #[test]
        fn prop_unknown_shapes_rejected(keys in prop::collection::btree_set("x_[a-z]{1,8}", 0..6)) {
            let payload: serde_json::Map<String, Value> =
                keys.into_iter().map(|k| (k, json!(1))).collect();
            let result = normalize_report(&Value::Object(payload), None);
            prop_assert!(
                matches!(result, Err(NormalizeError::UnrecognizedShape { .. })),
                "unexpected result: {:?}",
                result
            );
        }

        /// An explicit type overrides the key heuristics
        #[test]
        fn prop_explicit_type_wins(payload in monitoring_strategy()) {
            let mut payload = payload;
            payload["tipo"] = json!("lado_a_lado");
            prop_assert_eq!(detect_kind(&payload), Some(ReportKind::SideBySide));
            let report = normalize_report(&payload, Some(ReportKind::Planting)).unwrap();
            prop_assert_eq!(report.kind(), ReportKind::SideBySide);
        }
    }
}

//! WebAssembly module for the Field Report platform
//!
//! Provides client-side computation for:
//! - Severity classification
//! - Field and per-point monitoring metrics
//! - Recommendations
//! - Report payload normalization
//!
//! Structured values cross the boundary as JSON strings.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use shared::{
    classify_severity, compute_point_metrics, compute_talhao_metrics, normalize_report,
    KnowledgeBase, MonitoringAnalysis, MonitoringPoint, RecommendationEngine, Report, ReportKind,
};

#[derive(Serialize)]
struct AnalyzedReport {
    report: Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<MonitoringAnalysis>,
}

/// Severity tier code (`CONTROLLED`, `ATTENTION`, `HIGH_RISK`, `CRITICAL`)
#[wasm_bindgen]
pub fn classify_severity_tier(severity: f64) -> String {
    tier_code(severity)
}

/// Portuguese display label of the severity tier
#[wasm_bindgen]
pub fn severity_tier_label(severity: f64) -> String {
    classify_severity(severity).to_string()
}

/// Field metrics for a JSON array of monitoring points
#[wasm_bindgen]
pub fn field_metrics(points_json: &str) -> Result<String, JsValue> {
    with_points(points_json, |points| to_json(&compute_talhao_metrics(points))).map_err(report_error)
}

/// Per-point metrics for a JSON array of monitoring points
#[wasm_bindgen]
pub fn point_metrics(points_json: &str) -> Result<String, JsValue> {
    with_points(points_json, |points| to_json(&compute_point_metrics(points))).map_err(report_error)
}

/// Recommendations from the built-in table for a JSON array of monitoring points
#[wasm_bindgen]
pub fn recommendations(points_json: &str) -> Result<String, JsValue> {
    with_points(points_json, |points| {
        to_json(&RecommendationEngine::with_builtin().recommend(points))
    })
    .map_err(report_error)
}

/// Recommendations from a caller-supplied table (`name -> {product, dose, action}`),
/// matching a server configured with `recommendations.table_path`
#[wasm_bindgen]
pub fn recommendations_with_table(points_json: &str, table_json: &str) -> Result<String, JsValue> {
    let engine = engine_from_table(Some(table_json)).map_err(report_error)?;
    with_points(points_json, |points| to_json(&engine.recommend(points))).map_err(report_error)
}

/// Normalize a raw report payload. `kind_hint` is used when the payload
/// carries no explicit type.
#[wasm_bindgen]
pub fn normalize(payload_json: &str, kind_hint: Option<String>) -> Result<String, JsValue> {
    normalize_payload(payload_json, kind_hint.as_deref())
        .and_then(|report| to_json(&report))
        .map_err(report_error)
}

/// Normalize a raw report payload and attach the monitoring analysis
#[wasm_bindgen]
pub fn analyze(payload_json: &str, kind_hint: Option<String>) -> Result<String, JsValue> {
    analyze_payload(payload_json, kind_hint.as_deref(), None).map_err(report_error)
}

/// Same as [`analyze`], with recommendations drawn from `table_json`
#[wasm_bindgen]
pub fn analyze_with_table(
    payload_json: &str,
    kind_hint: Option<String>,
    table_json: &str,
) -> Result<String, JsValue> {
    analyze_payload(payload_json, kind_hint.as_deref(), Some(table_json)).map_err(report_error)
}

fn tier_code(severity: f64) -> String {
    match serde_json::to_value(classify_severity(severity)) {
        Ok(Value::String(code)) => code,
        _ => String::new(),
    }
}

fn with_points<F>(points_json: &str, f: F) -> Result<String, String>
where
    F: FnOnce(&[MonitoringPoint]) -> Result<String, String>,
{
    let points: Vec<MonitoringPoint> = serde_json::from_str(points_json)
        .map_err(|e| format!("Invalid points JSON: {}", e))?;
    f(&points)
}

fn normalize_payload(payload_json: &str, kind_hint: Option<&str>) -> Result<Report, String> {
    let payload: Value = serde_json::from_str(payload_json)
        .map_err(|e| format!("Invalid report JSON: {}", e))?;
    let hint = match kind_hint {
        Some(label) => Some(label.parse::<ReportKind>()?),
        None => None,
    };
    normalize_report(&payload, hint).map_err(|e| e.to_string())
}

/// Engine over `table_json`, or the built-in table when none is given
fn engine_from_table(table_json: Option<&str>) -> Result<RecommendationEngine, String> {
    match table_json {
        Some(json) => KnowledgeBase::from_json(json)
            .map(|kb| RecommendationEngine::new(Arc::new(kb)))
            .map_err(|e| format!("Invalid recommendation table JSON: {}", e)),
        None => Ok(RecommendationEngine::with_builtin()),
    }
}

fn analyze_payload(
    payload_json: &str,
    kind_hint: Option<&str>,
    table_json: Option<&str>,
) -> Result<String, String> {
    let engine = engine_from_table(table_json)?;
    let report = normalize_payload(payload_json, kind_hint)?;
    let analysis = match &report {
        Report::Monitoring(monitoring) => Some(MonitoringAnalysis::compute(&monitoring.talhao, &engine)),
        _ => None,
    };
    to_json(&AnalyzedReport { report, analysis })
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn report_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tier_codes() {
        assert_eq!(classify_severity_tier(9.9), "CONTROLLED");
        assert_eq!(classify_severity_tier(10.0), "ATTENTION");
        assert_eq!(classify_severity_tier(25.0), "HIGH_RISK");
        assert_eq!(classify_severity_tier(40.0), "CRITICAL");
        assert_eq!(classify_severity_tier(f64::NAN), "CONTROLLED");
        assert_eq!(severity_tier_label(45.0), "Crítico");
    }

    #[test]
    fn test_field_metrics_from_points_json() {
        let points = json!([
            {"id": "a", "label": "A", "latitude": -12.0, "longitude": -55.0, "infestations": [
                {"id": "a-1", "kind": "pest", "name": "Lagarta", "third": "médio", "quantity": null,
                 "severity": 45.0, "note": null, "image": null}
            ]},
            {"id": "b", "label": "B", "latitude": -12.1, "longitude": -55.1, "infestations": []}
        ]);
        let out = with_points(&points.to_string(), |p| to_json(&compute_talhao_metrics(p))).unwrap();
        let metrics: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(metrics["occurrence_index"], 50);
        assert_eq!(metrics["average_severity"], 45);
        assert_eq!(metrics["classification"], "CRITICAL");
        assert_eq!(metrics["pest_pct"], 100);
    }

    #[test]
    fn test_invalid_points_json() {
        let err = with_points("{", |_| Ok(String::new())).unwrap_err();
        assert!(err.starts_with("Invalid points JSON"));
    }

    #[test]
    fn test_analyze_monitoring_payload() {
        let payload = json!({
            "talhao": {"nome": "T1", "pontos": [
                {"label": "P1", "lat": -12.0, "lng": -55.0, "ocorrencias": [
                    {"tipo": "doença", "nome": "Ferrugem Asiática", "severidade": 32}
                ]},
                {"label": "P2", "lat": -12.01, "lng": -55.01, "ocorrencias": [
                    {"tipo": "doença", "nome": "ferrugem asiática", "severidade": 28}
                ]},
                {"label": "P3", "lat": -12.02, "lng": -55.02, "ocorrencias": [
                    {"tipo": "doença", "nome": "FERRUGEM ASIÁTICA", "severidade": 38}
                ]}
            ]}
        });
        let out: Value = serde_json::from_str(&analyze_payload(&payload.to_string(), None, None).unwrap()).unwrap();
        assert_eq!(out["report"]["type"], "monitoring");
        let recs = out["analysis"]["recommendations"].as_array().unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0]["severity"], 33);
        assert_eq!(recs[0]["level"], "HIGH_RISK");
    }

    #[test]
    fn test_injected_table_matches_server_override() {
        let table = json!({"Ferrugem Asiática": {"product": "Produto da fazenda", "dose": "0,5 L/ha", "action": "Aplicar."}});
        let payload = json!({"talhao": {"nome": "T1", "pontos": [
            {"label": "P1", "lat": -12.0, "lng": -55.0, "ocorrencias": [
                {"tipo": "doença", "nome": "ferrugem asiática", "severidade": 30}
            ]}
        ]}});

        let out: Value = serde_json::from_str(
            &analyze_payload(&payload.to_string(), None, Some(&table.to_string())).unwrap(),
        )
        .unwrap();
        assert_eq!(out["analysis"]["recommendations"][0]["product"], "Produto da fazenda");

        let builtin: Value = serde_json::from_str(&analyze_payload(&payload.to_string(), None, None).unwrap()).unwrap();
        assert_ne!(builtin["analysis"]["recommendations"][0]["product"], "Produto da fazenda");

        let err = engine_from_table(Some("[1]")).unwrap_err();
        assert!(err.starts_with("Invalid recommendation table JSON"));
    }

    #[test]
    fn test_hint_and_rejection() {
        let report = normalize_payload(r#"{"id": "x"}"#, Some("visita")).unwrap();
        assert_eq!(report.kind(), ReportKind::Visit);

        assert!(normalize_payload(r#"{"foo": 1}"#, None).is_err());
        assert!(normalize_payload(r#"{"id": "x"}"#, Some("relatorio")).is_err());
    }
}

//! Report normalizer
//!
//! Turns a loosely-typed payload (database row, stored JSON blob or mock
//! fixture) into a fully-defaulted [`Report`]. The kind is taken from an
//! explicit `type` field, then from the caller's hint, then from the keys
//! present. Payloads matching none of the known shapes are rejected; once
//! the kind is known, normalization always succeeds.
//!
//! Normalization is idempotent: a serialized [`Report`] normalizes back to
//! itself.

mod access;
mod monitoring;
mod planting;
mod side_by_side;
mod talhao;
mod visit;

use serde_json::Value;
use thiserror::Error;

use crate::models::{Report, ReportKind};
use access::{date, has_any, object, text};

/// Normalizer rejection
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("report payload must be a JSON object")]
    NotAnObject,

    #[error("payload does not match any known report shape (keys: {keys})")]
    UnrecognizedShape { keys: String },
}

const TYPE_KEYS: &[&str] = &["type", "tipo", "report_type", "reportType", "kind"];

/// Determine the report kind from an explicit type field or key presence.
///
/// The key heuristics are best effort: a payload carrying keys of several
/// shapes is assigned to the first match in the order visit, side-by-side,
/// planting, monitoring.
pub fn detect_kind(payload: &Value) -> Option<ReportKind> {
    if let Some(kind) = explicit_kind(payload) {
        return Some(kind);
    }
    if !payload.is_object() {
        return None;
    }

    if has_any(payload, &["meta"])
        && has_any(payload, &["propriedade", "property"])
        && has_any(payload, talhao::TALHAO_KEYS)
    {
        Some(ReportKind::Visit)
    } else if has_any(payload, side_by_side::TREATMENT_KEYS) {
        Some(ReportKind::SideBySide)
    } else if has_any(payload, planting::SAMPLE_KEYS)
        || has_any(payload, planting::ROW_SPACING_KEYS)
    {
        Some(ReportKind::Planting)
    } else if has_any(payload, talhao::TALHAO_KEYS) || has_any(payload, talhao::POINT_KEYS) {
        Some(ReportKind::Monitoring)
    } else {
        None
    }
}

fn explicit_kind(payload: &Value) -> Option<ReportKind> {
    text(payload, TYPE_KEYS).and_then(|label| label.parse().ok())
}

/// Normalize a payload into a report.
///
/// `hint` is the kind recorded alongside the payload (e.g. a database
/// column); an explicit `type` inside the payload takes precedence.
pub fn normalize_report(payload: &Value, hint: Option<ReportKind>) -> Result<Report, NormalizeError> {
    if !payload.is_object() {
        return Err(NormalizeError::NotAnObject);
    }

    let kind = explicit_kind(payload)
        .or(hint)
        .or_else(|| detect_kind(payload))
        .ok_or_else(|| NormalizeError::UnrecognizedShape {
            keys: payload
                .as_object()
                .map(|obj| obj.keys().cloned().collect::<Vec<_>>().join(", "))
                .unwrap_or_default(),
        })?;

    Ok(match kind {
        ReportKind::Monitoring => Report::Monitoring(monitoring::normalize(payload)),
        ReportKind::Planting => Report::Planting(planting::normalize(payload)),
        ReportKind::Visit => Report::Visit(visit::normalize(payload)),
        ReportKind::SideBySide => Report::SideBySide(side_by_side::normalize(payload)),
    })
}

// Header fields shared by every report kind

const ID_KEYS: &[&str] = &["id", "report_id", "reportId"];
const TITLE_KEYS: &[&str] = &["title", "titulo", "título"];

/// Report id carried by the payload itself, under any accepted alias
pub fn declared_id(payload: &Value) -> Option<String> {
    text(payload, ID_KEYS)
}

/// Report title carried by the payload itself, at the top level or in a
/// visit's `meta` block
pub fn declared_title(payload: &Value) -> Option<String> {
    text(payload, TITLE_KEYS).or_else(|| object(payload, &["meta"]).and_then(|meta| text(meta, TITLE_KEYS)))
}

fn report_id(payload: &Value) -> String {
    declared_id(payload).unwrap_or_default()
}

fn report_title(payload: &Value, kind: ReportKind) -> String {
    text(payload, TITLE_KEYS).unwrap_or_else(|| kind.default_title().to_string())
}

fn report_date(payload: &Value) -> Option<chrono::NaiveDate> {
    date(payload, &["date", "data", "visit_date", "visitDate", "data_visita"])
}

const TECHNICIAN_KEYS: &[&str] = &["technician", "tecnico", "técnico", "responsavel", "responsável"];
const CROP_STAGE_KEYS: &[&str] = &["crop_stage", "cropStage", "estadio", "estádio", "fenologia"];

fn farm_name(payload: &Value) -> String {
    text(payload, &["farm", "fazenda", "farm_name", "farmName", "propriedade"])
        .unwrap_or_else(|| "—".to_string())
}

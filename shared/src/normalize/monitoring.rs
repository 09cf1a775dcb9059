use serde_json::Value;

use super::access::{get, text};
use super::talhao::{field_points, normalize_field, TALHAO_KEYS};
use super::{farm_name, report_date, report_id, report_title, CROP_STAGE_KEYS, TECHNICIAN_KEYS};
use crate::models::{MonitoringReport, ReportKind};

pub(super) fn normalize(payload: &Value) -> MonitoringReport {
    let talhao = get(payload, TALHAO_KEYS).unwrap_or(&Value::Null);
    let points = field_points(talhao, payload);

    MonitoringReport {
        id: report_id(payload),
        title: report_title(payload, ReportKind::Monitoring),
        date: report_date(payload),
        farm: farm_name(payload),
        technician: text(payload, TECHNICIAN_KEYS).unwrap_or_else(|| "—".to_string()),
        crop_stage: text(payload, CROP_STAGE_KEYS),
        talhao: normalize_field(talhao, points, &[]),
        notes: text(payload, &["notes", "observacoes", "observações", "obs"]),
    }
}

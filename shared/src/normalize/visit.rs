use serde_json::Value;

use super::access::{date, get, list, object, text, text_list, value_text};
use super::talhao::{normalize_field, TALHAO_KEYS};
use super::{report_date, report_id, CROP_STAGE_KEYS, TECHNICIAN_KEYS, TITLE_KEYS};
use crate::models::{Photo, Property, ReportKind, VisitMeta, VisitReport};

pub(super) fn normalize(payload: &Value) -> VisitReport {
    let meta = object(payload, &["meta"]).unwrap_or(&Value::Null);
    let talhao = get(payload, TALHAO_KEYS).unwrap_or(&Value::Null);

    VisitReport {
        id: report_id(payload),
        meta: normalize_meta(meta, payload),
        propriedade: normalize_property(get(payload, &["propriedade", "property", "fazenda", "farm"])),
        talhao: normalize_field(talhao, &[], &[]),
        observations: text_list(payload, &["observations", "observacoes", "observações"]),
        recommendations: text_list(payload, &["recommendations", "recomendacoes", "recomendações"]),
        photos: list(payload, &["photos", "fotos", "images", "imagens"])
            .iter()
            .filter_map(normalize_photo)
            .collect(),
    }
}

/// Meta fields fall back to the payload top level
fn normalize_meta(meta: &Value, payload: &Value) -> VisitMeta {
    let either = |keys: &[&str]| text(meta, keys).or_else(|| text(payload, keys));
    let date_keys = ["date", "data", "visit_date", "visitDate", "data_visita"];

    VisitMeta {
        title: either(TITLE_KEYS)
            .unwrap_or_else(|| ReportKind::Visit.default_title().to_string()),
        date: date(meta, &date_keys).or_else(|| report_date(payload)),
        technician: either(TECHNICIAN_KEYS).unwrap_or_else(|| "—".to_string()),
        crop_stage: either(CROP_STAGE_KEYS),
    }
}

/// `value` may be an object or a bare farm name
fn normalize_property(value: Option<&Value>) -> Property {
    let value = value.unwrap_or(&Value::Null);
    Property {
        name: text(value, &["name", "nome"])
            .or_else(|| value_text(value))
            .unwrap_or_else(|| "—".to_string()),
        owner: text(value, &["owner", "proprietario", "proprietário", "produtor"]),
        city: text(value, &["city", "cidade", "municipio", "município"]),
        state: text(value, &["state", "estado", "uf"]),
    }
}

/// Photos without a URL are dropped
fn normalize_photo(value: &Value) -> Option<Photo> {
    if let Some(url) = value_text(value) {
        return Some(Photo { url, caption: None });
    }
    Some(Photo {
        url: text(value, &["url", "src", "image", "imagem"])?,
        caption: text(value, &["caption", "legenda", "descricao", "descrição"]),
    })
}

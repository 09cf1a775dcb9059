use serde_json::Value;

use super::access::{flag, get, list, number, text, value_number, value_text};
use super::talhao::{normalize_field, TALHAO_KEYS};
use super::{farm_name, report_date, report_id, report_title};
use crate::models::{ComparedAttribute, ReportKind, SideBySideReport, Treatment};

pub(super) const TREATMENT_KEYS: &[&str] = &["treatments", "tratamentos"];

pub(super) fn normalize(payload: &Value) -> SideBySideReport {
    let treatments: Vec<Treatment> = list(payload, TREATMENT_KEYS)
        .iter()
        .enumerate()
        .map(|(i, treatment)| normalize_treatment(treatment, i))
        .collect();

    let attributes = list(payload, &["attributes", "atributos", "comparisons", "comparacoes"])
        .iter()
        .enumerate()
        .map(|(i, attribute)| normalize_attribute(attribute, i, &treatments))
        .collect();

    SideBySideReport {
        id: report_id(payload),
        title: report_title(payload, ReportKind::SideBySide),
        date: report_date(payload),
        farm: farm_name(payload),
        talhao: normalize_field(get(payload, TALHAO_KEYS).unwrap_or(&Value::Null), &[], &[]),
        treatments,
        attributes,
    }
}

/// `value` may be an object or a bare treatment name
fn normalize_treatment(value: &Value, index: usize) -> Treatment {
    Treatment {
        id: text(value, &["id"]).unwrap_or_else(|| format!("t{}", index + 1)),
        name: text(value, &["name", "nome"])
            .or_else(|| value_text(value))
            .unwrap_or_else(|| format!("Tratamento {}", index + 1)),
        product: text(value, &["product", "produto"]),
        description: text(value, &["description", "descricao", "descrição"]),
    }
}

fn normalize_attribute(value: &Value, index: usize, treatments: &[Treatment]) -> ComparedAttribute {
    let higher_is_better = flag(value, &["higher_is_better", "higherIsBetter", "maior_melhor"]).unwrap_or(true);
    let values = aligned_values(get(value, &["values", "valores"]), treatments);
    let best_treatment = best_index(&values, higher_is_better).map(|i| treatments[i].id.clone());

    ComparedAttribute {
        name: text(value, &["name", "nome", "attribute", "atributo"])
            .unwrap_or_else(|| format!("Atributo {}", index + 1)),
        unit: text(value, &["unit", "unidade"]),
        higher_is_better,
        values,
        best_treatment,
    }
}

/// One value per treatment. Arrays are matched by position, objects by
/// treatment id and then by name.
fn aligned_values(source: Option<&Value>, treatments: &[Treatment]) -> Vec<Option<f64>> {
    match source {
        Some(Value::Array(items)) => (0..treatments.len())
            .map(|i| items.get(i).and_then(value_number))
            .collect(),
        Some(object @ Value::Object(_)) => treatments
            .iter()
            .map(|t| number(object, &[t.id.as_str()]).or_else(|| number(object, &[t.name.as_str()])))
            .collect(),
        _ => vec![None; treatments.len()],
    }
}

/// Index of the best value; the first one wins ties
fn best_index(values: &[Option<f64>], higher_is_better: bool) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
            Some((_, b)) if (higher_is_better && v <= b) || (!higher_is_better && v >= b) => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

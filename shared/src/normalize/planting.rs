use serde_json::Value;

use super::access::{get, list, number, object, round2, text};
use super::talhao::{normalize_field, TALHAO_KEYS};
use super::{farm_name, report_date, report_id, report_title};
use crate::models::{PlantingReport, PlantingSample, PlantingSummary, ReportKind};
use crate::validation::mean;

pub(super) const SAMPLE_KEYS: &[&str] = &["samples", "amostras", "planting_samples", "plantingSamples"];
pub(super) const ROW_SPACING_KEYS: &[&str] = &[
    "row_spacing_m",
    "rowSpacingM",
    "row_spacing",
    "espacamento",
    "espaçamento",
    "espacamento_m",
];

const SQUARE_METERS_PER_HA: f64 = 10_000.0;

pub(super) fn normalize(payload: &Value) -> PlantingReport {
    let samples: Vec<PlantingSample> = list(payload, SAMPLE_KEYS)
        .iter()
        .enumerate()
        .map(|(i, sample)| normalize_sample(sample, i))
        .collect();

    let positions: Vec<(f64, f64)> = samples.iter().map(|s| (s.latitude, s.longitude)).collect();
    let talhao = get(payload, TALHAO_KEYS).unwrap_or(&Value::Null);
    let row_spacing_m = number(payload, ROW_SPACING_KEYS).unwrap_or(0.0).max(0.0);
    let summary = summarize(object(payload, &["summary", "resumo"]), &samples, row_spacing_m);

    PlantingReport {
        id: report_id(payload),
        title: report_title(payload, ReportKind::Planting),
        date: report_date(payload),
        farm: farm_name(payload),
        talhao: normalize_field(talhao, &[], &positions),
        variety: text(payload, &["variety", "variedade", "cultivar", "hibrido", "híbrido"]),
        row_spacing_m,
        seeds_per_meter_target: number(
            payload,
            &["seeds_per_meter_target", "seedsPerMeterTarget", "sementes_por_metro", "meta_sementes"],
        ),
        samples,
        summary,
    }
}

fn normalize_sample(value: &Value, index: usize) -> PlantingSample {
    let non_negative = |keys: &[&str]| number(value, keys).unwrap_or(0.0).max(0.0);

    PlantingSample {
        id: text(value, &["id"]).unwrap_or_else(|| format!("a{}", index + 1)),
        label: text(value, &["label", "rotulo", "rótulo", "nome", "name"])
            .unwrap_or_else(|| format!("A{}", index + 1)),
        latitude: number(value, &["latitude", "lat"]).unwrap_or(0.0),
        longitude: number(value, &["longitude", "lng", "lon", "long"]).unwrap_or(0.0),
        plants_per_meter: non_negative(&["plants_per_meter", "plantsPerMeter", "plantas_por_metro", "plantas_metro"]),
        doubles_pct: non_negative(&["doubles_pct", "doublesPct", "duplas", "duplas_pct"]),
        failures_pct: non_negative(&["failures_pct", "failuresPct", "falhas", "falhas_pct"]),
        spacing_cv_pct: number(value, &["spacing_cv_pct", "spacingCvPct", "cv", "cv_pct"]),
        depth_cm: number(value, &["depth_cm", "depthCm", "profundidade", "profundidade_cm"]),
    }
}

/// Summary derived from the samples, overridden field by field by a source summary
fn summarize(source: Option<&Value>, samples: &[PlantingSample], row_spacing_m: f64) -> PlantingSummary {
    let avg = |values: Vec<f64>| mean(&values).map(round2);

    let avg_plants = avg(samples.iter().map(|s| s.plants_per_meter).collect()).unwrap_or(0.0);
    let derived = PlantingSummary {
        samples: samples.len(),
        avg_plants_per_meter: avg_plants,
        population_per_ha: population_per_ha(avg_plants, row_spacing_m),
        avg_doubles_pct: avg(samples.iter().map(|s| s.doubles_pct).collect()).unwrap_or(0.0),
        avg_failures_pct: avg(samples.iter().map(|s| s.failures_pct).collect()).unwrap_or(0.0),
        avg_spacing_cv_pct: avg(samples.iter().filter_map(|s| s.spacing_cv_pct).collect()),
    };

    let Some(source) = source else {
        return derived;
    };
    let pick = |keys: &[&str], fallback: f64| number(source, keys).unwrap_or(fallback);

    PlantingSummary {
        samples: number(source, &["samples", "amostras", "sample_count"])
            .map(|n| n.max(0.0) as usize)
            .unwrap_or(derived.samples),
        avg_plants_per_meter: pick(&["avg_plants_per_meter", "avgPlantsPerMeter", "media_plantas_metro"], derived.avg_plants_per_meter),
        population_per_ha: pick(&["population_per_ha", "populationPerHa", "populacao", "população"], derived.population_per_ha),
        avg_doubles_pct: pick(&["avg_doubles_pct", "avgDoublesPct", "media_duplas"], derived.avg_doubles_pct),
        avg_failures_pct: pick(&["avg_failures_pct", "avgFailuresPct", "media_falhas"], derived.avg_failures_pct),
        avg_spacing_cv_pct: number(source, &["avg_spacing_cv_pct", "avgSpacingCvPct", "media_cv"])
            .or(derived.avg_spacing_cv_pct),
    }
}

/// Plants per hectare, 0 when the row spacing is unknown
fn population_per_ha(plants_per_meter: f64, row_spacing_m: f64) -> f64 {
    if row_spacing_m > 0.0 {
        (plants_per_meter / row_spacing_m * SQUARE_METERS_PER_HA).round()
    } else {
        0.0
    }
}

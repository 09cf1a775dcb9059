//! Field, sampling point and occurrence normalization

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use super::access::{get, list, number, text, value_number, value_text};
use crate::models::{Field, Infestation, InfestationKind, MonitoringPoint};
use crate::types::Polygon;

pub(crate) const TALHAO_KEYS: &[&str] = &["talhao", "talhão", "field"];
pub(crate) const POINT_KEYS: &[&str] = &["points", "pontos", "monitoring_points", "monitoringPoints"];
const INFESTATION_KEYS: &[&str] = &[
    "infestations",
    "infestacoes",
    "infestações",
    "occurrences",
    "ocorrencias",
    "ocorrências",
];
const POLYGON_KEYS: &[&str] = &["polygon", "geometry", "geojson", "poligono", "polígono", "geom"];

/// Normalize a field. `talhao` may be an object, a bare name or null.
///
/// When the source has no usable geometry the polygon is the padded bounding
/// box of the points plus `extra_positions`, ignoring positions at (0, 0).
pub(crate) fn normalize_field(
    talhao: &Value,
    points: &[Value],
    extra_positions: &[(f64, f64)],
) -> Field {
    let points: Vec<MonitoringPoint> = points
        .iter()
        .enumerate()
        .map(|(i, point)| normalize_point(point, i))
        .collect();

    let polygon = get(talhao, POLYGON_KEYS)
        .and_then(parse_polygon)
        .unwrap_or_else(|| {
            let positions = points
                .iter()
                .map(|p| (p.latitude, p.longitude))
                .chain(extra_positions.iter().copied())
                .filter(|&(lat, lng)| !(lat == 0.0 && lng == 0.0));
            Polygon::bounding_box(positions)
        });

    let area = number(talhao, &["area_ha", "areaHa", "area", "área"])
        .unwrap_or(0.0)
        .max(0.0);

    Field {
        id: text(talhao, &["id", "talhao_id", "talhaoId"]).unwrap_or_else(|| "talhao".to_string()),
        name: text(talhao, &["name", "nome"])
            .or_else(|| value_text(talhao))
            .unwrap_or_else(|| "Talhão".to_string()),
        crop: text(talhao, &["crop", "cultura"]).unwrap_or_else(|| "—".to_string()),
        area_ha: Decimal::from_f64(area)
            .map(|d| d.round_dp(4).normalize())
            .unwrap_or(Decimal::ZERO),
        polygon,
        points,
    }
}

/// Points listed on the field object, or at the payload top level
pub(crate) fn field_points<'a>(talhao: &'a Value, payload: &'a Value) -> &'a [Value] {
    let points = list(talhao, POINT_KEYS);
    if points.is_empty() {
        list(payload, POINT_KEYS)
    } else {
        points
    }
}

fn normalize_point(value: &Value, index: usize) -> MonitoringPoint {
    let id = text(value, &["id"]).unwrap_or_else(|| format!("p{}", index + 1));
    let infestations = list(value, INFESTATION_KEYS)
        .iter()
        .enumerate()
        .map(|(j, infestation)| normalize_infestation(infestation, &id, j))
        .collect();

    MonitoringPoint {
        label: text(value, &["label", "rotulo", "rótulo", "nome", "name", "codigo"])
            .unwrap_or_else(|| format!("P{}", index + 1)),
        latitude: number(value, &["latitude", "lat"]).unwrap_or(0.0),
        longitude: number(value, &["longitude", "lng", "lon", "long"]).unwrap_or(0.0),
        infestations,
        id,
    }
}

fn normalize_infestation(value: &Value, point_id: &str, index: usize) -> Infestation {
    Infestation {
        id: text(value, &["id"]).unwrap_or_else(|| format!("{}-{}", point_id, index + 1)),
        kind: text(value, &["kind", "type", "tipo", "category", "categoria"])
            .map(|label| InfestationKind::from_label(&label))
            .unwrap_or(InfestationKind::Pest),
        name: text(value, &["name", "nome", "organism", "organismo"])
            .unwrap_or_else(|| "—".to_string()),
        third: text(value, &["third", "terco", "terço", "canopy_third", "canopyThird"])
            .unwrap_or_else(|| "—".to_string()),
        quantity: number(value, &["quantity", "quantidade", "qtd"]),
        severity: number(value, &["severity", "severidade"]).unwrap_or(0.0),
        note: text(value, &["note", "nota", "observacao", "observação", "obs"]),
        image: text(value, &["image", "imagem", "image_url", "imageUrl", "foto", "photo"]),
    }
}

/// Accepts a Feature, a bare Polygon/MultiPolygon geometry, a FeatureCollection
/// (first feature) or any of these encoded as a JSON string.
fn parse_polygon(value: &Value) -> Option<Polygon> {
    if let Value::String(encoded) = value {
        let decoded: Value = serde_json::from_str(encoded).ok()?;
        return parse_polygon(&decoded);
    }

    match value.get("type").and_then(Value::as_str)? {
        "Feature" => {
            let mut polygon = parse_polygon(value.get("geometry")?)?;
            if let Some(Value::Object(properties)) = value.get("properties") {
                polygon.properties = properties.clone();
            }
            Some(polygon)
        }
        "FeatureCollection" => value
            .get("features")?
            .as_array()?
            .iter()
            .find_map(parse_polygon),
        "Polygon" => parse_rings(value.get("coordinates")?).map(Polygon::from_rings),
        "MultiPolygon" => value
            .get("coordinates")?
            .as_array()?
            .iter()
            .find_map(parse_rings)
            .map(Polygon::from_rings),
        _ => None,
    }
}

fn parse_rings(value: &Value) -> Option<Vec<Vec<[f64; 2]>>> {
    let rings: Vec<Vec<[f64; 2]>> = value
        .as_array()?
        .iter()
        .filter_map(|ring| {
            let positions: Vec<[f64; 2]> = ring
                .as_array()?
                .iter()
                .filter_map(|position| {
                    let pair = position.as_array()?;
                    Some([value_number(pair.first()?)?, value_number(pair.get(1)?)?])
                })
                .collect();
            (positions.len() >= 3).then_some(positions)
        })
        .collect();
    (!rings.is_empty()).then_some(rings)
}

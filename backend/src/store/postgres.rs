//! Postgres (Supabase) report queries
//!
//! Reports keep their payload in the `data` jsonb column. Monitoring reports
//! captured by the field app instead leave `data` null and store the talhão,
//! points and occurrences relationally; those are assembled into a payload
//! here.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Map, Value};
use shared::{Pagination, ReportKind};
use sqlx::PgPool;
use uuid::Uuid;

use super::{parse_kind, ReportSummary, StoredReport};
use crate::error::AppResult;

const REPORT_COLUMNS: &str = r#"
    id::text AS id,
    owner_uid::text AS owner_uid,
    report_type,
    title,
    share_token,
    share_enabled,
    created_at,
    data,
    talhao_id::text AS talhao_id,
    farm,
    technician,
    report_date
"#;

#[derive(Debug, sqlx::FromRow)]
struct ReportRow {
    id: String,
    owner_uid: Option<String>,
    report_type: Option<String>,
    title: Option<String>,
    share_token: Option<String>,
    share_enabled: bool,
    created_at: Option<DateTime<Utc>>,
    data: Option<Value>,
    talhao_id: Option<String>,
    farm: Option<String>,
    technician: Option<String>,
    report_date: Option<NaiveDate>,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: String,
    report_type: Option<String>,
    title: Option<String>,
    share_token: Option<String>,
    share_enabled: bool,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct TalhaoRow {
    id: String,
    name: Option<String>,
    crop: Option<String>,
    area_ha: Option<f64>,
    geometry: Option<Value>,
}

#[derive(Debug, sqlx::FromRow)]
struct PointRow {
    id: String,
    label: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, sqlx::FromRow)]
struct OccurrenceRow {
    id: String,
    point_id: String,
    kind: Option<String>,
    organism: Option<String>,
    third: Option<String>,
    quantity: Option<f64>,
    severity: Option<f64>,
    note: Option<String>,
    image_url: Option<String>,
}

pub(super) async fn find_by_share_token(pool: &PgPool, token: &str) -> AppResult<Option<StoredReport>> {
    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "SELECT {} FROM reports WHERE share_token = $1",
        REPORT_COLUMNS
    ))
    .bind(token)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(into_stored(pool, row).await?)),
        None => Ok(None),
    }
}

pub(super) async fn find_for_owner(
    pool: &PgPool,
    id: &str,
    owner_uid: &str,
) -> AppResult<Option<StoredReport>> {
    // Malformed ids cannot match a uuid column
    let (Ok(id), Ok(owner)) = (Uuid::parse_str(id), Uuid::parse_str(owner_uid)) else {
        return Ok(None);
    };

    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "SELECT {} FROM reports WHERE id = $1 AND owner_uid = $2",
        REPORT_COLUMNS
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(into_stored(pool, row).await?)),
        None => Ok(None),
    }
}

pub(super) async fn list_for_owner(
    pool: &PgPool,
    owner_uid: &str,
    page: &Pagination,
) -> AppResult<(Vec<ReportSummary>, u64)> {
    let Ok(owner) = Uuid::parse_str(owner_uid) else {
        return Ok((Vec::new(), 0));
    };

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE owner_uid = $1")
        .bind(owner)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, SummaryRow>(
        r#"
        SELECT id::text AS id, report_type, title, share_token, share_enabled, created_at
        FROM reports
        WHERE owner_uid = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(owner)
    .bind(page.per_page as i64)
    .bind(page.offset() as i64)
    .fetch_all(pool)
    .await?;

    let summaries = rows
        .into_iter()
        .map(|row| ReportSummary {
            id: row.id,
            kind: parse_kind(row.report_type.as_deref()),
            title: row.title,
            share_token: row.share_token,
            share_enabled: row.share_enabled,
            created_at: row.created_at,
        })
        .collect();

    Ok((summaries, total.max(0) as u64))
}

pub(super) async fn set_share_token(
    pool: &PgPool,
    id: &str,
    owner_uid: &str,
    token: Option<&str>,
) -> AppResult<bool> {
    let (Ok(id), Ok(owner)) = (Uuid::parse_str(id), Uuid::parse_str(owner_uid)) else {
        return Ok(false);
    };

    let result = sqlx::query(
        r#"
        UPDATE reports
        SET share_token = $3, share_enabled = $4, updated_at = NOW()
        WHERE id = $1 AND owner_uid = $2
        "#,
    )
    .bind(id)
    .bind(owner)
    .bind(token)
    .bind(token.is_some())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

async fn into_stored(pool: &PgPool, row: ReportRow) -> AppResult<StoredReport> {
    let kind = parse_kind(row.report_type.as_deref());

    let data = match row.data {
        Some(data) => Some(data),
        None if matches!(kind, None | Some(ReportKind::Monitoring)) => {
            tracing::debug!(report_id = %row.id, "assembling monitoring payload from relational rows");
            Some(assemble_monitoring(pool, &row).await?)
        }
        None => None,
    };

    Ok(StoredReport {
        id: row.id,
        owner_uid: row.owner_uid,
        kind,
        title: row.title,
        share_token: row.share_token,
        share_enabled: row.share_enabled,
        created_at: row.created_at,
        data,
    })
}

/// Build a monitoring payload from `talhoes`, `monitoring_points` and
/// `monitoring_occurrences`
async fn assemble_monitoring(pool: &PgPool, report: &ReportRow) -> AppResult<Value> {
    let report_id = Uuid::parse_str(&report.id).map_err(|e| {
        crate::error::AppError::Internal(format!("Report id is not a uuid: {}", e))
    })?;

    let talhao = match report.talhao_id.as_deref().and_then(|id| Uuid::parse_str(id).ok()) {
        Some(talhao_id) => {
            sqlx::query_as::<_, TalhaoRow>(
                r#"
                SELECT id::text AS id, name, crop, area_ha::float8 AS area_ha, geometry
                FROM talhoes
                WHERE id = $1
                "#,
            )
            .bind(talhao_id)
            .fetch_optional(pool)
            .await?
        }
        None => None,
    };

    let points = sqlx::query_as::<_, PointRow>(
        r#"
        SELECT id::text AS id, label, latitude, longitude
        FROM monitoring_points
        WHERE report_id = $1
        ORDER BY position, label
        "#,
    )
    .bind(report_id)
    .fetch_all(pool)
    .await?;

    let occurrences = sqlx::query_as::<_, OccurrenceRow>(
        r#"
        SELECT o.id::text AS id, o.point_id::text AS point_id, o.kind, o.organism, o.third,
               o.quantity, o.severity, o.note, o.image_url
        FROM monitoring_occurrences o
        JOIN monitoring_points p ON p.id = o.point_id
        WHERE p.report_id = $1
        ORDER BY o.position
        "#,
    )
    .bind(report_id)
    .fetch_all(pool)
    .await?;

    Ok(monitoring_payload(report, talhao, points, occurrences))
}

fn monitoring_payload(
    report: &ReportRow,
    talhao: Option<TalhaoRow>,
    points: Vec<PointRow>,
    occurrences: Vec<OccurrenceRow>,
) -> Value {
    let mut by_point: HashMap<String, Vec<Value>> = HashMap::new();
    for o in occurrences {
        by_point.entry(o.point_id).or_default().push(json!({
            "id": o.id,
            "kind": o.kind,
            "name": o.organism,
            "third": o.third,
            "quantity": o.quantity,
            "severity": o.severity,
            "note": o.note,
            "image": o.image_url,
        }));
    }

    let points: Vec<Value> = points
        .into_iter()
        .map(|p| {
            let infestations = by_point.remove(&p.id).unwrap_or_default();
            json!({
                "id": p.id,
                "label": p.label,
                "latitude": p.latitude,
                "longitude": p.longitude,
                "infestations": infestations,
            })
        })
        .collect();

    let mut talhao_json = Map::new();
    if let Some(t) = talhao {
        talhao_json.insert("id".to_string(), json!(t.id));
        talhao_json.insert("name".to_string(), json!(t.name));
        talhao_json.insert("crop".to_string(), json!(t.crop));
        talhao_json.insert("area_ha".to_string(), json!(t.area_ha));
        talhao_json.insert("polygon".to_string(), t.geometry.unwrap_or(Value::Null));
    }
    talhao_json.insert("points".to_string(), Value::Array(points));

    json!({
        "type": ReportKind::Monitoring.as_str(),
        "id": report.id,
        "title": report.title,
        "date": report.report_date.map(|d| d.to_string()),
        "farm": report.farm,
        "technician": report.technician,
        "talhao": Value::Object(talhao_json),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{normalize_report, Report};

    fn report_row() -> ReportRow {
        ReportRow {
            id: "7d9f3b52-4d8e-4a43-9d6f-1f0f5b0c2a11".to_string(),
            owner_uid: None,
            report_type: None,
            title: Some("Monitoramento T05".to_string()),
            share_token: None,
            share_enabled: false,
            created_at: None,
            data: None,
            talhao_id: None,
            farm: Some("Fazenda Ouro Verde".to_string()),
            technician: None,
            report_date: NaiveDate::from_ymd_opt(2025, 3, 10),
        }
    }

    #[test]
    fn test_relational_rows_become_a_monitoring_payload() {
        let talhao = TalhaoRow {
            id: "t5".to_string(),
            name: Some("T05".to_string()),
            crop: Some("Soja".to_string()),
            area_ha: Some(42.5),
            geometry: None,
        };
        let points = vec![
            PointRow { id: "a".to_string(), label: Some("P1".to_string()), latitude: Some(-12.1), longitude: Some(-55.4) },
            PointRow { id: "b".to_string(), label: Some("P2".to_string()), latitude: Some(-12.2), longitude: Some(-55.5) },
        ];
        let occurrences = vec![OccurrenceRow {
            id: "o1".to_string(),
            point_id: "b".to_string(),
            kind: Some("doenca".to_string()),
            organism: Some("Ferrugem Asiática".to_string()),
            third: Some("inferior".to_string()),
            quantity: None,
            severity: Some(30.0),
            note: None,
            image_url: None,
        }];

        let payload = monitoring_payload(&report_row(), Some(talhao), points, occurrences);
        let Report::Monitoring(report) = normalize_report(&payload, None).unwrap() else {
            panic!("expected a monitoring report");
        };

        assert_eq!(report.farm, "Fazenda Ouro Verde");
        assert_eq!(report.date.map(|d| d.to_string()), Some("2025-03-10".to_string()));
        assert_eq!(report.talhao.name, "T05");
        assert_eq!(report.talhao.points.len(), 2);
        assert!(report.talhao.points[0].infestations.is_empty());
        assert_eq!(report.talhao.points[1].infestations[0].name, "Ferrugem Asiática");
    }

    #[test]
    fn test_payload_without_talhao_row() {
        let payload = monitoring_payload(&report_row(), None, Vec::new(), Vec::new());
        let report = normalize_report(&payload, None).unwrap();
        assert_eq!(report.talhao().name, "Talhão");
        assert!(report.talhao().points.is_empty());
    }
}

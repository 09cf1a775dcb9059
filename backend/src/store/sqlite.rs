//! Local SQLite report store
//!
//! A single `reports` table holding JSON payloads as text. Timestamps are
//! stored as text in either SQLite's `CURRENT_TIMESTAMP` format or RFC 3339.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use shared::Pagination;
use sqlx::SqlitePool;

use super::{parse_kind, ReportSummary, StoredReport};
use crate::error::{AppError, AppResult};

const CREATE_REPORTS: &str = r#"
CREATE TABLE IF NOT EXISTS reports (
    id TEXT PRIMARY KEY NOT NULL,
    owner_uid TEXT,
    report_type TEXT,
    title TEXT,
    share_token TEXT UNIQUE,
    share_enabled INTEGER NOT NULL DEFAULT 0,
    data TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

const CREATE_OWNER_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_reports_owner ON reports(owner_uid)";

#[derive(Debug, sqlx::FromRow)]
struct ReportRow {
    id: String,
    owner_uid: Option<String>,
    report_type: Option<String>,
    title: Option<String>,
    share_token: Option<String>,
    share_enabled: bool,
    created_at: Option<String>,
    data: Option<String>,
}

impl ReportRow {
    fn into_stored(self) -> AppResult<StoredReport> {
        let data = self
            .data
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()
            .map_err(|e| {
                AppError::UnrecognizedReport(format!("stored data for {} is not valid JSON: {}", self.id, e))
            })?;

        Ok(StoredReport {
            kind: parse_kind(self.report_type.as_deref()),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
            id: self.id,
            owner_uid: self.owner_uid,
            title: self.title,
            share_token: self.share_token,
            share_enabled: self.share_enabled,
            data,
        })
    }
}

pub(super) async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_REPORTS).execute(pool).await?;
    sqlx::query(CREATE_OWNER_INDEX).execute(pool).await?;
    Ok(())
}

pub(super) async fn find_by_share_token(pool: &SqlitePool, token: &str) -> AppResult<Option<StoredReport>> {
    sqlx::query_as::<_, ReportRow>("SELECT * FROM reports WHERE share_token = ?1")
        .bind(token)
        .fetch_optional(pool)
        .await?
        .map(ReportRow::into_stored)
        .transpose()
}

pub(super) async fn find_for_owner(
    pool: &SqlitePool,
    id: &str,
    owner_uid: &str,
) -> AppResult<Option<StoredReport>> {
    sqlx::query_as::<_, ReportRow>("SELECT * FROM reports WHERE id = ?1 AND owner_uid = ?2")
        .bind(id)
        .bind(owner_uid)
        .fetch_optional(pool)
        .await?
        .map(ReportRow::into_stored)
        .transpose()
}

pub(super) async fn list_for_owner(
    pool: &SqlitePool,
    owner_uid: &str,
    page: &Pagination,
) -> AppResult<(Vec<ReportSummary>, u64)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE owner_uid = ?1")
        .bind(owner_uid)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, ReportRow>(
        r#"
        SELECT id, owner_uid, report_type, title, share_token, share_enabled, created_at, NULL AS data
        FROM reports
        WHERE owner_uid = ?1
        ORDER BY created_at DESC
        LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(owner_uid)
    .bind(page.per_page as i64)
    .bind(page.offset() as i64)
    .fetch_all(pool)
    .await?;

    let summaries = rows
        .into_iter()
        .map(|row| row.into_stored().map(|stored| ReportSummary::from(&stored)))
        .collect::<AppResult<Vec<_>>>()?;

    Ok((summaries, total.max(0) as u64))
}

pub(super) async fn set_share_token(
    pool: &SqlitePool,
    id: &str,
    owner_uid: &str,
    token: Option<&str>,
) -> AppResult<bool> {
    let result = sqlx::query(
        "UPDATE reports SET share_token = ?3, share_enabled = ?4 WHERE id = ?1 AND owner_uid = ?2",
    )
    .bind(id)
    .bind(owner_uid)
    .bind(token)
    .bind(token.is_some())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        // One long-lived connection: every in-memory connection is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    async fn insert(pool: &SqlitePool, id: &str, owner: &str, token: Option<&str>, data: &str) {
        sqlx::query(
            "INSERT INTO reports (id, owner_uid, report_type, title, share_token, share_enabled, data, created_at) VALUES (?1, ?2, 'monitoring', ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(id)
        .bind(owner)
        .bind(format!("Relatório {}", id))
        .bind(token)
        .bind(token.is_some())
        .bind(data)
        .bind(format!("2025-01-0{} 10:00:00", id.len()))
        .execute(pool)
        .await
        .unwrap();
    }

    #[test]
    fn test_share_token_lookup() {
        tokio_test::block_on(async {
            let pool = memory_pool().await;
            insert(&pool, "r1", "owner-a", Some("tok-1"), &json!({"pontos": []}).to_string()).await;

            let found = find_by_share_token(&pool, "tok-1").await.unwrap().unwrap();
            assert_eq!(found.id, "r1");
            assert!(found.share_enabled);
            assert_eq!(found.kind, Some(shared::ReportKind::Monitoring));
            assert!(found.created_at.is_some());
            assert_eq!(found.data, Some(json!({"pontos": []})));

            assert!(find_by_share_token(&pool, "missing").await.unwrap().is_none());
        });
    }

    #[test]
    fn test_owner_scoping_and_share_updates() {
        tokio_test::block_on(async {
            let pool = memory_pool().await;
            insert(&pool, "r1", "owner-a", None, "{}").await;
            insert(&pool, "r22", "owner-b", None, "{}").await;

            assert!(find_for_owner(&pool, "r1", "owner-a").await.unwrap().is_some());
            assert!(find_for_owner(&pool, "r1", "owner-b").await.unwrap().is_none());

            let (page, total) = list_for_owner(&pool, "owner-a", &Pagination::default()).await.unwrap();
            assert_eq!(total, 1);
            assert_eq!(page[0].id, "r1");

            assert!(set_share_token(&pool, "r1", "owner-a", Some("fresh")).await.unwrap());
            assert!(!set_share_token(&pool, "r1", "owner-b", Some("stolen")).await.unwrap());
            let published = find_by_share_token(&pool, "fresh").await.unwrap().unwrap();
            assert!(published.share_enabled);

            assert!(set_share_token(&pool, "r1", "owner-a", None).await.unwrap());
            assert!(find_by_share_token(&pool, "fresh").await.unwrap().is_none());
        });
    }

    #[test]
    fn test_invalid_stored_json_is_reported() {
        tokio_test::block_on(async {
            let pool = memory_pool().await;
            insert(&pool, "r1", "owner-a", Some("tok"), "{not json").await;
            let result = find_by_share_token(&pool, "tok").await;
            assert!(matches!(result, Err(AppError::UnrecognizedReport(_))));
        });
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2025-01-02 10:00:00").is_some());
        assert!(parse_timestamp("2025-01-02T10:00:00Z").is_some());
        assert!(parse_timestamp("ontem").is_none());
    }
}

//! Report data access
//!
//! A [`ReportStore`] fetches raw report rows from Postgres (Supabase), a
//! local SQLite file or the built-in demo fixtures. Rows carry the report
//! payload untouched; interpretation is left to the normalizer.

pub mod mock;
mod postgres;
mod sqlite;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use shared::{Pagination, ReportKind};
use sqlx::{postgres::PgPoolOptions, sqlite::SqliteConnectOptions, PgPool, SqlitePool};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// A report row as stored
#[derive(Debug, Clone)]
pub struct StoredReport {
    pub id: String,
    pub owner_uid: Option<String>,
    /// Kind recorded next to the payload, if any
    pub kind: Option<ReportKind>,
    pub title: Option<String>,
    pub share_token: Option<String>,
    pub share_enabled: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub data: Option<Value>,
}

/// Listing entry for the owner's report index
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub id: String,
    pub kind: Option<ReportKind>,
    pub title: Option<String>,
    pub share_token: Option<String>,
    pub share_enabled: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&StoredReport> for ReportSummary {
    fn from(report: &StoredReport) -> Self {
        Self {
            id: report.id.clone(),
            kind: report.kind,
            title: report.title.clone(),
            share_token: report.share_token.clone(),
            share_enabled: report.share_enabled,
            created_at: report.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Postgres,
    Sqlite,
    Mock,
}

/// Connectivity of the configured store
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub source: SourceKind,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Clone)]
pub enum ReportStore {
    Postgres(PgPool),
    Sqlite(SqlitePool),
    /// No database configured; only the demo fallback can serve reports
    Mock,
}

impl ReportStore {
    /// Connect to Postgres when a URL is configured, else SQLite when a path
    /// is configured, else fall back to fixtures only.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        if let Some(url) = config.database.url.as_deref().filter(|u| !u.trim().is_empty()) {
            tracing::info!("Connecting to Postgres report store...");
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(url)
                .await?;

            if config.database.run_migrations {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Migrations completed");
            }
            return Ok(ReportStore::Postgres(pool));
        }

        if let Some(path) = config.sqlite.path.as_deref().filter(|p| !p.trim().is_empty()) {
            tracing::info!("Opening SQLite report store at {}", path);
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);
            let pool = SqlitePool::connect_with(options).await?;
            sqlite::init_schema(&pool).await?;
            return Ok(ReportStore::Sqlite(pool));
        }

        tracing::warn!("No report store configured; serving demo fixtures only");
        Ok(ReportStore::Mock)
    }

    pub fn source(&self) -> SourceKind {
        match self {
            ReportStore::Postgres(_) => SourceKind::Postgres,
            ReportStore::Sqlite(_) => SourceKind::Sqlite,
            ReportStore::Mock => SourceKind::Mock,
        }
    }

    /// Report published under `token`, whether or not sharing is enabled.
    ///
    /// The fixture store holds no reports of its own: demo fixtures are only
    /// reachable through the service's fallback, which honours
    /// `fallback.mock_enabled`.
    pub async fn find_by_share_token(&self, token: &str) -> AppResult<Option<StoredReport>> {
        match self {
            ReportStore::Postgres(pool) => postgres::find_by_share_token(pool, token).await,
            ReportStore::Sqlite(pool) => sqlite::find_by_share_token(pool, token).await,
            ReportStore::Mock => Ok(None),
        }
    }

    /// Report `id` if it belongs to `owner_uid`
    pub async fn find_for_owner(&self, id: &str, owner_uid: &str) -> AppResult<Option<StoredReport>> {
        match self {
            ReportStore::Postgres(pool) => postgres::find_for_owner(pool, id, owner_uid).await,
            ReportStore::Sqlite(pool) => sqlite::find_for_owner(pool, id, owner_uid).await,
            ReportStore::Mock => Ok(None),
        }
    }

    /// Page of the owner's reports, newest first, with the total count
    pub async fn list_for_owner(
        &self,
        owner_uid: &str,
        page: &Pagination,
    ) -> AppResult<(Vec<ReportSummary>, u64)> {
        match self {
            ReportStore::Postgres(pool) => postgres::list_for_owner(pool, owner_uid, page).await,
            ReportStore::Sqlite(pool) => sqlite::list_for_owner(pool, owner_uid, page).await,
            ReportStore::Mock => Ok((Vec::new(), 0)),
        }
    }

    /// Set or clear the share token. Returns false when the report does not
    /// exist or belongs to someone else.
    pub async fn set_share_token(
        &self,
        id: &str,
        owner_uid: &str,
        token: Option<&str>,
    ) -> AppResult<bool> {
        match self {
            ReportStore::Postgres(pool) => postgres::set_share_token(pool, id, owner_uid, token).await,
            ReportStore::Sqlite(pool) => sqlite::set_share_token(pool, id, owner_uid, token).await,
            ReportStore::Mock => Err(AppError::StoreUnavailable(
                "demo fixtures are read-only".to_string(),
            )),
        }
    }

    pub async fn probe(&self) -> SourceStatus {
        let result = match self {
            ReportStore::Postgres(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
            ReportStore::Sqlite(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
            ReportStore::Mock => Ok(()),
        };

        SourceStatus {
            source: self.source(),
            connected: result.is_ok(),
            detail: result.err().map(|e| e.to_string()),
        }
    }
}

/// Parse a stored kind label; unknown labels are left to detection
fn parse_kind(label: Option<&str>) -> Option<ReportKind> {
    label.and_then(|l| l.parse().ok())
}

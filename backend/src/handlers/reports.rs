//! Owner report handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use shared::{PaginatedResponse, Pagination};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::report::{ReportView, ShareLink};
use crate::store::ReportSummary;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ListReportsQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub per_page: Option<u32>,
}

impl ListReportsQuery {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// List the caller's reports
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListReportsQuery>,
) -> AppResult<Json<PaginatedResponse<ReportSummary>>> {
    query.validate()?;
    let page = state
        .report_service()
        .list_owned(&user.uid, &query.pagination())
        .await?;
    Ok(Json(page))
}

/// Get one of the caller's reports
pub async fn get_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ReportView>> {
    let view = state.report_service().get_owned(&id, &user.uid).await?;
    Ok(Json(view))
}

/// Issue (or rotate) the share link of a report
pub async fn create_share_link(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<ShareLink>)> {
    tracing::debug!(email = ?user.email, "share link requested");
    let link = state.report_service().share(&id, &user.uid).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// Revoke the share link of a report
pub async fn revoke_share_link(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.report_service().revoke_share(&id, &user.uid).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = ListReportsQuery { page: None, per_page: None };
        assert!(query.validate().is_ok());
        let page = query.pagination();
        assert_eq!((page.page, page.per_page), (1, 20));
    }

    #[test]
    fn test_query_bounds() {
        assert!(ListReportsQuery { page: Some(0), per_page: None }.validate().is_err());
        assert!(ListReportsQuery { page: Some(1), per_page: Some(101) }.validate().is_err());
        assert!(ListReportsQuery { page: Some(3), per_page: Some(100) }.validate().is_ok());
    }
}

//! Public share-token handlers
//!
//! Unauthenticated: anyone holding the link can read the report.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::{error::AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ShareQuery {
    /// "json" (default) or "csv"
    pub format: Option<String>,
}

/// Get a shared report, or its per-point metrics as CSV
pub async fn get_shared_report(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<ShareQuery>,
) -> AppResult<impl IntoResponse> {
    let service = state.report_service();

    if query.format.as_deref() == Some("csv") {
        let csv = service.shared_point_metrics_csv(&token).await?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"pontos_monitoramento.csv\""),
            ],
            csv,
        )
            .into_response())
    } else {
        let view = service.get_shared(&token).await?;
        Ok(Json(view).into_response())
    }
}

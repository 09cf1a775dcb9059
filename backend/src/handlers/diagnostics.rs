//! Share-link troubleshooting endpoint

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::services::diagnostics::{DiagnosticsService, ShareDiagnostics};
use crate::AppState;

/// Trace the lookup of a share token. Disabled unless `diagnostics.enabled`.
pub async fn diagnose_share(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<ShareDiagnostics>> {
    if !state.config.diagnostics.enabled {
        return Err(AppError::NotFound("Diagnostics".to_string()));
    }

    let service = DiagnosticsService::new(state.store.clone(), state.config.fallback.mock_enabled);
    let report = service.diagnose_share(&token).await;
    tracing::info!(
        fingerprint = %report.token_fingerprint,
        resolves = report.resolves(),
        "share diagnostics"
    );
    Ok(Json(report))
}

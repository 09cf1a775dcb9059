//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::store::SourceStatus;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: SourceStatus,
    pub mock_fallback: bool,
    pub knowledge_entries: usize,
}

/// Liveness probe
pub async fn health_check() -> &'static str {
    "OK"
}

/// Report store status
pub async fn store_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store.probe().await;

    Json(HealthResponse {
        status: if store.connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store,
        mock_fallback: state.config.fallback.mock_enabled,
        knowledge_entries: state.knowledge.len(),
    })
}

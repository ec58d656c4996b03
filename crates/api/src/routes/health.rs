use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether the QR artifact directory exists.
    pub qr_dir_ready: bool,
}

/// GET /health -- returns service, database, and QR directory health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = gymar_db::health_check(&state.pool).await.is_ok();
    let qr_dir_ready = tokio::fs::metadata(state.qr_store.dir())
        .await
        .is_ok_and(|m| m.is_dir());

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        qr_dir_ready,
    })
}

/// Mount health check routes (root level, not under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

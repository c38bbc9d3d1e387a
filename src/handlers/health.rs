use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::handlers::AppState;

/// Component health status
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: ComponentStatus,
    database: ComponentStatus,
    version: &'static str,
}

/// Liveness + database ping.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match state.db.ping().await {
        Ok(()) => ComponentStatus::Up,
        Err(_) => ComponentStatus::Down,
    };

    Json(HealthResponse {
        status: ComponentStatus::Up,
        database,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Minimal readiness probe with no dependencies.
async fn liveness() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}

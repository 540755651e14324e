//! Liveness endpoint, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

const STATUS_OK: &str = "ok";
const STATUS_DEGRADED: &str = "degraded";

/// Body of `GET /health`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}

impl HealthResponse {
    fn new(db_healthy: bool) -> Self {
        Self {
            status: if db_healthy { STATUS_OK } else { STATUS_DEGRADED },
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
        }
    }
}

/// Always answers 200; a failed `SELECT 1` only flips `dbHealthy`.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match taskforge_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };
    Json(HealthResponse::new(db_healthy))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

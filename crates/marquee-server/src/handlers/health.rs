use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog().store_health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "UP".to_string(),
                store: "UP".to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "DOWN".to_string(),
                    store: "DOWN".to_string(),
                }),
            )
        },
    }
}

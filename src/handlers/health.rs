//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model: String,
    timestamp: i64,
}

/// Artifacts are loaded before the listener binds, so a response means the model is ready
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model: state.model_info.model_name.clone(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

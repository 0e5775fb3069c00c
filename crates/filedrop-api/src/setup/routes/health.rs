//! Health check handler.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub(super) struct HealthResponse {
    pub status: &'static str,
    pub storage: String,
    pub bucket: String,
}

/// Liveness probe - process is running and adapters are built.
pub(super) async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            storage: state.storage.backend_type().to_string(),
            bucket: state.storage.bucket().to_string(),
        }),
    )
}

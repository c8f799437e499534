//! Health check handler.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: &'static str,
    pub authenticated: bool,
    pub version: &'static str,
}

/// Liveness plus whether a usable platform credential is stored.
pub(super) async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let authenticated = state.auth.is_authenticated().await;
    (
        StatusCode::OK,
        Json(HealthCheckResponse {
            status: "healthy",
            authenticated,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

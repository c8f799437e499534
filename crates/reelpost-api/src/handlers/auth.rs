//! OAuth sign-in handlers.
//!
//! The anti-forgery state lives in a server-side session; the browser only holds
//! the signed session id cookie between `/auth` and `/auth/callback`.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}

#[utoipa::path(
    get,
    path = "/auth",
    tag = "auth",
    responses(
        (status = 303, description = "Redirect to the provider consent screen"),
        (status = 500, description = "OAuth client not configured", body = ErrorResponse)
    )
)]
pub async fn start_auth(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    let request = state.auth.get_auth_url()?;
    let session_id = state.sessions.store.create(request.state).await;

    tracing::debug!("Authorization started");

    Ok((
        [(header::SET_COOKIE, state.sessions.cookie.set_cookie(&session_id))],
        Redirect::to(&request.url),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/auth/callback",
    tag = "auth",
    params(
        ("code" = Option<String>, Query, description = "Authorization code"),
        ("state" = Option<String>, Query, description = "Anti-forgery state issued by /auth"),
        ("error" = Option<String>, Query, description = "Provider error, e.g. access_denied")
    ),
    responses(
        (status = 303, description = "Credential stored, redirect to /"),
        (status = 500, description = "Authorization failed", body = ErrorResponse)
    )
)]
pub async fn auth_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response, HttpAppError> {
    let expected_state = match state.sessions.cookie.session_id(&headers) {
        Some(session_id) => state.sessions.store.take_state(&session_id).await,
        None => None,
    };
    if expected_state.is_none() {
        tracing::warn!("OAuth callback without a live session");
    }

    let redirect_uri = state.config.redirect_uri();
    let callback_url = match query.as_deref().filter(|q| !q.is_empty()) {
        Some(query) => format!("{}?{}", redirect_uri, query),
        None => redirect_uri.to_string(),
    };

    state
        .auth
        .handle_callback(&callback_url, expected_state.as_deref())
        .await?;

    Ok((
        [(header::SET_COOKIE, state.sessions.cookie.clear_cookie())],
        Redirect::to("/"),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/auth/status",
    tag = "auth",
    responses((status = 200, description = "Whether a usable credential is stored", body = AuthStatusResponse))
)]
pub async fn auth_status(State(state): State<Arc<AppState>>) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        authenticated: state.auth.is_authenticated().await,
    })
}

#[utoipa::path(
    get,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 303, description = "Credential removed, redirect to /"),
        (status = 500, description = "Credential store error", body = ErrorResponse)
    )
)]
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Redirect, HttpAppError> {
    state.auth.logout().await?;
    tracing::info!("Signed out");
    Ok(Redirect::to("/"))
}

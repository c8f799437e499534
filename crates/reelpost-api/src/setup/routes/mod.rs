//! Route configuration and setup.

mod health;

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use reelpost_core::Config;
use reelpost_infra::{
    get_request_id, request_id_middleware, security_headers_middleware, SecurityHeadersConfig,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Room for the thumbnail and form fields on top of the largest accepted video.
const MULTIPART_OVERHEAD_BYTES: usize = 16 * 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let security_headers_config = Arc::new(SecurityHeadersConfig::new(config.is_hosted()));
    let body_limit = config
        .max_video_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    tracing::info!(
        http_concurrency_limit = HTTP_CONCURRENCY_LIMIT,
        body_limit_bytes = body_limit,
        "HTTP limits configured"
    );

    let app = page_routes()
        .merge(auth_routes())
        .merge(upload_routes())
        .merge(frame_routes())
        .route("/health", get(health::health_check))
        .with_state(state)
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::ApiDoc::openapi()) }),
        )
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %get_request_id(request).unwrap_or_default(),
            )
        }))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ));

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn page_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(handlers::index::index))
}

fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth", get(handlers::auth::start_auth))
        .route("/auth/callback", get(handlers::auth::auth_callback))
        .route("/auth/status", get(handlers::auth::auth_status))
        .route("/auth/logout", get(handlers::auth::logout))
}

fn upload_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(handlers::upload::upload_video))
        .route("/upload/token", post(handlers::upload::create_upload_token))
        .route(
            "/upload/progress/{upload_id}",
            get(handlers::upload::get_upload_progress),
        )
}

fn frame_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/extract-frames", post(handlers::frames::extract_frames))
        .route("/frames/{filename}", get(handlers::frames::get_frame))
}

//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use reelpost_core::Config;
use std::sync::Arc;

pub use services::ServiceDeps;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    reelpost_infra::init_telemetry(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.log_json(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    tracing::info!("Configuration loaded and validated successfully");

    let deps = services::production_deps(&config)?;
    build_app(config, deps).await
}

/// Wire state and routes from already-built dependencies.
pub async fn build_app(config: Config, deps: ServiceDeps) -> Result<(Arc<AppState>, axum::Router)> {
    let state = services::initialize_services(&config, deps).await?;
    let router = routes::setup_routes(&config, state.clone())?;
    Ok((state, router))
}

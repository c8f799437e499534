//! Reelpost API Library
//!
//! This crate provides the HTTP handlers, middleware wiring, and application setup.

mod api_doc;
mod handlers;
mod utils;

pub mod error;
pub mod setup;
pub mod state;

pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
pub use setup::{build_app, initialize_app, ServiceDeps};
pub use state::AppState;

//! Data models for the application
//!
//! Each sub-module represents a specific feature area.

mod category;
mod credential;
mod frame;
mod upload;

// Re-export all models for convenient imports
pub use category::*;
pub use credential::*;
pub use frame::*;
pub use upload::*;

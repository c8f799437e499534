pub mod auth;
pub mod frames;
pub mod index;
pub mod upload;

//! HTTP API for the monitoring dashboard.
//!
//! This module contains all API-related functionality.

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use routes::configure;

//! API Middleware Module
//!
//! Provides CORS handling for every route and Basic authentication for the
//! back-office routes.

pub mod auth;
pub mod cors;

pub use auth::{admin_validator, credentials_match, render_missing_credentials, unauthorized};
pub use cors::{Cors, ALLOW_HEADERS, ALLOW_METHODS};

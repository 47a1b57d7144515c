//! Shared error body for every endpoint

use actix_web::HttpResponse;
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::ValidationError;
use crate::supabase::UpstreamError;

/// Error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ApiError,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    /// Names of absent required fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        ErrorResponse {
            success: false,
            error: ApiError {
                code: code.to_string(),
                message: message.into(),
                missing: None,
            },
        }
    }
}

impl From<&ValidationError> for ErrorResponse {
    fn from(err: &ValidationError) -> Self {
        ErrorResponse {
            success: false,
            error: ApiError {
                code: err.code().to_string(),
                message: err.to_string(),
                missing: err.missing_fields(),
            },
        }
    }
}

/// 400 for rejected client input
pub fn validation_error(err: &ValidationError) -> HttpResponse {
    warn!(code = err.code(), error = %err, "Rejected request");
    HttpResponse::BadRequest().json(ErrorResponse::from(err))
}

/// 500 relaying the upstream failure text
pub fn upstream_error(context: &str, err: &UpstreamError) -> HttpResponse {
    error!(error = %err, "{}", context);
    HttpResponse::InternalServerError().json(ErrorResponse::new(
        "UPSTREAM_ERROR",
        format!("{}: {}", context, err),
    ))
}

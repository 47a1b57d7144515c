//! OpenAPI 3.0 specification definition

use utoipa::OpenApi;

use crate::api::handlers::{
    admin::{
        ListResponse, LoginRequest, MessageResponse, UpdateStatusRequest, UpdateStatusResponse,
    },
    health::HealthResponse,
    sign::{SignRequest, SignResponse},
    submit::SubmitResponse,
};
use crate::api::response::{ApiError, ErrorResponse};
use crate::domain::{FilePayload, Submission, SubmissionId, SubmissionStatus, SubmitRequest};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Submission Gateway API",
        version = "1.0.0",
        description = "Article intake and moderation in front of Supabase",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "submissions", description = "Public submission intake"),
        (name = "uploads", description = "Direct-to-storage uploads"),
        (name = "admin", description = "Review and moderation, HTTP Basic auth")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::submit::submit,
        crate::api::handlers::sign::sign_upload,
        crate::api::handlers::admin::login,
        crate::api::handlers::admin::list_submissions,
        crate::api::handlers::admin::update_status,
    ),
    components(
        schemas(
            // System schemas
            HealthResponse,
            ErrorResponse,
            ApiError,
            // Intake schemas
            SubmitRequest,
            FilePayload,
            SubmitResponse,
            SignRequest,
            SignResponse,
            // Admin schemas
            LoginRequest,
            MessageResponse,
            ListResponse,
            UpdateStatusRequest,
            UpdateStatusResponse,
            // Domain schemas
            Submission,
            SubmissionId,
            SubmissionStatus,
        )
    )
)]
pub struct ApiDoc;

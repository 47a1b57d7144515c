//! Back-office endpoints
//!
//! Login checks the configured credentials. Listing and review sit behind
//! Basic auth (see [`crate::api::middleware::auth`]).

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::api::middleware::{credentials_match, unauthorized};
use crate::api::response::{upstream_error, validation_error, ErrorResponse};
use crate::domain::{
    ListFilter, RawRow, Submission, SubmissionId, SubmissionStatus, ValidationError,
};
use crate::AppState;

/// Header carrying the exact row count of a listing
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Generic success message
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Listing query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// pending, approved or rejected
    pub status: Option<String>,
    pub category: Option<String>,
    /// Matched case-insensitively against title and content
    pub search: Option<String>,
    /// 1-based page number
    pub page: Option<u32>,
    /// Rows per page, 1 to 100
    pub limit: Option<u32>,
}

impl ListQuery {
    /// Build the upstream filter; blank parameters count as absent
    pub fn to_filter(&self) -> Result<ListFilter, ValidationError> {
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<SubmissionStatus>)
            .transpose()?;

        Ok(ListFilter::new(
            status,
            self.category.as_deref(),
            self.search.as_deref(),
            self.page,
            self.limit,
        ))
    }
}

/// One page of submissions
#[derive(Serialize, ToSchema)]
pub struct ListResponse {
    pub success: bool,
    /// Rows exactly as stored
    #[schema(value_type = Vec<Submission>)]
    pub data: Vec<RawRow>,
    /// Exact match count, when the database reported one
    pub total: Option<u64>,
    pub page: u32,
    pub limit: u32,
}

/// Status change request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub id: Option<SubmissionId>,
    #[serde(default)]
    pub status: Option<String>,
}

/// The row after its status changed
#[derive(Serialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub success: bool,
    #[schema(value_type = Submission)]
    pub data: RawRow,
}

/// POST /admin/login - Check admin credentials
#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = MessageResponse),
        (status = 401, description = "Wrong username or password", body = ErrorResponse)
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> HttpResponse {
    if credentials_match(&state.settings.admin, &body.username, &body.password) {
        info!(username = %body.username, "Admin logged in");
        HttpResponse::Ok().json(MessageResponse {
            success: true,
            message: "Login successful".to_string(),
        })
    } else {
        warn!(username = %body.username, "Admin login failed");
        unauthorized("Invalid username or password")
    }
}

/// GET /admin/submissions - List submissions
#[utoipa::path(
    get,
    path = "/admin/submissions",
    tag = "admin",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of submissions, newest first", body = ListResponse),
        (status = 400, description = "Unknown status filter", body = ErrorResponse),
        (status = 401, description = "Missing or wrong admin credentials"),
        (status = 500, description = "Database query failed", body = ErrorResponse)
    )
)]
pub async fn list_submissions(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(e) => return validation_error(&e),
    };

    match state.store.list(&filter).await {
        Ok(page) => {
            info!(
                count = page.rows.len(),
                total = ?page.total,
                page = filter.page,
                "Retrieved submissions"
            );

            let mut response = HttpResponse::Ok();
            if let Some(total) = page.total {
                response.insert_header((TOTAL_COUNT_HEADER, total.to_string()));
            }
            response.json(ListResponse {
                success: true,
                data: page.rows,
                total: page.total,
                page: filter.page,
                limit: filter.limit,
            })
        }
        Err(e) => upstream_error("Failed to fetch submissions", &e),
    }
}

/// POST|PATCH /admin/update-status - Approve or reject a submission
#[utoipa::path(
    patch,
    path = "/admin/update-status",
    tag = "admin",
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = UpdateStatusResponse),
        (status = 400, description = "Missing id or unknown status", body = ErrorResponse),
        (status = 401, description = "Missing or wrong admin credentials"),
        (status = 404, description = "No submission with that id", body = ErrorResponse),
        (status = 500, description = "Database update failed", body = ErrorResponse)
    )
)]
pub async fn update_status(
    state: web::Data<AppState>,
    body: web::Json<UpdateStatusRequest>,
) -> HttpResponse {
    let body = body.into_inner();

    let mut missing = Vec::new();
    let id = body.id.filter(|id| !id.is_blank());
    if id.is_none() {
        missing.push("id");
    }
    let status = body.status.filter(|s| !s.trim().is_empty());
    if status.is_none() {
        missing.push("status");
    }
    let (id, status) = match (id, status) {
        (Some(id), Some(status)) => (id, status),
        _ => return validation_error(&ValidationError::MissingFields(missing)),
    };

    let status = match status.parse::<SubmissionStatus>() {
        Ok(status) => status,
        Err(e) => return validation_error(&e),
    };

    match state.store.update_status(&id, status).await {
        Ok(Some(row)) => {
            info!(id = %id, status = %status, "Submission status updated");
            HttpResponse::Ok().json(UpdateStatusResponse {
                success: true,
                data: row,
            })
        }
        Ok(None) => {
            warn!(id = %id, "Status update matched no submission");
            HttpResponse::NotFound().json(ErrorResponse::new(
                "NOT_FOUND",
                format!("Submission '{}' does not exist", id),
            ))
        }
        Err(e) => upstream_error("Failed to update status", &e),
    }
}

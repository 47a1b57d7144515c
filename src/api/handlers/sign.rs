//! Signed upload URL endpoint
//!
//! Large attachments skip the JSON body: the browser asks for a signed URL,
//! uploads straight to the bucket, then submits with `fileUrl` set.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::api::response::{upstream_error, validation_error, ErrorResponse};
use crate::domain::signed_upload_name;
use crate::supabase::UPLOADS_PREFIX;
use crate::AppState;

/// Request body for a signed upload URL
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignRequest {
    /// Desired file name, at most 255 characters
    #[serde(rename = "fileName", default)]
    pub file_name: Option<String>,
}

/// Signed upload URL
#[derive(Serialize, ToSchema)]
pub struct SignResponse {
    #[serde(rename = "signedUrl")]
    pub signed_url: String,
    /// Collision-resistant name the file will be stored under
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// Path inside the bucket
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// POST /sign - Issue a signed upload URL
#[utoipa::path(
    post,
    path = "/sign",
    tag = "uploads",
    request_body = SignRequest,
    responses(
        (status = 200, description = "Signed URL issued", body = SignResponse),
        (status = 400, description = "Missing or invalid file name", body = ErrorResponse),
        (status = 500, description = "Storage service refused", body = ErrorResponse)
    )
)]
pub async fn sign_upload(
    state: web::Data<AppState>,
    body: web::Json<SignRequest>,
) -> HttpResponse {
    let requested = body.into_inner().file_name.unwrap_or_default();

    let file_name = match signed_upload_name(&requested) {
        Ok(name) => name,
        Err(e) => return validation_error(&e),
    };
    let path = format!("{}/{}", UPLOADS_PREFIX, file_name);

    match state.storage.create_signed_upload(&path).await {
        Ok(signed) => {
            info!(path = %signed.path, "Signed upload URL issued");
            HttpResponse::Ok().json(SignResponse {
                signed_url: signed.signed_url,
                file_name,
                path: signed.path,
                token: signed.token,
            })
        }
        Err(e) => upstream_error("Sign URL generation failed", &e),
    }
}

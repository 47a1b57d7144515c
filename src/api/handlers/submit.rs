//! Submission intake endpoint

use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::future::try_join_all;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::api::response::{upstream_error, validation_error, ErrorResponse};
use crate::domain::{
    DecodedFile, NewSubmission, SubmissionId, SubmissionRules, SubmissionStatus, SubmitRequest,
};
use crate::supabase::{ObjectStorage, UpstreamError, ATTACHMENTS_PREFIX, IMAGES_PREFIX};
use crate::AppState;

/// Response for an accepted submission
#[derive(Serialize, ToSchema)]
pub struct SubmitResponse {
    pub success: bool,
    pub id: SubmissionId,
    pub message: String,
}

async fn upload_file(
    storage: &dyn ObjectStorage,
    prefix: &str,
    file: &DecodedFile,
) -> Result<String, UpstreamError> {
    let path = format!("{}/{}", prefix, file.file_name);
    let stored = storage.upload(&path, &file.content_type, file.bytes.clone()).await?;
    Ok(stored.public_url)
}

/// POST /submit - Accept a new submission
#[utoipa::path(
    post,
    path = "/submit",
    tag = "submissions",
    request_body = SubmitRequest,
    responses(
        (status = 201, description = "Submission stored as pending", body = SubmitResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 500, description = "Upload or insert failed upstream", body = ErrorResponse)
    )
)]
pub async fn submit(
    state: web::Data<AppState>,
    body: web::Json<SubmitRequest>,
) -> HttpResponse {
    let rules = SubmissionRules::new(&state.settings.submission);

    let draft = match rules.validate(body.into_inner()) {
        Ok(draft) => draft,
        Err(e) => return validation_error(&e),
    };

    info!(
        title = %draft.title,
        category = %draft.category,
        images = draft.images.len(),
        has_attachment = draft.attachment.is_some(),
        "Processing submission"
    );

    // Every file must land before the row is written
    let uploads = draft
        .images
        .iter()
        .map(|image| upload_file(state.storage.as_ref(), IMAGES_PREFIX, image));
    let images = match try_join_all(uploads).await {
        Ok(urls) => urls,
        Err(e) => return upstream_error("Image upload failed", &e),
    };

    let file_url = match &draft.attachment {
        Some(attachment) => {
            match upload_file(state.storage.as_ref(), ATTACHMENTS_PREFIX, attachment).await {
                Ok(url) => Some(url),
                Err(e) => return upstream_error("Attachment upload failed", &e),
            }
        }
        None => draft.file_url,
    };

    let row = NewSubmission {
        title: draft.title,
        content: draft.content,
        category: draft.category,
        author: draft.author,
        status: SubmissionStatus::Pending,
        created_at: Utc::now(),
        images,
        file_url,
    };

    match state.store.insert(&row).await {
        Ok(id) => {
            info!(id = %id, "Submission created");
            HttpResponse::Created().json(SubmitResponse {
                success: true,
                id,
                message: "Submission created".to_string(),
            })
        }
        Err(e) => upstream_error("Database error", &e),
    }
}

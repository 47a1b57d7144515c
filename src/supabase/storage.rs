//! Supabase Storage access
//!
//! ## Object layout
//! ```text
//! {bucket}/
//! ├── images/        # images posted inline with a submission
//! ├── attachments/   # the optional attachment of a submission
//! └── uploads/       # files uploaded by the browser through a signed URL
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{info, instrument};

use super::client::SupabaseClient;
use super::traits::{ObjectStorage, SignedUpload, StoredObject, UpstreamError, UpstreamResult};

pub const IMAGES_PREFIX: &str = "images";
pub const ATTACHMENTS_PREFIX: &str = "attachments";
pub const UPLOADS_PREFIX: &str = "uploads";

/// Answer of `POST /object/upload/sign/{bucket}/{path}`
#[derive(Debug, Deserialize)]
struct SignUploadResponse {
    #[serde(alias = "signedURL", alias = "signedUrl")]
    url: String,
    #[serde(default)]
    token: Option<String>,
}

/// Extract the `token` query parameter from a signed URL
fn token_from_url(signed_url: &str) -> Option<String> {
    let parsed = url::Url::parse(signed_url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
}

#[async_trait]
impl ObjectStorage for SupabaseClient {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn upload(&self, path: &str, content_type: &str, data: Bytes) -> UpstreamResult<StoredObject> {
        let size = data.len();

        self.execute(
            self.post(&self.storage_url("", path))
                .header(CONTENT_TYPE, content_type)
                .header("x-upsert", "false")
                .body(data),
        )
        .await?;

        info!(path = %path, size, "Uploaded object");

        Ok(StoredObject {
            path: path.to_string(),
            public_url: self.storage_url("public/", path),
        })
    }

    #[instrument(skip(self))]
    async fn create_signed_upload(&self, path: &str) -> UpstreamResult<SignedUpload> {
        let response = self
            .execute(
                self.post(&self.storage_url("upload/sign/", path))
                    .json(&serde_json::json!({})),
            )
            .await?;

        let body: SignUploadResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(format!("sign response: {}", e)))?;

        let signed_url = self.absolute_storage_url(&body.url);
        let token = body.token.or_else(|| token_from_url(&signed_url));

        info!(path = %path, "Issued signed upload URL");

        Ok(SignedUpload {
            path: path.to_string(),
            signed_url,
            token,
        })
    }
}

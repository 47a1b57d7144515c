//! File payloads carried inside a submission
//!
//! The submission form reads each file in the browser and posts it as base64
//! alongside its name and MIME type. Files are decoded and size-checked here,
//! then renamed so that two visitors uploading `photo.jpg` never collide in
//! the bucket.

use base64::Engine;
use bytes::Bytes;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use utoipa::ToSchema;

use super::intake::ValidationError;

/// Longest file name accepted by the signed-upload endpoint
pub const MAX_FILE_NAME_CHARS: usize = 255;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file as posted by the submission form
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FilePayload {
    /// Base64 data, with or without a `data:<mime>;base64,` prefix
    pub base64: String,
    #[serde(rename = "fileName", default)]
    pub file_name: String,
    #[serde(rename = "type", default)]
    pub content_type: String,
}

/// A decoded file ready for upload
#[derive(Debug, Clone)]
pub struct DecodedFile {
    /// Collision-resistant object name
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl FilePayload {
    /// Decode the payload and enforce the size limit
    pub fn decode(&self, max_bytes: usize) -> Result<DecodedFile, ValidationError> {
        let display_name = if self.file_name.is_empty() { "file" } else { self.file_name.as_str() };

        let data = match self.base64.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => self.base64.as_str(),
        };
        let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();

        if data.is_empty() {
            return Err(ValidationError::EmptyFile(display_name.to_string()));
        }

        // Reject before decoding when the encoded length already rules it out
        if data.len() / 4 * 3 > max_bytes + 2 {
            return Err(ValidationError::FileTooLarge {
                name: display_name.to_string(),
                max_bytes,
            });
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data.as_bytes())
            .map_err(|_| ValidationError::InvalidBase64(display_name.to_string()))?;

        if bytes.len() > max_bytes {
            return Err(ValidationError::FileTooLarge {
                name: display_name.to_string(),
                max_bytes,
            });
        }

        let content_type = if self.content_type.trim().is_empty() {
            FALLBACK_CONTENT_TYPE.to_string()
        } else {
            self.content_type.trim().to_lowercase()
        };

        Ok(DecodedFile {
            file_name: unique_file_name(&self.file_name),
            content_type,
            bytes: Bytes::from(bytes),
        })
    }
}

/// `{unix_millis}-{6 random alphanumerics}.{ext}`, keeping only the original
/// extension.
pub fn unique_file_name(original: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    let stem = format!("{}-{}", Utc::now().timestamp_millis(), suffix);

    match file_extension(original) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

fn file_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(10)
        .collect::<String>()
        .to_lowercase();

    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// Object name for a direct client upload: `{unix_millis}-{sanitized}` where
/// only `[A-Za-z0-9._-]` survive.
pub fn signed_upload_name(requested: &str) -> Result<String, ValidationError> {
    let requested = requested.trim();
    if requested.is_empty() || requested.chars().count() > MAX_FILE_NAME_CHARS {
        return Err(ValidationError::InvalidFileName);
    }

    let sanitized: String = requested
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    // A name made only of dots would address a parent path
    let sanitized = if sanitized.chars().all(|c| c == '.') {
        "file".to_string()
    } else {
        sanitized
    };

    Ok(format!("{}-{}", Utc::now().timestamp_millis(), sanitized))
}

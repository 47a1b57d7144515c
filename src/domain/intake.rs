//! Intake validation
//!
//! Turns the raw form payload into a [`ValidatedSubmission`] or a
//! [`ValidationError`] that the handler reports as a 400.

use serde::Deserialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::SubmissionSettings;
use super::files::{DecodedFile, FilePayload};

/// Client input errors
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Title must be at least {min} characters")]
    TitleTooShort { min: usize },

    #[error("Content must be at least {min} characters")]
    ContentTooShort { min: usize },

    #[error("At most {max} images are allowed")]
    TooManyImages { max: usize },

    #[error("Unsupported image type '{0}'")]
    UnsupportedImageType(String),

    #[error("File '{name}' exceeds the {max_bytes} byte limit")]
    FileTooLarge { name: String, max_bytes: usize },

    #[error("File '{0}' is not valid base64")]
    InvalidBase64(String),

    #[error("File '{0}' is empty")]
    EmptyFile(String),

    #[error("Invalid status '{0}', expected pending, approved or rejected")]
    InvalidStatus(String),

    #[error("Invalid file name")]
    InvalidFileName,
}

impl ValidationError {
    /// Machine-readable code returned to clients
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingFields(_) => "MISSING_FIELDS",
            ValidationError::TitleTooShort { .. } => "TITLE_TOO_SHORT",
            ValidationError::ContentTooShort { .. } => "CONTENT_TOO_SHORT",
            ValidationError::TooManyImages { .. }
            | ValidationError::UnsupportedImageType(_)
            | ValidationError::FileTooLarge { .. }
            | ValidationError::InvalidBase64(_)
            | ValidationError::EmptyFile(_) => "INVALID_FILE",
            ValidationError::InvalidStatus(_) => "INVALID_STATUS",
            ValidationError::InvalidFileName => "INVALID_FILE_NAME",
        }
    }

    /// Field names for `MissingFields`, if any
    pub fn missing_fields(&self) -> Option<Vec<String>> {
        match self {
            ValidationError::MissingFields(fields) => {
                Some(fields.iter().map(|f| f.to_string()).collect())
            }
            _ => None,
        }
    }
}

/// Request body for `POST /submit`
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Up to `max_images` base64 images
    #[serde(default)]
    pub images: Vec<FilePayload>,
    #[serde(default)]
    pub attachment: Option<FilePayload>,
    /// Attachment already uploaded through a signed URL
    #[serde(default)]
    pub file_url: Option<String>,
}

/// A submission that passed every check, files decoded
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub title: String,
    pub content: String,
    pub category: String,
    pub author: String,
    pub images: Vec<DecodedFile>,
    pub attachment: Option<DecodedFile>,
    pub file_url: Option<String>,
}

/// Intake rules, taken from configuration
pub struct SubmissionRules<'a> {
    settings: &'a SubmissionSettings,
}

impl<'a> SubmissionRules<'a> {
    pub fn new(settings: &'a SubmissionSettings) -> Self {
        SubmissionRules { settings }
    }

    /// Validate text fields first, then decode files
    pub fn validate(&self, request: SubmitRequest) -> Result<ValidatedSubmission, ValidationError> {
        let title = non_blank(request.title);
        let content = non_blank(request.content);

        let mut missing = Vec::new();
        if title.is_none() {
            missing.push("title");
        }
        if content.is_none() {
            missing.push("content");
        }
        let (title, content) = match (title, content) {
            (Some(title), Some(content)) => (title, content),
            _ => return Err(ValidationError::MissingFields(missing)),
        };

        if title.chars().count() < self.settings.title_min_chars {
            return Err(ValidationError::TitleTooShort { min: self.settings.title_min_chars });
        }
        if content.chars().count() < self.settings.content_min_chars {
            return Err(ValidationError::ContentTooShort { min: self.settings.content_min_chars });
        }

        if request.images.len() > self.settings.max_images {
            return Err(ValidationError::TooManyImages { max: self.settings.max_images });
        }

        let mut images = Vec::with_capacity(request.images.len());
        for image in &request.images {
            let content_type = image.content_type.trim().to_lowercase();
            if !self.settings.allowed_image_types.iter().any(|t| t.eq_ignore_ascii_case(&content_type)) {
                return Err(ValidationError::UnsupportedImageType(image.content_type.clone()));
            }
            images.push(image.decode(self.settings.max_image_bytes)?);
        }

        let attachment = request
            .attachment
            .as_ref()
            .map(|file| file.decode(self.settings.max_attachment_bytes))
            .transpose()?;

        Ok(ValidatedSubmission {
            title,
            content,
            category: non_blank(request.category)
                .unwrap_or_else(|| self.settings.default_category.clone()),
            author: non_blank(request.author)
                .unwrap_or_else(|| self.settings.default_author.clone()),
            images,
            attachment,
            file_url: non_blank(request.file_url),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

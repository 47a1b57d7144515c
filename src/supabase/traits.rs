//! Upstream trait definitions
//!
//! Handlers talk to the database and to object storage only through these two
//! traits. [`SupabaseClient`](super::SupabaseClient) implements both against
//! the hosted REST APIs.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{ListFilter, NewSubmission, RawRow, SubmissionId, SubmissionStatus};

// ============================================================================
// Error Types
// ============================================================================

/// Upstream error types
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),
}

/// Result type for upstream operations
pub type UpstreamResult<T> = Result<T, UpstreamError>;

// ============================================================================
// Result Types
// ============================================================================

/// One page of rows plus the exact total when the upstream reported it
#[derive(Debug, Clone)]
pub struct SubmissionPage {
    /// Rows as stored, unknown columns included
    pub rows: Vec<RawRow>,
    pub total: Option<u64>,
}

/// An object written to the bucket
#[derive(Debug, Clone, Serialize)]
pub struct StoredObject {
    /// Path inside the bucket
    pub path: String,
    pub public_url: String,
}

/// A pre-authorized URL the browser can upload to directly
#[derive(Debug, Clone, Serialize)]
pub struct SignedUpload {
    /// Path inside the bucket
    pub path: String,
    pub signed_url: String,
    pub token: Option<String>,
}

// ============================================================================
// Store Traits
// ============================================================================

/// Row operations on the submissions table
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Insert one row and return the id the database assigned
    async fn insert(&self, submission: &NewSubmission) -> UpstreamResult<SubmissionId>;

    /// Fetch one page of rows, newest first
    async fn list(&self, filter: &ListFilter) -> UpstreamResult<SubmissionPage>;

    /// Patch the status of one row. `None` when no row has that id.
    async fn update_status(
        &self,
        id: &SubmissionId,
        status: SubmissionStatus,
    ) -> UpstreamResult<Option<RawRow>>;
}

/// Object storage bucket operations
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload bytes under `path` and return the public URL
    async fn upload(&self, path: &str, content_type: &str, data: Bytes) -> UpstreamResult<StoredObject>;

    /// Ask the storage service for a short-lived upload URL for `path`
    async fn create_signed_upload(&self, path: &str) -> UpstreamResult<SignedUpload>;
}

//! In-memory store and bucket used by handler tests

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::domain::{
    ListFilter, NewSubmission, RawRow, Submission, SubmissionId, SubmissionStatus,
};
use super::traits::{
    ObjectStorage, SignedUpload, StoredObject, SubmissionPage, SubmissionStore, UpstreamError,
    UpstreamResult,
};

fn to_raw(row: &Submission) -> UpstreamResult<RawRow> {
    match serde_json::to_value(row) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(UpstreamError::Parse(format!("row is not an object: {}", other))),
        Err(e) => Err(UpstreamError::Parse(e.to_string())),
    }
}

fn failure(message: &str) -> UpstreamError {
    UpstreamError::Api {
        status: 503,
        message: message.to_string(),
    }
}

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Submission>>,
    next_id: AtomicU64,
    fail_with: Option<String>,
}

impl MemoryStore {
    pub fn failing(message: &str) -> Self {
        MemoryStore {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn rows(&self) -> Vec<Submission> {
        self.rows.lock().unwrap().clone()
    }

    /// Add a row directly, each one a minute newer than the previous
    pub fn seed(&self, title: &str, category: &str, status: SubmissionStatus) -> SubmissionId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = Submission {
            id: SubmissionId::new(n.to_string()),
            title: title.to_string(),
            content: format!("{} body text", title),
            category: Some(category.to_string()),
            author: Some("anonymous".to_string()),
            status,
            created_at: Utc::now() + Duration::minutes(n as i64),
            images: Vec::new(),
            file_url: None,
        };
        let id = row.id.clone();
        self.rows.lock().unwrap().push(row);
        id
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn insert(&self, submission: &NewSubmission) -> UpstreamResult<SubmissionId> {
        if let Some(message) = &self.fail_with {
            return Err(failure(message));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = Submission {
            id: SubmissionId::new(n.to_string()),
            title: submission.title.clone(),
            content: submission.content.clone(),
            category: Some(submission.category.clone()),
            author: Some(submission.author.clone()),
            status: submission.status,
            created_at: submission.created_at,
            images: submission.images.clone(),
            file_url: submission.file_url.clone(),
        };
        let id = row.id.clone();
        self.rows.lock().unwrap().push(row);
        Ok(id)
    }

    async fn list(&self, filter: &ListFilter) -> UpstreamResult<SubmissionPage> {
        if let Some(message) = &self.fail_with {
            return Err(failure(message));
        }
        let mut matched: Vec<Submission> = self
            .rows()
            .into_iter()
            .filter(|row| filter.status.map_or(true, |s| row.status == s))
            .filter(|row| {
                filter
                    .category
                    .as_ref()
                    .map_or(true, |c| row.category.as_deref() == Some(c.as_str()))
            })
            .filter(|row| {
                filter.search.as_ref().map_or(true, |term| {
                    let term = term.to_lowercase();
                    row.title.to_lowercase().contains(&term) || row.content.to_lowercase().contains(&term)
                })
            })
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        let rows = matched
            .iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .map(to_raw)
            .collect::<UpstreamResult<Vec<_>>>()?;

        Ok(SubmissionPage { rows, total: Some(total) })
    }

    async fn update_status(
        &self,
        id: &SubmissionId,
        status: SubmissionStatus,
    ) -> UpstreamResult<Option<RawRow>> {
        if let Some(message) = &self.fail_with {
            return Err(failure(message));
        }
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|row| &row.id == id) {
            Some(row) => {
                row.status = status;
                to_raw(row).map(Some)
            }
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<Vec<(String, usize)>>,
    fail_with: Option<String>,
}

impl MemoryStorage {
    pub fn failing(message: &str) -> Self {
        MemoryStorage {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Paths and sizes of everything uploaded so far
    pub fn objects(&self) -> Vec<(String, usize)> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, path: &str, _content_type: &str, data: Bytes) -> UpstreamResult<StoredObject> {
        if let Some(message) = &self.fail_with {
            return Err(failure(message));
        }
        self.objects.lock().unwrap().push((path.to_string(), data.len()));
        Ok(StoredObject {
            path: path.to_string(),
            public_url: format!("https://storage.test/public/{}", path),
        })
    }

    async fn create_signed_upload(&self, path: &str) -> UpstreamResult<SignedUpload> {
        if let Some(message) = &self.fail_with {
            return Err(failure(message));
        }
        Ok(SignedUpload {
            path: path.to_string(),
            signed_url: format!("https://storage.test/upload/sign/{}?token=test-token", path),
            token: Some("test-token".to_string()),
        })
    }
}

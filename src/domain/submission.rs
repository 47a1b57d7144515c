//! Submission rows and moderation status
//!
//! A submission is owned by the remote `submissions` table. These types mirror
//! its columns; the gateway only ever creates rows, patches `status`, and
//! reads pages of rows back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::intake::ValidationError;

/// Moderation status of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        SubmissionStatus::Pending
    }
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for SubmissionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(SubmissionStatus::Pending),
            "approved" => Ok(SubmissionStatus::Approved),
            "rejected" => Ok(SubmissionStatus::Rejected),
            _ => Err(ValidationError::InvalidStatus(s.to_string())),
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row identifier generated by the database
///
/// The column may be a bigint or a UUID depending on how the table was
/// created, so both JSON numbers and strings are accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub struct SubmissionId(String);

impl SubmissionId {
    pub fn new(id: impl Into<String>) -> Self {
        SubmissionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SubmissionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => SubmissionId(s.trim().to_string()),
            RawId::Number(n) => SubmissionId(n.to_string()),
        })
    }
}

/// Documented shape of a submission row. Listings and updates forward the
/// database's own JSON ([`RawRow`]) rather than this struct.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Submission {
    pub id: SubmissionId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// A row exactly as the database returned it, every column included
pub type RawRow = serde_json::Map<String, serde_json::Value>;

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Row payload written on intake
#[derive(Debug, Clone, Serialize)]
pub struct NewSubmission {
    pub title: String,
    pub content: String,
    pub category: String,
    pub author: String,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub images: Vec<String>,
    pub file_url: Option<String>,
}

/// Largest page size the listing endpoint will forward
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Filter and pagination for the listing endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ListFilter {
    pub status: Option<SubmissionStatus>,
    pub category: Option<String>,
    /// Already stripped of query-syntax characters
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl ListFilter {
    pub fn new(
        status: Option<SubmissionStatus>,
        category: Option<&str>,
        search: Option<&str>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Self {
        ListFilter {
            status,
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
            search: search.and_then(sanitize_search_term),
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for ListFilter {
    fn default() -> Self {
        ListFilter::new(None, None, None, None, None)
    }
}

/// Strip characters that carry meaning inside a PostgREST `or=(...)` filter
/// or an `ilike` pattern (`%` and `_` are wildcards there). Returns `None` when nothing searchable is left.
pub fn sanitize_search_term(term: &str) -> Option<String> {
    let cleaned: String = term
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '%' | '_' | '"' | '\\'))
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

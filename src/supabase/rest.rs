//! PostgREST access to the submissions table

use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::domain::{ListFilter, NewSubmission, RawRow, SubmissionId, SubmissionStatus};
use super::client::SupabaseClient;
use super::traits::{SubmissionPage, SubmissionStore, UpstreamError, UpstreamResult};

const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Serialize)]
struct StatusPatch {
    status: SubmissionStatus,
}

/// The one column read back from an insert
#[derive(Deserialize)]
struct InsertedRow {
    id: SubmissionId,
}

/// Translate a listing filter into PostgREST query parameters
pub fn postgrest_params(filter: &ListFilter) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", "*".to_string()),
        ("order", "created_at.desc".to_string()),
    ];

    if let Some(status) = filter.status {
        params.push(("status", format!("eq.{}", status.as_str())));
    }
    if let Some(category) = &filter.category {
        params.push(("category", format!("eq.{}", category)));
    }
    if let Some(term) = &filter.search {
        params.push((
            "or",
            format!("(title.ilike.*{term}*,content.ilike.*{term}*)", term = term),
        ));
    }

    params.push(("offset", filter.offset().to_string()));
    params.push(("limit", filter.limit.to_string()));
    params
}

/// Total row count from a `Content-Range` header (`0-9/42`, `*/0`).
/// A `*` total means the upstream did not count.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.trim().parse().ok()
}

#[async_trait]
impl SubmissionStore for SupabaseClient {
    #[instrument(skip(self, submission), fields(title = %submission.title))]
    async fn insert(&self, submission: &NewSubmission) -> UpstreamResult<SubmissionId> {
        let response = self
            .execute(
                self.post(&self.rest_url())
                    .header("Prefer", RETURN_REPRESENTATION)
                    .json(submission),
            )
            .await?;

        let rows: Vec<InsertedRow> = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(format!("insert response: {}", e)))?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Parse("insert returned no row".to_string()))?;

        info!(id = %row.id, "Submission row inserted");
        Ok(row.id)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &ListFilter) -> UpstreamResult<SubmissionPage> {
        let response = self
            .execute(
                self.get(&self.rest_url())
                    .query(&postgrest_params(filter))
                    .header("Prefer", "count=exact"),
            )
            .await?;

        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);

        let rows: Vec<RawRow> = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(format!("list response: {}", e)))?;

        debug!(count = rows.len(), total = ?total, "Fetched submission page");
        Ok(SubmissionPage { rows, total })
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: &SubmissionId,
        status: SubmissionStatus,
    ) -> UpstreamResult<Option<RawRow>> {
        let response = self
            .execute(
                self.patch(&self.rest_url())
                    .query(&[("id", format!("eq.{}", id))])
                    .header("Prefer", RETURN_REPRESENTATION)
                    .json(&StatusPatch { status }),
            )
            .await?;

        let rows: Vec<RawRow> = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(format!("update response: {}", e)))?;

        Ok(rows.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_without_filters() {
        let params = postgrest_params(&ListFilter::default());
        assert_eq!(
            params,
            vec![
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
                ("offset", "0".to_string()),
                ("limit", "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_with_filters() {
        let filter = ListFilter::new(
            Some(SubmissionStatus::Approved),
            Some("poetry"),
            Some("moon, (night)"),
            Some(2),
            Some(25),
        );
        let params = postgrest_params(&filter);

        assert!(params.contains(&("status", "eq.approved".to_string())));
        assert!(params.contains(&("category", "eq.poetry".to_string())));
        assert!(params.contains(&("or", "(title.ilike.*moon night*,content.ilike.*moon night*)".to_string())));
        assert!(params.contains(&("offset", "25".to_string())));
        assert!(params.contains(&("limit", "25".to_string())));
    }

    use chrono::Utc;
    use serde_json::json;

    use crate::supabase::fake::{FakeSupabase, Reply, TEST_KEY};

    fn new_submission() -> NewSubmission {
        NewSubmission {
            title: "Morning on the river".to_string(),
            content: "The river was quiet that morning.".to_string(),
            category: "essay".to_string(),
            author: "anonymous".to_string(),
            status: SubmissionStatus::Pending,
            created_at: Utc::now(),
            images: vec!["https://cdn.test/a.png".to_string()],
            file_url: None,
        }
    }

    #[actix_web::test]
    async fn test_insert_posts_row_and_reads_id() {
        let fake = FakeSupabase::start(Reply::json(
            201,
            json!([{ "id": 42, "title": "Morning on the river", "created_at": "2025-01-02T03:04:05.678" }]),
        ))
        .await;

        let id = fake.client().insert(&new_submission()).await.unwrap();
        assert_eq!(id.as_str(), "42");

        let req = fake.only_request();
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/rest/v1/submissions");
        assert_eq!(req.header("prefer"), Some("return=representation"));
        assert_eq!(req.header("apikey"), Some(TEST_KEY));
        assert_eq!(req.header("authorization"), Some(format!("Bearer {}", TEST_KEY).as_str()));

        let body = req.json();
        assert_eq!(body["title"], "Morning on the river");
        assert_eq!(body["status"], "pending");
        assert_eq!(body["images"], json!(["https://cdn.test/a.png"]));

        fake.stop().await;
    }

    #[actix_web::test]
    async fn test_list_forwards_rows_untouched() {
        // Naive timestamp, null title and columns the gateway knows nothing about
        let row = json!({
            "id": 3,
            "title": null,
            "content": "Leaves",
            "status": "pending",
            "created_at": "2025-01-02T03:04:05.678",
            "email": "lin@example.com",
            "updated_at": null
        });
        let fake = FakeSupabase::start(
            Reply::json(200, json!([row.clone()])).with_header("Content-Range", "10-10/11"),
        )
        .await;

        let filter = ListFilter::new(Some(SubmissionStatus::Pending), None, Some("leaves"), Some(2), Some(10));
        let page = fake.client().list(&filter).await.unwrap();

        assert_eq!(page.total, Some(11));
        assert_eq!(page.rows.len(), 1);
        assert_eq!(serde_json::Value::Object(page.rows[0].clone()), row);

        let req = fake.only_request();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/rest/v1/submissions");
        assert_eq!(req.header("prefer"), Some("count=exact"));
        assert_eq!(req.query_value("select"), Some("*"));
        assert_eq!(req.query_value("order"), Some("created_at.desc"));
        assert_eq!(req.query_value("status"), Some("eq.pending"));
        assert_eq!(req.query_value("or"), Some("(title.ilike.*leaves*,content.ilike.*leaves*)"));
        assert_eq!(req.query_value("offset"), Some("10"));
        assert_eq!(req.query_value("limit"), Some("10"));

        fake.stop().await;
    }

    #[actix_web::test]
    async fn test_list_without_counted_total() {
        let fake = FakeSupabase::start(Reply::json(200, json!([])).with_header("Content-Range", "*/*")).await;

        let page = fake.client().list(&ListFilter::default()).await.unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.total, None);

        fake.stop().await;
    }

    #[actix_web::test]
    async fn test_update_status_patches_one_id() {
        let fake = FakeSupabase::start(Reply::json(
            200,
            json!([{ "id": "7", "status": "approved", "created_at": "2025-01-02 03:04:05", "reviewer": "sam" }]),
        ))
        .await;

        let row = fake
            .client()
            .update_status(&SubmissionId::new("7"), SubmissionStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row["status"], "approved");
        assert_eq!(row["reviewer"], "sam");

        let req = fake.only_request();
        assert_eq!(req.method, "PATCH");
        assert_eq!(req.query_value("id"), Some("eq.7"));
        assert_eq!(req.header("prefer"), Some("return=representation"));
        assert_eq!(req.json(), json!({ "status": "approved" }));

        fake.stop().await;
    }

    #[actix_web::test]
    async fn test_update_status_without_match() {
        let fake = FakeSupabase::start(Reply::json(200, json!([]))).await;

        let row = fake
            .client()
            .update_status(&SubmissionId::new("99"), SubmissionStatus::Rejected)
            .await
            .unwrap();
        assert!(row.is_none());

        fake.stop().await;
    }

    #[actix_web::test]
    async fn test_upstream_error_text_relayed() {
        let fake = FakeSupabase::start(Reply::json(
            400,
            json!({ "code": "42703", "message": "column submissions.colour does not exist" }),
        ))
        .await;

        let err = fake.client().list(&ListFilter::default()).await.unwrap_err();
        match err {
            UpstreamError::Api { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("column submissions.colour does not exist"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        fake.stop().await;
    }

    #[test]
    fn test_content_range_parsing() {
        assert_eq!(parse_content_range_total("0-9/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }
}

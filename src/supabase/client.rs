//! HTTP client for the Supabase REST and Storage APIs
//!
//! Wraps a pooled `reqwest::Client`, attaches the project key to every
//! request and turns non-2xx answers into [`UpstreamError::Api`] carrying the
//! upstream's own error text.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SupabaseSettings;
use super::traits::{UpstreamError, UpstreamResult};

/// Characters escaped inside one object-path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'?')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Supabase project client
#[derive(Clone)]
pub struct SupabaseClient {
    /// Inner HTTP client
    client: Client,

    /// Project URL without trailing slash
    base_url: String,

    api_key: String,
    pub(super) bucket: String,
    pub(super) table: String,
}

impl SupabaseClient {
    /// Create a client for the configured project
    ///
    /// # Arguments
    /// * `settings` - Project URL, key, bucket and table
    /// * `timeout` - Per-request timeout for every upstream call
    pub fn new(settings: &SupabaseSettings, timeout: Duration) -> UpstreamResult<Self> {
        let base_url = settings.url.trim().trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| UpstreamError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("submission-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(SupabaseClient {
            client,
            base_url,
            api_key: settings.key.clone(),
            bucket: settings.bucket.clone(),
            table: settings.table.clone(),
        })
    }

    /// `{base}/rest/v1/{table}`
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, encode_segment(&self.table))
    }

    /// `{base}/storage/v1/object/{kind}{bucket}/{path}`, where `kind` is
    /// empty, `public/` or `upload/sign/`
    pub fn storage_url(&self, kind: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}{}/{}",
            self.base_url,
            kind,
            encode_segment(&self.bucket),
            encode_path(path)
        )
    }

    /// Turn a storage-relative URL (`/object/...`) into an absolute one
    pub fn absolute_storage_url(&self, relative: &str) -> String {
        if relative.starts_with("http://") || relative.starts_with("https://") {
            relative.to_string()
        } else {
            format!("{}/storage/v1/{}", self.base_url, relative.trim_start_matches('/'))
        }
    }

    /// Build a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.authorized(self.client.get(url))
    }

    /// Build a POST request
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.authorized(self.client.post(url))
    }

    /// Build a PATCH request
    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.authorized(self.client.patch(url))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Send the request; any non-2xx status becomes an error with the body text
    pub async fn execute(&self, builder: RequestBuilder) -> UpstreamResult<Response> {
        let response = builder.send().await?;
        let status = response.status();

        debug!(status = status.as_u16(), url = %response.url(), "Upstream responded");

        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));

        warn!(status = status.as_u16(), message = %message, "Upstream request failed");

        Err(UpstreamError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

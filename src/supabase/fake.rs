//! Local HTTP stand-in for PostgREST and Storage, used by client tests
//!
//! Every request is recorded and answered with the same canned reply.

use actix_web::{dev::ServerHandle, http::StatusCode, web, App, HttpRequest, HttpResponse, HttpServer};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{Settings, SupabaseSettings};
use super::client::SupabaseClient;

pub const TEST_KEY: &str = "service-role-test-key";

/// One request as the server received it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Lowercased header names
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// Canned answer
#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Reply {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

struct Shared {
    reply: Reply,
    requests: Mutex<Vec<Recorded>>,
}

pub struct FakeSupabase {
    base_url: String,
    shared: Arc<Shared>,
    handle: ServerHandle,
}

impl FakeSupabase {
    /// Bind to an ephemeral local port and start answering with `reply`
    pub async fn start(reply: Reply) -> Self {
        let shared = Arc::new(Shared {
            reply,
            requests: Mutex::new(Vec::new()),
        });
        let data = web::Data::from(shared.clone());

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(record))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        tokio::spawn(server);

        FakeSupabase {
            base_url: format!("http://{}", addr),
            shared,
            handle,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client pointed at this server, default bucket and table
    pub fn client(&self) -> SupabaseClient {
        let settings = SupabaseSettings {
            url: self.base_url.clone(),
            key: TEST_KEY.to_string(),
            ..Settings::default().supabase
        };
        SupabaseClient::new(&settings, Duration::from_secs(5)).unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().unwrap().clone()
    }

    /// The single request the test expects
    pub fn only_request(&self) -> Recorded {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request: {:?}", requests);
        requests[0].clone()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

async fn record(req: HttpRequest, body: web::Bytes, shared: web::Data<Shared>) -> HttpResponse {
    let recorded = Recorded {
        method: req.method().to_string(),
        path: req.path().to_string(),
        query: url::form_urlencoded::parse(req.query_string().as_bytes())
            .into_owned()
            .collect(),
        headers: req
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
        body: body.to_vec(),
    };
    shared.requests.lock().unwrap().push(recorded);

    let reply = &shared.reply;
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = HttpResponse::build(status);
    for (name, value) in &reply.headers {
        response.insert_header((name.as_str(), value.as_str()));
    }
    response
        .content_type("application/json")
        .body(reply.body.clone())
}

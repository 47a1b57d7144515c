//! Submission Gateway
//!
//! Stateless HTTP front for a content-submission site. Accepts article
//! submissions with inline files, issues signed upload URLs, and exposes a
//! small moderation API. Rows and files live in Supabase.

use actix_web::{web, App, HttpServer, middleware};
use anyhow::Context;
use tracing::info;
use tracing_actix_web::TracingLogger;
use std::sync::Arc;
use std::time::Duration;

mod api;
mod config;
mod domain;
mod supabase;

use crate::api::middleware::Cors;
use crate::config::Settings;
use crate::supabase::{ObjectStorage, SubmissionStore, SupabaseClient};

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<dyn SubmissionStore>,
    pub storage: Arc<dyn ObjectStorage>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("submission_gateway=info".parse()?)
                .add_directive("actix_web=info".parse()?)
        )
        .json()
        .init();

    let settings = Settings::load().context("Failed to load configuration")?;
    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);

    info!(
        "Starting Submission Gateway v{} on {}",
        env!("CARGO_PKG_VERSION"),
        bind_addr
    );

    let client = Arc::new(
        SupabaseClient::new(
            &settings.supabase,
            Duration::from_secs(settings.server.request_timeout_secs),
        )
        .context("Failed to initialize Supabase client")?,
    );
    info!(
        bucket = %settings.supabase.bucket,
        table = %settings.supabase.table,
        "Supabase client ready"
    );

    let workers = settings.server.workers.unwrap_or_else(|| num_cpus::get() * 2);
    let max_body_bytes = settings.server.max_body_bytes;

    let app_state = web::Data::new(AppState {
        settings,
        store: client.clone(),
        storage: client,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(api::json_config(max_body_bytes))
            .app_data(api::query_config())
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "submission-gateway"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION")))
            )
            // Outermost, so preflights and errors still carry CORS headers
            .wrap(Cors::any_origin())
            .configure(api::configure_routes)
    })
    .workers(workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await?;

    Ok(())
}

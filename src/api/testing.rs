//! Helpers shared by handler tests

use actix_web::web;
use base64::Engine;
use std::sync::Arc;

use crate::config::Settings;
use crate::supabase::memory::{MemoryStorage, MemoryStore};
use crate::AppState;

pub const VALID_TITLE: &str = "Morning on the river";
pub const VALID_CONTENT: &str =
    "The river was quiet that morning, and the fog sat low over the reeds along the bank.";

/// Full application (routes, JSON config, CORS) over the given state
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state)
                .app_data(crate::api::json_config(1024 * 1024))
                .app_data(crate::api::query_config())
                .wrap(crate::api::middleware::Cors::any_origin())
                .configure(crate::api::configure_routes),
        )
        .await
    };
}
pub(crate) use test_app;

pub fn state(store: Arc<MemoryStore>, storage: Arc<MemoryStorage>) -> web::Data<AppState> {
    web::Data::new(AppState {
        settings: Settings::default(),
        store,
        storage,
    })
}

/// `Authorization` header for the default admin account
pub fn admin_auth() -> (&'static str, String) {
    basic_auth("admin", "123456")
}

pub fn basic_auth(username: &str, password: &str) -> (&'static str, String) {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", username, password));
    ("Authorization", format!("Basic {}", encoded))
}

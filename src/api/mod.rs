//! API module - HTTP routes and handlers

pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response;

#[cfg(test)]
pub mod testing;

use actix_web::{
    error::InternalError, http::StatusCode, middleware::ErrorHandlers, web, HttpResponse,
};
use actix_web_httpauth::middleware::HttpAuthentication;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::openapi::ApiDoc;
use crate::api::response::ErrorResponse;

/// JSON body limits and a 400 in the shared error shape for bad bodies
pub fn json_config(max_body_bytes: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_body_bytes)
        .error_handler(|err, req| {
            let message = err.to_string();
            warn!(path = %req.path(), error = %message, "Rejected JSON body");
            InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(ErrorResponse::new("INVALID_JSON", message)),
            )
            .into()
        })
}

/// Query-string parse failures (e.g. `page=abc`) as 400 in the shared error shape
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req| {
        let message = err.to_string();
        warn!(path = %req.path(), error = %message, "Rejected query string");
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ErrorResponse::new("INVALID_QUERY", message)),
        )
        .into()
    })
}

/// Configure all API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/submit")
            .route(web::post().to(handlers::submit::submit))
    )
    .service(
        web::resource("/sign")
            .route(web::post().to(handlers::sign::sign_upload))
    )
    .service(
        web::scope("/admin")
            .service(
                web::resource("/login")
                    .route(web::post().to(handlers::admin::login))
            )
            .service(
                web::resource("/submissions")
                    .wrap(HttpAuthentication::basic(middleware::admin_validator))
                    .wrap(ErrorHandlers::new().handler(
                        StatusCode::UNAUTHORIZED,
                        middleware::render_missing_credentials,
                    ))
                    .route(web::get().to(handlers::admin::list_submissions))
            )
            .service(
                web::resource("/update-status")
                    .wrap(HttpAuthentication::basic(middleware::admin_validator))
                    .wrap(ErrorHandlers::new().handler(
                        StatusCode::UNAUTHORIZED,
                        middleware::render_missing_credentials,
                    ))
                    .route(web::post().to(handlers::admin::update_status))
                    .route(web::patch().to(handlers::admin::update_status))
            )
    )
    .service(
        web::resource("/health")
            .route(web::get().to(handlers::health::health_check))
    )
    // Swagger UI and OpenAPI spec
    .service(
        SwaggerUi::new("/swagger-ui/{_:.*}")
            .url("/api-docs/openapi.json", ApiDoc::openapi())
    );
}

//! Admin Authentication
//!
//! The back-office routes accept HTTP Basic credentials matching the
//! configured admin account. The same check backs `POST /admin/login`.

use actix_web::{
    dev::{ServiceRequest, ServiceResponse},
    error::InternalError,
    http::header::{CONTENT_TYPE, WWW_AUTHENTICATE},
    middleware::ErrorHandlerResponse,
    web, Error, HttpResponse,
};
use actix_web_httpauth::extractors::basic::BasicAuth;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::api::response::ErrorResponse;
use crate::config::AdminSettings;
use crate::AppState;

/// Realm announced in the `WWW-Authenticate` challenge
pub const ADMIN_REALM: &str = "admin";

/// Hash a credential using SHA-256
fn hash_credential(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a username/password pair against the configured admin account.
/// Digests are compared so the comparison does not depend on input length.
pub fn credentials_match(admin: &AdminSettings, username: &str, password: &str) -> bool {
    let user_ok = hash_credential(username) == hash_credential(&admin.username);
    let pass_ok = hash_credential(password) == hash_credential(&admin.password);
    user_ok & pass_ok
}

/// 401 with a Basic challenge and the shared error body
pub fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((WWW_AUTHENTICATE, format!("Basic realm=\"{}\"", ADMIN_REALM)))
        .json(ErrorResponse::new("INVALID_CREDENTIALS", message))
}

/// `ErrorHandlers` hook for 401s. A missing or malformed `Authorization`
/// header is refused by the Basic extractor with an empty body; give it the
/// shared error body. Responses that already carry JSON pass through.
pub fn render_missing_credentials<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .map_or(false, |v| v.as_bytes().starts_with(b"application/json"));
    if is_json {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    debug!(path = %res.request().path(), "Admin request without Basic credentials");
    let (req, _) = res.into_parts();
    let res = ServiceResponse::new(req, unauthorized("Authentication required"))
        .map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}

/// Validator for `HttpAuthentication::basic`
pub async fn admin_validator(
    req: ServiceRequest,
    credentials: BasicAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let state = match req.app_data::<web::Data<AppState>>() {
        Some(state) => state.clone(),
        None => {
            warn!("Application state missing, refusing admin request");
            let err = InternalError::from_response(
                "application state missing",
                HttpResponse::InternalServerError()
                    .json(ErrorResponse::new("INTERNAL_ERROR", "Server misconfigured")),
            );
            return Err((err.into(), req));
        }
    };

    let password = credentials.password().map(|p| p.to_string()).unwrap_or_default();

    if credentials_match(&state.settings.admin, credentials.user_id(), &password) {
        info!(path = %req.path(), "Admin request authenticated");
        Ok(req)
    } else {
        warn!(path = %req.path(), "Admin credentials rejected");
        let err = InternalError::from_response(
            "invalid admin credentials",
            unauthorized("Invalid username or password"),
        );
        Err((err.into(), req))
    }
}

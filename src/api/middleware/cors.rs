//! CORS Middleware
//!
//! The submission form and the back office are static pages served from
//! another origin, so every response allows any origin and `OPTIONS`
//! preflights are answered here without reaching a handler.

use actix_web::{
    body::{BoxBody, EitherBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        header::{
            HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
        },
        Method,
    },
    Error, HttpResponse,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;
use tracing::debug;

pub const ALLOW_METHODS: &str = "GET, POST, PATCH, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Middleware factory for permissive CORS
pub struct Cors {
    allow_methods: &'static str,
    allow_headers: &'static str,
}

impl Cors {
    pub fn any_origin() -> Self {
        Self {
            allow_methods: ALLOW_METHODS,
            allow_headers: ALLOW_HEADERS,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Cors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Transform = CorsService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(CorsService {
            service: Rc::new(service),
            allow_methods: self.allow_methods,
            allow_headers: self.allow_headers,
        })
    }
}

/// The actual middleware service
pub struct CorsService<S> {
    service: Rc<S>,
    allow_methods: &'static str,
    allow_headers: &'static str,
}

impl<S, B> Service<ServiceRequest> for CorsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut core::task::Context<'_>) -> core::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let allow_methods = self.allow_methods;
        let allow_headers = self.allow_headers;

        Box::pin(async move {
            // Preflight never reaches routing or auth
            if *req.method() == Method::OPTIONS {
                debug!(path = %req.path(), "Answering CORS preflight");
                let response = HttpResponse::NoContent()
                    .insert_header((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
                    .insert_header((ACCESS_CONTROL_ALLOW_METHODS, allow_methods))
                    .insert_header((ACCESS_CONTROL_ALLOW_HEADERS, allow_headers))
                    .insert_header((ACCESS_CONTROL_MAX_AGE, "86400"))
                    .finish();
                return Ok(req.into_response(response).map_into_right_body());
            }

            let http_req = req.request().clone();

            // Errors raised by inner middleware (auth) still need the header
            let mut res = match service.call(req).await {
                Ok(res) => res.map_into_left_body(),
                Err(err) => {
                    ServiceResponse::new(http_req, HttpResponse::from_error(err)).map_into_right_body()
                }
            };

            res.headers_mut()
                .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

            Ok(res)
        })
    }
}

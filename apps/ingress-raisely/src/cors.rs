use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

const ALLOW_METHODS: &str = "GET,HEAD,POST,PUT";
const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers, Authorization, Origin, Accept, \
     X-Requested-With, Content-Type, Access-Control-Request-Method, Access-Control-Request-Headers";
const MAX_AGE_SECS: &str = "86400";

/// Origin allow-list. A listed origin is echoed back; anything else gets the
/// first listed origin.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    pub fn allowed_origin<'a>(&'a self, origin: Option<&'a str>) -> Option<&'a str> {
        match origin {
            Some(origin) if self.allowed_origins.iter().any(|o| o == origin) => Some(origin),
            _ => self.allowed_origins.first().map(String::as_str),
        }
    }

    pub fn decorate(&self, origin: Option<&str>, headers: &mut HeaderMap) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        if let Some(allowed) = self.allowed_origin(origin) {
            match HeaderValue::from_str(allowed) {
                Ok(value) => {
                    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
                }
                Err(_) => tracing::warn!(origin = allowed, "origin is not a valid header value"),
            }
        }
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(MAX_AGE_SECS),
        );
        headers.append(header::VARY, HeaderValue::from_static("origin"));
    }
}

/// Sets CORS headers on every response and answers preflight requests with
/// 204 before they reach a handler.
pub async fn apply_cors(
    State(policy): State<Arc<CorsPolicy>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let mut res = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };
    policy.decorate(origin.as_deref(), res.headers_mut());
    res
}

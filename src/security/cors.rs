//! CORS policy responder.
//!
//! # Responsibilities
//! - Echo the request origin as the allowed origin (`*` when absent)
//! - Advertise the static header allow-list for both allow and expose
//! - Advertise the allowed methods in a stable order
//! - Answer preflight requests without invoking the handler
//!
//! # Design Decisions
//! - The three injectors are independent and return plain header maps
//! - Echoing the origin keeps credentialed CORS usable; enforcement is the browser's

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS,
            ACCESS_CONTROL_REQUEST_METHOD, ALLOW, ORIGIN,
        },
        HeaderMap, HeaderValue, Method, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::http::headers::allowed_headers_value;

/// `Access-Control-Allow-Origin` for the given `Origin` header.
pub fn allow_origin(origin: Option<&HeaderValue>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let value = origin
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
    headers
}

/// `Access-Control-Allow-Headers` and `Access-Control-Expose-Headers`.
pub fn cors_allowed_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, allowed_headers_value());
    headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, allowed_headers_value());
    headers
}

/// `Allow` and `Access-Control-Allow-Methods` for the given methods.
pub fn cors_allowed_methods(methods: &[Method]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&render_methods(methods)) {
        headers.insert(ALLOW, value.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, value);
    }
    headers
}

/// Deduplicated, ordered by `method_rank`, comma-separated.
fn render_methods(methods: &[Method]) -> String {
    let mut sorted: Vec<&Method> = methods.iter().collect();
    sorted.sort_by(|a, b| {
        method_rank(a)
            .cmp(&method_rank(b))
            .then_with(|| a.as_str().cmp(b.as_str()))
    });
    sorted.dedup();
    sorted
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn method_rank(method: &Method) -> u8 {
    match *method {
        Method::GET => 0,
        Method::HEAD => 1,
        Method::POST => 2,
        Method::PUT => 3,
        Method::PATCH => 4,
        Method::DELETE => 5,
        Method::OPTIONS => 6,
        _ => u8::MAX,
    }
}

/// CORS stage configuration.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    methods: Vec<Method>,
}

impl CorsPolicy {
    pub fn new(methods: Vec<Method>) -> Self {
        Self { methods }
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Write all CORS headers for a request with the given origin.
    pub fn apply(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        headers.extend(allow_origin(origin));
        headers.extend(cors_allowed_headers());
        headers.extend(cors_allowed_methods(&self.methods));
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::new(vec![
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
    }
}

fn is_preflight(request: &Request<Body>) -> bool {
    request.method() == Method::OPTIONS
        && request.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD)
}

/// CORS stage of the pipeline.
pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request.headers().get(ORIGIN).cloned();

    let mut response = if is_preflight(&request) {
        tracing::debug!(origin = ?origin, "Answering CORS preflight");
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    policy.apply(origin.as_ref(), response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_origin_echoes_declared_origin() {
        let origin = HeaderValue::from_static("https://app.example.com");
        let headers = allow_origin(Some(&origin));
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.example.com");
    }

    #[test]
    fn test_allow_origin_defaults_to_wildcard() {
        let headers = allow_origin(None);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_allow_and_expose_lists_identical() {
        let first = cors_allowed_headers();
        let second = cors_allowed_headers();
        assert_eq!(
            first[ACCESS_CONTROL_ALLOW_HEADERS],
            first[ACCESS_CONTROL_EXPOSE_HEADERS]
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_methods_rendered_in_stable_order() {
        let a = cors_allowed_methods(&[Method::DELETE, Method::GET, Method::POST, Method::GET]);
        let b = cors_allowed_methods(&[Method::POST, Method::DELETE, Method::GET]);
        assert_eq!(a[ALLOW], "GET, POST, DELETE");
        assert_eq!(a[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, DELETE");
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_method_set() {
        let headers = cors_allowed_methods(&[]);
        assert_eq!(headers[ALLOW], "");
    }

    #[test]
    fn test_policy_apply_writes_all_headers() {
        let policy = CorsPolicy::new(vec![Method::GET]);
        let mut headers = HeaderMap::new();
        policy.apply(None, &mut headers);
        assert_eq!(headers.len(), 5);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET");
    }
}

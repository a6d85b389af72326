//! Request context extraction.
//!
//! # Responsibilities
//! - Canonicalize the `Authorization` header to the Bearer scheme
//! - Derive a tracking id (copied from `X-Trace` or generated UUID v4)
//! - Resolve the originating client IP
//! - Copy the allow-listed headers into an immutable `RequestContext`
//!
//! # Design Decisions
//! - Extraction never fails: malformed input falls back silently
//! - Tracking id is attached as early as possible and echoed on the response
//! - Token verification is not done here, only normalization

use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::http::headers::{AUTHORIZATION, BEARER, CONTEXT_HEADERS, X_FORWARDED_FOR, X_TRACE};
use crate::observability::metrics;

/// Canonical per-request context derived from the inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    tracking_id: String,
    originating_ip: Option<IpAddr>,
    headers: BTreeMap<String, String>,
}

impl RequestContext {
    /// Non-empty correlation id for this request.
    pub fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    pub fn originating_ip(&self) -> Option<IpAddr> {
        self.originating_ip
    }

    /// Allow-listed inbound headers, keyed by lowercase header name.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Bearer token with the scheme prefix removed.
    pub fn authorization(&self) -> Option<&str> {
        self.header(AUTHORIZATION.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Derive the context for a request.
///
/// `peer` is the transport-level address, used when no valid
/// `X-Forwarded-For` entry is present.
pub fn extract_context(headers: &HeaderMap, peer: Option<IpAddr>) -> RequestContext {
    let tracking_id = headers
        .get(&X_TRACE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_tracking_id);

    let originating_ip = forwarded_ip(headers).or(peer);

    let mut copied = BTreeMap::new();
    for name in CONTEXT_HEADERS {
        let Some(value) = headers.get(&name).and_then(|v| v.to_str().ok()) else {
            continue;
        };
        let value = if name == AUTHORIZATION {
            strip_bearer(&canonical_authorization(value)).to_string()
        } else {
            value.to_string()
        };
        copied.insert(name.as_str().to_string(), value);
    }

    RequestContext {
        tracking_id,
        originating_ip,
        headers: copied,
    }
}

/// Rewrite `Authorization` in place so it always carries the Bearer scheme.
pub fn normalize_authorization(headers: &mut HeaderMap) {
    let Some(value) = headers.get(&AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return;
    };
    if value.starts_with(BEARER) {
        return;
    }
    if let Ok(rewrapped) = HeaderValue::from_str(&canonical_authorization(value)) {
        headers.insert(AUTHORIZATION, rewrapped);
    }
}

/// Fresh random tracking id (UUID v4).
pub fn generate_tracking_id() -> String {
    Uuid::new_v4().to_string()
}

fn canonical_authorization(value: &str) -> String {
    if value.starts_with(BEARER) {
        value.to_string()
    } else {
        format!("{} {}", BEARER, value.trim())
    }
}

fn strip_bearer(value: &str) -> &str {
    value.strip_prefix(BEARER).unwrap_or(value).trim()
}

/// First entry of `X-Forwarded-For`, if it is an IP literal.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let raw = headers.get(&X_FORWARDED_FOR)?.to_str().ok()?;
    let first = raw.split(',').next()?.trim();
    match first.parse::<IpAddr>() {
        Ok(ip) => Some(ip),
        Err(_) => {
            tracing::debug!(value = %first, "Ignoring unparseable X-Forwarded-For");
            None
        }
    }
}

/// Context stage of the pipeline.
///
/// Attaches `RequestContext` to the request extensions, runs the rest of the
/// chain inside a span carrying the tracking id and echoes `X-Trace`.
pub async fn context_middleware(mut request: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();
    normalize_authorization(request.headers_mut());

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let context = extract_context(request.headers(), peer);
    let tracking_id = context.tracking_id().to_string();
    let method = request.method().to_string();

    let span = tracing::info_span!(
        "request",
        tracking_id = %tracking_id,
        method = %method,
        path = %request.uri().path(),
        client_ip = ?context.originating_ip(),
    );

    request.extensions_mut().insert(context);
    let mut response = next.run(request).instrument(span).await;

    if !response.headers().contains_key(&X_TRACE) {
        if let Ok(value) = HeaderValue::from_str(&tracking_id) {
            response.headers_mut().insert(X_TRACE, value);
        }
    }

    metrics::record_request(&method, response.status().as_u16(), start_time);
    response
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<RequestContext>() {
            return Ok(context.clone());
        }
        // Router mounted without the context stage.
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(extract_context(&parts.headers, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::{PERMISSIONS, TRACEPARENT, X_B3_SPAN_ID, X_CLIENT_FINGERPRINT};
    use std::collections::HashSet;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                name.parse::<axum::http::HeaderName>().unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_tracking_id_copied_verbatim() {
        let ctx = extract_context(&headers(&[("X-Trace", "abc-123 ")]), None);
        assert_eq!(ctx.tracking_id(), "abc-123 ");
        assert_eq!(ctx.header("x-trace"), Some("abc-123 "));
    }

    #[test]
    fn test_tracking_id_generated_and_unique() {
        let empty = HeaderMap::new();
        let ids: HashSet<String> = (0..10_000)
            .map(|_| extract_context(&empty, None).tracking_id().to_string())
            .collect();
        assert_eq!(ids.len(), 10_000);
        assert!(ids.iter().all(|id| Uuid::parse_str(id).is_ok()));
    }

    #[test]
    fn test_blank_tracking_header_counts_as_absent() {
        let ctx = extract_context(&headers(&[("X-Trace", "  ")]), None);
        assert!(!ctx.tracking_id().trim().is_empty());
    }

    #[test]
    fn test_forwarded_ip_preferred_over_peer() {
        let peer: IpAddr = "10.0.0.1".parse().unwrap();
        let ctx = extract_context(
            &headers(&[("X-Forwarded-For", "203.0.113.7, 10.0.0.2")]),
            Some(peer),
        );
        assert_eq!(ctx.originating_ip(), Some("203.0.113.7".parse().unwrap()));
    }

    #[test]
    fn test_invalid_forwarded_ip_falls_back_to_peer() {
        let peer: IpAddr = "::1".parse().unwrap();
        let ctx = extract_context(&headers(&[("X-Forwarded-For", "not-an-ip")]), Some(peer));
        assert_eq!(ctx.originating_ip(), Some(peer));

        let ctx = extract_context(&headers(&[("X-Forwarded-For", "not-an-ip")]), None);
        assert_eq!(ctx.originating_ip(), None);
    }

    #[test]
    fn test_authorization_bearer_prefix_stripped() {
        let ctx = extract_context(&headers(&[("Authorization", "Bearer  tok.en ")]), None);
        assert_eq!(ctx.authorization(), Some("tok.en"));

        let ctx = extract_context(&headers(&[("Authorization", "tok.en")]), None);
        assert_eq!(ctx.authorization(), Some("tok.en"));
    }

    #[test]
    fn test_normalize_authorization_rewraps_bare_token() {
        let mut map = headers(&[("Authorization", "tok.en")]);
        normalize_authorization(&mut map);
        assert_eq!(map.get(&AUTHORIZATION).unwrap(), "Bearer tok.en");

        let mut map = headers(&[("Authorization", "Bearer x")]);
        normalize_authorization(&mut map);
        assert_eq!(map.get(&AUTHORIZATION).unwrap(), "Bearer x");
    }

    #[test]
    fn test_only_allow_listed_headers_copied() {
        let ctx = extract_context(
            &headers(&[
                ("Permissions", "read,write"),
                ("X-Client-Fingerprint", "fp"),
                ("X-B3-SpanId", "span"),
                ("Traceparent", "00-abc-def-01"),
                ("Cookie", "secret"),
            ]),
            None,
        );
        assert_eq!(ctx.header(PERMISSIONS.as_str()), Some("read,write"));
        assert_eq!(ctx.header(X_CLIENT_FINGERPRINT.as_str()), Some("fp"));
        assert_eq!(ctx.header(X_B3_SPAN_ID.as_str()), Some("span"));
        assert_eq!(ctx.header(TRACEPARENT.as_str()), Some("00-abc-def-01"));
        assert_eq!(ctx.header("cookie"), None);
        assert_eq!(ctx.headers().len(), 4);
    }
}

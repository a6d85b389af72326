//! Header vocabulary.
//!
//! # Responsibilities
//! - Name every header the pipeline reads or writes
//! - Define the allow-list copied into `RequestContext`
//! - Define the allow-list advertised by CORS (allow and expose)
//!
//! # Design Decisions
//! - Names are lowercase `HeaderName` constants (HTTP names are case-insensitive)
//! - The CORS list is one static string, identical for allow and expose

use axum::http::{HeaderName, HeaderValue};

pub use axum::http::header::AUTHORIZATION;

pub const PERMISSIONS: HeaderName = HeaderName::from_static("permissions");
/// Tracking id, echoed on every response.
pub const X_TRACE: HeaderName = HeaderName::from_static("x-trace");
pub const X_STACKTRACE: HeaderName = HeaderName::from_static("x-stacktrace");
pub const X_B3_TRACE_ID: HeaderName = HeaderName::from_static("x-b3-traceid");
pub const X_B3_SPAN_ID: HeaderName = HeaderName::from_static("x-b3-spanid");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_CLIENT_FINGERPRINT: HeaderName = HeaderName::from_static("x-client-fingerprint");
pub const TRACEPARENT: HeaderName = HeaderName::from_static("traceparent");
pub const X_RESOURCE_COUNT: HeaderName = HeaderName::from_static("x-resource-count");
pub const X_PAGE_COUNT: HeaderName = HeaderName::from_static("x-page-count");

/// Scheme prefix of the authentication header.
pub const BEARER: &str = "Bearer";

/// Inbound headers copied into the request context.
pub const CONTEXT_HEADERS: [HeaderName; 9] = [
    AUTHORIZATION,
    PERMISSIONS,
    X_TRACE,
    X_STACKTRACE,
    X_B3_TRACE_ID,
    X_B3_SPAN_ID,
    X_FORWARDED_FOR,
    X_CLIENT_FINGERPRINT,
    TRACEPARENT,
];

/// Headers a browser may send and read cross-origin, in advertised order.
pub const ALLOWED_HEADERS: [&str; 12] = [
    "Authorization",
    "Content-Type",
    "Permissions",
    "X-Trace",
    "X-Stacktrace",
    "X-B3-TraceId",
    "X-B3-SpanId",
    "X-Forwarded-For",
    "X-Client-Fingerprint",
    "Traceparent",
    "X-Resource-Count",
    "X-Page-Count",
];

const ALLOWED_HEADERS_LIST: &str = "Authorization, Content-Type, Permissions, X-Trace, \
X-Stacktrace, X-B3-TraceId, X-B3-SpanId, X-Forwarded-For, X-Client-Fingerprint, \
Traceparent, X-Resource-Count, X-Page-Count";

/// `ALLOWED_HEADERS` rendered as a single header value.
pub fn allowed_headers_value() -> HeaderValue {
    HeaderValue::from_static(ALLOWED_HEADERS_LIST)
}

//! Response body sanitizer.
//!
//! Breaks literal `</sc` sequences (the start of a `</script` closing tag) by
//! inserting a space after the `<`, so `</script>` leaves as `< /script>`.
//! This is a last-resort mitigation for reflected script injection, not a
//! replacement for output encoding.
//!
//! Each chunk is scanned on its own. A sequence split across two chunks is
//! not detected.

use axum::{
    body::{Body, Bytes},
    http::{header::CONTENT_LENGTH, Method, Request},
    middleware::Next,
    response::Response,
};
use futures_util::StreamExt;

use crate::observability::metrics;

const NEEDLE: &[u8] = b"</sc";

/// Sanitize one body chunk.
///
/// Returns the input untouched (no copy) when there is nothing to rewrite.
pub fn sanitize(chunk: Bytes) -> Bytes {
    let hits = match_offsets(&chunk);
    if hits.is_empty() {
        return chunk;
    }

    let mut out = Vec::with_capacity(chunk.len() + hits.len());
    let mut last = 0;
    for slash in hits {
        out.extend_from_slice(&chunk[last..slash]);
        out.push(b' ');
        last = slash;
    }
    out.extend_from_slice(&chunk[last..]);
    Bytes::from(out)
}

/// Offsets of each `/` that starts a `</sc` match, left to right.
fn match_offsets(chunk: &[u8]) -> Vec<usize> {
    chunk
        .windows(NEEDLE.len())
        .enumerate()
        .filter(|(_, window)| *window == NEEDLE)
        .map(|(start, _)| start + 1)
        .collect()
}

/// Apply `sanitize` to every chunk of a body, preserving chunk order.
pub fn sanitize_body(body: Body) -> Body {
    let stream = body.into_data_stream().map(|chunk| {
        chunk.map(|bytes| {
            let len = bytes.len();
            let sanitized = sanitize(bytes);
            if sanitized.len() != len {
                metrics::record_sanitized_chunk();
            }
            sanitized
        })
    });
    Body::from_stream(stream)
}

/// Sanitizer stage of the pipeline. Must wrap every other stage.
pub async fn sanitize_middleware(request: Request<Body>, next: Next) -> Response {
    // HEAD responses have no body to rewrite; keep their Content-Length.
    if request.method() == Method::HEAD {
        return next.run(request).await;
    }
    let response = next.run(request).await;
    let (mut parts, body) = response.into_parts();
    // Rewriting may grow the body.
    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, sanitize_body(body))
}

//! Client-facing error conditions raised by the pipeline.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Malformed pagination query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Exactly one of `pageSize` and `pageNumber` was supplied.
    #[error("incompatible pagination parameters")]
    Incompatible,
}

impl IntoResponse for PaginationError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

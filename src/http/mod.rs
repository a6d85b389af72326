//! HTTP request/response pipeline.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → request.rs (normalize Authorization, derive RequestContext)
//!     → handler (pagination.rs: ListQuery in, ListResponse out)
//!     → timeout (408 if the handler is too slow)
//!     → security::headers, security::cors (response headers)
//!     → security::sanitizer (rewrite body chunks)
//!     → send to client
//! ```
//!
//! `pipeline.rs` fixes that order; `server.rs` serves it.

pub mod headers;
pub mod pagination;
pub mod pipeline;
pub mod request;
pub mod server;

pub use pagination::{
    decode_pagination, decode_sorting, encode_pagination_query, encode_sorting_query, page_count,
    ListQuery, ListResponse, Pagination, SortOrder, Sorting, SortingField,
};
pub use pipeline::{Pipeline, Stage};
pub use request::{extract_context, RequestContext};
pub use server::{service_routes, HttpServer};

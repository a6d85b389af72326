//! HTTP request/response pipeline toolkit.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::ServiceConfig;
pub use error::PaginationError;
pub use http::{HttpServer, Pipeline, RequestContext};
pub use lifecycle::Shutdown;

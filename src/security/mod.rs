//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → cors.rs (allow-origin, allow/expose headers, allowed methods)
//!     → headers.rs (nosniff, frame and referrer policy)
//!     → sanitizer.rs (break `</script` sequences in the body, always last)
//! ```
//!
//! # Design Decisions
//! - Every stage is a pure header or byte transform, no shared state
//! - Token verification and authorization are left to the application

pub mod cors;
pub mod headers;
pub mod sanitizer;

pub use cors::{allow_origin, cors_allowed_headers, cors_allowed_methods, CorsPolicy};
pub use sanitizer::sanitize;

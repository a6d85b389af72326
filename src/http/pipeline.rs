//! Pipeline composition.
//!
//! Stages in fixed order, outermost first:
//!
//! ```text
//! request  → sanitizer (no-op) → context → [cors] → [security headers] → trace → timeout → handler
//! response ← sanitizer          ← context ← [cors] ← [security headers] ← trace ← timeout ← handler
//! ```
//!
//! Context extraction is the first stage to see the request, so every later
//! stage and the handler can read `RequestContext`. The sanitizer is the last
//! stage to touch the response, so it rewrites final bytes. Header stages wrap
//! the timeout so a 408 carries the same headers as any other response.
//! Pagination is handler-level: `ListQuery` decodes the query and
//! `ListResponse` adds the count headers before the response leaves the handler.

use axum::{middleware, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{validation::parse_method, ServiceConfig};
use crate::http::request::context_middleware;
use crate::security::cors::{cors_middleware, CorsPolicy};
use crate::security::headers::with_security_headers;
use crate::security::sanitizer::sanitize_middleware;

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sanitizer,
    Context,
    Cors,
    SecurityHeaders,
    Trace,
    Timeout,
}

/// Every stage, outermost first. `Pipeline::apply` installs from this table.
const STAGE_ORDER: [Stage; 6] = [
    Stage::Sanitizer,
    Stage::Context,
    Stage::Cors,
    Stage::SecurityHeaders,
    Stage::Trace,
    Stage::Timeout,
];

/// The middleware chain wrapped around application routes.
#[derive(Debug, Clone)]
pub struct Pipeline {
    cors: Option<Arc<CorsPolicy>>,
    security_headers: bool,
    request_timeout: Duration,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            cors: Some(Arc::new(CorsPolicy::default())),
            security_headers: true,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Build from validated configuration. Unknown method names are skipped.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let cors = config.cors.enabled.then(|| {
            let methods = config
                .cors
                .allowed_methods
                .iter()
                .filter_map(|m| parse_method(m))
                .collect();
            CorsPolicy::new(methods)
        });

        Self::new()
            .with_cors(cors)
            .with_security_headers(config.security.enable_headers)
            .with_request_timeout(Duration::from_secs(config.timeouts.request_secs))
    }

    /// `None` leaves CORS to another layer of the deployment.
    pub fn with_cors(mut self, policy: Option<CorsPolicy>) -> Self {
        self.cors = policy.map(Arc::new);
        self
    }

    pub fn with_security_headers(mut self, enabled: bool) -> Self {
        self.security_headers = enabled;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn enabled(&self, stage: Stage) -> bool {
        match stage {
            Stage::Cors => self.cors.is_some(),
            Stage::SecurityHeaders => self.security_headers,
            _ => true,
        }
    }

    /// Installed stages, outermost first.
    pub fn stages(&self) -> Vec<Stage> {
        STAGE_ORDER
            .into_iter()
            .filter(|stage| self.enabled(*stage))
            .collect()
    }

    /// Wrap `router` with every installed stage.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        // Layers added later wrap the ones added earlier, so install innermost first.
        self.stages()
            .into_iter()
            .rev()
            .fold(router, |router, stage| self.install(router, stage))
    }

    fn install<S>(&self, router: Router<S>, stage: Stage) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        match stage {
            Stage::Sanitizer => router.layer(middleware::from_fn(sanitize_middleware)),
            Stage::Context => router.layer(middleware::from_fn(context_middleware)),
            Stage::Cors => match &self.cors {
                Some(policy) => router.layer(middleware::from_fn_with_state(
                    policy.clone(),
                    cors_middleware,
                )),
                None => router,
            },
            Stage::SecurityHeaders => with_security_headers(router),
            Stage::Trace => router.layer(TraceLayer::new_for_http()),
            Stage::Timeout => {
                #[allow(deprecated)]
                let timeout = TimeoutLayer::new(self.request_timeout);
                router.layer(timeout)
            }
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap application routes in the pipeline
//! - Serve with peer addresses available to the context stage
//! - Stop on shutdown signal, draining in-flight requests

use axum::{extract::Json, routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ServiceConfig;
use crate::http::pipeline::Pipeline;
use crate::http::request::RequestContext;
use crate::lifecycle::shutdown::wait_for_shutdown;

/// HTTP server running application routes behind the pipeline.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a server for `routes` with the given configuration.
    pub fn new(config: ServiceConfig, routes: Router) -> Self {
        let pipeline = Pipeline::from_config(&config);
        tracing::debug!(stages = ?pipeline.stages(), "Pipeline assembled");
        let router = pipeline.apply(routes);
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The fully wrapped router, for driving without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Built-in routes: liveness and a context echo for debugging clients.
pub fn service_routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/context", get(context))
}

async fn health() -> &'static str {
    "ok"
}

async fn context(context: RequestContext) -> Json<RequestContext> {
    Json(context)
}

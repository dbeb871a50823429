//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the ingest handler on every path
//! - Restrict methods to GET and POST (TRACE, OPTIONS and the rest get 405)
//! - Wire up middleware (body limit, request ID, tracing, panic guard)
//! - Serve a bound listener, plain or TLS, until the handle shuts it down

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::http::pipeline::{ingest, Pipeline};
use crate::http::request::MakeRequestUuid;

/// HTTP server for the event source.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server dispatching every request to `pipeline`.
    pub fn new(pipeline: Arc<Pipeline>, max_body_size: usize) -> Self {
        Self {
            router: build_router(pipeline, max_body_size),
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve `listener` until `handle` signals shutdown and in-flight
    /// requests have drained.
    pub async fn run(
        self,
        listener: std::net::TcpListener,
        tls: Option<RustlsConfig>,
        handle: Handle,
    ) -> Result<(), std::io::Error> {
        let app = self.router.into_make_service();

        match tls {
            Some(tls) => {
                axum_server::from_tcp_rustls(listener, tls)
                    .handle(handle)
                    .serve(app)
                    .await
            }
            None => axum_server::from_tcp(listener).handle(handle).serve(app).await,
        }?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(pipeline: Arc<Pipeline>, max_body_size: usize) -> Router {
    Router::new()
        .route("/", get(ingest).post(ingest))
        .route("/{*path}", get(ingest).post(ingest))
        .with_state(pipeline)
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CatchPanicLayer::new()),
        )
}

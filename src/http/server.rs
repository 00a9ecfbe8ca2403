//! HTTP server setup and the axum transport adapter.
//!
//! # Responsibilities
//! - Create the Axum Router with a catch-all handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Buffer request bodies up to the configured limit
//! - Convert between axum and engine request/response types
//! - Dispatch each request to a freshly built Resource and run the Engine
//! - Record per-request metrics

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{uri::Scheme, StatusCode},
    response::IntoResponse,
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::engine::Engine;
use crate::http::{Request, Response};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::resource::Resource;

/// Builds the resource that will answer one request.
pub trait Dispatcher: Send + Sync + 'static {
    type Resource: Resource + Send;

    /// `None` answers 404 without running the engine.
    fn dispatch(&self, request: &Request) -> Option<Self::Resource>;
}

impl<F, R> Dispatcher for F
where
    F: Fn(&Request) -> Option<R> + Send + Sync + 'static,
    R: Resource + Send,
{
    type Resource = R;

    fn dispatch(&self, request: &Request) -> Option<R> {
        self(request)
    }
}

/// Errors from binding or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
struct AppState<D> {
    engine: Arc<Engine>,
    dispatcher: Arc<D>,
    max_body_bytes: usize,
}

impl<D> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            dispatcher: self.dispatcher.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// HTTP server hosting one dispatcher.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new<D: Dispatcher>(config: ServerConfig, engine: Engine, dispatcher: D) -> Self {
        let state = AppState {
            engine: Arc::new(engine),
            dispatcher: Arc::new(dispatcher),
            max_body_bytes: config.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router<D: Dispatcher>(config: &ServerConfig, state: AppState<D>) -> Router {
        Router::new()
            .route("/{*path}", any(handle::<D>))
            .route("/", any(handle::<D>))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        TcpListener::bind(&self.config.bind_address)
            .await
            .map_err(|source| ServerError::Bind {
                address: self.config.bind_address.clone(),
                source,
            })
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.signalled().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: adapt, dispatch, process, adapt back.
async fn handle<D: Dispatcher>(
    State(state): State<AppState<D>>,
    request: axum::extract::Request,
) -> axum::response::Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, limit = state.max_body_bytes, "Request body rejected");
            metrics::record_request(&method, 413, start);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response();
        }
    };

    let confidential = parts.uri.scheme() == Some(&Scheme::HTTPS);
    let mut engine_request = Request::new(parts.method, parts.uri.to_string())
        .with_version(parts.version)
        .with_headers(parts.headers)
        .with_body(body)
        .with_confidential(confidential);
    if let Some(addr) = remote_addr {
        engine_request = engine_request.with_remote_addr(addr);
    }

    let Some(mut resource) = state.dispatcher.dispatch(&engine_request) else {
        tracing::debug!(path = %engine_request.path(), "No resource for path");
        metrics::record_request(&method, 404, start);
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };

    let mut response = Response::new();
    state
        .engine
        .process(&mut resource, &engine_request, &mut response);

    metrics::record_request(&method, response.status().as_u16(), start);
    into_axum(response)
}

fn into_axum(mut response: Response) -> axum::response::Response {
    let body = response.take_body();
    let mut out = axum::response::Response::new(Body::from(body));
    *out.status_mut() = response.status();
    *out.headers_mut() = response.headers().clone();
    out
}

//! Decision engine subsystem.
//!
//! # Data Flow
//! ```text
//! Engine::process(resource, request, response)
//!     → Server / Date headers
//!     → decision.rs (walk the graph, one resource question per node)
//!         gates:        503 414 400 501 401 403 501 415 413
//!         OPTIONS:      200 + Allow
//!         method:       405 + Allow
//!         negotiation:  media type → language → charset → encoding (406)
//!         existence:    conditional requests (412 / 304) or missing branch
//!                       (412 301 307 410 404)
//!         method body:  DELETE (202 204 500), POST (303 201), PUT (409 201)
//!     → finalize.rs (validators, representation, byte ranges)
//!     → finish_request, commit
//! ```
//!
//! # Design Decisions
//! - The graph is acyclic; every walk ends in a status after a bounded
//!   number of nodes
//! - Resource halts map to their status, faults and panics map to 500
//! - The engine keeps no state between requests and can be shared freely

pub mod decision;
mod finalize;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use axum::http::{header, Method, StatusCode};

pub use decision::Decision;

use crate::config::schema::EngineConfig;
use crate::http::date::format_http_date;
use crate::http::{Request, Response};
use crate::negotiation::{Charset, CharsetNegotiator};
use crate::resource::{BoundResource, Exchange, Resource, ResourceError};

/// Drives resources through HTTP request semantics.
#[derive(Debug, Clone)]
pub struct Engine {
    server_name: String,
    charsets: CharsetNegotiator,
    enable_ranges: bool,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Self {
        let pool = config
            .default_charsets
            .iter()
            .map(|name| Charset::for_name(name))
            .collect();
        Self {
            server_name: config.server_name.clone(),
            charsets: CharsetNegotiator::new(pool),
            enable_ranges: config.enable_ranges,
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Process one request. The outcome is the final state of `response`,
    /// which is committed on return.
    pub fn process<R: Resource>(&self, resource: &mut R, request: &Request, response: &mut Response) {
        let mut ex = Exchange::new(request, response);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.stamp(&mut ex)?;
            decision::Walk::new(self, &mut *resource, &mut ex).run()
        }));

        match outcome {
            Ok(Ok(status)) => settle(&mut ex, status, None),
            Ok(Err(ResourceError::Halt { status, message })) => {
                tracing::warn!(status = %status, "Resource halted processing");
                settle(&mut ex, status, message);
            }
            Ok(Err(err)) => {
                tracing::error!(
                    method = %request.method(),
                    uri = %request.uri(),
                    error = %err,
                    "Resource fault"
                );
                internal_error(&mut ex);
            }
            Err(_) => {
                tracing::error!(
                    method = %request.method(),
                    uri = %request.uri(),
                    "Resource panicked"
                );
                internal_error(&mut ex);
            }
        }

        if let Err(err) = resource.finish_request(&mut ex) {
            tracing::error!(error = %err, "finish_request failed");
        }

        if request.method() == Method::HEAD {
            let _ = ex.response.clear_body();
        }

        tracing::debug!(
            method = %request.method(),
            uri = %request.uri(),
            status = %ex.response.status(),
            nodes = ex.trace().len(),
            "Request processed"
        );
        ex.response.commit();
    }

    /// Process a resource that owns its request.
    pub fn process_bound<R: BoundResource>(&self, resource: &mut R, response: &mut Response) {
        let request: Arc<Request> = resource.request();
        self.process(resource, &request, response);
    }

    fn stamp(&self, ex: &mut Exchange<'_>) -> Result<(), ResourceError> {
        let date = format_http_date(&ex.response.origination());
        ex.response.set_header(header::SERVER, &self.server_name)?;
        ex.response.set_header(header::DATE, &date)?;
        Ok(())
    }

    pub(crate) fn charset_negotiator(&self) -> &CharsetNegotiator {
        &self.charsets
    }

    pub(crate) fn ranges_enabled(&self) -> bool {
        self.enable_ranges
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

fn settle(ex: &mut Exchange<'_>, status: StatusCode, message: Option<String>) {
    if let Err(err) = ex.response.set_status(status) {
        tracing::error!(error = %err, "Could not set final status");
        return;
    }
    if let Some(message) = message {
        let _ = ex.response.set_body(message.as_bytes());
        let _ = ex
            .response
            .set_header(header::CONTENT_TYPE, "text/plain; charset=utf-8");
        let length = ex.response.body().len().to_string();
        let _ = ex.response.set_header(header::CONTENT_LENGTH, &length);
    }
}

fn internal_error(ex: &mut Exchange<'_>) {
    let reason = StatusCode::INTERNAL_SERVER_ERROR
        .canonical_reason()
        .unwrap_or_default();
    for name in [
        header::CONTENT_ENCODING,
        header::CONTENT_LANGUAGE,
        header::CONTENT_RANGE,
        header::ETAG,
        header::LAST_MODIFIED,
        header::EXPIRES,
        header::LOCATION,
    ] {
        let _ = ex.response.remove_header(&name);
    }
    settle(ex, StatusCode::INTERNAL_SERVER_ERROR, Some(reason.to_string()));
}

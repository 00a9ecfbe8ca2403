//! Resource capability contract.
//!
//! # Data Flow
//! ```text
//! Dispatcher builds one Resource per request
//!     → Engine asks it questions (exists? allowed methods? etag? ...)
//!     → answers steer the decision graph
//!     → a provider writes the chosen representation into the response
//!     → finish_request runs last, whatever the outcome
//! ```
//!
//! # Design Decisions
//! - Every callback has a default, so a resource overrides only what it needs
//! - Callbacks receive the `Exchange` for header access and negotiated values
//! - A callback fails with `ResourceError::Halt` to answer a specific status,
//!   or with `ResourceError::Fault` for anything unexpected (answered with 500)

pub mod context;
pub mod error;
pub mod etag;

use std::sync::Arc;

use axum::http::Method;
use chrono::{DateTime, Utc};

pub use context::{Context, Exchange};
pub use error::{BoxError, ResourceError, ResourceResult};
pub use etag::ETag;

use crate::http::Request;
use crate::negotiation::{Charset, LanguageTag, MediaType};

/// Writes a representation into the response, or consumes the request body.
pub type Handler<R> = fn(&mut R, &mut Exchange<'_>) -> ResourceResult<()>;

/// A body writer keyed by the media type it produces.
pub type Provider<R> = (MediaType, Handler<R>);

/// A request-body handler keyed by the media type it consumes.
pub type Acceptor<R> = (MediaType, Handler<R>);

/// Methods any resource recognises unless it says otherwise.
pub fn standard_methods() -> Vec<Method> {
    vec![
        Method::GET,
        Method::HEAD,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
        Method::TRACE,
        Method::CONNECT,
        Method::PATCH,
    ]
}

/// The questions the decision engine asks about one resource.
///
/// Only [`Resource::content_types_provided`] has no default.
pub trait Resource: Sized {
    /// `false` answers 503.
    fn service_available(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(true)
    }

    /// Methods recognised at all; anything else answers 501.
    fn known_methods(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<Method>> {
        Ok(standard_methods())
    }

    /// `true` answers 414.
    fn uri_too_long(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(false)
    }

    /// `true` answers 400.
    fn malformed_request(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(false)
    }

    /// `false` answers 401. Set `WWW-Authenticate` on the response before returning it.
    fn is_authorized(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(true)
    }

    /// `true` answers 403.
    fn forbidden(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(false)
    }

    /// `false` answers 501.
    fn valid_content_headers(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(true)
    }

    /// `false` answers 415.
    fn known_content_type(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(true)
    }

    /// `false` answers 413.
    fn valid_entity_length(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(true)
    }

    /// Methods this resource serves; also the `Allow` header.
    fn allowed_methods(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<Method>> {
        Ok(vec![Method::GET, Method::HEAD])
    }

    /// Representations this resource can produce, in preference order.
    fn content_types_provided(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<Vec<Provider<Self>>>;

    /// Request bodies this resource can consume for PUT and POST-as-create.
    fn content_types_accepted(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<Acceptor<Self>>> {
        Ok(Vec::new())
    }

    /// `None` means any language is fine and `Accept-Language` is not negotiated.
    fn languages_provided(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<Vec<LanguageTag>>> {
        Ok(None)
    }

    /// Empty means the engine's configured default pool.
    fn charsets_provided(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<Charset>> {
        Ok(Vec::new())
    }

    /// `identity` is always implied.
    fn encodings_provided(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<String>> {
        Ok(vec![crate::negotiation::IDENTITY.to_string()])
    }

    /// Extra request headers the representation depends on, for `Vary`.
    fn variances(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn resource_exists(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(true)
    }

    /// `true` turns a missing resource's 404 into 410 (or a redirect).
    fn previously_existed(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(false)
    }

    /// New location for a 301.
    fn moved_permanently(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<String>> {
        Ok(None)
    }

    /// New location for a 307.
    fn moved_temporarily(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<String>> {
        Ok(None)
    }

    /// `true` answers a PUT with 409.
    fn is_conflict(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(false)
    }

    /// Whether a POST to a missing resource is processed anyway.
    fn allow_missing_post(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(false)
    }

    /// `true` handles POST like a PUT to [`Resource::create_path`].
    fn post_is_create(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(false)
    }

    /// Path of the resource a creating POST makes, relative to the request URI.
    fn create_path(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<String>> {
        Ok(None)
    }

    /// Generic POST processing. `false` answers 500.
    fn process_post(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Err(ResourceError::halt(axum::http::StatusCode::NOT_IMPLEMENTED))
    }

    /// Start deletion; `false` means it was refused.
    fn delete_resource(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(false)
    }

    /// `false` answers 202: deletion is enacted later.
    fn delete_completed(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(true)
    }

    fn generate_etag(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<ETag>> {
        Ok(None)
    }

    fn last_modified(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<DateTime<Utc>>> {
        Ok(None)
    }

    fn expires(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<DateTime<Utc>>> {
        Ok(None)
    }

    /// `true` answers 300 instead of 200.
    fn multiple_choices(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        Ok(false)
    }

    /// Runs after every request, including early exits. Must not touch status or headers.
    fn finish_request(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<()> {
        Ok(())
    }
}

/// A resource that carries its own request.
pub trait BoundResource: Resource {
    fn request(&self) -> Arc<Request>;
}

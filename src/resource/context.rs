//! Per-request state shared between the engine and a resource.
//!
//! # Responsibilities
//! - Give callbacks read access to the request and write access to the response
//! - Carry the outcome of content negotiation
//! - Carry a typed key/value store for memoising work between callbacks
//!
//! # Design Decisions
//! - The store is keyed by type, so two callbacks agree on a value by
//!   agreeing on a type rather than on a string key
//! - Nothing here outlives one call to `Engine::process`

use axum::http::Extensions;

use crate::engine::Decision;
use crate::http::{Request, Response};
use crate::negotiation::{Charset, LanguageTag, MediaType};

/// Typed request-scoped store.
#[derive(Debug, Default)]
pub struct Context {
    values: Extensions,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, returning the previous one of the same type.
    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.values.insert(value)
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values.get::<T>()
    }

    pub fn get_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.values.get_mut::<T>()
    }

    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.values.remove::<T>()
    }

    /// Fetch a memoised value, computing it on first use.
    pub fn get_or_insert_with<T, F>(&mut self, f: F) -> &mut T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        self.values.get_or_insert_with(f)
    }
}

/// Everything a resource callback may look at or change during one request.
pub struct Exchange<'a> {
    request: &'a Request,
    pub response: &'a mut Response,
    pub context: Context,
    pub(crate) media_type: Option<MediaType>,
    pub(crate) charset: Option<Charset>,
    pub(crate) language: Option<LanguageTag>,
    pub(crate) encoding: Option<String>,
    redirect: bool,
    trace: Vec<Decision>,
}

impl<'a> Exchange<'a> {
    pub fn new(request: &'a Request, response: &'a mut Response) -> Self {
        Self {
            request,
            response,
            context: Context::new(),
            media_type: None,
            charset: None,
            language: None,
            encoding: None,
            redirect: false,
            trace: Vec::new(),
        }
    }

    pub fn request(&self) -> &'a Request {
        self.request
    }

    /// Media type chosen from `Accept` (or the first provided one).
    pub fn media_type(&self) -> Option<&MediaType> {
        self.media_type.as_ref()
    }

    pub fn charset(&self) -> Option<&Charset> {
        self.charset.as_ref()
    }

    pub fn language(&self) -> Option<&LanguageTag> {
        self.language.as_ref()
    }

    /// Negotiated content-coding; the body writer is responsible for applying it.
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Ask for `303 See Other` after a POST. A `Location` header must be set too.
    pub fn set_redirect(&mut self, redirect: bool) {
        self.redirect = redirect;
    }

    pub fn is_redirect(&self) -> bool {
        self.redirect
    }

    /// Decision nodes visited so far, in order.
    pub fn trace(&self) -> &[Decision] {
        &self.trace
    }

    pub(crate) fn record(&mut self, decision: Decision) {
        self.trace.push(decision);
    }
}

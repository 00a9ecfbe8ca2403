//! Shared fixtures for the engine and server tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};

use resource_engine::config::{EngineConfig, ServerConfig};
use resource_engine::engine::{Decision, Engine};
use resource_engine::http::{HttpServer, Request, Response};
use resource_engine::negotiation::{Charset, LanguageTag, MediaType};
use resource_engine::resource::{
    Acceptor, ETag, Exchange, Handler, Provider, Resource, ResourceError, ResourceResult,
};
use resource_engine::store::{DocumentDispatcher, DocumentStore};

/// Fixed origination time for every test response.
pub fn origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn engine() -> Engine {
    Engine::default()
}

pub fn engine_without_ranges() -> Engine {
    Engine::new(&EngineConfig {
        enable_ranges: false,
        ..EngineConfig::default()
    })
}

/// Run `resource` through the default engine.
pub fn process(resource: &mut Fixture, request: &Request) -> Response {
    process_with(&engine(), resource, request)
}

pub fn process_with(engine: &Engine, resource: &mut Fixture, request: &Request) -> Response {
    let mut response = Response::originated_at(origin());
    engine.process(resource, request, &mut response);
    response
}

pub fn request(method: Method, uri: &str) -> Request {
    Request::new(method, uri).with_header("host", "example.com")
}

/// A resource whose every answer is a plain field.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub available: bool,
    pub uri_too_long: bool,
    pub malformed: bool,
    pub authorized: bool,
    pub forbidden: bool,
    pub valid_content_headers: bool,
    pub known_content_type: bool,
    pub valid_entity_length: bool,
    pub allowed: Vec<Method>,
    pub provided: Vec<MediaType>,
    pub accepted: Vec<MediaType>,
    pub languages: Option<Vec<LanguageTag>>,
    pub charsets: Vec<Charset>,
    pub encodings: Vec<String>,
    pub variances: Vec<String>,
    pub exists: bool,
    pub previously_existed: bool,
    pub moved_permanently: Option<String>,
    pub moved_temporarily: Option<String>,
    pub conflict: bool,
    pub allow_missing_post: bool,
    pub post_is_create: bool,
    pub create_path: Option<String>,
    pub post_result: bool,
    pub post_redirect: Option<String>,
    pub delete_accepted: bool,
    pub delete_completed: bool,
    pub etag: Option<ETag>,
    pub last_modified: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub multiple_choices: bool,
    pub body: String,

    /// Callback that panics when entered.
    pub panic_in: Option<&'static str>,
    /// Callback that fails with an untyped fault when entered.
    pub fault_in: Option<&'static str>,
    /// Callback that halts with a status and message when entered.
    pub halt_in: Option<(&'static str, StatusCode, &'static str)>,

    /// Callbacks entered, in order.
    pub calls: Vec<&'static str>,
    /// Body handed to an acceptor.
    pub received: Option<Bytes>,
    /// Decision trace captured by `finish_request`.
    pub trace: Vec<Decision>,
    pub finished: bool,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            available: true,
            uri_too_long: false,
            malformed: false,
            authorized: true,
            forbidden: false,
            valid_content_headers: true,
            known_content_type: true,
            valid_entity_length: true,
            allowed: vec![Method::GET, Method::HEAD],
            provided: vec![MediaType::new("text", "plain")],
            accepted: vec![MediaType::new("text", "plain")],
            languages: None,
            charsets: Vec::new(),
            encodings: vec!["identity".to_string()],
            variances: Vec::new(),
            exists: true,
            previously_existed: false,
            moved_permanently: None,
            moved_temporarily: None,
            conflict: false,
            allow_missing_post: false,
            post_is_create: false,
            create_path: None,
            post_result: true,
            post_redirect: None,
            delete_accepted: true,
            delete_completed: true,
            etag: None,
            last_modified: None,
            expires: None,
            multiple_choices: false,
            body: "hello, world".to_string(),
            panic_in: None,
            fault_in: None,
            halt_in: None,
            calls: Vec::new(),
            received: None,
            trace: Vec::new(),
            finished: false,
        }
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn called(&self, name: &str) -> bool {
        self.calls.contains(&name)
    }

    pub fn visited(&self, decision: Decision) -> bool {
        self.trace.contains(&decision)
    }

    fn enter(&mut self, name: &'static str) -> ResourceResult<()> {
        self.calls.push(name);
        if self.panic_in == Some(name) {
            panic!("fixture panicked in {name}");
        }
        if self.fault_in == Some(name) {
            return Err(ResourceError::fault(format!("fixture fault in {name}")));
        }
        if let Some((at, status, message)) = self.halt_in {
            if at == name {
                return Err(ResourceError::halt_with(status, message));
            }
        }
        Ok(())
    }

    fn provide(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<()> {
        self.enter("provide")?;
        ex.response.write_body(self.body.as_bytes());
        Ok(())
    }

    fn accept(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<()> {
        self.enter("accept")?;
        self.received = Some(ex.request().body().clone());
        Ok(())
    }
}

impl Resource for Fixture {
    fn service_available(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("service_available")?;
        Ok(self.available)
    }

    fn uri_too_long(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("uri_too_long")?;
        Ok(self.uri_too_long)
    }

    fn malformed_request(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("malformed_request")?;
        Ok(self.malformed)
    }

    fn is_authorized(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("is_authorized")?;
        if !self.authorized {
            ex.response
                .set_header(axum::http::header::WWW_AUTHENTICATE, "Basic realm=\"test\"")?;
        }
        Ok(self.authorized)
    }

    fn forbidden(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("forbidden")?;
        Ok(self.forbidden)
    }

    fn valid_content_headers(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("valid_content_headers")?;
        Ok(self.valid_content_headers)
    }

    fn known_content_type(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("known_content_type")?;
        Ok(self.known_content_type)
    }

    fn valid_entity_length(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("valid_entity_length")?;
        Ok(self.valid_entity_length)
    }

    fn allowed_methods(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<Method>> {
        self.enter("allowed_methods")?;
        Ok(self.allowed.clone())
    }

    fn content_types_provided(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<Provider<Self>>> {
        self.enter("content_types_provided")?;
        Ok(self
            .provided
            .iter()
            .map(|media_type| (media_type.clone(), Self::provide as Handler<Self>))
            .collect())
    }

    fn content_types_accepted(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<Acceptor<Self>>> {
        self.enter("content_types_accepted")?;
        Ok(self
            .accepted
            .iter()
            .map(|media_type| (media_type.clone(), Self::accept as Handler<Self>))
            .collect())
    }

    fn languages_provided(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<Vec<LanguageTag>>> {
        self.enter("languages_provided")?;
        Ok(self.languages.clone())
    }

    fn charsets_provided(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<Charset>> {
        self.enter("charsets_provided")?;
        Ok(self.charsets.clone())
    }

    fn encodings_provided(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<String>> {
        self.enter("encodings_provided")?;
        Ok(self.encodings.clone())
    }

    fn variances(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Vec<String>> {
        self.enter("variances")?;
        Ok(self.variances.clone())
    }

    fn resource_exists(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("resource_exists")?;
        Ok(self.exists)
    }

    fn previously_existed(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("previously_existed")?;
        Ok(self.previously_existed)
    }

    fn moved_permanently(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<String>> {
        self.enter("moved_permanently")?;
        Ok(self.moved_permanently.clone())
    }

    fn moved_temporarily(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<String>> {
        self.enter("moved_temporarily")?;
        Ok(self.moved_temporarily.clone())
    }

    fn is_conflict(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("is_conflict")?;
        Ok(self.conflict)
    }

    fn allow_missing_post(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("allow_missing_post")?;
        Ok(self.allow_missing_post)
    }

    fn post_is_create(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("post_is_create")?;
        Ok(self.post_is_create)
    }

    fn create_path(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<String>> {
        self.enter("create_path")?;
        Ok(self.create_path.clone())
    }

    fn process_post(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("process_post")?;
        if let Some(location) = &self.post_redirect {
            ex.response
                .set_header(axum::http::header::LOCATION, location)?;
            ex.set_redirect(true);
        }
        Ok(self.post_result)
    }

    fn delete_resource(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("delete_resource")?;
        Ok(self.delete_accepted)
    }

    fn delete_completed(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("delete_completed")?;
        Ok(self.delete_completed)
    }

    fn generate_etag(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<ETag>> {
        self.enter("generate_etag")?;
        Ok(self.etag.clone())
    }

    fn last_modified(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<DateTime<Utc>>> {
        self.enter("last_modified")?;
        Ok(self.last_modified)
    }

    fn expires(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<Option<DateTime<Utc>>> {
        self.enter("expires")?;
        Ok(self.expires)
    }

    fn multiple_choices(&mut self, _ex: &mut Exchange<'_>) -> ResourceResult<bool> {
        self.enter("multiple_choices")?;
        Ok(self.multiple_choices)
    }

    fn finish_request(&mut self, ex: &mut Exchange<'_>) -> ResourceResult<()> {
        self.calls.push("finish_request");
        self.trace = ex.trace().to_vec();
        self.finished = true;
        Ok(())
    }
}

/// A document server with a fresh store and test-friendly limits.
pub fn document_server() -> (HttpServer, Arc<DocumentStore>) {
    let store = Arc::new(DocumentStore::new());
    let config = ServerConfig {
        bind_address: "127.0.0.1:0".to_string(),
        max_body_bytes: 1024,
        request_timeout_secs: 5,
    };
    let server = HttpServer::new(
        config,
        Engine::default(),
        DocumentDispatcher::new(store.clone()),
    );
    (server, store)
}

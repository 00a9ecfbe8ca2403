//! Inbound request model.
//!
//! # Responsibilities
//! - Hold the parsed request line, headers, peer address, and body
//! - Answer case-insensitive header lookups, joining repeated lines
//!
//! # Design Decisions
//! - Immutable once built: the builder methods consume `self`
//! - The body is fully buffered by the transport adapter before processing

use std::net::SocketAddr;

use bytes::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Version};

/// An HTTP request as seen by the decision engine.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: String,
    version: Version,
    headers: HeaderMap,
    remote_addr: Option<SocketAddr>,
    body: Bytes,
    confidential: bool,
}

impl Request {
    /// Start a request with the given method and raw (undecoded) URI.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            remote_addr: None,
            body: Bytes::new(),
            confidential: false,
        }
    }

    /// Append a header line. Invalid names or values are dropped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Mark the request as received over TLS.
    pub fn with_confidential(mut self, confidential: bool) -> Self {
        self.confidential = confidential;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Path component of the request URI, without the query string.
    pub fn path(&self) -> &str {
        let uri = self.uri.split(['?', '#']).next().unwrap_or_default();
        match uri.find("://") {
            Some(scheme_end) => {
                let rest = &uri[scheme_end + 3..];
                rest.find('/').map(|i| &rest[i..]).unwrap_or("/")
            }
            None => uri,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All values of a list-valued header joined with `", "`.
    pub fn header_list(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn is_confidential(&self) -> bool {
        self.confidential
    }
}

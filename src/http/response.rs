//! Outbound response model.
//!
//! # Responsibilities
//! - Accumulate status, headers, and body while the engine runs
//! - Freeze status and headers once committed
//!
//! # Design Decisions
//! - Origination time is captured at construction; `Last-Modified` is never
//!   allowed to be later than it
//! - Body writes stay legal after commit (the body is streamed last)
//! - Committing twice is a programming error and panics

use bytes::{Bytes, BytesMut};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::http::date::truncate_to_seconds;

/// Errors raised by response mutation.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Status or headers touched after commit.
    #[error("response already committed")]
    Committed,

    #[error("invalid value for header {name}: {value:?}")]
    InvalidHeaderValue { name: HeaderName, value: String },
}

/// An HTTP response under construction.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    has_body: bool,
    origination: DateTime<Utc>,
    committed: bool,
}

impl Response {
    pub fn new() -> Self {
        Self::originated_at(Utc::now())
    }

    /// A response whose origination time is fixed by the caller.
    pub fn originated_at(origination: DateTime<Utc>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
            has_body: false,
            origination: truncate_to_seconds(origination),
            committed: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Canonical reason phrase for the current status.
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown")
    }

    pub fn set_status(&mut self, status: StatusCode) -> Result<(), ResponseError> {
        self.ensure_open()?;
        self.status = status;
        Ok(())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Replace every value of `name` with `value`.
    pub fn set_header(&mut self, name: HeaderName, value: &str) -> Result<(), ResponseError> {
        self.ensure_open()?;
        let value = Self::header_value(&name, value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Add a value, keeping any already present.
    pub fn append_header(&mut self, name: HeaderName, value: &str) -> Result<(), ResponseError> {
        self.ensure_open()?;
        let value = Self::header_value(&name, value)?;
        self.headers.append(name, value);
        Ok(())
    }

    pub fn remove_header(&mut self, name: &HeaderName) -> Result<(), ResponseError> {
        self.ensure_open()?;
        self.headers.remove(name);
        Ok(())
    }

    /// Whether anything has been written to the body, even zero bytes.
    pub fn has_body(&self) -> bool {
        self.has_body
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn write_body(&mut self, chunk: &[u8]) {
        self.has_body = true;
        self.body.extend_from_slice(chunk);
    }

    /// Replace the body. Only legal before commit.
    pub fn set_body(&mut self, body: impl AsRef<[u8]>) -> Result<(), ResponseError> {
        self.ensure_open()?;
        self.body.clear();
        self.write_body(body.as_ref());
        Ok(())
    }

    pub fn clear_body(&mut self) -> Result<(), ResponseError> {
        self.ensure_open()?;
        self.body.clear();
        self.has_body = false;
        Ok(())
    }

    pub fn take_body(&mut self) -> Bytes {
        self.body.split().freeze()
    }

    pub fn origination(&self) -> DateTime<Utc> {
        self.origination
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Freeze status and headers.
    ///
    /// # Panics
    /// When called twice: headers cannot be sent twice.
    pub fn commit(&mut self) {
        assert!(!self.committed, "response committed twice");
        self.committed = true;
    }

    fn ensure_open(&self) -> Result<(), ResponseError> {
        if self.committed {
            Err(ResponseError::Committed)
        } else {
            Ok(())
        }
    }

    fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue, ResponseError> {
        HeaderValue::from_str(value).map_err(|_| ResponseError::InvalidHeaderValue {
            name: name.clone(),
            value: value.to_string(),
        })
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

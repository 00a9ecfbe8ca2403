//! The tail of the graph: request bodies, representations, validators and
//! byte ranges.
//!
//! # Responsibilities
//! - Hand PUT and creating-POST bodies to the matching acceptor
//! - Resolve `Location` values against the request URI
//! - Write the negotiated representation and its entity headers
//! - Serve `206` / `416` for `Range` requests

use axum::http::{header, Method, StatusCode};
use url::Url;

use crate::engine::decision::{Transition, Walk};
use crate::http::date::format_http_date;
use crate::negotiation::{MediaType, IDENTITY};
use crate::range::{self, Range};
use crate::resource::{Resource, ResourceError, ResourceResult};

const OCTET_STREAM: &str = "application/octet-stream";

impl<R: Resource> Walk<'_, '_, R> {
    /// Pass the request body to the acceptor registered for its content type.
    pub(crate) fn accept_body(&mut self) -> ResourceResult<()> {
        let content_type: MediaType = self
            .request_header("content-type")
            .unwrap_or(OCTET_STREAM)
            .parse()
            .map_err(|_| ResourceError::halt(StatusCode::UNSUPPORTED_MEDIA_TYPE))?;

        let acceptor = self
            .resource
            .content_types_accepted(self.ex)?
            .into_iter()
            .find(|(pattern, _)| content_type.matches(pattern))
            .map(|(_, handler)| handler);
        let Some(handler) = acceptor else {
            return Err(ResourceError::halt(StatusCode::UNSUPPORTED_MEDIA_TYPE));
        };
        handler(self.resource, self.ex)?;

        if self.method() == Method::PUT
            && !self.exists
            && !self.ex.response.has_header("location")
        {
            let location = self.resolve_created(self.ex.request().path());
            self.ex.response.set_header(header::LOCATION, &location)?;
        }
        Ok(())
    }

    /// Absolute URI for `path`, relative to the request URI. Relative paths
    /// are taken to live under the request path.
    pub(crate) fn resolve_created(&self, path: &str) -> String {
        let request = self.ex.request();
        let base = Url::parse(request.uri()).or_else(|_| {
            let scheme = if request.is_confidential() { "https" } else { "http" };
            let host = request.header("host").unwrap_or("localhost");
            Url::parse(&format!("{scheme}://{host}{}", request.path()))
        });
        let Ok(mut base) = base else {
            return path.to_string();
        };

        if !path.starts_with('/') && !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        base.set_query(None);
        base.set_fragment(None);
        match base.join(path) {
            Ok(url) => url.to_string(),
            Err(_) => path.to_string(),
        }
    }

    pub(crate) fn write_expires(&mut self) -> ResourceResult<()> {
        if let Some(expires) = self.resource.expires(self.ex)? {
            self.ex
                .response
                .set_header(header::EXPIRES, &format_http_date(&expires))?;
        }
        Ok(())
    }

    /// Validators, representation and length of a successful response.
    pub(crate) fn respond(&mut self) -> ResourceResult<Transition> {
        if let Some(etag) = self.etag()? {
            self.ex.response.set_header(header::ETAG, &etag.to_string())?;
        }
        if let Some(modified) = self.last_modified()? {
            let modified = modified.min(self.ex.response.origination());
            self.ex
                .response
                .set_header(header::LAST_MODIFIED, &format_http_date(&modified))?;
        }
        self.write_expires()?;
        self.write_entity_headers()?;

        if self.is_get_or_head() {
            self.write_representation()?;
        }

        let mut status = StatusCode::OK;
        if self.engine.ranges_enabled() {
            self.ex.response.set_header(header::ACCEPT_RANGES, "bytes")?;
            if self.method() == Method::GET {
                if let Some(partial) = self.serve_ranges()? {
                    status = partial;
                }
            }
        }

        let length = self.ex.response.body().len().to_string();
        self.ex.response.set_header(header::CONTENT_LENGTH, &length)?;
        Ok(Transition::Done(status))
    }

    fn write_entity_headers(&mut self) -> ResourceResult<()> {
        if !self.ex.response.has_header("content-type") {
            if let Some(media_type) = self.ex.media_type() {
                let value = match self.ex.charset() {
                    Some(charset) => format!("{media_type}; charset={charset}"),
                    None => media_type.to_string(),
                };
                self.ex.response.set_header(header::CONTENT_TYPE, &value)?;
            }
        }
        if let Some(language) = self.ex.language() {
            let value = language.to_string();
            self.ex.response.set_header(header::CONTENT_LANGUAGE, &value)?;
        }
        if let Some(encoding) = self.ex.encoding() {
            if !encoding.eq_ignore_ascii_case(IDENTITY) {
                let value = encoding.to_string();
                self.ex.response.set_header(header::CONTENT_ENCODING, &value)?;
            }
        }
        Ok(())
    }

    fn write_representation(&mut self) -> ResourceResult<()> {
        let Some(media_type) = self.ex.media_type().cloned() else {
            return Err(ResourceError::fault("no content type was negotiated"));
        };
        let provider = self
            .resource
            .content_types_provided(self.ex)?
            .into_iter()
            .find(|(provided, _)| *provided == media_type)
            .map(|(_, handler)| handler);
        match provider {
            Some(handler) => handler(self.resource, self.ex),
            None => Err(ResourceError::fault(format!(
                "no provider for negotiated type {media_type}"
            ))),
        }
    }

    /// `Some(status)` when the `Range` header changed the response.
    fn serve_ranges(&mut self) -> ResourceResult<Option<StatusCode>> {
        let Some(header_value) = self.request_header("range") else {
            return Ok(None);
        };
        let requested = Range::parse(header_value);
        if requested.is_empty() {
            return Ok(None);
        }

        let len = self.ex.response.body().len() as u64;
        let ranges = Range::collapse(&requested, len);
        let response = &mut *self.ex.response;
        match ranges.as_slice() {
            [] => {
                response.set_header(header::CONTENT_RANGE, &format!("bytes */{len}"))?;
                response.clear_body()?;
                Ok(Some(StatusCode::RANGE_NOT_SATISFIABLE))
            }
            [single] => {
                let first = single.first_byte(len) as usize;
                let last = single.last_byte(len) as usize;
                let body = response.take_body();
                response.set_body(&body[first..=last])?;
                response.set_header(header::CONTENT_RANGE, &single.content_range(len))?;
                Ok(Some(StatusCode::PARTIAL_CONTENT))
            }
            many => {
                let boundary = range::boundary();
                let content_type = response.header("content-type").map(str::to_string);
                let body = response.take_body();
                let multipart =
                    range::write_multipart(&body, many, content_type.as_deref(), &boundary);
                response.set_body(multipart)?;
                response.set_header(
                    header::CONTENT_TYPE,
                    &format!("multipart/byteranges; boundary={boundary}"),
                )?;
                Ok(Some(StatusCode::PARTIAL_CONTENT))
            }
        }
    }
}

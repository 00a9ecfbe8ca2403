//! The decision graph.
//!
//! Each node asks one question of the resource (or a negotiator) and either
//! moves to another node or ends the walk with a status. Edges only ever
//! point further down the list of concerns, so a walk visits each node at
//! most once.

use axum::http::{header, Method, StatusCode};
use chrono::{DateTime, Utc};

use crate::engine::Engine;
use crate::http::date::{parse_http_date, truncate_to_seconds};
use crate::negotiation::{
    CharsetChoice, EncodingNegotiator, LanguageNegotiator, MediaTypeNegotiator, WeightedValue,
};
use crate::resource::etag::{is_any, ETag};
use crate::resource::{Exchange, Resource, ResourceError, ResourceResult};

/// Nodes of the decision graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    ServiceAvailable,
    UriTooLong,
    MalformedRequest,
    KnownMethod,
    Authorized,
    Forbidden,
    ValidContentHeaders,
    KnownContentType,
    ValidEntityLength,
    Options,
    MethodAllowed,
    AcceptMediaType,
    AcceptLanguage,
    AcceptCharset,
    AcceptEncoding,
    ResourceExists,
    IfMatch,
    IfUnmodifiedSince,
    IfNoneMatch,
    IfModifiedSince,
    MissingIfMatchAny,
    MissingIsPut,
    PutMovedPermanently,
    PreviouslyExisted,
    MovedPermanently,
    MovedTemporarily,
    PostToGone,
    PostToMissing,
    MethodDelete,
    DeleteCompleted,
    MethodPost,
    PostIsCreate,
    CreatePath,
    ProcessPost,
    MethodPut,
    Conflict,
    AcceptBody,
    SeeOther,
    NewResource,
    HasBody,
    MultipleChoices,
    Respond,
}

pub(crate) enum Transition {
    To(Decision),
    Done(StatusCode),
}

use Decision::*;
use Transition::{Done, To};

fn gate(passed: bool, next: Decision, failed: StatusCode) -> Transition {
    if passed {
        To(next)
    } else {
        Done(failed)
    }
}

/// One walk through the graph for one request.
pub(crate) struct Walk<'w, 'a, R: Resource> {
    pub(crate) engine: &'w Engine,
    pub(crate) resource: &'w mut R,
    pub(crate) ex: &'w mut Exchange<'a>,
    pub(crate) exists: bool,
    etag: Option<Option<ETag>>,
    last_modified: Option<Option<DateTime<Utc>>>,
}

impl<'w, 'a, R: Resource> Walk<'w, 'a, R> {
    pub(crate) fn new(engine: &'w Engine, resource: &'w mut R, ex: &'w mut Exchange<'a>) -> Self {
        Self {
            engine,
            resource,
            ex,
            exists: true,
            etag: None,
            last_modified: None,
        }
    }

    pub(crate) fn run(mut self) -> ResourceResult<StatusCode> {
        let mut decision = ServiceAvailable;
        loop {
            tracing::trace!(?decision, "Visiting decision");
            self.ex.record(decision);
            match self.visit(decision)? {
                To(next) => decision = next,
                Done(status) => return Ok(status),
            }
        }
    }

    pub(crate) fn method(&self) -> &'a Method {
        self.ex.request().method()
    }

    pub(crate) fn is_get_or_head(&self) -> bool {
        self.method() == Method::GET || self.method() == Method::HEAD
    }

    pub(crate) fn request_header(&self, name: &str) -> Option<&'a str> {
        self.ex.request().header(name)
    }

    /// Every line of a list-valued conditional header, joined.
    fn conditional(&self, name: &str) -> Option<String> {
        self.ex.request().header_list(name)
    }

    fn preferences(&self, name: &str) -> Option<Vec<WeightedValue>> {
        self.ex
            .request()
            .header_list(name)
            .map(|value| WeightedValue::parse_list(&value))
    }

    pub(crate) fn etag(&mut self) -> ResourceResult<Option<ETag>> {
        if self.etag.is_none() {
            self.etag = Some(self.resource.generate_etag(self.ex)?);
        }
        Ok(self.etag.clone().flatten())
    }

    pub(crate) fn last_modified(&mut self) -> ResourceResult<Option<DateTime<Utc>>> {
        if self.last_modified.is_none() {
            let value = self.resource.last_modified(self.ex)?.map(truncate_to_seconds);
            self.last_modified = Some(value);
        }
        Ok(self.last_modified.flatten())
    }

    fn visit(&mut self, decision: Decision) -> ResourceResult<Transition> {
        let transition = match decision {
            ServiceAvailable => gate(
                self.resource.service_available(self.ex)?,
                UriTooLong,
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            UriTooLong => gate(
                !self.resource.uri_too_long(self.ex)?,
                MalformedRequest,
                StatusCode::URI_TOO_LONG,
            ),
            MalformedRequest => gate(
                !self.resource.malformed_request(self.ex)?,
                KnownMethod,
                StatusCode::BAD_REQUEST,
            ),
            KnownMethod => {
                let known = self.resource.known_methods(self.ex)?;
                gate(
                    known.contains(self.method()),
                    Authorized,
                    StatusCode::NOT_IMPLEMENTED,
                )
            }
            Authorized => gate(
                self.resource.is_authorized(self.ex)?,
                Forbidden,
                StatusCode::UNAUTHORIZED,
            ),
            Forbidden => gate(
                !self.resource.forbidden(self.ex)?,
                ValidContentHeaders,
                StatusCode::FORBIDDEN,
            ),
            ValidContentHeaders => gate(
                self.resource.valid_content_headers(self.ex)?,
                KnownContentType,
                StatusCode::NOT_IMPLEMENTED,
            ),
            KnownContentType => gate(
                self.resource.known_content_type(self.ex)?,
                ValidEntityLength,
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            ValidEntityLength => gate(
                self.resource.valid_entity_length(self.ex)?,
                Options,
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            Options => {
                if self.method() == Method::OPTIONS {
                    let allowed = self.resource.allowed_methods(self.ex)?;
                    self.ex.response.set_header(header::ALLOW, &join_methods(&allowed))?;
                    self.ex.response.set_header(header::CONTENT_LENGTH, "0")?;
                    Done(StatusCode::OK)
                } else {
                    To(MethodAllowed)
                }
            }
            MethodAllowed => {
                let allowed = self.resource.allowed_methods(self.ex)?;
                if allowed.contains(self.method()) {
                    To(AcceptMediaType)
                } else {
                    self.ex.response.set_header(header::ALLOW, &join_methods(&allowed))?;
                    Done(StatusCode::METHOD_NOT_ALLOWED)
                }
            }
            AcceptMediaType => {
                let mut vary = vec!["Accept-Encoding".to_string()];
                vary.extend(self.resource.variances(self.ex)?);
                self.ex.response.set_header(header::VARY, &vary.join(", "))?;

                let provided: Vec<_> = self
                    .resource
                    .content_types_provided(self.ex)?
                    .into_iter()
                    .map(|(media_type, _)| media_type)
                    .collect();
                match self.preferences("accept") {
                    Some(accept) => {
                        match MediaTypeNegotiator::new().select(&provided, Some(&accept)) {
                            Some(media_type) => {
                                self.ex.media_type = Some(media_type);
                                To(AcceptLanguage)
                            }
                            None => Done(StatusCode::NOT_ACCEPTABLE),
                        }
                    }
                    None => {
                        self.ex.media_type = MediaTypeNegotiator::new().select(&provided, None);
                        To(AcceptLanguage)
                    }
                }
            }
            AcceptLanguage => {
                let Some(ranges) = self.preferences("accept-language") else {
                    return Ok(To(AcceptCharset));
                };
                let Some(available) = self.resource.languages_provided(self.ex)? else {
                    return Ok(To(AcceptCharset));
                };
                match LanguageNegotiator::new().select(&available, &ranges) {
                    Some(language) => {
                        self.ex.language = Some(language);
                        To(AcceptCharset)
                    }
                    None => Done(StatusCode::NOT_ACCEPTABLE),
                }
            }
            AcceptCharset => {
                let Some(preferences) = self.preferences("accept-charset") else {
                    return Ok(To(AcceptEncoding));
                };
                let supported = self.resource.charsets_provided(self.ex)?;
                match self
                    .engine
                    .charset_negotiator()
                    .select(&supported, Some(&preferences))
                {
                    Some(CharsetChoice::Selected(charset)) => {
                        self.ex.charset = Some(charset);
                        To(AcceptEncoding)
                    }
                    Some(CharsetChoice::Unconstrained) => To(AcceptEncoding),
                    None => Done(StatusCode::NOT_ACCEPTABLE),
                }
            }
            AcceptEncoding => {
                let preferences = self.preferences("accept-encoding");
                let provided = self.resource.encodings_provided(self.ex)?;
                match EncodingNegotiator::new().select(&provided, preferences.as_deref()) {
                    Some(encoding) => {
                        self.ex.encoding = Some(encoding);
                        To(ResourceExists)
                    }
                    None => Done(StatusCode::NOT_ACCEPTABLE),
                }
            }
            ResourceExists => {
                self.exists = self.resource.resource_exists(self.ex)?;
                if self.exists {
                    To(IfMatch)
                } else {
                    To(MissingIfMatchAny)
                }
            }
            IfMatch => match self.conditional("if-match") {
                None => To(IfUnmodifiedSince),
                Some(value) if is_any(&value) => To(IfUnmodifiedSince),
                Some(value) => {
                    let wanted = ETag::parse_list(&value);
                    let matched = self
                        .etag()?
                        .is_some_and(|etag| wanted.iter().any(|w| w.matches(&etag)));
                    gate(matched, IfUnmodifiedSince, StatusCode::PRECONDITION_FAILED)
                }
            },
            IfUnmodifiedSince => {
                if self.method() == Method::PUT {
                    return Ok(To(IfNoneMatch));
                }
                let Some(since) = self
                    .request_header("if-unmodified-since")
                    .and_then(parse_http_date)
                else {
                    return Ok(To(IfNoneMatch));
                };
                match self.last_modified()? {
                    Some(modified) if modified < since => Done(StatusCode::PRECONDITION_FAILED),
                    _ => To(IfNoneMatch),
                }
            }
            IfNoneMatch => match self.conditional("if-none-match") {
                None => To(IfModifiedSince),
                Some(value) => {
                    let matched = if is_any(&value) {
                        true
                    } else {
                        let candidates = ETag::parse_list(&value);
                        self.etag()?
                            .is_some_and(|etag| candidates.iter().any(|c| c.matches(&etag)))
                    };
                    if !matched {
                        To(IfModifiedSince)
                    } else if self.is_get_or_head() {
                        self.not_modified()?
                    } else {
                        Done(StatusCode::PRECONDITION_FAILED)
                    }
                }
            },
            IfModifiedSince => {
                let Some(since) = self
                    .request_header("if-modified-since")
                    .and_then(parse_http_date)
                else {
                    return Ok(To(MethodDelete));
                };
                if since > self.ex.response.origination() {
                    return Ok(To(MethodDelete));
                }
                match self.last_modified()? {
                    Some(modified) if modified <= since => self.not_modified()?,
                    _ => To(MethodDelete),
                }
            }
            MissingIfMatchAny => match self.conditional("if-match") {
                Some(value) if is_any(&value) => Done(StatusCode::PRECONDITION_FAILED),
                _ => To(MissingIsPut),
            },
            MissingIsPut => {
                if self.method() == Method::PUT {
                    To(PutMovedPermanently)
                } else {
                    To(PreviouslyExisted)
                }
            }
            PutMovedPermanently => match self.resource.moved_permanently(self.ex)? {
                Some(location) => {
                    self.ex.response.set_header(header::LOCATION, &location)?;
                    Done(StatusCode::MOVED_PERMANENTLY)
                }
                None => To(Conflict),
            },
            PreviouslyExisted => {
                if self.resource.previously_existed(self.ex)? {
                    To(MovedPermanently)
                } else {
                    To(PostToMissing)
                }
            }
            MovedPermanently => match self.resource.moved_permanently(self.ex)? {
                Some(location) => {
                    self.ex.response.set_header(header::LOCATION, &location)?;
                    Done(StatusCode::MOVED_PERMANENTLY)
                }
                None => To(MovedTemporarily),
            },
            MovedTemporarily => match self.resource.moved_temporarily(self.ex)? {
                Some(location) => {
                    self.ex.response.set_header(header::LOCATION, &location)?;
                    Done(StatusCode::TEMPORARY_REDIRECT)
                }
                None => To(PostToGone),
            },
            PostToGone => {
                if self.method() == Method::POST && self.resource.allow_missing_post(self.ex)? {
                    To(PostIsCreate)
                } else {
                    Done(StatusCode::GONE)
                }
            }
            PostToMissing => {
                if self.method() == Method::POST && self.resource.allow_missing_post(self.ex)? {
                    To(PostIsCreate)
                } else {
                    Done(StatusCode::NOT_FOUND)
                }
            }
            MethodDelete => {
                if self.method() != Method::DELETE {
                    To(MethodPost)
                } else if self.resource.delete_resource(self.ex)? {
                    To(DeleteCompleted)
                } else {
                    Done(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
            DeleteCompleted => gate(
                self.resource.delete_completed(self.ex)?,
                HasBody,
                StatusCode::ACCEPTED,
            ),
            MethodPost => {
                if self.method() == Method::POST {
                    To(PostIsCreate)
                } else {
                    To(MethodPut)
                }
            }
            PostIsCreate => {
                if self.resource.post_is_create(self.ex)? {
                    To(CreatePath)
                } else {
                    To(ProcessPost)
                }
            }
            CreatePath => {
                let Some(path) = self.resource.create_path(self.ex)? else {
                    return Err(ResourceError::fault("post_is_create without a create_path"));
                };
                let location = self.resolve_created(&path);
                self.ex.response.set_header(header::LOCATION, &location)?;
                To(AcceptBody)
            }
            ProcessPost => gate(
                self.resource.process_post(self.ex)?,
                SeeOther,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            MethodPut => {
                if self.method() == Method::PUT {
                    To(Conflict)
                } else {
                    To(MultipleChoices)
                }
            }
            Conflict => gate(
                !self.resource.is_conflict(self.ex)?,
                AcceptBody,
                StatusCode::CONFLICT,
            ),
            AcceptBody => {
                self.accept_body()?;
                To(SeeOther)
            }
            SeeOther => {
                if !self.ex.is_redirect() {
                    To(NewResource)
                } else if self.ex.response.has_header("location") {
                    Done(StatusCode::SEE_OTHER)
                } else {
                    return Err(ResourceError::fault("redirect requested without a Location"));
                }
            }
            NewResource => {
                if self.ex.response.has_header("location") {
                    Done(StatusCode::CREATED)
                } else {
                    To(HasBody)
                }
            }
            HasBody => {
                if self.ex.response.has_body() {
                    To(MultipleChoices)
                } else {
                    Done(StatusCode::NO_CONTENT)
                }
            }
            MultipleChoices => {
                if self.resource.multiple_choices(self.ex)? {
                    Done(StatusCode::MULTIPLE_CHOICES)
                } else {
                    To(Respond)
                }
            }
            Respond => self.respond()?,
        };

        Ok(transition)
    }

    /// 304 carries the validators a cache needs to refresh its copy.
    fn not_modified(&mut self) -> ResourceResult<Transition> {
        if let Some(etag) = self.etag()? {
            self.ex.response.set_header(header::ETAG, &etag.to_string())?;
        }
        self.write_expires()?;
        Ok(Done(StatusCode::NOT_MODIFIED))
    }
}

fn join_methods(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

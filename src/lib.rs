//! Webmachine-style HTTP resource processing.
//!
//! A [`resource::Resource`] answers capability questions (does it exist?
//! which methods? which media types?) and the [`engine::Engine`] walks it
//! through HTTP/1.1 request semantics to a single status, header set and
//! body. [`negotiation`] holds the Accept-* algorithms, [`range`] the byte
//! range model, and [`http::HttpServer`] adapts the whole thing to axum.

pub mod config;
pub mod engine;
pub mod http;
pub mod lifecycle;
pub mod negotiation;
pub mod observability;
pub mod range;
pub mod resource;
pub mod store;

pub use config::schema::AppConfig;
pub use engine::Engine;
pub use http::{HttpServer, Request, Response};
pub use lifecycle::Shutdown;
pub use resource::{Exchange, Resource, ResourceError, ResourceResult};

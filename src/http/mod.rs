//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, body limit)
//!     → request.rs (immutable Request handed to the engine)
//!     → Dispatcher builds a Resource, Engine processes it
//!     → response.rs (Response built up, then committed)
//!     → server.rs (converted back to an axum response)
//!     → Send to client
//! ```

pub mod date;
pub mod request;
pub mod response;
pub mod server;

pub use request::Request;
pub use response::{Response, ResponseError};
pub use server::{Dispatcher, HttpServer, ServerError};

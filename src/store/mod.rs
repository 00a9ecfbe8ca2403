//! In-memory document store served through the decision engine.
//!
//! # Data Flow
//! ```text
//! HttpServer
//!     → DocumentDispatcher (one DocumentResource per request)
//!     → Engine asks the resource questions
//!         resource_exists / previously_existed → DocumentStore lookups
//!         generate_etag / last_modified        → document revision and time
//!         acceptors (PUT, POST to a collection) → DocumentStore::put
//!         providers (GET, HEAD)                 → JSON or plain text
//! ```
//!
//! # Design Decisions
//! - Paths ending in `/` are collections; POST to one creates a document
//!   with a generated name
//! - Revisions come from one store-wide counter, so an ETag is never reused
//!   even after a delete and re-create
//! - Deleted paths leave a tombstone so a later GET answers 410

mod document;
mod resource;

pub use document::{Document, DocumentStore};
pub use resource::{DocumentDispatcher, DocumentResource};

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine and HTTP adapter produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Request ID (x-request-id) is attached to the per-request span
//! - Metrics are cheap (atomic increments) and recorded once per request

pub mod logging;
pub mod metrics;

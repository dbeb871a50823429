//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request pipeline / lifecycle produce:
//!     → counters.rs (received vs accepted batches and events)
//!     → metrics.rs (same increments mirrored to the metrics facade)
//!     → logging.rs (structured log events)
//!
//! Consumers:
//!     → HttpSource::counters() snapshots
//!     → Metrics endpoint (Prometheus scrape, optional)
//!     → Log aggregation (stdout)
//! ```
//!
//! # Design Decisions
//! - Counters are plain atomics, no lock on the request path
//! - Counters outlive restarts of the same source; stopping freezes a
//!   snapshot for reporting but never resets

pub mod counters;
pub mod logging;
pub mod metrics;

pub use counters::{CounterSnapshot, SourceCounter};

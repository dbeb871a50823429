//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! HttpSource (source.rs):
//!     Unconfigured ─configure→ Configured ─start→ Running ─stop→ Stopped
//!                                  ▲                               │
//!                                  └──────────configure────────────┘
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → caller stops the source
//! ```
//!
//! # Design Decisions
//! - Explicit state enum behind an async mutex; start/stop never race
//! - Fail fast: configure and start errors are returned, state unchanged
//! - Stop always completes: drain failures are logged, not returned

pub mod signals;
pub mod source;
pub mod state;

pub use source::HttpSource;
pub use state::Lifecycle;

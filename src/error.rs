//! Lifecycle errors of the HTTP source.
//!
//! Configuration and start failures abort the operation and are returned to
//! the caller. Per-request failures never surface here; see
//! [`IngestError`](crate::http::IngestError).

use crate::config::ConfigError;
use crate::handler::ResolveError;
use crate::net::{ListenerError, TlsError};

/// Error returned by [`HttpSource`](crate::lifecycle::HttpSource) operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Settings are missing or violate an invariant.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// The configured handler could not be instantiated.
    #[error("handler resolution failed: {0}")]
    HandlerResolution(#[from] ResolveError),

    /// The listener could not be built or bound.
    #[error("failed to start transport: {0}")]
    TransportStart(#[from] TransportError),

    /// A listener is already running for this source.
    #[error("running HTTP server found in source {0} before one was started")]
    AlreadyRunning(String),

    /// `start` was called without a successful `configure` since the last
    /// stop.
    #[error("source is not configured")]
    NotConfigured,
}

/// Cause of a [`SourceError::TransportStart`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error(transparent)]
    Tls(#[from] TlsError),
}

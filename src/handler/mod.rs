//! Pluggable event deserialization.
//!
//! # Data Flow
//! ```text
//! RawRequest (method, uri, headers, body)
//!     → EventHandler::extract_events
//!     → Vec<Event> handed to the request pipeline
//! ```
//!
//! # Design Decisions
//! - Handlers are selected by name from a [`HandlerRegistry`] at configure
//!   time, then shared read-only across all request tasks (`Send + Sync`)
//! - A malformed payload is [`HandlerError::BadRequest`]; anything else is a
//!   handler fault. The pipeline maps the two to 400 and 500.

pub mod blob;
pub mod json;
pub mod registry;

use crate::config::Context;
use crate::event::Event;
use crate::http::request::RawRequest;

pub use blob::BlobHandler;
pub use json::JsonHandler;
pub use registry::{HandlerFactory, HandlerRegistry, ResolveError};

/// Error returned by an [`EventHandler`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// The client sent a payload the handler cannot decode.
    #[error("{0}")]
    BadRequest(String),
    /// The handler rejected its configuration.
    #[error("{0}")]
    Configuration(String),
    /// Any other handler failure.
    #[error("{0}")]
    Other(String),
}

/// Converts a raw HTTP request into a batch of events.
///
/// Implementations must be safe to call concurrently: one instance serves
/// every request once configured.
pub trait EventHandler: Send + Sync {
    /// Apply the `[handler]` properties. Called once, before any request.
    fn configure(&mut self, _properties: &Context) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Decode the request into events, in order.
    fn extract_events(&self, request: &RawRequest) -> Result<Vec<Event>, HandlerError>;
}

//! HTTP event source library.
//!
//! Accepts event batches over HTTP(S), decodes them with a pluggable
//! [`EventHandler`](handler::EventHandler) and hands them to a
//! [`Channel`](channel::Channel).

pub mod channel;
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use channel::{Channel, ChannelError, MemoryChannel};
pub use config::{Context, SourceConfig, TlsSettings};
pub use error::SourceError;
pub use event::Event;
pub use handler::{EventHandler, HandlerError, HandlerRegistry};
pub use http::RawRequest;
pub use lifecycle::{HttpSource, Lifecycle};
pub use observability::{CounterSnapshot, SourceCounter};

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, method constraints, middleware)
//!     → request.rs (request ID, buffered RawRequest)
//!     → pipeline.rs (handler → counters → channel)
//!     → response.rs (status mapping, CORS headers)
//!     → Send to client
//! ```

pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use pipeline::Pipeline;
pub use request::{RawRequest, X_REQUEST_ID};
pub use response::{Accepted, IngestError};
pub use server::HttpServer;

//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! SourceConfig (bind, port, tls, excluded protocols)
//!     → listener.rs (resolve, bind with SO_REUSEADDR)
//!     → protocol.rs (drop excluded TLS versions)
//!     → tls.rs (keystore → rustls ServerConfig, TLS only)
//!     → Hand off to axum-server
//! ```
//!
//! # Design Decisions
//! - The protocol allow-list is applied while building the TLS config, so
//!   no connection can ever negotiate an excluded version
//! - Binding happens before the server task is spawned; a bind failure is
//!   reported by start, not logged from a background task

pub mod listener;
pub mod protocol;
pub mod tls;

pub use listener::{bind, ListenerError};
pub use protocol::ProtocolFilter;
pub use tls::TlsError;

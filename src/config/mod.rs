//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (serde into SourceFile)
//!     → validation.rs (SourceFile → SourceConfig, invariant checks)
//!     → SourceConfig (validated, immutable)
//!     → handed to HttpSource::configure
//! ```
//!
//! # Design Decisions
//! - Config is immutable once validated; changes require a new configure
//! - Handler settings travel as an opaque [`Context`] built from `[handler]`
//! - Type errors come from serde; invariant checks collect every violation

pub mod context;
pub mod loader;
pub mod schema;
pub mod validation;

pub use context::Context;
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{HandlerSection, ProtocolList, SourceConfig, SourceFile, TlsSettings};
pub use validation::{validate_config, ValidationError};

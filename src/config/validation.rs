//! Configuration validation.
//!
//! # Responsibilities
//! - Turn a deserialized [`SourceFile`] into a typed [`SourceConfig`]
//! - Enforce the invariants: non-empty bind host, port present, complete
//!   keystore credentials when TLS is on
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Type errors (a port that is not a number) are serde's, reported by the
//!   loader with the offending key

use crate::config::context::Context;
use crate::config::schema::{
    excluded_protocols, SourceConfig, SourceFile, TlsSettings,
    BASELINE_EXCLUDED_PROTOCOL, DEFAULT_HANDLER,
};
use crate::config::ConfigError;

/// A single violated configuration invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("bind host is empty")]
    EmptyBindHost,
    #[error("a port number must be specified")]
    MissingPort,
    #[error("keystore is required when TLS is enabled")]
    MissingKeystore,
    #[error("keystore password is required when TLS is enabled")]
    MissingKeystorePassword,
    #[error("handler name is empty")]
    EmptyHandler,
    #[error("maxBodySize must be greater than zero")]
    ZeroBodyLimit,
    #[error("excluded protocols must contain SSLv3")]
    MissingBaselineProtocol,
}

/// Check the invariants of an already typed configuration.
pub fn validate_config(config: &SourceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bind.trim().is_empty() {
        errors.push(ValidationError::EmptyBindHost);
    }
    if let Some(tls) = &config.tls {
        if tls.keystore.as_os_str().is_empty() {
            errors.push(ValidationError::MissingKeystore);
        }
        if tls.keystore_password.is_empty() {
            errors.push(ValidationError::MissingKeystorePassword);
        }
    }
    if config.handler.trim().is_empty() {
        errors.push(ValidationError::EmptyHandler);
    }
    if config.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if !config.excluded_protocols.contains(BASELINE_EXCLUDED_PROTOCOL) {
        errors.push(ValidationError::MissingBaselineProtocol);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl TryFrom<SourceFile> for SourceConfig {
    type Error = ConfigError;

    fn try_from(file: SourceFile) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let port = file.port.unwrap_or_else(|| {
            errors.push(ValidationError::MissingPort);
            0
        });

        let tls = if file.enable_ssl {
            tracing::debug!("TLS configuration enabled");
            Some(TlsSettings::new(
                file.keystore.unwrap_or_default(),
                file.keystore_password.unwrap_or_default(),
            ))
        } else {
            None
        };

        let (handler, handler_properties) = match file.handler {
            Some(section) => section.into_parts()?,
            None => (DEFAULT_HANDLER.to_string(), Context::new()),
        };

        let config = SourceConfig {
            name: file.name,
            bind: file.bind.trim().to_string(),
            port,
            tls,
            excluded_protocols: excluded_protocols(
                file.exclude_protocols
                    .map(|list| list.names())
                    .unwrap_or_default(),
            ),
            handler: handler.trim().to_string(),
            handler_properties,
            max_body_size: file.max_body_size,
            metrics_address: file
                .metrics_address
                .map(|addr| addr.trim().to_string())
                .filter(|addr| !addr.is_empty()),
        };

        if let Err(more) = validate_config(&config) {
            errors.extend(more);
        }

        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

//! TLS configuration and keystore loading.
//!
//! The keystore is a PEM file with the certificate chain followed by the
//! private key (PKCS#8, PKCS#1 or SEC1). Protocol versions come from
//! rustls' defaults minus the [`ProtocolFilter`] exclusions.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;

use crate::config::TlsSettings;
use crate::net::protocol::ProtocolFilter;

/// Error type for TLS setup.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("Failed to read keystore {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No certificate found in keystore {0:?}")]
    NoCertificates(PathBuf),
    #[error("No private key found in keystore {0:?}")]
    NoPrivateKey(PathBuf),
    #[error("Every TLS protocol is excluded (excluded: {excluded})")]
    NoProtocolsEnabled { excluded: String },
    #[error("Invalid TLS configuration: {0}")]
    Rustls(#[from] rustls::Error),
}

/// Read the certificate chain and private key from a PEM keystore.
pub fn load_keystore(
    path: &Path,
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>), TlsError> {
    let io_err = |source: std::io::Error| TlsError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.to_path_buf()));
    }

    // certs() consumed the reader, start over for the key
    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);
    let key = rustls_pemfile::private_key(&mut reader)
        .map_err(io_err)?
        .ok_or_else(|| TlsError::NoPrivateKey(path.to_path_buf()))?;

    Ok((certs, key))
}

/// Build the rustls server config with the filtered protocol list.
pub fn server_config(
    settings: &TlsSettings,
    filter: &ProtocolFilter,
) -> Result<ServerConfig, TlsError> {
    let versions = filter.apply(rustls::DEFAULT_VERSIONS)?;
    let (certs, key) = load_keystore(&settings.keystore)?;

    let mut config = ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::aws_lc_rs::default_provider(),
    ))
    .with_protocol_versions(&versions)?
    .with_no_client_auth()
    .with_single_cert(certs, key)?;

    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
    Ok(config)
}

/// Load TLS configuration for axum-server.
pub fn load_tls_config(
    settings: &TlsSettings,
    filter: &ProtocolFilter,
) -> Result<RustlsConfig, TlsError> {
    let config = server_config(settings, filter)?;
    tracing::debug!(keystore = ?settings.keystore, "TLS keystore loaded");
    Ok(RustlsConfig::from_config(Arc::new(config)))
}

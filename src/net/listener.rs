//! TCP listener setup.
//!
//! # Responsibilities
//! - Resolve the configured host
//! - Bind with address reuse so a restart does not wait out TIME_WAIT
//! - Hand back a std listener in non-blocking mode for axum-server

use std::net::SocketAddr;

use tokio::net::TcpSocket;

/// Pending connection queue length.
const BACKLOG: u32 = 1024;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Host name could not be resolved.
    #[error("Failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },
    /// Host resolved to no address.
    #[error("No address found for {0}")]
    NoAddress(String),
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Bind `host:port` with `SO_REUSEADDR` set.
///
/// Returns the listener and the address it actually bound (port 0 resolves
/// to an ephemeral port).
pub async fn bind(
    host: &str,
    port: u16,
) -> Result<(std::net::TcpListener, SocketAddr), ListenerError> {
    let addr = tokio::net::lookup_host((host, port))
        .await
        .map_err(|source| ListenerError::Resolve {
            host: host.to_string(),
            source,
        })?
        .next()
        .ok_or_else(|| ListenerError::NoAddress(host.to_string()))?;

    let bind_err = |source: std::io::Error| ListenerError::Bind { addr, source };

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(bind_err)?;
    socket.set_reuseaddr(true).map_err(bind_err)?;
    socket.bind(addr).map_err(bind_err)?;

    let listener = socket.listen(BACKLOG).map_err(bind_err)?;
    let local_addr = listener.local_addr().map_err(bind_err)?;
    tracing::info!(address = %local_addr, "Listener bound");

    let listener = listener.into_std().map_err(bind_err)?;
    Ok((listener, local_addr))
}

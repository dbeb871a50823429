//! The HTTP source: configuration, listener ownership and lifecycle.
//!
//! # Responsibilities
//! - Validate configuration and resolve the handler (`configure`)
//! - Bind the plain or TLS listener and serve the pipeline (`start`)
//! - Drain in-flight requests and release the listener (`stop`)
//! - Own the counters, created once per source instance

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use axum_server::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::channel::Channel;
use crate::config::{validate_config, ConfigError, SourceConfig};
use crate::error::{SourceError, TransportError};
use crate::handler::{EventHandler, HandlerRegistry};
use crate::http::{HttpServer, Pipeline};
use crate::lifecycle::Lifecycle;
use crate::net::{self, tls, ProtocolFilter};
use crate::observability::SourceCounter;

/// Validated configuration plus the handler resolved from it.
#[derive(Clone)]
struct Prepared {
    config: Arc<SourceConfig>,
    handler: Arc<dyn EventHandler>,
}

/// A live listener.
struct Running {
    prepared: Prepared,
    local_addr: SocketAddr,
    handle: Handle,
    task: JoinHandle<Result<(), std::io::Error>>,
}

enum State {
    Unconfigured,
    Configured(Prepared),
    Running(Running),
    Stopped,
}

impl State {
    fn lifecycle(&self) -> Lifecycle {
        match self {
            State::Unconfigured => Lifecycle::Unconfigured,
            State::Configured(_) => Lifecycle::Configured,
            State::Running(_) => Lifecycle::Running,
            State::Stopped => Lifecycle::Stopped,
        }
    }
}

/// HTTP ingestion endpoint feeding a [`Channel`].
///
/// ```no_run
/// # async fn run() -> Result<(), http_source::SourceError> {
/// use std::sync::Arc;
/// use http_source::{HttpSource, MemoryChannel, SourceConfig};
///
/// let channel = Arc::new(MemoryChannel::new(10_000));
/// let source = HttpSource::new(channel);
/// source.configure(SourceConfig::new("0.0.0.0", 8080)).await?;
/// source.start().await?;
/// // ...
/// source.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct HttpSource {
    channel: Arc<dyn Channel>,
    registry: HandlerRegistry,
    counters: OnceLock<Arc<SourceCounter>>,
    state: Mutex<State>,
}

impl HttpSource {
    /// Create a source using the built-in handlers.
    pub fn new(channel: Arc<dyn Channel>) -> Self {
        Self::with_registry(channel, HandlerRegistry::default())
    }

    /// Create a source resolving handlers from `registry`.
    pub fn with_registry(channel: Arc<dyn Channel>, registry: HandlerRegistry) -> Self {
        Self {
            channel,
            registry,
            counters: OnceLock::new(),
            state: Mutex::new(State::Unconfigured),
        }
    }

    /// Parse TOML configuration text and [`configure`](Self::configure).
    pub async fn configure_from_toml(&self, content: &str) -> Result<(), SourceError> {
        let config = SourceConfig::from_toml(content).map_err(|e| {
            tracing::error!(error = %e, "Error configuring HTTP source");
            e
        })?;
        self.configure(config).await
    }

    /// Validate `config`, resolve its handler and ensure counters exist.
    ///
    /// Allowed from any state but Running. On failure the state is unchanged.
    pub async fn configure(&self, config: SourceConfig) -> Result<(), SourceError> {
        let mut state = self.state.lock().await;
        if let State::Running(running) = &*state {
            return Err(SourceError::AlreadyRunning(running.prepared.config.name.clone()));
        }

        if let Err(errors) = validate_config(&config) {
            let err = ConfigError::Validation(errors);
            tracing::error!(source = %config.name, error = %err, "Error configuring HTTP source");
            return Err(err.into());
        }

        let handler = self
            .registry
            .resolve(&config.handler, &config.handler_properties)
            .map_err(|e| {
                tracing::error!(source = %config.name, handler = %config.handler, error = %e, "Error resolving handler");
                e
            })?;

        let counters = self
            .counters
            .get_or_init(|| Arc::new(SourceCounter::new(config.name.clone())));
        // Values carry over; the metric label follows the latest name.
        counters.rename(&config.name);

        tracing::info!(
            source = %config.name,
            bind = %config.bind,
            port = config.port,
            tls = config.tls_enabled(),
            handler = %config.handler,
            "HTTP source configured"
        );

        *state = State::Configured(Prepared {
            config: Arc::new(config),
            handler,
        });
        Ok(())
    }

    /// Bind the listener and start serving.
    ///
    /// Returns the bound address. Fails with
    /// [`SourceError::AlreadyRunning`] if a listener is held and leaves the
    /// source Configured on any bind or TLS failure.
    pub async fn start(&self) -> Result<SocketAddr, SourceError> {
        let mut state = self.state.lock().await;
        let prepared = match &*state {
            State::Running(running) => {
                tracing::error!(
                    source = %running.prepared.config.name,
                    "Running HTTP server found before one was started, will not start another"
                );
                return Err(SourceError::AlreadyRunning(
                    running.prepared.config.name.clone(),
                ));
            }
            State::Configured(prepared) => prepared.clone(),
            State::Unconfigured | State::Stopped => return Err(SourceError::NotConfigured),
        };
        let config = &prepared.config;

        let tls_config = match &config.tls {
            Some(settings) => {
                let filter = ProtocolFilter::new(config.excluded_protocols.iter().cloned());
                Some(
                    tls::load_tls_config(settings, &filter)
                        .map_err(|e| start_error(config, e.into()))?,
                )
            }
            None => None,
        };

        let (listener, local_addr) = net::bind(&config.bind, config.port)
            .await
            .map_err(|e| start_error(config, e.into()))?;

        let counters = Arc::clone(self.counters.get_or_init(|| {
            Arc::new(SourceCounter::new(config.name.clone()))
        }));
        let pipeline = Arc::new(Pipeline::new(
            Arc::clone(&prepared.handler),
            Arc::clone(&self.channel),
            Arc::clone(&counters),
        ));
        let server = HttpServer::new(pipeline, config.max_body_size);

        let handle = Handle::new();
        let task = tokio::spawn(server.run(listener, tls_config, handle.clone()));

        counters.start();
        tracing::info!(
            source = %config.name,
            address = %local_addr,
            tls = config.tls_enabled(),
            "HTTP source started"
        );

        *state = State::Running(Running {
            prepared,
            local_addr,
            handle,
            task,
        });
        Ok(local_addr)
    }

    /// Stop accepting, drain in-flight requests and release the listener.
    ///
    /// A no-op unless Running. Never fails; shutdown errors are logged.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        let running = match std::mem::replace(&mut *state, State::Stopped) {
            State::Running(running) => running,
            other => {
                tracing::debug!(state = %other.lifecycle(), "HTTP source not running, nothing to stop");
                *state = other;
                return;
            }
        };

        let name = running.prepared.config.name.clone();
        running.handle.graceful_shutdown(None);

        match running.task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(source = %name, error = %e, "Error while stopping HTTP source")
            }
            Err(e) => {
                tracing::error!(source = %name, error = %e, "HTTP server task failed")
            }
        }

        if let Some(counters) = self.counters.get() {
            let frozen = counters.stop();
            tracing::info!(source = %name, metrics = %frozen, "HTTP source stopped");
        }
    }

    /// Current lifecycle state.
    pub async fn lifecycle(&self) -> Lifecycle {
        self.state.lock().await.lifecycle()
    }

    /// Address the listener is bound to, while Running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        match &*self.state.lock().await {
            State::Running(running) => Some(running.local_addr),
            _ => None,
        }
    }

    /// The active configuration, if configured or running.
    pub async fn config(&self) -> Option<Arc<SourceConfig>> {
        match &*self.state.lock().await {
            State::Configured(prepared) => Some(Arc::clone(&prepared.config)),
            State::Running(running) => Some(Arc::clone(&running.prepared.config)),
            State::Unconfigured | State::Stopped => None,
        }
    }

    /// Counters, once the source has been configured.
    pub fn counters(&self) -> Option<Arc<SourceCounter>> {
        self.counters.get().cloned()
    }
}

impl std::fmt::Debug for HttpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSource")
            .field("registry", &self.registry)
            .field("counters", &self.counters.get().map(|c| c.snapshot()))
            .finish_non_exhaustive()
    }
}

fn start_error(config: &SourceConfig, err: TransportError) -> SourceError {
    tracing::error!(source = %config.name, error = %err, "Error while starting HTTP source");
    SourceError::TransportStart(err)
}

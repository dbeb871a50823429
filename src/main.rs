//! HTTP event source (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                   HTTP SOURCE                    │
//!                         │                                                  │
//!   Client POST/GET       │  ┌─────────┐   ┌──────────┐   ┌──────────────┐  │
//!   ──────────────────────┼─▶│   net   │──▶│   http   │──▶│   handler    │  │
//!                         │  │listener │   │ pipeline │   │ (json/blob)  │  │
//!                         │  │  + TLS  │   └────┬─────┘   └──────────────┘  │
//!                         │  └─────────┘        │                           │
//!                         │                     ▼                           │
//!   200/400/500/503       │               ┌──────────┐    ┌─────────────┐   │
//!   ◀─────────────────────┼───────────────│ counters │    │   channel   │───┼──▶ sinks
//!                         │               └──────────┘    └─────────────┘   │
//!                         │                                                  │
//!                         │  config · lifecycle · observability              │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use http_source::config::load_config;
use http_source::lifecycle::signals::shutdown_signal;
use http_source::observability::{logging, metrics};
use http_source::{HttpSource, MemoryChannel};

#[derive(Parser)]
#[command(name = "http-source")]
#[command(about = "HTTP ingestion endpoint feeding an in-memory channel", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: PathBuf,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Channel capacity in events.
    #[arg(long, default_value_t = 10_000)]
    channel_capacity: usize,

    /// How often the built-in logging sink drains the channel, in milliseconds.
    #[arg(long, default_value_t = 1_000, value_parser = clap::value_parser!(u64).range(1..))]
    drain_interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    tracing::info!("http-source v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli.config)?;

    if let Some(address) = &config.metrics_address {
        match address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(metrics_address = %address, error = %e, "Failed to parse metrics address"),
        }
    }

    let channel = Arc::new(MemoryChannel::new(cli.channel_capacity));
    let sink = tokio::spawn(drain(
        Arc::clone(&channel),
        Duration::from_millis(cli.drain_interval_ms),
    ));

    let source = HttpSource::new(channel);
    source.configure(config).await?;
    source.start().await?;

    shutdown_signal().await;

    source.stop().await;
    sink.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Stand-in sink: empties the channel periodically and logs what it took.
async fn drain(channel: Arc<MemoryChannel>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        let events = channel.take(channel.capacity());
        if !events.is_empty() {
            let bytes: usize = events.iter().map(|e| e.body().len()).sum();
            tracing::info!(events = events.len(), bytes, "Drained events from channel");
        }
    }
}

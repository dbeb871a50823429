//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use http_source::{
    Context, Event, EventHandler, HandlerError, HandlerRegistry, HttpSource, MemoryChannel,
    RawRequest, SourceConfig,
};

/// Body the echo handler refuses.
pub const MALFORMED: &str = "malformed";

/// Turns every request into three copies of its body.
pub struct EchoHandler;

impl EventHandler for EchoHandler {
    fn extract_events(&self, request: &RawRequest) -> Result<Vec<Event>, HandlerError> {
        if request.body().as_ref() == MALFORMED.as_bytes() {
            return Err(HandlerError::BadRequest("echo handler cannot parse body".into()));
        }
        Ok((0..3).map(|_| Event::from_body(request.body().clone())).collect())
    }
}

pub fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::default();
    registry.register("echo", || Box::new(EchoHandler));
    registry
}

/// Plain-HTTP config on an ephemeral loopback port using the echo handler.
pub fn echo_config() -> SourceConfig {
    SourceConfig::new("127.0.0.1", 0).with_handler("echo", Context::new())
}

/// Configure and start a source, returning it with its channel and address.
pub async fn start_source(
    config: SourceConfig,
    capacity: usize,
) -> (HttpSource, Arc<MemoryChannel>, SocketAddr) {
    let channel = Arc::new(MemoryChannel::new(capacity));
    let source = HttpSource::with_registry(channel.clone(), registry());
    source.configure(config).await.unwrap();
    let addr = source.start().await.unwrap();
    (source, channel, addr)
}

/// Counter totals as (batches received, events received, batches accepted,
/// events accepted).
pub fn totals(source: &HttpSource) -> (u64, u64, u64, u64) {
    let snap = source.counters().unwrap().snapshot();
    (
        snap.batches_received,
        snap.events_received,
        snap.batches_accepted,
        snap.events_accepted,
    )
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

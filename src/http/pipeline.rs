//! Per-request processing pipeline.
//!
//! # State Machine
//! ```text
//! Received → Deserializing ─┬─ bad request ──────────────→ 400
//!                           ├─ handler fault ────────────→ 500
//!                           └─ Deserialized (N events)
//!                                 → count received (+1 batch, +N events)
//!                                 → Submitting ─┬─ full ──→ 503
//!                                               ├─ fault ─→ 500
//!                                               └─ Accepted
//!                                                    → count accepted → 200
//! ```
//!
//! # Design Decisions
//! - GET and POST take the same path
//! - No retries here; the status code tells the client what to do
//! - No lock is held across the channel submit
//! - Handler and channel calls are synchronous and may block, so each
//!   request runs them on the blocking pool, never on an async worker

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::header::ORIGIN;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};

use crate::channel::{Channel, ChannelError};
use crate::handler::{EventHandler, HandlerError};
use crate::http::request::{request_id, RawRequest};
use crate::http::response::{Accepted, IngestError};
use crate::observability::metrics;
use crate::observability::SourceCounter;

/// Everything a request needs, shared by all request tasks.
pub struct Pipeline {
    source: String,
    handler: Arc<dyn EventHandler>,
    channel: Arc<dyn Channel>,
    counters: Arc<SourceCounter>,
}

impl Pipeline {
    pub fn new(
        handler: Arc<dyn EventHandler>,
        channel: Arc<dyn Channel>,
        counters: Arc<SourceCounter>,
    ) -> Self {
        Self {
            source: counters.name(),
            handler,
            channel,
            counters,
        }
    }

    pub fn counters(&self) -> &Arc<SourceCounter> {
        &self.counters
    }

    /// Deserialize, account and submit one request.
    pub fn process(&self, request: &RawRequest) -> Result<Accepted, IngestError> {
        let events = self
            .handler
            .extract_events(request)
            .map_err(|e| match e {
                HandlerError::BadRequest(detail) => {
                    tracing::warn!(source = %self.source, error = %detail, "Received bad request from client");
                    IngestError::BadRequest(detail)
                }
                other => {
                    tracing::warn!(source = %self.source, error = %other, "Deserializer threw unexpected exception");
                    IngestError::HandlerFault(other.to_string())
                }
            })?;

        let count = events.len();
        self.counters.record_batch_received(count as u64);

        self.channel.submit_batch(events).map_err(|e| match e {
            ChannelError::Full(detail) => {
                tracing::warn!(
                    source = %self.source,
                    events = count,
                    error = %detail,
                    "Error appending event to channel. Channel might be full. \
                     Consider increasing the channel capacity or make sure the sinks perform faster."
                );
                IngestError::ChannelFull(detail)
            }
            ChannelError::Other(detail) => {
                tracing::warn!(source = %self.source, events = count, error = %detail, "Unexpected error appending event to channel");
                IngestError::ChannelFault(detail)
            }
        })?;

        self.counters.record_batch_accepted(count as u64);

        Ok(Accepted {
            origin: request.headers().get(ORIGIN).cloned(),
            charset: request.charset().map(str::to_string),
            events: count,
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source)
            .field("counters", &self.counters.snapshot())
            .finish()
    }
}

/// Axum handler for every ingest path.
pub async fn ingest(
    State(pipeline): State<Arc<Pipeline>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = request_id(&headers).to_string();

    let response = match body {
        Err(rejection) => {
            tracing::warn!(request_id = %request_id, error = %rejection.body_text(), "Failed to read request body");
            IngestError::Body {
                status: rejection.status(),
                detail: rejection.body_text(),
            }
            .into_response()
        }
        Ok(body) => {
            let raw = RawRequest::new(method, uri, headers, body);
            let worker = Arc::clone(&pipeline);
            let outcome = tokio::task::spawn_blocking(move || worker.process(&raw))
                .await
                .unwrap_or_else(|e| {
                    tracing::error!(request_id = %request_id, error = %e, "Request processing task failed");
                    Err(IngestError::Internal(e.to_string()))
                });
            match outcome {
                Ok(accepted) => {
                    tracing::debug!(request_id = %request_id, events = accepted.events, "Batch accepted");
                    accepted.into_response()
                }
                Err(e) => e.into_response(),
            }
        }
    };

    metrics::record_response(&pipeline.source, response.status().as_u16());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MemoryChannel;
    use crate::handler::JsonHandler;
    use crate::observability::CounterSnapshot;

    struct Failing(HandlerError);

    impl EventHandler for Failing {
        fn extract_events(&self, _request: &RawRequest) -> Result<Vec<crate::event::Event>, HandlerError> {
            Err(self.0.clone())
        }
    }

    struct BrokenChannel;

    impl Channel for BrokenChannel {
        fn submit_batch(&self, _events: Vec<crate::event::Event>) -> Result<(), ChannelError> {
            Err(ChannelError::Other("transaction aborted".into()))
        }
    }

    fn pipeline(handler: Arc<dyn EventHandler>, channel: Arc<dyn Channel>) -> Pipeline {
        Pipeline::new(handler, channel, Arc::new(SourceCounter::new("test")))
    }

    fn totals(p: &Pipeline) -> (u64, u64, u64, u64) {
        let CounterSnapshot {
            batches_received,
            events_received,
            batches_accepted,
            events_accepted,
            ..
        } = p.counters().snapshot();
        (batches_received, events_received, batches_accepted, events_accepted)
    }

    const TWO_EVENTS: &str = r#"[{"body": "a"}, {"body": "b"}]"#;

    #[test]
    fn accepted_batch_counted_twice() {
        let channel = Arc::new(MemoryChannel::new(10));
        let p = pipeline(Arc::new(JsonHandler), channel.clone());

        let accepted = p.process(&RawRequest::post("/", TWO_EVENTS)).unwrap();
        assert_eq!(accepted.events, 2);
        assert_eq!(totals(&p), (1, 2, 1, 2));
        assert_eq!(channel.len(), 2);
    }

    #[test]
    fn bad_request_touches_no_counter() {
        let p = pipeline(Arc::new(JsonHandler), Arc::new(MemoryChannel::new(10)));

        let err = p.process(&RawRequest::post("/", "{not json")).unwrap_err();
        assert_eq!(err.status().as_u16(), 400);
        assert_eq!(totals(&p), (0, 0, 0, 0));
    }

    #[test]
    fn handler_fault_is_500() {
        let p = pipeline(
            Arc::new(Failing(HandlerError::Other("decoder crashed".into()))),
            Arc::new(MemoryChannel::new(10)),
        );

        let err = p.process(&RawRequest::post("/", "")).unwrap_err();
        assert_eq!(err.status().as_u16(), 500);
        assert_eq!(err.to_string(), "Deserializer threw unexpected exception. decoder crashed");
        assert_eq!(totals(&p), (0, 0, 0, 0));
    }

    #[test]
    fn full_channel_counts_received_only() {
        let channel = Arc::new(MemoryChannel::new(1));
        let p = pipeline(Arc::new(JsonHandler), channel.clone());

        let err = p.process(&RawRequest::post("/", TWO_EVENTS)).unwrap_err();
        assert_eq!(err.status().as_u16(), 503);
        assert!(err
            .to_string()
            .starts_with("Error appending event to channel. Channel might be full."));
        assert_eq!(totals(&p), (1, 2, 0, 0));
        assert!(channel.is_empty());
    }

    #[test]
    fn channel_fault_is_500() {
        let p = pipeline(Arc::new(JsonHandler), Arc::new(BrokenChannel));

        let err = p.process(&RawRequest::post("/", TWO_EVENTS)).unwrap_err();
        assert_eq!(err.status().as_u16(), 500);
        assert_eq!(
            err.to_string(),
            "Unexpected error while appending event to channel. transaction aborted"
        );
        assert_eq!(totals(&p), (1, 2, 0, 0));
    }

    #[test]
    fn empty_batch_still_counted() {
        let p = pipeline(Arc::new(JsonHandler), Arc::new(MemoryChannel::new(10)));

        p.process(&RawRequest::post("/", "[]")).unwrap();
        assert_eq!(totals(&p), (1, 0, 1, 0));
    }

    #[test]
    fn origin_and_charset_echoed() {
        use axum::http::header::CONTENT_TYPE;

        let p = pipeline(Arc::new(JsonHandler), Arc::new(MemoryChannel::new(10)));
        let request = RawRequest::post("/", "[]")
            .with_header(ORIGIN, "https://app.example")
            .with_header(CONTENT_TYPE, "application/json; charset=utf-8");

        let accepted = p.process(&request).unwrap();
        assert_eq!(accepted.origin.unwrap(), "https://app.example");
        assert_eq!(accepted.charset.as_deref(), Some("utf-8"));
    }
}

//! Event type shared by handlers and channels.

use std::collections::BTreeMap;

use axum::body::Bytes;

/// A single ingested event: a header map plus an opaque body.
///
/// Events are produced by an [`EventHandler`](crate::handler::EventHandler)
/// and consumed by a [`Channel`](crate::channel::Channel).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    headers: BTreeMap<String, String>,
    body: Bytes,
}

impl Event {
    /// Create an event from headers and body.
    pub fn new(headers: BTreeMap<String, String>, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// Create an event with no headers.
    pub fn from_body(body: impl Into<Bytes>) -> Self {
        Self::new(BTreeMap::new(), body)
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Split the event into its headers and body.
    pub fn into_parts(self) -> (BTreeMap<String, String>, Bytes) {
        (self.headers, self.body)
    }
}

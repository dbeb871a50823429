//! Response handling.
//!
//! # Responsibilities
//! - Map every pipeline outcome to exactly one complete HTTP response
//! - Add CORS headers on accepted batches
//!
//! # Status Mapping
//! ```text
//! handler bad request      → 400
//! handler fault            → 500
//! channel full             → 503
//! channel fault            → 500
//! processing task failed   → 500
//! unreadable / oversized   → 400 / 413
//! accepted                 → 200
//! ```

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

pub const ALLOWED_METHODS: &str = "POST, GET, OPTIONS";

/// Per-request failure. Never escapes the pipeline; always rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("Bad request from client. {0}")]
    BadRequest(String),
    #[error("Deserializer threw unexpected exception. {0}")]
    HandlerFault(String),
    #[error("Error appending event to channel. Channel might be full.{0}")]
    ChannelFull(String),
    #[error("Unexpected error while appending event to channel. {0}")]
    ChannelFault(String),
    /// The blocking task running the request panicked or was cancelled.
    #[error("Internal error while processing request. {0}")]
    Internal(String),
    /// The body could not be read (too large, client went away).
    #[error("{detail}")]
    Body { status: StatusCode, detail: String },
}

impl IngestError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::BadRequest(_) => StatusCode::BAD_REQUEST,
            IngestError::HandlerFault(_)
            | IngestError::ChannelFault(_)
            | IngestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            IngestError::ChannelFull(_) => StatusCode::SERVICE_UNAVAILABLE,
            IngestError::Body { status, .. } => *status,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// A batch the channel accepted.
#[derive(Debug, Clone, Default)]
pub struct Accepted {
    /// Request `Origin`, echoed as `Access-Control-Allow-Origin`.
    pub origin: Option<HeaderValue>,
    /// Request charset, echoed on the response content type.
    pub charset: Option<String>,
    pub events: usize,
}

impl IntoResponse for Accepted {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;

        let headers = response.headers_mut();
        if let Some(charset) = &self.charset {
            if let Ok(value) = HeaderValue::from_str(&format!("text/plain; charset={}", charset)) {
                headers.insert(CONTENT_TYPE, value);
            }
        }
        if let Some(origin) = self.origin {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        response
    }
}

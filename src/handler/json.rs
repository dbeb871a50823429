//! JSON array handler.
//!
//! Body format:
//! ```json
//! [{"headers": {"host": "web-1"}, "body": "first"}, {"body": "second"}]
//! ```
//! An empty body is an empty batch.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::event::Event;
use crate::handler::{EventHandler, HandlerError};
use crate::http::request::RawRequest;

#[derive(Debug, Deserialize)]
struct JsonEvent {
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    body: String,
}

/// Decodes a JSON array of `{headers, body}` objects. The default handler.
#[derive(Debug, Default, Clone)]
pub struct JsonHandler;

impl JsonHandler {
    pub const NAME: &'static str = "json";
}

impl EventHandler for JsonHandler {
    fn extract_events(&self, request: &RawRequest) -> Result<Vec<Event>, HandlerError> {
        if let Some(charset) = request.charset() {
            if !is_utf8(charset) {
                return Err(HandlerError::BadRequest(format!(
                    "Unsupported character set in request: {}. JSON handler supports UTF-8 only.",
                    charset
                )));
            }
        }

        let body = request.body();
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let events: Vec<JsonEvent> = serde_json::from_slice(body).map_err(|e| {
            HandlerError::BadRequest(format!("Request has invalid JSON Syntax. {}", e))
        })?;

        Ok(events
            .into_iter()
            .map(|e| Event::new(e.headers, e.body))
            .collect())
    }
}

fn is_utf8(charset: &str) -> bool {
    charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("utf8")
}

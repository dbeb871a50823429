//! Whole-body handler.
//!
//! The request body becomes a single event. Query parameters become event
//! headers; `mandatoryParameters` (comma separated) names the ones a request
//! must carry.

use std::collections::BTreeMap;

use crate::config::Context;
use crate::event::Event;
use crate::handler::{EventHandler, HandlerError};
use crate::http::request::RawRequest;

const MANDATORY_PARAMETERS: &str = "mandatoryParameters";

/// Wraps the raw body in one event, headers taken from the query string.
#[derive(Debug, Default, Clone)]
pub struct BlobHandler {
    mandatory_parameters: Vec<String>,
}

impl BlobHandler {
    pub const NAME: &'static str = "blob";

    /// Create a handler requiring the given query parameters.
    pub fn new<I, S>(mandatory_parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mandatory_parameters: mandatory_parameters.into_iter().map(Into::into).collect(),
        }
    }
}

impl EventHandler for BlobHandler {
    fn configure(&mut self, properties: &Context) -> Result<(), HandlerError> {
        if let Some(raw) = properties.get_string(MANDATORY_PARAMETERS) {
            let names: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
            if names.is_empty() {
                return Err(HandlerError::Configuration(format!(
                    "{} is set but names no parameters",
                    MANDATORY_PARAMETERS
                )));
            }
            self.mandatory_parameters = names;
        }
        Ok(())
    }

    fn extract_events(&self, request: &RawRequest) -> Result<Vec<Event>, HandlerError> {
        let mut headers = BTreeMap::new();
        for (key, value) in request.query_pairs() {
            // first occurrence wins
            headers.entry(key).or_insert(value);
        }

        for name in &self.mandatory_parameters {
            if !headers.contains_key(name) {
                return Err(HandlerError::BadRequest(format!(
                    "Please specify {} parameter in the request.",
                    name
                )));
            }
        }

        Ok(vec![Event::new(headers, request.body().clone())])
    }
}

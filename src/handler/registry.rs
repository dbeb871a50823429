//! Name → handler factory lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Context;
use crate::handler::{BlobHandler, EventHandler, HandlerError, JsonHandler};

/// Builds a fresh, unconfigured handler.
pub type HandlerFactory = Arc<dyn Fn() -> Box<dyn EventHandler> + Send + Sync>;

/// Failure to turn a handler name into a configured handler.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no handler registered as '{name}' (known: {known})")]
    Unknown { name: String, known: String },
    #[error("handler '{name}' rejected its configuration: {source}")]
    Configure {
        name: String,
        #[source]
        source: HandlerError,
    },
}

/// Registry of the handlers a source can be configured with.
///
/// [`HandlerRegistry::default`] knows the built-in `json` and `blob`
/// handlers; embedders add their own with [`HandlerRegistry::register`].
#[derive(Clone)]
pub struct HandlerRegistry {
    factories: BTreeMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    /// A registry with no handlers at all.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with the built-in handlers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(JsonHandler::NAME, || Box::new(JsonHandler::default()));
        registry.register(BlobHandler::NAME, || Box::new(BlobHandler::default()));
        registry
    }

    /// Register (or replace) a factory under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn EventHandler> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiate the handler registered as `name` and configure it.
    pub fn resolve(
        &self,
        name: &str,
        properties: &Context,
    ) -> Result<Arc<dyn EventHandler>, ResolveError> {
        let factory = self.factories.get(name).ok_or_else(|| ResolveError::Unknown {
            name: name.to_string(),
            known: self.names().collect::<Vec<_>>().join(", "),
        })?;

        let mut handler = factory();
        handler
            .configure(properties)
            .map_err(|source| ResolveError::Configure {
                name: name.to_string(),
                source,
            })?;

        tracing::debug!(handler = %name, "Handler configured");
        Ok(Arc::from(handler))
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

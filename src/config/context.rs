//! Handler properties.
//!
//! # Responsibilities
//! - Carry the `[handler]` section to the selected handler as flat strings
//! - Flatten nested TOML tables into dotted keys
//!
//! # Design Decisions
//! - Opaque to the source: only the handler knows which keys it reads
//! - Keys are kept sorted (BTreeMap) for deterministic logging

use std::collections::BTreeMap;

use toml::Value;

use crate::config::ConfigError;

/// Properties handed to a handler's `configure`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    properties: BTreeMap<String, String>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a TOML table.
    ///
    /// Nested tables become dotted keys, arrays of scalars become
    /// space-separated strings.
    pub fn from_table(table: &toml::Table) -> Result<Self, ConfigError> {
        let mut context = Context::new();
        flatten("", table, &mut context)?;
        Ok(context)
    }

    /// Insert or replace a property.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`Context::put`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.put(key, value);
        self
    }

    /// Remove a property, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.properties.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut Context) -> Result<(), ConfigError> {
    for (key, value) in table {
        let full_key = format!("{}{}", prefix, key);
        match value {
            Value::Table(nested) => flatten(&format!("{}.", full_key), nested, out)?,
            Value::Array(items) => {
                let mut parts = Vec::with_capacity(items.len());
                for item in items {
                    parts.push(scalar(&full_key, item)?);
                }
                out.put(full_key, parts.join(" "));
            }
            other => {
                let rendered = scalar(&full_key, other)?;
                out.put(full_key, rendered);
            }
        }
    }
    Ok(())
}

fn scalar(key: &str, value: &Value) -> Result<String, ConfigError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Datetime(d) => Ok(d.to_string()),
        Value::Array(_) => Err(ConfigError::Unsupported {
            key: key.to_string(),
            kind: "nested array",
        }),
        Value::Table(_) => Err(ConfigError::Unsupported {
            key: key.to_string(),
            kind: "table inside array",
        }),
    }
}

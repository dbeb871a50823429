//! Configuration schema definitions.
//!
//! [`SourceFile`] is the on-disk TOML form, deserialized with serde.
//! [`SourceConfig`] is the validated, immutable snapshot consumed by the
//! HTTP source. It is built from a file by
//! [`load_config`](crate::config::load_config) /
//! [`SourceConfig::from_toml`], or directly in code and checked with
//! [`validate_config`](crate::config::validation::validate_config).
//!
//! ```toml
//! name = "ingest"
//! bind = "0.0.0.0"
//! port = 8443
//! enableSSL = true
//! keystore = "/etc/source/keystore.pem"
//! keystorePassword = "changeit"
//! excludeProtocols = ["TLSv1.2"]
//!
//! [handler]
//! type = "blob"
//! mandatoryParameters = "tenant,host"
//! ```
//!
//! `handler = "blob"` is accepted as shorthand when the handler takes no
//! properties.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;

use crate::config::context::Context;
use crate::config::loader;
use crate::config::ConfigError;

pub const DEFAULT_SOURCE_NAME: &str = "http-source";
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_HANDLER: &str = "json";
pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024; // 2MB

/// Key inside the `[handler]` table that names the handler.
pub const HANDLER_TYPE_KEY: &str = "type";

/// Protocol that is always excluded from the TLS listener, whatever the
/// operator lists in `excludeProtocols`.
pub const BASELINE_EXCLUDED_PROTOCOL: &str = "SSLv3";

/// Configuration file layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_bind")]
    pub bind: String,

    /// Required; `None` is reported by validation.
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(rename = "enableSSL", default)]
    pub enable_ssl: bool,

    #[serde(default)]
    pub keystore: Option<PathBuf>,

    #[serde(default)]
    pub keystore_password: Option<String>,

    #[serde(default)]
    pub exclude_protocols: Option<ProtocolList>,

    #[serde(default)]
    pub handler: Option<HandlerSection>,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    #[serde(default)]
    pub metrics_address: Option<String>,
}

fn default_name() -> String {
    DEFAULT_SOURCE_NAME.to_string()
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

/// `excludeProtocols`: a space-separated string or an array of names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProtocolList {
    Spaced(String),
    List(Vec<String>),
}

impl ProtocolList {
    pub fn names(&self) -> Vec<String> {
        match self {
            ProtocolList::Spaced(list) => list.split_whitespace().map(str::to_string).collect(),
            ProtocolList::List(names) => names
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }
}

/// `handler`: a bare registry name, or a table with `type` plus the
/// handler's own properties.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HandlerSection {
    Name(String),
    Table(toml::Table),
}

impl HandlerSection {
    /// Split into the registry name and the properties the handler receives.
    pub fn into_parts(self) -> Result<(String, Context), ConfigError> {
        match self {
            HandlerSection::Name(name) => Ok((name, Context::new())),
            HandlerSection::Table(table) => {
                let mut properties = Context::from_table(&table)?;
                let name = properties
                    .remove(HANDLER_TYPE_KEY)
                    .unwrap_or_else(|| DEFAULT_HANDLER.to_string());
                Ok((name, properties))
            }
        }
    }
}

/// Root configuration for the HTTP source.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Source name used in logs and metric labels.
    pub name: String,

    /// Host or address to bind (e.g., "0.0.0.0").
    pub bind: String,

    /// Port to bind. 0 picks an ephemeral port.
    pub port: u16,

    /// TLS settings; `None` serves plain HTTP.
    pub tls: Option<TlsSettings>,

    /// TLS protocol names never enabled on the listener.
    pub excluded_protocols: BTreeSet<String>,

    /// Handler registry name.
    pub handler: String,

    /// Properties from the `[handler]` table, minus `type`.
    pub handler_properties: Context,

    /// Maximum accepted request body in bytes.
    pub max_body_size: usize,

    /// Optional Prometheus exporter address (e.g., "0.0.0.0:9090").
    pub metrics_address: Option<String>,
}

impl SourceConfig {
    /// Create a plain-HTTP configuration with defaults for everything else.
    pub fn new(bind: impl Into<String>, port: u16) -> Self {
        Self {
            name: DEFAULT_SOURCE_NAME.to_string(),
            bind: bind.into(),
            port,
            tls: None,
            excluded_protocols: excluded_protocols(Vec::new()),
            handler: DEFAULT_HANDLER.to_string(),
            handler_properties: Context::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            metrics_address: None,
        }
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        loader::parse_config(content)
    }

    /// Select the handler by registry name.
    pub fn with_handler(mut self, name: impl Into<String>, properties: Context) -> Self {
        self.handler = name.into();
        self.handler_properties = properties;
        self
    }

    /// Enable TLS with the given keystore.
    pub fn with_tls(mut self, tls: TlsSettings) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls.is_some()
    }
}

/// Keystore credentials for the TLS listener.
///
/// The keystore is a PEM file holding the certificate chain followed by the
/// private key.
#[derive(Clone, PartialEq, Eq)]
pub struct TlsSettings {
    pub keystore: PathBuf,
    pub keystore_password: String,
}

impl TlsSettings {
    pub fn new(keystore: impl Into<PathBuf>, keystore_password: impl Into<String>) -> Self {
        Self {
            keystore: keystore.into(),
            keystore_password: keystore_password.into(),
        }
    }
}

impl std::fmt::Debug for TlsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsSettings")
            .field("keystore", &self.keystore)
            .field("keystore_password", &"<redacted>")
            .finish()
    }
}

/// Build the exclusion set from the operator's list.
///
/// [`BASELINE_EXCLUDED_PROTOCOL`] is always part of the result.
pub fn excluded_protocols(names: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    let mut excluded: BTreeSet<String> = names.into_iter().collect();
    excluded.insert(BASELINE_EXCLUDED_PROTOCOL.to_string());
    excluded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_protocol_always_excluded() {
        assert_eq!(
            excluded_protocols(Vec::new()).into_iter().collect::<Vec<_>>(),
            vec!["SSLv3"]
        );

        let operator = excluded_protocols(ProtocolList::Spaced("TLSv1  TLSv1.1".into()).names());
        assert!(operator.contains("SSLv3"));
        assert!(operator.contains("TLSv1"));
        assert!(operator.contains("TLSv1.1"));
        assert_eq!(operator.len(), 3);
    }

    #[test]
    fn protocol_list_forms() {
        let spaced = ProtocolList::Spaced(" TLSv1 TLSv1.1 ".into());
        let array = ProtocolList::List(vec!["TLSv1".into(), " ".into(), "TLSv1.1".into()]);
        assert_eq!(spaced.names(), vec!["TLSv1", "TLSv1.1"]);
        assert_eq!(array.names(), spaced.names());
    }

    #[test]
    fn handler_table_carries_type_and_properties() {
        let table: toml::Table = "type = \"blob\"\nmandatoryParameters = \"tenant\""
            .parse()
            .unwrap();
        let (name, properties) = HandlerSection::Table(table).into_parts().unwrap();
        assert_eq!(name, "blob");
        assert_eq!(properties.get_string("mandatoryParameters"), Some("tenant"));
        assert!(!properties.contains_key(HANDLER_TYPE_KEY));

        let (name, properties) = HandlerSection::Table(toml::Table::new()).into_parts().unwrap();
        assert_eq!(name, DEFAULT_HANDLER);
        assert!(properties.is_empty());
    }

    #[test]
    fn password_is_redacted() {
        let tls = TlsSettings::new("/etc/source/keystore.pem", "hunter2");
        let printed = format!("{:?}", tls);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("keystore.pem"));
    }
}

//! TLS protocol filtering.
//!
//! Takes the TLS library's default protocol list, drops every name in the
//! exclusion set and keeps the rest in their original order. Names follow
//! the usual `SSLv3` / `TLSv1.2` spelling.

use std::collections::BTreeSet;

use rustls::{ProtocolVersion, SupportedProtocolVersion};

use crate::config::schema::BASELINE_EXCLUDED_PROTOCOL;
use crate::net::tls::TlsError;

/// Exclusion set applied to the TLS listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolFilter {
    excluded: BTreeSet<String>,
}

impl ProtocolFilter {
    /// Build a filter. [`BASELINE_EXCLUDED_PROTOCOL`] is always added.
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut excluded: BTreeSet<String> = excluded.into_iter().map(Into::into).collect();
        excluded.insert(BASELINE_EXCLUDED_PROTOCOL.to_string());
        Self { excluded }
    }

    pub fn excluded(&self) -> &BTreeSet<String> {
        &self.excluded
    }

    pub fn is_excluded(&self, protocol: &str) -> bool {
        self.excluded.contains(protocol)
    }

    /// Drop excluded names, preserving order.
    pub fn filter<'a>(&self, enabled: &[&'a str]) -> Vec<&'a str> {
        enabled
            .iter()
            .copied()
            .filter(|protocol| !self.is_excluded(protocol))
            .collect()
    }

    /// Drop excluded rustls versions, preserving order.
    ///
    /// Fails when nothing is left to negotiate.
    pub fn apply(
        &self,
        enabled: &[&'static SupportedProtocolVersion],
    ) -> Result<Vec<&'static SupportedProtocolVersion>, TlsError> {
        let kept: Vec<_> = enabled
            .iter()
            .copied()
            .filter(|v| !self.is_excluded(&protocol_name(v.version)))
            .collect();

        if kept.is_empty() {
            return Err(TlsError::NoProtocolsEnabled {
                excluded: self.excluded.iter().cloned().collect::<Vec<_>>().join(" "),
            });
        }

        tracing::debug!(
            enabled = ?kept.iter().map(|v| protocol_name(v.version)).collect::<Vec<_>>(),
            excluded = ?self.excluded,
            "TLS protocols filtered"
        );
        Ok(kept)
    }
}

impl Default for ProtocolFilter {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

/// Conventional name of a protocol version.
pub fn protocol_name(version: ProtocolVersion) -> String {
    match version {
        ProtocolVersion::SSLv2 => "SSLv2".to_string(),
        ProtocolVersion::SSLv3 => "SSLv3".to_string(),
        ProtocolVersion::TLSv1_0 => "TLSv1".to_string(),
        ProtocolVersion::TLSv1_1 => "TLSv1.1".to_string(),
        ProtocolVersion::TLSv1_2 => "TLSv1.2".to_string(),
        ProtocolVersion::TLSv1_3 => "TLSv1.3".to_string(),
        other => format!("{:?}", other),
    }
}

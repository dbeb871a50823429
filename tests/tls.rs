//! TLS listener tests: protocol exclusion is enforced at handshake time.

use http_source::{SourceConfig, TlsSettings};
use reqwest::tls::Version;

mod common;

fn tls_config(exclude: Option<&str>) -> SourceConfig {
    let mut toml = format!(
        "bind = \"127.0.0.1\"\nport = 0\nhandler = \"echo\"\nenableSSL = true\n\
         keystore = '{}'\nkeystorePassword = \"changeit\"\n",
        common::fixture("keystore.pem").display()
    );
    if let Some(exclude) = exclude {
        toml.push_str(&format!("excludeProtocols = \"{}\"\n", exclude));
    }
    SourceConfig::from_toml(&toml).unwrap()
}

fn client(min: Version, max: Version) -> reqwest::Client {
    reqwest::Client::builder()
        .use_rustls_tls()
        .danger_accept_invalid_certs(true)
        .min_tls_version(min)
        .max_tls_version(max)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn serves_over_tls() {
    let (source, _channel, addr) = common::start_source(tls_config(None), 100).await;
    assert!(source.config().await.unwrap().excluded_protocols.contains("SSLv3"));

    let res = client(Version::TLS_1_2, Version::TLS_1_3)
        .post(format!("https://127.0.0.1:{}/", addr.port()))
        .body("secure")
        .send()
        .await
        .expect("TLS request failed");
    assert_eq!(res.status(), 200);
    assert_eq!(common::totals(&source), (1, 3, 1, 3));

    source.stop().await;
}

#[tokio::test]
async fn excluded_protocol_never_negotiated() {
    let config = tls_config(Some("TLSv1.2"));
    assert!(config.excluded_protocols.contains("TLSv1.2"));
    assert!(config.excluded_protocols.contains("SSLv3"));
    let (source, _channel, addr) = common::start_source(config, 100).await;
    let url = format!("https://127.0.0.1:{}/", addr.port());

    // a client limited to TLS 1.2 cannot complete the handshake
    let result = client(Version::TLS_1_2, Version::TLS_1_2)
        .post(&url)
        .body("old")
        .send()
        .await;
    assert!(result.is_err());
    assert_eq!(common::totals(&source), (0, 0, 0, 0));

    let res = client(Version::TLS_1_3, Version::TLS_1_3)
        .post(&url)
        .body("new")
        .send()
        .await
        .expect("TLS 1.3 request failed");
    assert_eq!(res.status(), 200);

    source.stop().await;
}

#[tokio::test]
async fn excluding_every_protocol_fails_start() {
    let channel = std::sync::Arc::new(http_source::MemoryChannel::new(10));
    let source = http_source::HttpSource::with_registry(channel, common::registry());
    source
        .configure(tls_config(Some("TLSv1.2 TLSv1.3")))
        .await
        .unwrap();

    let err = source.start().await.unwrap_err();
    assert!(matches!(err, http_source::SourceError::TransportStart(_)));
    assert_eq!(source.lifecycle().await, http_source::Lifecycle::Configured);
}

#[test]
fn keystore_settings_required() {
    let err = SourceConfig::from_toml(
        "port = 8443\nenableSSL = true\nkeystore = \"/etc/keystore.pem\"",
    )
    .unwrap_err();
    assert!(err.to_string().contains("keystore password"));

    let ok = SourceConfig::new("127.0.0.1", 0).with_tls(TlsSettings::new("/k.pem", "pw"));
    assert!(http_source::config::validate_config(&ok).is_ok());
}

//! End-to-end tests over a real listener.

use std::time::Duration;

use http_source::{Context, HttpSource, Lifecycle, MemoryChannel, SourceConfig};
use std::sync::Arc;

mod common;

#[tokio::test]
async fn accepted_then_malformed() {
    let (source, channel, addr) = common::start_source(common::echo_config(), 100).await;
    let client = common::client();

    let res = client
        .post(format!("http://{}/", addr))
        .body("hello")
        .send()
        .await
        .expect("source unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(common::totals(&source), (1, 3, 1, 3));
    assert_eq!(channel.len(), 3);

    let res = client
        .post(format!("http://{}/", addr))
        .body(common::MALFORMED)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    assert_eq!(
        res.text().await.unwrap(),
        "Bad request from client. echo handler cannot parse body"
    );
    assert_eq!(common::totals(&source), (1, 3, 1, 3));

    source.stop().await;
    assert_eq!(source.lifecycle().await, Lifecycle::Stopped);
    assert_eq!(common::totals(&source), (1, 3, 1, 3));
}

#[tokio::test]
async fn get_treated_as_post() {
    let (source, _channel, addr) = common::start_source(common::echo_config(), 100).await;

    let res = common::client()
        .get(format!("http://{}/any/path?x=1", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(common::totals(&source), (1, 3, 1, 3));

    source.stop().await;
}

#[tokio::test]
async fn cors_headers_on_success() {
    let (source, _channel, addr) = common::start_source(common::echo_config(), 100).await;

    let res = common::client()
        .post(format!("http://{}/", addr))
        .header("Origin", "https://dashboard.example")
        .body("x")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let headers = res.headers();
    assert_eq!(headers["access-control-allow-origin"], "https://dashboard.example");
    assert_eq!(headers["access-control-allow-methods"], "POST, GET, OPTIONS");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert!(headers.contains_key("x-request-id"));

    source.stop().await;
}

#[tokio::test]
async fn full_channel_returns_503() {
    // room for one echo batch of 3 events
    let (source, channel, addr) = common::start_source(common::echo_config(), 4).await;
    let client = common::client();

    let res = client
        .post(format!("http://{}/", addr))
        .body("first")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .post(format!("http://{}/", addr))
        .body("second")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503);
    assert!(res
        .text()
        .await
        .unwrap()
        .starts_with("Error appending event to channel. Channel might be full."));
    assert_eq!(common::totals(&source), (2, 6, 1, 3));
    assert_eq!(channel.len(), 3);

    // a sink drains the channel, the next batch fits again
    channel.take(3);
    let res = client
        .post(format!("http://{}/", addr))
        .body("third")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(common::totals(&source), (3, 9, 2, 6));

    source.stop().await;
}

#[tokio::test]
async fn trace_rejected() {
    let (source, _channel, addr) = common::start_source(common::echo_config(), 100).await;

    let res = common::client()
        .request(reqwest::Method::TRACE, format!("http://{}/", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 405);
    assert_eq!(common::totals(&source), (0, 0, 0, 0));

    source.stop().await;
}

#[tokio::test]
async fn json_handler_from_toml() {
    let channel = Arc::new(MemoryChannel::new(100));
    let source = HttpSource::new(channel.clone());
    source
        .configure_from_toml("bind = \"127.0.0.1\"\nport = 0\n")
        .await
        .unwrap();
    let addr = source.start().await.unwrap();

    let res = common::client()
        .post(format!("http://{}/", addr))
        .header("Content-Type", "application/json; charset=UTF-8")
        .body(r#"[{"headers": {"h": "v"}, "body": "one"}, {"body": "two"}]"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/plain; charset=UTF-8");

    let events = channel.take(10);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].headers().get("h").map(String::as_str), Some("v"));
    assert_eq!(events[1].body().as_ref(), b"two");

    source.stop().await;
}

#[tokio::test]
async fn blob_handler_with_mandatory_parameters_from_toml() {
    let channel = Arc::new(MemoryChannel::new(100));
    let source = HttpSource::new(channel.clone());
    source
        .configure_from_toml(
            r#"
            bind = "127.0.0.1"
            port = 0

            [handler]
            type = "blob"
            mandatoryParameters = "tenant"
            "#,
        )
        .await
        .unwrap();
    let addr = source.start().await.unwrap();
    let client = common::client();

    let res = client
        .post(format!("http://{}/", addr))
        .body("raw payload")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    assert_eq!(
        res.text().await.unwrap(),
        "Bad request from client. Please specify tenant parameter in the request."
    );

    let res = client
        .post(format!("http://{}/?tenant=acme", addr))
        .body("raw payload")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let events = channel.take(10);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].headers().get("tenant").map(String::as_str), Some("acme"));
    assert_eq!(events[0].body().as_ref(), b"raw payload");

    source.stop().await;
}

#[tokio::test]
async fn stop_refuses_new_connections() {
    let (source, _channel, addr) = common::start_source(common::echo_config(), 100).await;
    source.stop().await;

    let result = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap()
        .post(format!("http://{}/", addr))
        .body("late")
        .send()
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn restart_on_same_port() {
    let (source, _channel, addr) = common::start_source(common::echo_config(), 100).await;
    source.stop().await;

    source
        .configure(SourceConfig::new("127.0.0.1", addr.port()).with_handler("echo", Context::new()))
        .await
        .unwrap();
    let again = source.start().await.unwrap();
    assert_eq!(again, addr);

    let res = common::client()
        .post(format!("http://{}/", addr))
        .body("x")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(common::totals(&source), (1, 3, 1, 3));

    source.stop().await;
}

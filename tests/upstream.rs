//! End-to-end tests: a real relay listener in front of a raw TCP upstream.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use trace_relay::{Readiness, RelayConfig, RelayServer};

mod common;

use common::{closed_addr, start_silent_upstream, start_upstream};

const ACCEPTED: &str =
    "HTTP/1.1 202 Accepted\r\nContent-Length: 5\r\nX-Upstream: yes\r\nConnection: close\r\n\r\nhello";

async fn start_relay(config: RelayConfig) -> (SocketAddr, Arc<Readiness>) {
    let server = RelayServer::new(config).unwrap();
    let readiness = server.readiness();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.run(listener));

    (addr, readiness)
}

fn relay_config(target: SocketAddr) -> RelayConfig {
    RelayConfig {
        trace_route: "/trace".to_string(),
        target_host: Some(target.to_string()),
        ..RelayConfig::default()
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn relays_through_real_upstream() {
    let (upstream, mut requests) = start_upstream(ACCEPTED).await;
    let (relay, _) = start_relay(relay_config(upstream)).await;

    let resp = client()
        .post(format!("http://{}/trace/api/items?id=7&id=8", relay))
        .header("X-B3-TraceId", "463ac35c9f6413ad")
        .header("X-B3-Sampled", "1")
        .header("x-custom", "kept")
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::ACCEPTED);
    assert_eq!(resp.headers()["x-upstream"], "yes");
    assert_eq!(resp.text().await.unwrap(), "hello");

    let raw = tokio::time::timeout(Duration::from_secs(5), requests.recv())
        .await
        .unwrap()
        .unwrap();
    let lower = raw.to_lowercase();

    assert!(raw.starts_with("POST /api/items?id=7&id=8 HTTP/1.1\r\n"), "{}", raw);
    assert!(lower.contains(&format!("host: {}\r\n", upstream)));
    assert!(lower.contains("x-custom: kept\r\n"));
    assert!(lower.contains("x-envoy-force-trace: true\r\n"));
    assert!(lower.contains("x-client-trace-id: "));
    assert!(!lower.contains("x-b3-"));
    assert!(raw.ends_with("payload"));
}

#[tokio::test]
async fn redirects_reach_the_caller_unfollowed() {
    let (second, mut second_requests) = start_upstream(ACCEPTED).await;
    let redirect: &'static str = Box::leak(
        format!(
            "HTTP/1.1 302 Found\r\nLocation: http://{}/elsewhere\r\nContent-Length: 5\r\nConnection: close\r\n\r\nmoved",
            second
        )
        .into_boxed_str(),
    );
    let (first, mut first_requests) = start_upstream(redirect).await;
    let (relay, _) = start_relay(relay_config(first)).await;

    let resp = client()
        .post(format!("http://{}/trace/x", relay))
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::FOUND);
    assert_eq!(
        resp.headers()["location"],
        format!("http://{}/elsewhere", second).as_str()
    );
    assert_eq!(resp.text().await.unwrap(), "moved");

    let raw = first_requests.recv().await.unwrap();
    assert!(raw.starts_with("POST /x HTTP/1.1\r\n"), "{}", raw);

    let followed = tokio::time::timeout(Duration::from_millis(300), second_requests.recv()).await;
    assert!(followed.is_err(), "redirect target was contacted");
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let (relay, _) = start_relay(relay_config(closed_addr().await)).await;

    let resp = client()
        .get(format!("http://{}/trace/x", relay))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::BAD_GATEWAY);
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn upstream_timeout_is_bad_gateway() {
    let config = RelayConfig {
        upstream_timeout_secs: Some(1),
        ..relay_config(start_silent_upstream().await)
    };
    let (relay, _) = start_relay(config).await;

    let resp = tokio::time::timeout(
        Duration::from_secs(10),
        client().get(format!("http://{}/trace/slow", relay)).send(),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn health_follows_readiness() {
    let (upstream, _requests) = start_upstream(ACCEPTED).await;
    let (relay, readiness) = start_relay(relay_config(upstream)).await;
    let url = format!("http://{}/health", relay);

    let resp = client().get(&url).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "OK");

    assert!(readiness.mark_not_ready());

    let resp = client().post(&url).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp.text().await.unwrap().is_empty());

    // Forwarding keeps working while unhealthy.
    let resp = client()
        .get(format!("http://{}/trace/still-open", relay))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::ACCEPTED);
}

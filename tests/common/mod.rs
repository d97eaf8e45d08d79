//! Shared helpers for the wiremock-backed integration tests.

#![allow(dead_code)]

use integrations_xmatters::{AuthMethod, RetryConfig, XMattersClient, XMattersConfigBuilder};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::MockServer;

/// Path prefix every request carries.
pub const ROOT: &str = "/api/xm/1";

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Builder aimed at the mock server with basic auth, no throttling and no retries.
pub fn config(server: &MockServer) -> XMattersConfigBuilder {
    XMattersConfigBuilder::new()
        .base_url(server.uri())
        .auth(AuthMethod::basic("svc", "pw"))
        .no_rate_limit()
        .no_retry()
}

pub fn client(server: &MockServer) -> XMattersClient {
    XMattersClient::builder()
        .config(|_| config(server))
        .build()
        .expect("client")
}

/// Millisecond backoff so retry tests run in real time.
pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        min_retry_delay: Duration::from_millis(10),
        max_retry_delay: Duration::from_millis(50),
        ..Default::default()
    }
}

/// A page envelope holding `{"id": ..}` items.
pub fn page(ids: &[&str], next: Option<&str>) -> Value {
    json!({
        "count": ids.len(),
        "total": ids.len(),
        "links": {"next": next},
        "data": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
    })
}

/// `(METHOD, path)` of every request the server saw.
pub async fn calls(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|r| (r.method.to_string(), r.url.path().to_string()))
        .collect()
}

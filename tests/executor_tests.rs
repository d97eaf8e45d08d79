//! Request executor behavior against a live HTTP server.

mod common;

use common::*;
use integrations_xmatters::{RequestBody, RequestContext, XMattersClient, XMattersError};
use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::json;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[test_case(200 ; "ok")]
#[test_case(201 ; "created")]
#[tokio::test]
async fn test_success_statuses_return_body(status: u16) {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/sites/s1", ROOT)))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"id": "s1"})))
        .mount(&server)
        .await;

    let body = client(&server)
        .request(Method::GET, "/sites/s1", RequestBody::Empty)
        .await
        .unwrap();
    assert_eq!(&body[..], br#"{"id":"s1"}"#);
}

#[tokio::test]
async fn test_no_content_is_distinct() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let err = client(&server)
        .request(Method::GET, "/sites/s1", RequestBody::Empty)
        .await
        .unwrap_err();
    assert!(err.is_no_content());
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_credentials() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
        .mount(&server)
        .await;

    let err = client(&server)
        .request(Method::GET, "/people", RequestBody::Empty)
        .await
        .unwrap_err();
    assert!(matches!(err, XMattersError::InvalidCredentials));
}

#[tokio::test]
async fn test_error_body_is_decoded() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": 500,
            "reason": "Internal Server Error",
            "message": "Something broke",
            "subcode": "X-42"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .request(Method::GET, "/people", RequestBody::Empty)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(500));
    let body = err.api_error().unwrap();
    assert_eq!(body.reason, "Internal Server Error");
    assert_eq!(body.subcode.as_deref(), Some("X-42"));
}

#[tokio::test]
async fn test_unparseable_error_body_keeps_raw_text() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .request(Method::GET, "/people", RequestBody::Empty)
        .await
        .unwrap_err();
    match err {
        XMattersError::Decode { body, .. } => assert!(body.contains("bad gateway")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_default_headers_and_basic_auth() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/people", ROOT)))
        .and(header("authorization", "Basic c3ZjOnB3"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"targetName": "jdoe"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "p1"})))
        .expect(1)
        .mount(&server)
        .await;

    let created: serde_json::Value = client(&server)
        .post("/people", &json!({"targetName": "jdoe"}))
        .await
        .unwrap();
    assert_eq!(created["id"], "p1");
}

#[tokio::test]
async fn test_custom_headers_override_defaults() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "ops-sync/2.0"))
        .and(header("x-trace", "abc"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = XMattersClient::builder()
        .config(|_| {
            config(&server)
                .auth(integrations_xmatters::AuthMethod::bearer("tok"))
                .header("User-Agent", "ops-sync/2.0")
                .header("X-Trace", "abc")
        })
        .build()
        .unwrap();

    let _: serde_json::Value = client.get("/people").await.unwrap();
}

#[tokio::test]
async fn test_deadline_bounds_slow_response() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let ctx = RequestContext::new().with_timeout(Duration::from_millis(100));
    let result: Result<serde_json::Value, _> =
        client(&server).get_with_context(&ctx, "/people").await;
    assert!(matches!(result, Err(XMattersError::DeadlineExceeded)));
}

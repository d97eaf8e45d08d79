//! Mock transport for testing xMatters clients without a server.
//!
//! Responses are keyed by `"METHOD path?query"`, with the path taken
//! relative to the API root (`/people`, not `/api/xm/1/people`). Several
//! responses registered under one key are served in order; the last one
//! keeps being served once the others are used up.

use crate::errors::{ApiErrorBody, TransportErrorKind, XMattersError, XMattersResult};
use crate::pagination::strip_base_path;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// A canned response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: String,
    /// Headers.
    pub headers: HashMap<String, String>,
    /// Delay before responding.
    pub delay: Option<Duration>,
    error: Option<(TransportErrorKind, String)>,
}

impl MockResponse {
    fn new(status: u16, body: String) -> Self {
        Self {
            status,
            body,
            headers: HashMap::new(),
            delay: None,
            error: None,
        }
    }

    /// A 200 response carrying `body` as JSON.
    pub fn ok<T: Serialize>(body: &T) -> Self {
        Self::new(200, serde_json::to_string(body).unwrap_or_default())
    }

    /// A 201 response carrying `body` as JSON.
    pub fn created<T: Serialize>(body: &T) -> Self {
        Self::new(201, serde_json::to_string(body).unwrap_or_default())
    }

    /// A 204 response.
    pub fn no_content() -> Self {
        Self::new(204, String::new())
    }

    /// A 401 response.
    pub fn unauthorized() -> Self {
        Self::api_error(401, "Unauthorized", "Invalid credentials")
    }

    /// Any status with a verbatim body.
    pub fn raw(status: u16, body: &str) -> Self {
        Self::new(status, body.to_string())
    }

    /// An xMatters error payload.
    pub fn api_error(status: u16, reason: &str, message: &str) -> Self {
        let body = ApiErrorBody {
            code: status,
            reason: reason.to_string(),
            message: message.to_string(),
            subcode: None,
        };
        Self::new(status, serde_json::to_string(&body).unwrap_or_default())
    }

    /// Fails the attempt before any response arrives.
    pub fn transport_error(kind: TransportErrorKind, message: &str) -> Self {
        let mut response = Self::new(0, String::new());
        response.error = Some((kind, message.to_string()));
        response
    }

    /// Adds a header to the response.
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Adds a delay to the response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn into_http(self) -> XMattersResult<HttpResponse> {
        if let Some((kind, message)) = self.error {
            return Err(XMattersError::transport(kind, message));
        }

        let status = StatusCode::from_u16(self.status)
            .map_err(|e| XMattersError::request(format!("invalid mock status: {}", e)))?;
        let mut headers = HeaderMap::new();
        for (key, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }
        Ok(HttpResponse::new(status, headers, Bytes::from(self.body)))
    }
}

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: Method,
    /// Path and query relative to the API root.
    pub path: String,
    /// Encoded body.
    pub body: Option<Bytes>,
    /// Headers as sent.
    pub headers: HeaderMap,
}

/// What to do with a request nothing was registered for.
#[derive(Debug, Clone, Copy, Default)]
pub enum DefaultBehavior {
    /// Answer 404.
    #[default]
    NotFound,
    /// Fail with a transport error.
    Error,
    /// Panic.
    Panic,
}

/// In-memory [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    default_behavior: DefaultBehavior,
}

impl MockTransport {
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the behavior for unmatched requests.
    pub fn with_default_behavior(mut self, behavior: DefaultBehavior) -> Self {
        self.default_behavior = behavior;
        self
    }

    /// Queues a response for `method` and `path`.
    pub fn register(&self, method: Method, path: &str, response: MockResponse) {
        self.responses
            .lock()
            .entry(key(&method, path))
            .or_default()
            .push_back(response);
    }

    /// Queues a GET response.
    pub fn on_get(&self, path: &str, response: MockResponse) {
        self.register(Method::GET, path, response);
    }

    /// Queues a POST response.
    pub fn on_post(&self, path: &str, response: MockResponse) {
        self.register(Method::POST, path, response);
    }

    /// Queues a DELETE response.
    pub fn on_delete(&self, path: &str, response: MockResponse) {
        self.register(Method::DELETE, path, response);
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    fn next_response(&self, key: &str) -> Option<MockResponse> {
        let mut responses = self.responses.lock();
        let queue = responses.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

fn key(method: &Method, path: &str) -> String {
    format!("{} {}", method, path)
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> XMattersResult<HttpResponse> {
        let path = strip_base_path(request.url.as_str());
        self.requests.lock().push(RecordedRequest {
            method: request.method.clone(),
            path: path.clone(),
            body: request.body.clone(),
            headers: request.headers.clone(),
        });

        let key = key(&request.method, &path);
        let response = match self.next_response(&key) {
            Some(response) => response,
            None => match self.default_behavior {
                DefaultBehavior::NotFound => {
                    MockResponse::api_error(404, "Not Found", &format!("No mock for {}", key))
                }
                DefaultBehavior::Error => MockResponse::transport_error(
                    TransportErrorKind::Other,
                    &format!("No mock for {}", key),
                ),
                DefaultBehavior::Panic => panic!("No mock response for {}", key),
            },
        };

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }
        response.into_http()
    }
}

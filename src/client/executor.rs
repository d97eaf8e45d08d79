//! Request executor with auth, resilience, and response classification.

use crate::auth::AuthManager;
use crate::client::context::RequestContext;
use crate::config::XMattersConfig;
use crate::errors::{ApiErrorBody, XMattersError, XMattersResult};
use crate::observability::{redact_header, Metrics, RequestTimer, TracingHooks};
use crate::resilience::ResilienceOrchestrator;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Content type sent with every request.
pub const CONTENT_JSON: &str = "application/json";

/// Body of an outbound request.
///
/// Raw bytes and readers are sent verbatim. Readers are drained once, on the
/// blocking pool, before the first attempt so retries replay the same payload.
#[derive(Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Raw bytes.
    Bytes(Bytes),
    /// A streaming source, read to the end before sending.
    Reader(Box<dyn Read + Send>),
    /// A JSON document.
    Json(serde_json::Value),
}

impl RequestBody {
    /// Encodes `value` as JSON, keeping its field order.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> XMattersResult<Self> {
        serde_json::to_vec(value)
            .map(|encoded| Self::Bytes(Bytes::from(encoded)))
            .map_err(XMattersError::Serialization)
    }

    /// Wraps a reader.
    pub fn reader(reader: impl Read + Send + 'static) -> Self {
        Self::Reader(Box::new(reader))
    }

    async fn into_bytes(self) -> XMattersResult<Option<Bytes>> {
        match self {
            Self::Empty => Ok(None),
            Self::Bytes(bytes) => Ok(Some(bytes)),
            Self::Reader(mut reader) => {
                let drained = tokio::task::spawn_blocking(move || {
                    let mut buf = Vec::new();
                    reader.read_to_end(&mut buf).map(|_| buf)
                })
                .await
                .map_err(|e| XMattersError::request(format!("body reader panicked: {}", e)))?;
                let buf = drained
                    .map_err(|e| XMattersError::request(format!("failed to read body: {}", e)))?;
                Ok(Some(Bytes::from(buf)))
            }
            Self::Json(value) => serde_json::to_vec(&value)
                .map(|encoded| Some(Bytes::from(encoded)))
                .map_err(XMattersError::Serialization),
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Self::Reader(_) => write!(f, "Reader"),
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// Request executor that authenticates, throttles, retries, and classifies.
///
/// Headers are computed once: `Content-Type`, `User-Agent`, `Authorization`,
/// then every configured custom header, which overwrites a default of the
/// same name.
pub struct RequestExecutor {
    base_url: String,
    headers: HeaderMap,
    timeout: Duration,
    transport: Arc<dyn HttpTransport>,
    resilience: ResilienceOrchestrator,
    metrics: Arc<Metrics>,
}

impl RequestExecutor {
    /// Creates a new request executor.
    pub fn new(
        config: &XMattersConfig,
        transport: Arc<dyn HttpTransport>,
        metrics: Arc<Metrics>,
    ) -> XMattersResult<Self> {
        let headers = Self::build_headers(config)?;
        let resilience =
            ResilienceOrchestrator::new(config.retry.clone(), &config.rate_limit, metrics.clone());

        Ok(Self {
            base_url: config.base_url.clone(),
            headers,
            timeout: config.timeout,
            transport,
            resilience,
            metrics,
        })
    }

    fn build_headers(config: &XMattersConfig) -> XMattersResult<HeaderMap> {
        let auth = config
            .auth
            .clone()
            .ok_or_else(|| XMattersError::configuration("authentication required"))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_JSON));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| XMattersError::configuration(format!("invalid user agent: {}", e)))?,
        );
        headers.insert(AUTHORIZATION, AuthManager::new(auth).auth_header()?);

        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                XMattersError::configuration(format!("invalid header name {:?}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                XMattersError::configuration(format!("invalid value for header {}: {}", name, e))
            })?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Gets the precomputed request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets the resilience orchestrator.
    pub fn resilience(&self) -> &ResilienceOrchestrator {
        &self.resilience
    }

    /// Gets the metrics collector.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Joins the base URL with a path that already carries its query.
    pub fn build_url(&self, path: &str) -> XMattersResult<Url> {
        let raw = if path.is_empty() || path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        Url::parse(&raw).map_err(|e| XMattersError::request(format!("invalid URL {}: {}", raw, e)))
    }

    /// Executes a request and returns the raw success body.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> XMattersResult<Bytes> {
        let timer = RequestTimer::start(self.metrics.clone());
        TracingHooks::on_request_start(method.as_str(), path);

        let result = self.send(ctx, method.clone(), path, body).await;

        match &result {
            Ok(_) => timer.success(),
            Err(XMattersError::NoContent) => timer.success(),
            Err(e) => {
                TracingHooks::on_request_error(method.as_str(), path, &e.to_string());
                timer.failure();
            }
        }

        result
    }

    /// Executes a request and decodes the JSON success body.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> XMattersResult<T> {
        let bytes = self.execute(ctx, method, path, body).await?;
        serde_json::from_slice(&bytes).map_err(|e| XMattersError::decode(e, &bytes))
    }

    async fn send(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> XMattersResult<Bytes> {
        let url = self.build_url(path)?;
        let body = ctx.run(body.into_bytes()).await?;

        let request = HttpRequest {
            method,
            url,
            headers: self.headers.clone(),
            body,
            timeout: Some(self.timeout),
        };

        let started = std::time::Instant::now();
        let transport = &self.transport;
        let response = self
            .resilience
            .execute(ctx, |_| {
                let request = request.clone();
                async move { transport.send(request).await }
            })
            .await?;

        TracingHooks::on_request_complete(
            request.method.as_str(),
            path,
            response.status.as_u16(),
            started.elapsed(),
        );

        Self::classify(response)
    }

    /// Maps a final response to its body or an error.
    pub fn classify(response: HttpResponse) -> XMattersResult<Bytes> {
        match response.status {
            StatusCode::NO_CONTENT => Err(XMattersError::NoContent),
            StatusCode::UNAUTHORIZED => Err(XMattersError::InvalidCredentials),
            StatusCode::OK | StatusCode::CREATED => Ok(response.body),
            status => match serde_json::from_slice::<ApiErrorBody>(&response.body) {
                Ok(error) => Err(XMattersError::Api {
                    status: status.as_u16(),
                    error,
                }),
                Err(e) => Err(XMattersError::decode(
                    format!("error body for HTTP {}: {}", status.as_u16(), e),
                    &response.body,
                )),
            },
        }
    }
}

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, String)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let value = value.to_str().unwrap_or("<binary>");
                (name.as_str(), redact_header(name.as_str(), value))
            })
            .collect();

        f.debug_struct("RequestExecutor")
            .field("base_url", &self.base_url)
            .field("headers", &headers)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

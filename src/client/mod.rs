//! xMatters API client implementation.

pub mod context;
pub mod executor;
pub mod uri;

use crate::config::{XMattersConfig, XMattersConfigBuilder};
use crate::errors::{XMattersError, XMattersResult};
use crate::observability::Metrics;
use crate::pagination::{self, PageIterator};
use crate::services::*;
use crate::transport::{HttpTransport, ReqwestTransport};
use bytes::Bytes;
use context::RequestContext;
use executor::{RequestBody, RequestExecutor};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::debug;

/// xMatters API client.
///
/// Cheap to share behind an `Arc`; the rate limiter inside is the only
/// mutable state and is safe under concurrent use.
#[derive(Debug)]
pub struct XMattersClient {
    config: XMattersConfig,
    executor: RequestExecutor,
    metrics: Arc<Metrics>,
}

impl XMattersClient {
    /// Creates a client backed by reqwest.
    pub fn new(config: XMattersConfig) -> XMattersResult<Self> {
        let transport = ReqwestTransport::new(config.timeout, config.connect_timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client on top of a custom transport.
    pub fn with_transport(
        config: XMattersConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> XMattersResult<Self> {
        config.validate()?;

        let metrics = Arc::new(Metrics::new());
        let executor = RequestExecutor::new(&config, transport, metrics.clone())?;

        debug!(
            base_url = %config.base_url,
            auth = config.auth.as_ref().map(|a| a.scheme()).unwrap_or("none"),
            requests_per_second = config.rate_limit.requests_per_second,
            max_retries = config.retry.max_retries,
            "Created xMatters client"
        );

        Ok(Self {
            config,
            executor,
            metrics,
        })
    }

    /// Creates a client from `XMATTERS_*` environment variables.
    pub fn from_env() -> XMattersResult<Self> {
        Self::new(XMattersConfig::from_env()?)
    }

    /// Creates a new client builder.
    pub fn builder() -> XMattersClientBuilder {
        XMattersClientBuilder::new()
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Gets the configuration.
    pub fn config(&self) -> &XMattersConfig {
        &self.config
    }

    /// Gets the metrics collector.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Gets the request executor.
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    // Service accessors

    /// Gets the people service.
    pub fn people(&self) -> PeopleService<'_> {
        PeopleService::new(self)
    }

    /// Gets the devices service.
    pub fn devices(&self) -> DevicesService<'_> {
        DevicesService::new(self)
    }

    /// Gets the groups service.
    pub fn groups(&self) -> GroupsService<'_> {
        GroupsService::new(self)
    }

    /// Gets the group roster service.
    pub fn rosters(&self) -> RosterService<'_> {
        RosterService::new(self)
    }

    /// Gets the sites service.
    pub fn sites(&self) -> SitesService<'_> {
        SitesService::new(self)
    }

    /// Gets the services (service catalog) service.
    pub fn service_catalog(&self) -> ServiceCatalogService<'_> {
        ServiceCatalogService::new(self)
    }

    /// Gets the templates service.
    pub fn templates(&self) -> TemplatesService<'_> {
        TemplatesService::new(self)
    }

    // HTTP methods

    /// Sends a request and returns the raw success body.
    pub async fn request(&self, method: Method, path: &str, body: RequestBody) -> XMattersResult<Bytes> {
        self.request_with_context(&RequestContext::new(), method, path, body)
            .await
    }

    /// [`request`](Self::request) bounded by `ctx`.
    pub async fn request_with_context(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> XMattersResult<Bytes> {
        self.executor.execute(ctx, method, path, body).await
    }

    /// Makes a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> XMattersResult<T> {
        self.get_with_context(&RequestContext::new(), path).await
    }

    /// Makes a GET request bounded by `ctx`.
    pub async fn get_with_context<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> XMattersResult<T> {
        self.executor
            .execute_json(ctx, Method::GET, path, RequestBody::Empty)
            .await
    }

    /// Makes a POST request with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> XMattersResult<T> {
        self.post_with_context(&RequestContext::new(), path, body)
            .await
    }

    /// Makes a POST request bounded by `ctx`.
    pub async fn post_with_context<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
    ) -> XMattersResult<T> {
        let body = RequestBody::json(body)?;
        self.executor
            .execute_json(ctx, Method::POST, path, body)
            .await
    }

    /// Makes a DELETE request. A 204 answer counts as success.
    pub async fn delete(&self, path: &str) -> XMattersResult<()> {
        self.delete_with_context(&RequestContext::new(), path).await
    }

    /// Makes a DELETE request bounded by `ctx`.
    pub async fn delete_with_context(&self, ctx: &RequestContext, path: &str) -> XMattersResult<()> {
        match self
            .executor
            .execute(ctx, Method::DELETE, path, RequestBody::Empty)
            .await
        {
            Ok(_) | Err(XMattersError::NoContent) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // Pagination

    /// Fetches every page of a collection.
    pub async fn collect_all<T: DeserializeOwned>(&self, uri: &str) -> XMattersResult<Vec<T>> {
        self.collect_all_with_context(&RequestContext::new(), uri)
            .await
    }

    /// [`collect_all`](Self::collect_all) bounded by `ctx`.
    pub async fn collect_all_with_context<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        uri: &str,
    ) -> XMattersResult<Vec<T>> {
        pagination::collect_all(&self.executor, ctx, uri).await
    }

    /// Fetches every page, projecting each item through `map`.
    pub async fn collect_all_mapped<T, U, F>(&self, uri: &str, map: F) -> XMattersResult<Vec<U>>
    where
        T: DeserializeOwned,
        F: FnMut(T) -> U,
    {
        self.collect_all_mapped_with_context(&RequestContext::new(), uri, map)
            .await
    }

    /// [`collect_all_mapped`](Self::collect_all_mapped) bounded by `ctx`.
    pub async fn collect_all_mapped_with_context<T, U, F>(
        &self,
        ctx: &RequestContext,
        uri: &str,
        map: F,
    ) -> XMattersResult<Vec<U>>
    where
        T: DeserializeOwned,
        F: FnMut(T) -> U,
    {
        pagination::collect_all_mapped(&self.executor, ctx, uri, map).await
    }

    /// Walks a collection page by page.
    pub fn pages<T: DeserializeOwned>(&self, uri: &str) -> PageIterator<'_, T> {
        self.pages_with_context(RequestContext::new(), uri)
    }

    /// [`pages`](Self::pages) bounded by `ctx`.
    pub fn pages_with_context<T: DeserializeOwned>(
        &self,
        ctx: RequestContext,
        uri: &str,
    ) -> PageIterator<'_, T> {
        PageIterator::new(&self.executor, ctx, uri)
    }
}

/// Builder for XMattersClient.
#[derive(Default)]
pub struct XMattersClientBuilder {
    config: XMattersConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl XMattersClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies configuration changes.
    pub fn config<F>(mut self, f: F) -> Self
    where
        F: FnOnce(XMattersConfigBuilder) -> XMattersConfigBuilder,
    {
        self.config = f(self.config);
        self
    }

    /// Uses a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> XMattersResult<XMattersClient> {
        let config = self.config.build()?;
        match self.transport {
            Some(transport) => XMattersClient::with_transport(config, transport),
            None => XMattersClient::new(config),
        }
    }
}

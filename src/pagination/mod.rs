//! Pagination handling for the xMatters API.
//!
//! List endpoints answer with a page envelope whose `links.next` points at
//! the following page. The walker follows those links in a loop until the
//! server stops sending one.

use crate::client::context::RequestContext;
use crate::client::executor::{RequestBody, RequestExecutor};
use crate::config::API_ROOT;
use crate::errors::{XMattersError, XMattersResult};
use crate::observability::TracingHooks;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::marker::PhantomData;
use tracing::debug;

/// Links to the current, previous, and next pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLinks {
    /// This page.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// The next page; absent on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// The previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

/// One page of a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct PageEnvelope<T> {
    /// Items on this page.
    #[serde(default)]
    pub count: Option<u64>,
    /// Items across all pages.
    #[serde(default)]
    pub total: Option<u64>,
    /// Navigation links.
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: PaginationLinks,
    /// Page contents.
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub data: Vec<T>,
}

impl<T> PageEnvelope<T> {
    /// Returns true if another page follows.
    pub fn has_next(&self) -> bool {
        self.links.next.is_some()
    }

    /// The next page's URI relative to the API root.
    pub fn next_uri(&self) -> Option<String> {
        self.links.next.as_deref().map(strip_base_path)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Turns a `next` link into a URI the executor can append to its base URL.
///
/// Absolute URLs are reduced to path and query, then a leading API root is
/// removed. Already stripped input is returned unchanged.
pub fn strip_base_path(link: &str) -> String {
    let relative = match url::Url::parse(link) {
        Ok(url) => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
        Err(_) => link.to_string(),
    };

    match relative.strip_prefix(API_ROOT) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') => {
            rest.to_string()
        }
        _ => relative,
    }
}

/// Walks a collection one page at a time.
///
/// Callers that want to keep partial progress when a later page fails use
/// this directly; `collect_all` discards everything on failure.
pub struct PageIterator<'a, T> {
    executor: &'a RequestExecutor,
    ctx: RequestContext,
    next: Option<String>,
    pages: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned> PageIterator<'a, T> {
    /// Starts at `first_uri`.
    pub fn new(executor: &'a RequestExecutor, ctx: RequestContext, first_uri: impl Into<String>) -> Self {
        Self {
            executor,
            ctx,
            next: Some(first_uri.into()),
            pages: 0,
            _marker: PhantomData,
        }
    }

    /// URI of the page the next call will fetch.
    pub fn next_uri(&self) -> Option<&str> {
        self.next.as_deref()
    }

    /// Pages fetched so far.
    pub fn pages_fetched(&self) -> u64 {
        self.pages
    }

    /// Fetches the next page, or `None` once the collection is exhausted.
    ///
    /// On error the cursor stays put, so the same page can be requested
    /// again.
    pub async fn next_page(&mut self) -> XMattersResult<Option<PageEnvelope<T>>> {
        let uri = match self.next.as_deref() {
            Some(uri) => uri.to_string(),
            None => return Ok(None),
        };

        let page: PageEnvelope<T> = self
            .executor
            .execute_json(&self.ctx, Method::GET, &uri, RequestBody::Empty)
            .await?;

        let next = page.next_uri();
        if next.as_deref() == Some(uri.as_str()) {
            return Err(XMattersError::decode(
                "next page link points back at the current page",
                uri.as_bytes(),
            ));
        }

        self.pages += 1;
        self.executor.metrics().record_page();
        TracingHooks::on_page(&uri, self.pages, page.data.len(), next.is_some());

        self.next = next;
        Ok(Some(page))
    }
}

/// Fetches every page starting at `first_uri` and concatenates the items.
pub async fn collect_all<T: DeserializeOwned>(
    executor: &RequestExecutor,
    ctx: &RequestContext,
    first_uri: &str,
) -> XMattersResult<Vec<T>> {
    collect_all_mapped(executor, ctx, first_uri, |item: T| item).await
}

/// Like [`collect_all`], projecting each item through `map` as it arrives.
pub async fn collect_all_mapped<T, U, F>(
    executor: &RequestExecutor,
    ctx: &RequestContext,
    first_uri: &str,
    mut map: F,
) -> XMattersResult<Vec<U>>
where
    T: DeserializeOwned,
    F: FnMut(T) -> U,
{
    let mut pages = PageIterator::<T>::new(executor, ctx.clone(), first_uri);
    let mut items = Vec::new();

    while let Some(page) = pages.next_page().await? {
        items.extend(page.data.into_iter().map(&mut map));
    }

    debug!(
        uri = %first_uri,
        pages = pages.pages_fetched(),
        items = items.len(),
        "Collected paginated result"
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthMethod;
    use crate::config::XMattersConfig;
    use crate::mocks::{MockResponse, MockTransport};
    use crate::observability::Metrics;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use test_case::test_case;

    fn executor(mock: &MockTransport) -> RequestExecutor {
        let config = XMattersConfig::builder()
            .hostname("acme.xmatters.com")
            .auth(AuthMethod::bearer("t"))
            .no_rate_limit()
            .no_retry()
            .build()
            .unwrap();
        RequestExecutor::new(&config, Arc::new(mock.clone()), Arc::new(Metrics::new())).unwrap()
    }

    fn page(items: &[&str], next: Option<&str>) -> MockResponse {
        MockResponse::ok(&json!({
            "count": items.len(),
            "total": 5,
            "links": { "self": "/api/xm/1/people", "next": next },
            "data": items.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>(),
        }))
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    #[test_case("/api/xm/1/people?offset=100&limit=100", "/people?offset=100&limit=100" ; "relative")]
    #[test_case("https://acme.xmatters.com/api/xm/1/people?offset=100", "/people?offset=100" ; "absolute")]
    #[test_case("/people?offset=100", "/people?offset=100" ; "already stripped")]
    #[test_case("/api/xm/10/people", "/api/xm/10/people" ; "prefix lookalike")]
    fn test_strip_base_path(link: &str, expected: &str) {
        assert_eq!(strip_base_path(link), expected);
        assert_eq!(strip_base_path(&strip_base_path(link)), expected);
    }

    #[test]
    fn test_envelope_null_fields() {
        let page: PageEnvelope<Item> =
            serde_json::from_str(r#"{"count":0,"total":0,"links":null,"data":null}"#).unwrap();
        assert!(page.data.is_empty());
        assert!(!page.has_next());

        let page: PageEnvelope<Item> = serde_json::from_str(r#"{}"#).unwrap();
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_collect_all_follows_links_in_order() {
        let mock = MockTransport::new();
        mock.on_get("/people", page(&["a", "b"], Some("/api/xm/1/people?offset=2")));
        mock.on_get("/people?offset=2", page(&["c", "d"], Some("/api/xm/1/people?offset=4")));
        mock.on_get("/people?offset=4", page(&["e"], None));
        let executor = executor(&mock);

        let items: Vec<Item> = collect_all(&executor, &RequestContext::new(), "/people")
            .await
            .unwrap();

        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(mock.requests().len(), 3);
        assert_eq!(executor.metrics().snapshot().pages_fetched, 3);
    }

    #[tokio::test]
    async fn test_single_page_makes_one_call() {
        let mock = MockTransport::new();
        mock.on_get("/sites", page(&["s1"], None));
        let executor = executor(&mock);

        let items: Vec<Item> = collect_all(&executor, &RequestContext::new(), "/sites")
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_final_page() {
        let mock = MockTransport::new();
        mock.on_get("/groups", page(&[], None));
        let executor = executor(&mock);

        let items: Vec<Item> = collect_all(&executor, &RequestContext::new(), "/groups")
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_failure_discards_partial_result() {
        let mock = MockTransport::new();
        mock.on_get("/people", page(&["a"], Some("/api/xm/1/people?offset=1")));
        mock.on_get(
            "/people?offset=1",
            MockResponse::api_error(500, "Internal Server Error", "boom"),
        );
        let executor = executor(&mock);

        let result: XMattersResult<Vec<Item>> =
            collect_all(&executor, &RequestContext::new(), "/people").await;
        assert_eq!(result.unwrap_err().status_code(), Some(500));
    }

    #[tokio::test]
    async fn test_iterator_keeps_partial_progress() {
        let mock = MockTransport::new();
        mock.on_get("/people", page(&["a"], Some("/api/xm/1/people?offset=1")));
        mock.on_get("/people?offset=1", MockResponse::raw(200, "garbage"));
        let executor = executor(&mock);

        let mut pages = PageIterator::<Item>::new(&executor, RequestContext::new(), "/people");
        let first = pages.next_page().await.unwrap().unwrap();
        assert_eq!(first.data, vec![Item { id: "a".to_string() }]);

        assert!(pages.next_page().await.is_err());
        assert_eq!(pages.next_uri(), Some("/people?offset=1"));
    }

    #[tokio::test]
    async fn test_self_referencing_next_is_rejected() {
        let mock = MockTransport::new();
        mock.on_get("/people", page(&["a"], Some("/api/xm/1/people")));
        let executor = executor(&mock);

        let result: XMattersResult<Vec<Item>> =
            collect_all(&executor, &RequestContext::new(), "/people").await;
        assert!(matches!(result, Err(XMattersError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_collect_all_mapped() {
        let mock = MockTransport::new();
        mock.on_get("/devices", page(&["d1", "d2"], None));
        let executor = executor(&mock);

        let ids = collect_all_mapped(&executor, &RequestContext::new(), "/devices", |i: Item| i.id)
            .await
            .unwrap();
        assert_eq!(ids, vec!["d1".to_string(), "d2".to_string()]);
    }
}

//! Site operations.

use crate::client::context::RequestContext;
use crate::client::uri::build_uri;
use crate::client::XMattersClient;
use crate::errors::XMattersResult;
use serde::{Deserialize, Serialize};

/// Service for sites.
pub struct SitesService<'a> {
    client: &'a XMattersClient,
    ctx: RequestContext,
}

impl<'a> SitesService<'a> {
    /// Creates a new sites service.
    pub fn new(client: &'a XMattersClient) -> Self {
        Self {
            client,
            ctx: RequestContext::new(),
        }
    }

    /// Bounds every call by `ctx`.
    pub fn with_context(mut self, ctx: RequestContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Gets a site.
    pub async fn get(&self, site_id: &str) -> XMattersResult<Site> {
        self.client
            .get_with_context(&self.ctx, &format!("/sites/{}", site_id))
            .await
    }

    /// Lists every site matching `params`.
    pub async fn list(&self, params: &SiteListParams) -> XMattersResult<Vec<Site>> {
        let uri = build_uri("/sites", params)?;
        self.client.collect_all_with_context(&self.ctx, &uri).await
    }

    /// Creates a site, or updates one when `params.id` is set.
    pub async fn push(&self, params: &PushSiteParams) -> XMattersResult<Site> {
        self.client
            .post_with_context(&self.ctx, "/sites", params)
            .await
    }

    /// Deletes a site.
    pub async fn delete(&self, site_id: &str) -> XMattersResult<()> {
        self.client
            .delete_with_context(&self.ctx, &format!("/sites/{}", site_id))
            .await
    }
}

/// A site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Site id.
    pub id: String,
    /// Site name.
    #[serde(default)]
    pub name: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub address1: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub address2: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub city: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub state: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub postal_code: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub country: Option<String>,
    /// Language code.
    #[serde(default)]
    pub language: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub latitude: Option<f64>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub longitude: Option<f64>,
    /// `ACTIVE` or `INACTIVE`.
    #[serde(default)]
    pub status: Option<String>,
    /// Timezone.
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Query parameters for [`SitesService::list`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteListParams {
    /// Search terms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// `AND` or `OR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operand: Option<String>,
    /// Fields the search applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    /// Country filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Only sites with coordinates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geocoded: Option<bool>,
    /// `ACTIVE` or `INACTIVE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body for [`SitesService::push`].
///
/// Address fields are always sent so that `None` clears them.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSiteParams {
    /// Set to update an existing site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Site name.
    pub name: String,
    /// Country.
    pub country: String,
    /// Language code.
    pub language: String,
    /// Timezone.
    pub timezone: String,
    #[allow(missing_docs)]
    pub address1: Option<String>,
    #[allow(missing_docs)]
    pub address2: Option<String>,
    #[allow(missing_docs)]
    pub city: Option<String>,
    #[allow(missing_docs)]
    pub state: Option<String>,
    #[allow(missing_docs)]
    pub postal_code: Option<String>,
    #[allow(missing_docs)]
    pub latitude: Option<f64>,
    #[allow(missing_docs)]
    pub longitude: Option<f64>,
    /// `ACTIVE` or `INACTIVE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

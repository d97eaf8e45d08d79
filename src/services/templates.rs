//! Template operations.

use crate::client::context::RequestContext;
use crate::client::uri::{build_uri, Embed};
use crate::client::XMattersClient;
use crate::errors::XMattersResult;
use crate::pagination::PageEnvelope;
use serde::{Deserialize, Serialize};

/// Service for templates.
pub struct TemplatesService<'a> {
    client: &'a XMattersClient,
    ctx: RequestContext,
}

impl<'a> TemplatesService<'a> {
    /// Creates a new templates service.
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

    /// Gets a template with its links embedded.
    pub async fn get(&self, template_id: &str) -> XMattersResult<Template> {
        let uri = build_uri(
            &format!("/template/{}", template_id),
            &Embed {
                embed: "templateLinks",
            },
        )?;
        self.client.get_with_context(&self.ctx, &uri).await
    }

    /// Lists templates. Only the first page is fetched.
    pub async fn list(&self, params: &TemplateListParams) -> XMattersResult<Vec<Template>> {
        let uri = build_uri("/template", params)?;
        let page: PageEnvelope<Template> = self.client.get_with_context(&self.ctx, &uri).await?;
        Ok(page.data)
    }

    /// Creates a template, or updates one when `params.id` is set.
    pub async fn push(&self, params: &PushTemplateParams) -> XMattersResult<Template> {
        self.client
            .post_with_context(&self.ctx, "/template", params)
            .await
    }

    /// Deletes a template.
    pub async fn delete(&self, template_id: &str) -> XMattersResult<()> {
        self.client
            .delete_with_context(&self.ctx, &format!("/template/{}", template_id))
            .await
    }
}

/// A template. Fields beyond the id and name are kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Query parameters for [`TemplatesService::list`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateListParams {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operand: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
}

/// Body for [`TemplatesService::push`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushTemplateParams {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
}

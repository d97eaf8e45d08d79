//! Service catalog operations: services and their dependencies.

use crate::client::context::RequestContext;
use crate::client::uri::{build_uri, Embed};
use crate::client::XMattersClient;
use crate::errors::XMattersResult;
use crate::types::{embedded, GroupReference, ServiceReference};
use serde::{Deserialize, Serialize};

/// Service for the xMatters service catalog.
pub struct ServiceCatalogService<'a> {
    client: &'a XMattersClient,
    ctx: RequestContext,
}

impl<'a> ServiceCatalogService<'a> {
    /// Creates a new service catalog service.
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

    /// Gets a service with its links embedded.
    pub async fn get(&self, service_id: &str) -> XMattersResult<Service> {
        let uri = build_uri(
            &format!("/services/{}", service_id),
            &Embed {
                embed: "serviceLinks",
            },
        )?;
        self.client.get_with_context(&self.ctx, &uri).await
    }

    /// Lists every service matching `params`.
    pub async fn list(&self, params: &ServiceListParams) -> XMattersResult<Vec<Service>> {
        let uri = build_uri("/services", params)?;
        self.client.collect_all_with_context(&self.ctx, &uri).await
    }

    /// Creates a service, or updates one when `params.id` is set.
    pub async fn push(&self, params: &PushServiceParams) -> XMattersResult<Service> {
        self.client
            .post_with_context(&self.ctx, "/services", params)
            .await
    }

    /// Deletes a service.
    pub async fn delete(&self, service_id: &str) -> XMattersResult<()> {
        self.client
            .delete_with_context(&self.ctx, &format!("/services/{}", service_id))
            .await
    }

    /// Gets a service dependency.
    pub async fn get_dependency(&self, dependency_id: &str) -> XMattersResult<ServiceDependency> {
        self.client
            .get_with_context(&self.ctx, &format!("/service-dependencies/{}", dependency_id))
            .await
    }

    /// Creates or updates a service dependency.
    pub async fn push_dependency(
        &self,
        params: &PushServiceDependencyParams,
    ) -> XMattersResult<ServiceDependency> {
        self.client
            .post_with_context(&self.ctx, "/service-dependencies", params)
            .await
    }

    /// Deletes a service dependency.
    pub async fn delete_dependency(&self, dependency_id: &str) -> XMattersResult<()> {
        self.client
            .delete_with_context(&self.ctx, &format!("/service-dependencies/{}", dependency_id))
            .await
    }
}

/// A service in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Service id.
    pub id: String,
    /// Service name.
    #[serde(default)]
    pub target_name: Option<String>,
    /// Always `SERVICE` when present.
    #[serde(default)]
    pub recipient_type: Option<String>,
    /// `BUSINESS` or `TECHNICAL`.
    #[serde(default)]
    pub service_type: Option<String>,
    /// Criticality tier.
    #[serde(default)]
    pub service_tier: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// External links.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub service_links: Vec<ServiceLink>,
    /// Owning group.
    #[serde(default)]
    pub owned_by: Option<GroupReference>,
    /// Synchronized from an external system.
    #[serde(default)]
    pub externally_owned: Option<bool>,
    /// `ACTIVE` or `INACTIVE`.
    #[serde(default)]
    pub status: Option<String>,
}

/// A link shown on a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLink {
    /// Link text.
    pub label: String,
    /// Target URL.
    pub url: String,
}

/// A dependency between two services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDependency {
    /// Dependency id.
    pub id: String,
    /// The service that depends.
    #[serde(default)]
    pub service: Option<ServiceReference>,
    /// The service depended upon.
    #[serde(default)]
    pub dependent_service: Option<ServiceReference>,
}

/// Query parameters for [`ServiceCatalogService::list`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListParams {
    /// Search terms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Fields the search applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    /// `AND` or `OR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operand: Option<String>,
    /// Owning group id or name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
}

/// Body for [`ServiceCatalogService::push`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushServiceParams {
    /// Set to update an existing service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Service name.
    pub target_name: String,
    /// Description.
    pub description: Option<String>,
    /// `BUSINESS` or `TECHNICAL`.
    pub service_type: String,
    /// Criticality tier.
    pub service_tier: Option<String>,
    /// Owning group.
    pub owned_by: Option<GroupReference>,
    /// External links.
    pub service_links: Vec<ServiceLink>,
}

/// Body for [`ServiceCatalogService::push_dependency`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushServiceDependencyParams {
    /// Set to update an existing dependency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The service that depends.
    pub service_id: String,
    /// The service depended upon.
    pub dependent_service_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_links_unwrapped() {
        let service: Service = serde_json::from_str(
            r#"{"id":"s1","targetName":"Payments","serviceLinks":{"count":1,"data":[{"label":"Runbook","url":"https://wiki/runbook"}]}}"#,
        )
        .unwrap();
        assert_eq!(service.service_links[0].label, "Runbook");
    }

    #[test]
    fn test_dependency_params() {
        let params = PushServiceDependencyParams {
            service_id: "a".to_string(),
            dependent_service_id: "b".to_string(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"serviceId":"a","dependentServiceId":"b"}"#
        );
    }
}

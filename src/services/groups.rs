//! Group operations.

use crate::client::context::RequestContext;
use crate::client::uri::{build_uri, Embed};
use crate::client::XMattersClient;
use crate::errors::XMattersResult;
use crate::services::Service;
use crate::types::{embedded, ReferenceById, ReferenceByName};
use serde::{Deserialize, Serialize};

/// Service for groups.
pub struct GroupsService<'a> {
    client: &'a XMattersClient,
    ctx: RequestContext,
}

impl<'a> GroupsService<'a> {
    /// Creates a new groups service.
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

    /// Gets a group with supervisors, observers and services embedded.
    pub async fn get(&self, group_id: &str) -> XMattersResult<Group> {
        let uri = build_uri(
            &format!("/groups/{}", group_id),
            &Embed {
                embed: "supervisors,observers,services",
            },
        )?;
        self.client.get_with_context(&self.ctx, &uri).await
    }

    /// Lists every group matching `params`.
    pub async fn list(&self, params: &GroupListParams) -> XMattersResult<Vec<Group>> {
        let uri = build_uri("/groups", params)?;
        self.client.collect_all_with_context(&self.ctx, &uri).await
    }

    /// Creates a group, or updates one when `params.id` is set.
    pub async fn push(&self, params: &PushGroupParams) -> XMattersResult<Group> {
        self.client
            .post_with_context(&self.ctx, "/groups", params)
            .await
    }

    /// Deletes a group.
    pub async fn delete(&self, group_id: &str) -> XMattersResult<()> {
        self.client
            .delete_with_context(&self.ctx, &format!("/groups/{}", group_id))
            .await
    }
}

/// A group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group id.
    pub id: String,
    /// Group name.
    #[serde(default)]
    pub target_name: Option<String>,
    /// `ACTIVE` or `INACTIVE`.
    #[serde(default)]
    pub status: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// `ON_CALL` or `BROADCAST`.
    #[serde(default)]
    pub group_type: Option<String>,
    /// Allow one person to be notified through several memberships.
    #[serde(default)]
    pub allow_duplicates: Option<bool>,
    /// Timezone.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Home site.
    #[serde(default)]
    pub site: Option<ReferenceById>,
    /// Every user may observe.
    #[serde(default)]
    pub observed_by_all: Option<bool>,
    /// Observer roles.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub observers: Vec<ReferenceByName>,
    /// Notify members on their default devices.
    #[serde(default)]
    pub use_default_devices: Option<bool>,
    /// Supervisors.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub supervisors: Vec<ReferenceById>,
    /// Services owned by the group.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub services: Vec<Service>,
    /// Identifier in an external system.
    #[serde(default)]
    pub external_key: Option<String>,
    /// Synchronized from an external system.
    #[serde(default)]
    pub externally_owned: Option<bool>,
}

/// Query parameters for [`GroupsService::list`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupListParams {
    /// Embedded objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<String>,
    /// Search terms.
    #[serde(rename = "search", skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    /// Fields the search applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    /// `AND` or `OR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operand: Option<String>,
    /// `ON_CALL` or `BROADCAST`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    /// Only groups with (or without) members.
    #[serde(rename = "member.exists", skip_serializing_if = "Option::is_none")]
    pub member_exists: Option<bool>,
    /// Member ids or names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<String>,
    /// Site ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sites: Option<String>,
    /// `ACTIVE` or `INACTIVE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Supervisor ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisors: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
}

/// Body for [`GroupsService::push`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushGroupParams {
    /// Set to update an existing group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Group name.
    pub target_name: String,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_duplicates: Option<bool>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_key: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub externally_owned: Option<bool>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_by_all: Option<bool>,
    /// Observer roles.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub observers: Vec<ReferenceByName>,
    /// Site id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_default_devices: Option<bool>,
    /// Supervisors.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supervisors: Vec<ReferenceById>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthMethod;
    use crate::mocks::{MockResponse, MockTransport};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn client(mock: &MockTransport) -> XMattersClient {
        XMattersClient::builder()
            .config(|c| {
                c.hostname("acme.xmatters.com")
                    .auth(AuthMethod::basic("svc", "pw"))
                    .no_rate_limit()
                    .no_retry()
            })
            .transport(Arc::new(mock.clone()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_unwraps_embedded_collections() {
        let mock = MockTransport::new();
        mock.on_get(
            "/groups/g1?embed=supervisors%2Cobservers%2Cservices",
            MockResponse::ok(&json!({
                "id": "g1",
                "targetName": "Ops",
                "observers": {"count": 1, "data": [{"name": "Standard User"}]},
                "supervisors": {"count": 2, "data": [{"id": "p1"}, {"id": "p2"}]},
                "services": {"count": 1, "data": [{"id": "s1", "targetName": "Payments"}]}
            })),
        );

        let group = client(&mock).groups().get("g1").await.unwrap();

        assert_eq!(group.observers, vec![ReferenceByName { name: "Standard User".into() }]);
        assert_eq!(group.supervisors, vec![ReferenceById::new("p1"), ReferenceById::new("p2")]);
        assert_eq!(group.services[0].id, "s1");
    }

    #[test]
    fn test_list_params_dotted_names() {
        let params = GroupListParams {
            member_exists: Some(true),
            group_type: Some("ON_CALL".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_urlencoded::to_string(&params).unwrap(),
            "groupType=ON_CALL&member.exists=true"
        );
    }

    #[test]
    fn test_push_params_minimal() {
        let params = PushGroupParams {
            target_name: "Ops".into(),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&params).unwrap(), r#"{"targetName":"Ops"}"#);
    }
}

//! Group roster operations.
//!
//! A roster is the flattened member list of a group. [`RosterService::reconcile`]
//! converges a group onto a desired member list with one request per
//! difference. Nothing is batched and nothing is rolled back: the first
//! failing request stops the run and leaves the roster partially changed.

use crate::client::context::RequestContext;
use crate::client::XMattersClient;
use crate::errors::XMattersResult;
use crate::types::{embedded, GroupReference, RecipientReference, RecipientType, Shift};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Service for group rosters.
pub struct RosterService<'a> {
    client: &'a XMattersClient,
    ctx: RequestContext,
}

impl<'a> RosterService<'a> {
    /// Creates a new roster service.
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

    /// Fetches every member of a group.
    ///
    /// The group reference comes from the first membership; an empty group
    /// yields an empty roster.
    pub async fn get(&self, group_id: &str) -> XMattersResult<GroupRoster> {
        let mut group: Option<GroupReference> = None;
        let members = self
            .client
            .collect_all_mapped_with_context(
                &self.ctx,
                &members_path(group_id),
                |membership: GroupMembership| {
                    if group.is_none() {
                        group = Some(membership.group.clone());
                    }
                    GroupMember::from(&membership.member)
                },
            )
            .await?;

        Ok(GroupRoster {
            group_id: group.as_ref().and_then(|g| g.id.clone()),
            group,
            members,
        })
    }

    /// Makes the roster of `group_id` equal to `desired`, comparing members
    /// by id only, and returns the roster as the server reports it afterwards.
    ///
    /// Members missing from `desired` are removed first, in current roster
    /// order. Then members missing from the group are added, in `desired`
    /// order. An id listed twice in `desired` is added once.
    pub async fn reconcile(
        &self,
        group_id: &str,
        desired: &[GroupMember],
    ) -> XMattersResult<GroupRoster> {
        let current = self.get(group_id).await?;

        let wanted: HashSet<&str> = desired.iter().map(|m| m.id.as_str()).collect();
        let present: HashSet<&str> = current.members.iter().map(|m| m.id.as_str()).collect();

        let to_remove: Vec<&GroupMember> = current
            .members
            .iter()
            .filter(|m| !wanted.contains(m.id.as_str()))
            .collect();
        let mut queued: HashSet<&str> = HashSet::new();
        let to_add: Vec<&GroupMember> = desired
            .iter()
            .filter(|m| !present.contains(m.id.as_str()) && queued.insert(m.id.as_str()))
            .collect();

        info!(
            group_id,
            current = current.members.len(),
            desired = desired.len(),
            removing = to_remove.len(),
            adding = to_add.len(),
            "Reconciling group roster"
        );

        for member in to_remove {
            debug!(group_id, member_id = %member.id, "Removing group member");
            self.remove_member(group_id, &member.id).await?;
        }
        for member in to_add {
            debug!(group_id, member_id = %member.id, "Adding group member");
            self.add_member(group_id, member).await?;
        }

        self.get(group_id).await
    }

    /// Removes every member of a group.
    pub async fn delete_roster(&self, group_id: &str) -> XMattersResult<()> {
        let roster = self.get(group_id).await?;
        info!(group_id, members = roster.members.len(), "Clearing group roster");
        for member in &roster.members {
            self.remove_member(group_id, &member.id).await?;
        }
        Ok(())
    }

    /// Adds one member to a group.
    pub async fn add_member(
        &self,
        group_id: &str,
        member: &GroupMember,
    ) -> XMattersResult<GroupMembership> {
        self.client
            .post_with_context(&self.ctx, &members_path(group_id), member)
            .await
    }

    /// Removes one member from a group.
    pub async fn remove_member(&self, group_id: &str, member_id: &str) -> XMattersResult<()> {
        self.client
            .delete_with_context(
                &self.ctx,
                &format!("{}/{}", members_path(group_id), member_id),
            )
            .await
    }
}

fn members_path(group_id: &str) -> String {
    format!("/groups/{}/members", group_id)
}

/// A member of a roster, identified by id and kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    /// Member id.
    pub id: String,
    /// Member kind.
    pub recipient_type: RecipientType,
}

impl GroupMember {
    /// Creates a member.
    pub fn new(id: impl Into<String>, recipient_type: RecipientType) -> Self {
        Self {
            id: id.into(),
            recipient_type,
        }
    }
}

impl From<&RecipientReference> for GroupMember {
    fn from(recipient: &RecipientReference) -> Self {
        Self::new(recipient.id(), recipient.recipient_type())
    }
}

/// The membership of one recipient in a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMembership {
    /// The group.
    pub group: GroupReference,
    /// The member.
    pub member: RecipientReference,
    /// Shifts the member belongs to, for on-call groups.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub shifts: Vec<Shift>,
}

/// All members of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupRoster {
    /// Group id, when the group has members.
    pub group_id: Option<String>,
    /// The group, when it has members.
    pub group: Option<GroupReference>,
    /// Members in server order.
    pub members: Vec<GroupMember>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthMethod;
    use crate::errors::XMattersError;
    use crate::mocks::{MockResponse, MockTransport};
    use pretty_assertions::assert_eq;
    use reqwest::Method;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn client(mock: &MockTransport) -> XMattersClient {
        XMattersClient::builder()
            .config(|c| {
                c.hostname("acme.xmatters.com")
                    .auth(AuthMethod::bearer("t"))
                    .no_rate_limit()
                    .no_retry()
            })
            .transport(Arc::new(mock.clone()))
            .build()
            .unwrap()
    }

    fn membership(id: &str) -> Value {
        json!({
            "group": {"id": "g1", "targetName": "Ops", "recipientType": "GROUP"},
            "member": {"id": id, "targetName": id, "recipientType": "PERSON"}
        })
    }

    fn roster_page(ids: &[&str]) -> MockResponse {
        let data: Vec<Value> = ids.iter().map(|id| membership(id)).collect();
        MockResponse::ok(&json!({"count": data.len(), "total": data.len(), "data": data, "links": {}}))
    }

    fn person(id: &str) -> GroupMember {
        GroupMember::new(id, RecipientType::Person)
    }

    fn calls(mock: &MockTransport) -> Vec<(Method, String)> {
        mock.requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }

    #[tokio::test]
    async fn test_get_maps_memberships() {
        let mock = MockTransport::new();
        mock.on_get(
            "/groups/g1/members",
            MockResponse::ok(&json!({
                "count": 2,
                "total": 2,
                "data": [
                    membership("alice"),
                    {
                        "group": {"id": "g1"},
                        "member": {"id": "d1", "recipientType": "DEVICE", "timeframes": {"data": []}},
                        "shifts": {"count": 0, "data": []}
                    }
                ]
            })),
        );

        let roster = client(&mock).rosters().get("g1").await.unwrap();

        assert_eq!(roster.group_id.as_deref(), Some("g1"));
        assert_eq!(
            roster.members,
            vec![person("alice"), GroupMember::new("d1", RecipientType::Device)]
        );
    }

    #[tokio::test]
    async fn test_empty_roster() {
        let mock = MockTransport::new();
        mock.on_get("/groups/g1/members", roster_page(&[]));

        let roster = client(&mock).rosters().get("g1").await.unwrap();
        assert_eq!(roster, GroupRoster::default());
    }

    #[tokio::test]
    async fn test_reconcile_removes_then_adds() {
        let mock = MockTransport::new();
        mock.on_get("/groups/g1/members", roster_page(&["A", "B"]));
        mock.on_get("/groups/g1/members", roster_page(&["B", "C"]));
        mock.on_delete("/groups/g1/members/A", MockResponse::ok(&membership("A")));
        mock.on_post("/groups/g1/members", MockResponse::created(&membership("C")));

        let roster = client(&mock)
            .rosters()
            .reconcile("g1", &[person("B"), person("C")])
            .await
            .unwrap();

        assert_eq!(roster.members, vec![person("B"), person("C")]);
        assert_eq!(
            calls(&mock),
            vec![
                (Method::GET, "/groups/g1/members".to_string()),
                (Method::DELETE, "/groups/g1/members/A".to_string()),
                (Method::POST, "/groups/g1/members".to_string()),
                (Method::GET, "/groups/g1/members".to_string()),
            ]
        );
        let body: Value = serde_json::from_slice(mock.requests()[2].body.as_ref().unwrap()).unwrap();
        assert_eq!(body, json!({"id": "C", "recipientType": "PERSON"}));
    }

    #[tokio::test]
    async fn test_reconcile_noop_only_reads() {
        let mock = MockTransport::new();
        mock.on_get("/groups/g1/members", roster_page(&["A"]));

        client(&mock)
            .rosters()
            .reconcile("g1", &[person("A")])
            .await
            .unwrap();

        assert!(calls(&mock).iter().all(|(m, _)| *m == Method::GET));
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_reconcile_stops_at_first_failure() {
        let mock = MockTransport::new();
        mock.on_get("/groups/g1/members", roster_page(&["A", "B"]));
        mock.on_delete(
            "/groups/g1/members/A",
            MockResponse::api_error(403, "Forbidden", "not allowed"),
        );

        let err = client(&mock)
            .rosters()
            .reconcile("g1", &[person("C")])
            .await
            .unwrap_err();

        assert!(matches!(err, XMattersError::Api { status: 403, .. }));
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_reconcile_adds_repeated_member_once() {
        let mock = MockTransport::new();
        mock.on_get("/groups/g1/members", roster_page(&[]));
        mock.on_get("/groups/g1/members", roster_page(&["C"]));
        mock.on_post("/groups/g1/members", MockResponse::created(&membership("C")));

        client(&mock)
            .rosters()
            .reconcile("g1", &[person("C"), person("C")])
            .await
            .unwrap();

        let posts = calls(&mock)
            .into_iter()
            .filter(|(m, _)| *m == Method::POST)
            .count();
        assert_eq!(posts, 1);
    }

    #[tokio::test]
    async fn test_unrecognised_member_kind_is_kept() {
        let mock = MockTransport::new();
        mock.on_get(
            "/groups/g1/members",
            MockResponse::ok(&json!({
                "count": 2,
                "total": 2,
                "data": [
                    membership("alice"),
                    {
                        "group": {"id": "g1"},
                        "member": {"id": "x1", "targetName": "partner", "recipientType": "EXTERNAL_USER"}
                    }
                ]
            })),
        );

        let roster = client(&mock).rosters().get("g1").await.unwrap();
        let external = GroupMember::new("x1", RecipientType::Other("EXTERNAL_USER".to_string()));
        assert_eq!(roster.members, vec![person("alice"), external.clone()]);

        // Reconciling onto the same roster changes nothing.
        client(&mock)
            .rosters()
            .reconcile("g1", &[person("alice"), external])
            .await
            .unwrap();
        assert!(calls(&mock).iter().all(|(m, _)| *m == Method::GET));
    }

    #[tokio::test]
    async fn test_delete_roster_removes_everyone() {
        let mock = MockTransport::new();
        mock.on_get("/groups/g1/members", roster_page(&["A", "B"]));
        mock.on_delete("/groups/g1/members/A", MockResponse::no_content());
        mock.on_delete("/groups/g1/members/B", MockResponse::no_content());

        client(&mock).rosters().delete_roster("g1").await.unwrap();

        let deletes: Vec<String> = calls(&mock)
            .into_iter()
            .filter(|(m, _)| *m == Method::DELETE)
            .map(|(_, p)| p)
            .collect();
        assert_eq!(deletes, vec!["/groups/g1/members/A", "/groups/g1/members/B"]);
    }
}

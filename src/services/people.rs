//! People operations.

use crate::client::context::RequestContext;
use crate::client::uri::{build_uri, Embed};
use crate::client::XMattersClient;
use crate::errors::XMattersResult;
use crate::types::{embedded, PersonReference, ReferenceById, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Service for people.
pub struct PeopleService<'a> {
    client: &'a XMattersClient,
    ctx: RequestContext,
}

impl<'a> PeopleService<'a> {
    /// Creates a new people service.
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

    /// Gets a person with roles and supervisors embedded.
    pub async fn get(&self, person_id: &str) -> XMattersResult<Person> {
        let uri = build_uri(
            &format!("/people/{}", person_id),
            &Embed {
                embed: "roles,supervisors",
            },
        )?;
        self.client.get_with_context(&self.ctx, &uri).await
    }

    /// Lists every person matching `params`, across all pages.
    pub async fn list(&self, params: &PeopleListParams) -> XMattersResult<Vec<Person>> {
        let uri = build_uri("/people", params)?;
        self.client.collect_all_with_context(&self.ctx, &uri).await
    }

    /// Creates a person, or updates one when `params.id` is set.
    pub async fn push(&self, params: &PushPersonParams) -> XMattersResult<Person> {
        self.client
            .post_with_context(&self.ctx, "/people", params)
            .await
    }

    /// Deletes a person.
    pub async fn delete(&self, person_id: &str) -> XMattersResult<()> {
        self.client
            .delete_with_context(&self.ctx, &format!("/people/{}", person_id))
            .await
    }

    /// Gets the user license quotas of the instance.
    pub async fn license_quotas(&self) -> XMattersResult<UserQuotas> {
        self.client
            .get_with_context(&self.ctx, "/people/license-quotas")
            .await
    }
}

/// A person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Person id.
    pub id: String,
    /// User id.
    #[serde(default)]
    pub target_name: Option<String>,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Assigned roles.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub roles: Vec<Role>,
    /// `ACTIVE` or `INACTIVE`.
    #[serde(default)]
    pub status: Option<String>,
    /// Web login.
    #[serde(default)]
    pub web_login: Option<String>,
    /// Home site.
    #[serde(default)]
    pub site: Option<ReferenceById>,
    /// Timezone.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Preferred language.
    #[serde(default)]
    pub language: Option<String>,
    /// Supervisors.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub supervisors: Vec<PersonReference>,
    /// Phone login.
    #[serde(default)]
    pub phone_login: Option<String>,
    /// `FULL_USER` or `STAKEHOLDER_USER`.
    #[serde(default)]
    pub license_type: Option<String>,
    /// Identifier in an external system.
    #[serde(default)]
    pub external_key: Option<String>,
    /// Synchronized from an external system.
    #[serde(default)]
    pub externally_owned: Option<bool>,
    /// Last login timestamp.
    #[serde(default)]
    pub last_login: Option<String>,
    /// Custom properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, serde_json::Value>>,
}

/// User license quotas of an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuotas {
    /// Stakeholder licenses are available.
    #[serde(default)]
    pub stakeholder_users_enabled: Option<bool>,
    /// Stakeholder user quota.
    #[serde(default)]
    pub stakeholder_users: Option<QuotaDetails>,
    /// Full user quota.
    #[serde(default)]
    pub full_users: Option<QuotaDetails>,
}

/// Usage of one license type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaDetails {
    /// Licenses purchased.
    #[serde(default)]
    pub total: i64,
    /// Licenses in use.
    #[serde(default)]
    pub active: i64,
    /// Licenses left.
    #[serde(default)]
    pub unused: i64,
}

/// Query parameters for [`PeopleService::list`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeopleListParams {
    /// Embedded objects, e.g. `roles,devices`.
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
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_after: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_before: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_from: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_to: Option<String>,
    /// Has at least one device.
    #[serde(rename = "devices.exists", skip_serializing_if = "Option::is_none")]
    pub devices_exists: Option<bool>,
    /// Has an email device.
    #[serde(rename = "devices.email.exists", skip_serializing_if = "Option::is_none")]
    pub devices_email_exists: Option<bool>,
    /// Has a failsafe device.
    #[serde(rename = "devices.failsafe.exists", skip_serializing_if = "Option::is_none")]
    pub devices_failsafe_exists: Option<bool>,
    /// Has a mobile device.
    #[serde(rename = "devices.mobile.exists", skip_serializing_if = "Option::is_none")]
    pub devices_mobile_exists: Option<bool>,
    /// Has an SMS device.
    #[serde(rename = "devices.sms.exists", skip_serializing_if = "Option::is_none")]
    pub devices_sms_exists: Option<bool>,
    /// Has a voice device.
    #[serde(rename = "devices.voice.exists", skip_serializing_if = "Option::is_none")]
    pub devices_voice_exists: Option<bool>,
    /// Device status filter.
    #[serde(rename = "devices.status", skip_serializing_if = "Option::is_none")]
    pub devices_status: Option<String>,
    /// Device test status filter.
    #[serde(rename = "devices.testStatus", skip_serializing_if = "Option::is_none")]
    pub devices_test_status: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Comma-separated group names or ids. Sent unescaped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<String>,
    /// Belongs to at least one group.
    #[serde(rename = "groups.exists", skip_serializing_if = "Option::is_none")]
    pub groups_exists: Option<bool>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_type: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisors: Option<String>,
    /// Has at least one supervisor.
    #[serde(rename = "supervisors.exists", skip_serializing_if = "Option::is_none")]
    pub supervisors_exists: Option<bool>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_login: Option<String>,
    /// Sort field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// `ASCENDING` or `DESCENDING`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
}

/// Body for [`PeopleService::push`].
///
/// Fields sent as explicit `null` clear the value on the server.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPersonParams {
    /// Set to update an existing person.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// User id.
    pub target_name: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Role names.
    pub roles: Vec<String>,
    /// `FULL_USER` or `STAKEHOLDER_USER`.
    pub license_type: String,
    /// Home site id or name.
    pub site: String,
    /// Language code.
    pub language: String,
    /// Supervisor ids or target names.
    pub supervisors: Vec<String>,
    /// Timezone.
    pub timezone: String,
    /// Web login.
    pub web_login: String,
    /// `ACTIVE` or `INACTIVE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Phone login.
    pub phone_login: Option<String>,
    /// Phone PIN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_pin: Option<String>,
    /// Identifier in an external system.
    pub external_key: Option<String>,
    /// Synchronized from an external system.
    pub externally_owned: Option<bool>,
}

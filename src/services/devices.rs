//! Device operations.

use crate::client::context::RequestContext;
use crate::client::uri::{build_uri, Embed};
use crate::client::XMattersClient;
use crate::errors::XMattersResult;
use crate::types::{embedded, DeviceTimeframe, PersonReference};
use serde::{Deserialize, Serialize};

/// Service for devices.
pub struct DevicesService<'a> {
    client: &'a XMattersClient,
    ctx: RequestContext,
}

impl<'a> DevicesService<'a> {
    /// Creates a new devices service.
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

    /// Gets a device with its timeframes embedded.
    pub async fn get(&self, device_id: &str) -> XMattersResult<Device> {
        let uri = build_uri(
            &format!("/devices/{}", device_id),
            &Embed {
                embed: "timeframes",
            },
        )?;
        self.client.get_with_context(&self.ctx, &uri).await
    }

    /// Lists every device matching `params`.
    pub async fn list(&self, params: &DeviceListParams) -> XMattersResult<Vec<Device>> {
        let uri = build_uri("/devices", params)?;
        self.client.collect_all_with_context(&self.ctx, &uri).await
    }

    /// Creates a device, or updates one when `params.id` is set.
    pub async fn push(&self, params: &PushDeviceParams) -> XMattersResult<Device> {
        self.client
            .post_with_context(&self.ctx, "/devices", params)
            .await
    }

    /// Deletes a device.
    pub async fn delete(&self, device_id: &str) -> XMattersResult<()> {
        self.client
            .delete_with_context(&self.ctx, &format!("/devices/{}", device_id))
            .await
    }
}

/// A device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Device id.
    pub id: String,
    /// `owner|name` pair.
    #[serde(default)]
    pub target_name: Option<String>,
    /// Country code for phone devices.
    #[serde(default)]
    pub country: Option<String>,
    /// Default device of its owner.
    #[serde(default)]
    pub default_device: Option<bool>,
    /// Minutes to wait before notifying.
    #[serde(default)]
    pub delay: Option<i32>,
    /// `EMAIL`, `VOICE`, `SMS`, ...
    #[serde(default)]
    pub device_type: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub email_address: Option<String>,
    /// Identifier in an external system.
    #[serde(default)]
    pub external_key: Option<String>,
    /// Synchronized from an external system.
    #[serde(default)]
    pub externally_owned: Option<bool>,
    /// Device name, e.g. `Work Email`.
    #[serde(default)]
    pub name: Option<String>,
    /// Owner.
    #[serde(default)]
    pub owner: Option<PersonReference>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub phone_number: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub pin: Option<String>,
    /// `LOW`, `MEDIUM` or `HIGH`.
    #[serde(default)]
    pub priority_threshold: Option<String>,
    /// Order among the owner's devices.
    #[serde(default)]
    pub sequence: Option<i32>,
    /// `ACTIVE` or `INACTIVE`.
    #[serde(default)]
    pub status: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub test_status: Option<String>,
    /// Notification windows.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub timeframes: Vec<DeviceTimeframe>,
    /// Accepts replies.
    #[serde(default)]
    pub two_way_device: Option<bool>,
}

/// Query parameters for [`DevicesService::list`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListParams {
    /// Embedded objects, e.g. `timeframes`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<String>,
    /// `ACTIVE` or `INACTIVE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_status: Option<String>,
    /// Device type filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    /// Comma-separated device names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_names: Option<String>,
}

/// Body for [`DevicesService::push`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushDeviceParams {
    /// Set to update an existing device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Device type.
    pub device_type: String,
    /// Device name.
    pub name: String,
    /// Owner id.
    pub owner: String,
    /// Order among the owner's devices.
    pub sequence: Option<i32>,
    /// `LOW`, `MEDIUM` or `HIGH`.
    pub priority_threshold: String,
    #[allow(missing_docs)]
    pub test_status: String,
    /// Notification windows.
    pub timeframes: Vec<DeviceTimeframe>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_device: Option<bool>,
    /// Minutes to wait before notifying.
    pub delay: Option<i32>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    /// Identifier in an external system.
    pub external_key: Option<String>,
    /// Synchronized from an external system.
    pub externally_owned: Option<bool>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Accepts replies.
    pub two_way_device: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_decodes_wrapped_timeframes() {
        let device: Device = serde_json::from_str(
            r#"{
                "id": "d1",
                "name": "Work Email",
                "deviceType": "EMAIL",
                "owner": {"id": "p1", "targetName": "jdoe"},
                "timeframes": {"count": 1, "data": [
                    {"name": "24x7", "startTime": "00:00", "durationInMinutes": 1440,
                     "days": ["MO", "TU"], "excludeHolidays": false}
                ]}
            }"#,
        )
        .unwrap();

        assert_eq!(device.timeframes.len(), 1);
        assert_eq!(device.timeframes[0].duration_in_minutes, 1440);
        assert_eq!(device.owner.unwrap().id, "p1");
    }

    #[test]
    fn test_push_params_shape() {
        let params = PushDeviceParams {
            device_type: "EMAIL".to_string(),
            name: "Work Email".to_string(),
            owner: "p1".to_string(),
            email_address: Some("jdoe@example.com".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["deviceType"], "EMAIL");
        assert_eq!(value["emailAddress"], "jdoe@example.com");
        assert!(value.get("pin").is_none());
        assert!(value["delay"].is_null());
    }
}

//! Core data types shared across xMatters resources.

use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Decoding helpers for embedded sub-collections.
pub mod embedded {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Embedded<T> {
        Plain(Vec<T>),
        Wrapped { data: Option<Vec<T>> },
    }

    /// Accepts `{"data": [...]}`, a bare array, or `null`.
    ///
    /// Embedded collections such as `roles` or `supervisors` arrive wrapped
    /// in a page envelope when requested through `embed=`.
    pub fn unwrap_data<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(match Option::<Embedded<T>>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(Embedded::Plain(items)) => items,
            Some(Embedded::Wrapped { data }) => data.unwrap_or_default(),
        })
    }
}

/// Identifies a resource by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceById {
    /// Resource id.
    pub id: String,
}

impl ReferenceById {
    /// Creates a reference.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Identifies a resource by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceByName {
    /// Resource name.
    pub name: String,
}

/// Shorthand for a person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonReference {
    /// Person id.
    #[serde(default)]
    pub id: String,
    /// User id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Shorthand for a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupReference {
    /// Group id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Group name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    /// Always `GROUP` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_type: Option<RecipientType>,
    /// `ON_CALL` or `BROADCAST`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
}

/// Shorthand for a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReference {
    /// Service id.
    #[serde(default)]
    pub id: String,
    /// Service name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
}

/// A role that can be assigned to people or observe groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Role name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A window during which a device may be notified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTimeframe {
    /// Timeframe name.
    pub name: String,
    /// Start time, `HH:mm`.
    pub start_time: String,
    /// Length in minutes.
    pub duration_in_minutes: i32,
    /// Days of the week, e.g. `MO`.
    #[serde(default)]
    pub days: Vec<String>,
    /// Skip company holidays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_holidays: Option<bool>,
}

/// Kind of recipient.
///
/// Kinds this crate does not know keep their wire name in [`RecipientType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecipientType {
    /// A person.
    Person,
    /// A group.
    Group,
    /// A device.
    Device,
    /// A dynamic team.
    DynamicTeam,
    /// Any other kind, as sent by the server.
    Other(String),
}

impl RecipientType {
    /// Wire name, e.g. `DYNAMIC_TEAM`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Person => "PERSON",
            Self::Group => "GROUP",
            Self::Device => "DEVICE",
            Self::DynamicTeam => "DYNAMIC_TEAM",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for RecipientType {
    fn from(name: &str) -> Self {
        match name {
            "PERSON" => Self::Person,
            "GROUP" => Self::Group,
            "DEVICE" => Self::Device,
            "DYNAMIC_TEAM" => Self::DynamicTeam,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for RecipientType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecipientType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from(name.as_str()))
    }
}

/// Points at a recipient by id and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientPointer {
    /// Recipient id.
    pub id: String,
    /// Recipient kind.
    pub recipient_type: RecipientType,
}

/// A group member as returned by the API.
///
/// The `recipientType` field selects the variant. Each variant carries the
/// fields the server sends for that kind of recipient; unknown kinds decode
/// into [`RecipientReference::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecipientReference {
    /// A person.
    Person(PersonRecipient),
    /// A group.
    Group(GroupRecipient),
    /// A device.
    Device(DeviceRecipient),
    /// A dynamic team.
    DynamicTeam(DynamicTeamRecipient),
    /// A kind of recipient without a dedicated variant.
    Other(OtherRecipient),
}

impl RecipientReference {
    /// Recipient id.
    pub fn id(&self) -> &str {
        match self {
            Self::Person(p) => &p.id,
            Self::Group(g) => &g.id,
            Self::Device(d) => &d.id,
            Self::DynamicTeam(t) => &t.id,
            Self::Other(o) => &o.id,
        }
    }

    /// Recipient name, if the server sent one.
    pub fn target_name(&self) -> Option<&str> {
        match self {
            Self::Person(p) => p.target_name.as_deref(),
            Self::Group(g) => g.target_name.as_deref(),
            Self::Device(d) => d.target_name.as_deref(),
            Self::DynamicTeam(t) => t.target_name.as_deref(),
            Self::Other(o) => o.target_name.as_deref(),
        }
    }

    /// Recipient kind.
    pub fn recipient_type(&self) -> RecipientType {
        match self {
            Self::Person(_) => RecipientType::Person,
            Self::Group(_) => RecipientType::Group,
            Self::Device(_) => RecipientType::Device,
            Self::DynamicTeam(_) => RecipientType::DynamicTeam,
            Self::Other(o) => RecipientType::from(o.recipient_type.as_str()),
        }
    }
}

impl Serialize for RecipientReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = match self {
            Self::Person(p) => serde_json::to_value(p),
            Self::Group(g) => serde_json::to_value(g),
            Self::Device(d) => serde_json::to_value(d),
            Self::DynamicTeam(t) => serde_json::to_value(t),
            Self::Other(o) => return o.serialize(serializer),
        };
        let mut value = value.map_err(<S::Error as ser::Error>::custom)?;
        if let serde_json::Value::Object(fields) = &mut value {
            fields.insert(
                "recipientType".to_string(),
                serde_json::Value::String(self.recipient_type().as_str().to_string()),
            );
        }
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RecipientReference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = match value.get("recipientType") {
            Some(serde_json::Value::String(kind)) => RecipientType::from(kind.as_str()),
            Some(_) => return Err(de::Error::custom("recipientType must be a string")),
            None => return Err(de::Error::missing_field("recipientType")),
        };
        let decoded = match kind {
            RecipientType::Person => serde_json::from_value(value).map(Self::Person),
            RecipientType::Group => serde_json::from_value(value).map(Self::Group),
            RecipientType::Device => serde_json::from_value(value).map(Self::Device),
            RecipientType::DynamicTeam => serde_json::from_value(value).map(Self::DynamicTeam),
            RecipientType::Other(_) => serde_json::from_value(value).map(Self::Other),
        };
        decoded.map_err(de::Error::custom)
    }
}

/// Fields of a [`RecipientReference`] of unrecognised kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherRecipient {
    /// Recipient id.
    pub id: String,
    /// Raw `recipientType`.
    pub recipient_type: String,
    /// Recipient name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Person fields of a [`RecipientReference`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecipient {
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
    /// Preferred language.
    #[serde(default)]
    pub language: Option<String>,
    /// Timezone.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Web login.
    #[serde(default)]
    pub web_login: Option<String>,
    /// Phone login.
    #[serde(default)]
    pub phone_login: Option<String>,
    /// License type.
    #[serde(default)]
    pub license_type: Option<String>,
    /// Last login timestamp.
    #[serde(default)]
    pub last_login: Option<String>,
    /// `ACTIVE` or `INACTIVE`.
    #[serde(default)]
    pub status: Option<String>,
    /// Home site.
    #[serde(default)]
    pub site: Option<ReferenceById>,
    /// Custom properties.
    #[serde(default)]
    pub properties: Option<HashMap<String, serde_json::Value>>,
    /// Roles.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub roles: Vec<Role>,
    /// Supervisors.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub supervisors: Vec<PersonReference>,
    /// Synchronized from an external system.
    #[serde(default)]
    pub externally_owned: Option<bool>,
}

/// Group fields of a [`RecipientReference`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecipient {
    /// Group id.
    pub id: String,
    /// Group name.
    #[serde(default)]
    pub target_name: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// `ON_CALL` or `BROADCAST`.
    #[serde(default)]
    pub group_type: Option<String>,
    /// `ACTIVE` or `INACTIVE`.
    #[serde(default)]
    pub status: Option<String>,
    /// Allow duplicate notifications.
    #[serde(default)]
    pub allow_duplicates: Option<bool>,
    /// Everyone may observe the group.
    #[serde(default)]
    pub observed_by_all: Option<bool>,
    /// Responses required.
    #[serde(default)]
    pub response_count: Option<i64>,
    /// Threshold for responses.
    #[serde(default)]
    pub response_count_threshold: Option<i64>,
    /// Notify default devices.
    #[serde(default)]
    pub use_default_devices: Option<bool>,
    /// Home site.
    #[serde(default)]
    pub site: Option<ReferenceById>,
    /// Supervisors.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub supervisors: Vec<PersonReference>,
    /// Observer roles.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub observers: Vec<Role>,
    /// Owned services.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub services: Vec<ServiceReference>,
    /// Synchronized from an external system.
    #[serde(default)]
    pub externally_owned: Option<bool>,
}

/// Device fields of a [`RecipientReference`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecipient {
    /// Device id.
    pub id: String,
    /// `owner|name` pair.
    #[serde(default)]
    pub target_name: Option<String>,
    /// Device name, e.g. `Work Email`.
    #[serde(default)]
    pub name: Option<String>,
    /// `EMAIL`, `VOICE`, `SMS`, ...
    #[serde(default)]
    pub device_type: Option<String>,
    /// Default device of its owner.
    #[serde(default)]
    pub default_device: Option<bool>,
    /// Minutes to wait before notifying.
    #[serde(default)]
    pub delay: Option<i64>,
    /// Owner.
    #[serde(default)]
    pub owner: Option<PersonReference>,
    /// `LOW`, `MEDIUM` or `HIGH`.
    #[serde(default)]
    pub priority_threshold: Option<String>,
    /// Delivery provider.
    #[serde(default)]
    pub provider: Option<ReferenceById>,
    /// Order among the owner's devices.
    #[serde(default)]
    pub sequence: Option<i64>,
    /// Test status.
    #[serde(default)]
    pub test_status: Option<String>,
    /// `ACTIVE` or `INACTIVE`.
    #[serde(default)]
    pub status: Option<String>,
    /// Notification windows.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub timeframes: Vec<DeviceTimeframe>,
    /// Synchronized from an external system.
    #[serde(default)]
    pub externally_owned: Option<bool>,
}

/// Dynamic team fields of a [`RecipientReference`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicTeamRecipient {
    /// Team id.
    pub id: String,
    /// Team name.
    #[serde(default)]
    pub target_name: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Synchronized from an external system.
    #[serde(default)]
    pub externally_owned: Option<bool>,
}

/// An on-call shift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    /// Shift id.
    #[serde(default)]
    pub id: String,
    /// Owning group.
    #[serde(default)]
    pub group: Option<GroupReference>,
    /// Shift name.
    #[serde(default)]
    pub name: Option<String>,
    /// Start timestamp.
    #[serde(default)]
    pub start: Option<String>,
    /// End timestamp.
    #[serde(default)]
    pub end: Option<String>,
    /// Timezone.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Repeat rule.
    #[serde(default)]
    pub recurrence: Option<ShiftRecurrence>,
    /// Rotation members.
    #[serde(default, deserialize_with = "embedded::unwrap_data")]
    pub members: Vec<ShiftMember>,
}

/// How a shift repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecurrence {
    /// `ONCE`, `DAILY`, `WEEKLY`, `MONTHLY` or `YEARLY`.
    #[serde(default)]
    pub frequency: Option<String>,
    /// Interval between repeats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_every: Option<i64>,
    /// Weekdays for weekly shifts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_days: Vec<String>,
    /// `DATE` or `DAY_OF_WEEK` for monthly shifts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<String>,
    /// Months for yearly shifts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub months: Vec<String>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_month: Option<String>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week_classifier: Option<String>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
    /// When the repetition stops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<ShiftEnd>,
}

/// End condition of a recurring shift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftEnd {
    /// `NEVER`, `DATE` or `REPETITIONS`.
    #[serde(default)]
    pub end_by: Option<String>,
    /// End date.
    #[serde(default)]
    pub date: Option<String>,
    /// Number of repetitions.
    #[serde(default, alias = "repititions")]
    pub repetitions: Option<i64>,
}

/// A recipient in a shift rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftMember {
    /// The member.
    pub recipient: RecipientPointer,
    /// Owning shift.
    #[serde(default)]
    pub shift: Option<ReferenceById>,
    /// Position in the rotation.
    #[serde(default)]
    pub position: Option<i64>,
    /// Escalation delay in minutes.
    #[serde(default)]
    pub delay: Option<i64>,
    /// `NONE` or `ESCALATION`.
    #[serde(default)]
    pub escalation_type: Option<String>,
    /// Currently part of the rotation.
    #[serde(default)]
    pub in_rotation: Option<bool>,
}

//! User custom actions.

use serde::{Deserialize, Deserializer, Serialize};

// SharePoint sends unset properties as `null` rather than omitting them.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Permission mask required to see a custom action, split into two halves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionRights {
    /// High 32 bits of the mask.
    #[serde(default, deserialize_with = "null_as_default")]
    pub high: String,
    /// Low 32 bits of the mask.
    #[serde(default, deserialize_with = "null_as_default")]
    pub low: String,
}

/// A `UserCustomAction` registered on a web or site collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CustomAction {
    /// SPFx component id.
    #[serde(deserialize_with = "null_as_default")]
    pub client_side_component_id: String,
    /// SPFx component properties, as a JSON string.
    #[serde(deserialize_with = "null_as_default")]
    pub client_side_component_properties: String,
    /// Action id.
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Icon URL.
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    /// Where the action is rendered (e.g., `ClientSideExtension.ApplicationCustomizer`).
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    /// Registration target id (list template, content type, ...).
    #[serde(deserialize_with = "null_as_default")]
    pub registration_id: String,
    /// Registration target kind.
    #[serde(deserialize_with = "null_as_default")]
    pub registration_type: i32,
    /// Whether only site administrators see the action.
    #[serde(deserialize_with = "null_as_default")]
    pub require_site_administrator: bool,
    /// Required permissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<ActionRights>,
    /// Display title.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Target URL.
    #[serde(deserialize_with = "null_as_default")]
    pub url_action: String,
}

/// Container keyed by `Items`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomActionElements {
    /// Custom actions.
    #[serde(rename = "Items", default)]
    pub items: Vec<CustomAction>,
}

/// OData collection response for `UserCustomActions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomActionCollection {
    /// Custom actions.
    #[serde(default)]
    pub value: Vec<CustomAction>,
}

/// Scope a custom action is registered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionScope {
    /// The current web.
    #[default]
    Web,
    /// The site collection.
    Site,
}

impl ActionScope {
    /// REST path of the scope's `UserCustomActions` collection.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Web => "_api/web/UserCustomActions",
            Self::Site => "_api/site/UserCustomActions",
        }
    }
}

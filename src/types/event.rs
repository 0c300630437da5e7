//! Event types for the append-only editor log
//!
//! Events are immutable records of editor actions. The current component
//! tree is derived by replaying them in order, so every payload carries
//! enough data to be applied without consulting anything but prior state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::component::{Position, Size};

/// Where an event originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    /// Direct user interaction in the editor
    #[default]
    User,
    /// Generated by the engine itself
    System,
    /// Submitted through an external API
    Api,
}

/// Versioning metadata attached to an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMeta {
    /// Monotonic version assigned by the event factory
    pub version: u64,
    #[serde(default)]
    pub source: EventSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload for a `COMPONENT_CREATED` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentCreatedPayload {
    #[serde(rename = "componentId")]
    pub component_id: String,
    #[serde(rename = "componentType")]
    pub component_type: String,
    #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub position: Position,
    pub size: Size,
    #[serde(rename = "initialProps", default)]
    pub initial_props: Map<String, Value>,
    #[serde(rename = "initialStyles", default)]
    pub initial_styles: Map<String, Value>,
}

/// Partial update applied by a `COMPONENT_UPDATED` event
///
/// `props` and `styles` merge key-wise into the existing maps;
/// `position` and `size` replace wholesale when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComponentUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Map<String, Value>>,
}

/// Payload for a `COMPONENT_UPDATED` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentUpdatedPayload {
    #[serde(rename = "componentId")]
    pub component_id: String,
    pub updates: ComponentUpdates,
}

/// Payload for a `COMPONENT_DELETED` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDeletedPayload {
    #[serde(rename = "componentId")]
    pub component_id: String,
    #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Payload for a `COMPONENT_MOVED` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMovedPayload {
    #[serde(rename = "componentId")]
    pub component_id: String,
    #[serde(rename = "oldPosition")]
    pub old_position: Position,
    #[serde(rename = "newPosition")]
    pub new_position: Position,
    #[serde(rename = "oldParentId", default, skip_serializing_if = "Option::is_none")]
    pub old_parent_id: Option<String>,
    #[serde(rename = "newParentId", default, skip_serializing_if = "Option::is_none")]
    pub new_parent_id: Option<String>,
}

/// Payload for a `PROPERTY_CHANGED` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyChangedPayload {
    #[serde(rename = "componentId")]
    pub component_id: String,
    /// Dotted path into the component, e.g. `position.x` or `props.label`
    #[serde(rename = "propertyPath")]
    pub property_path: String,
    #[serde(rename = "oldValue", default)]
    pub old_value: Value,
    #[serde(rename = "newValue")]
    pub new_value: Value,
}

/// Payload for a `STYLE_UPDATED` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleUpdatedPayload {
    #[serde(rename = "componentId")]
    pub component_id: String,
    #[serde(rename = "styleProperty")]
    pub style_property: String,
    #[serde(rename = "oldValue", default)]
    pub old_value: Value,
    #[serde(rename = "newValue")]
    pub new_value: Value,
}

/// Typed event payload, tagged by the wire-level `type` field
///
/// The union is closed: an unrecognized tag fails at decode time and is
/// surfaced as an import error, so the reducer match is exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EventPayload {
    #[serde(rename = "COMPONENT_CREATED")]
    ComponentCreated(ComponentCreatedPayload),
    #[serde(rename = "COMPONENT_UPDATED")]
    ComponentUpdated(ComponentUpdatedPayload),
    #[serde(rename = "COMPONENT_DELETED")]
    ComponentDeleted(ComponentDeletedPayload),
    #[serde(rename = "COMPONENT_MOVED")]
    ComponentMoved(ComponentMovedPayload),
    #[serde(rename = "PROPERTY_CHANGED")]
    PropertyChanged(PropertyChangedPayload),
    #[serde(rename = "STYLE_UPDATED")]
    StyleUpdated(StyleUpdatedPayload),
}

impl EventPayload {
    /// Wire-level tag for this payload, used in logs and statistics
    pub fn type_name(&self) -> &'static str {
        match self {
            EventPayload::ComponentCreated(_) => "COMPONENT_CREATED",
            EventPayload::ComponentUpdated(_) => "COMPONENT_UPDATED",
            EventPayload::ComponentDeleted(_) => "COMPONENT_DELETED",
            EventPayload::ComponentMoved(_) => "COMPONENT_MOVED",
            EventPayload::PropertyChanged(_) => "PROPERTY_CHANGED",
            EventPayload::StyleUpdated(_) => "STYLE_UPDATED",
        }
    }
}

/// An immutable event in the editor log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiEvent {
    /// Unique event id (uuid)
    pub id: String,

    #[serde(flatten)]
    pub payload: EventPayload,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,

    #[serde(rename = "userId")]
    pub user_id: String,

    #[serde(rename = "sessionId")]
    pub session_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMeta>,
}

impl UiEvent {
    /// The factory-assigned version, or 0 when metadata is absent
    pub fn version(&self) -> u64 {
        self.metadata.as_ref().map(|m| m.version).unwrap_or(0)
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

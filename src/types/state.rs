//! Full editor state types
//!
//! `UiState` is the value the reducer folds events into. Components live in
//! a `BTreeMap` so iteration and serialization order are deterministic,
//! which keeps replay output structurally comparable across runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::component::ComponentNode;

/// Page layout mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    #[default]
    Free,
    Grid,
    Flex,
}

/// Optional layout constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LayoutConstraints {
    #[serde(rename = "maxWidth", default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    #[serde(rename = "maxHeight", default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<f64>,
    #[serde(rename = "gridSize", default, skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<u32>,
    #[serde(rename = "snapToGrid", default, skip_serializing_if = "Option::is_none")]
    pub snap_to_grid: Option<bool>,
}

/// Page layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LayoutConfig {
    #[serde(rename = "type")]
    pub layout_type: LayoutType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<LayoutConstraints>,
}

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Page-wide styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GlobalStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(rename = "customCSS", default, skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,
}

/// State bookkeeping carried alongside the component tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMetadata {
    /// Highest event version folded into this state; never decreases
    pub version: u64,
    /// Creation time, ms since epoch
    pub created: i64,
    /// Timestamp of the last applied event, ms since epoch
    pub modified: i64,
    pub title: String,
}

/// Complete editor state, rebuilt wholesale on every replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    #[serde(rename = "pageId")]
    pub page_id: String,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentNode>,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(rename = "globalStyles", default)]
    pub global_styles: GlobalStyles,
    #[serde(
        rename = "selectedComponentId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_id: Option<String>,
    pub metadata: StateMetadata,
}

impl UiState {
    /// Number of live components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Look up a component by id
    pub fn component(&self, id: &str) -> Option<&ComponentNode> {
        self.components.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::initial_state;

    #[test]
    fn test_state_serialization_names() {
        let mut state = initial_state();
        state.selected_id = Some("btn-1".to_string());

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"pageId\":\"main-page\""));
        assert!(json.contains("\"globalStyles\""));
        assert!(json.contains("\"selectedComponentId\":\"btn-1\""));
        assert!(json.contains("\"snapToGrid\":false"));

        let parsed: UiState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_layout_type_wire_names() {
        assert_eq!(serde_json::to_string(&LayoutType::Free).unwrap(), "\"free\"");
        assert_eq!(
            serde_json::from_str::<LayoutType>("\"flex\"").unwrap(),
            LayoutType::Flex
        );
    }
}

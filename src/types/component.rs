//! Component tree node types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canvas position in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Component dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A node in the component tree
///
/// `parent_id` and the parent's `children` list are kept bidirectionally
/// consistent by the reducer; `children` preserves insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default)]
    pub styles: Map<String, Value>,
    pub position: Position,
    pub size: Size,
    #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    pub visible: bool,
    pub locked: bool,
    #[serde(rename = "zIndex")]
    pub z_index: u32,
}

impl ComponentNode {
    /// Create a leaf node with default flags and no parent linkage
    pub fn new(id: String, component_type: String, position: Position, size: Size) -> Self {
        Self {
            id,
            component_type,
            props: Map::new(),
            styles: Map::new(),
            position,
            size,
            parent_id: None,
            children: Vec::new(),
            visible: true,
            locked: false,
            z_index: 0,
        }
    }
}

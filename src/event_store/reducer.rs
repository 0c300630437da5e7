//! Pure state reducer
//!
//! `apply` folds a single event into a new state value and `replay`
//! reconstructs state from an event list. Neither ever mutates its input:
//! the previous state is cloned and the clone is edited, so references to
//! older states stay valid across applies.
//!
//! All failure modes here are non-fatal. An event targeting a missing
//! component is logged and skipped; a create referencing a missing parent
//! still creates the node, just without the child link.

use serde_json::{Map, Value};
use tracing::warn;

use crate::types::{
    ComponentCreatedPayload, ComponentDeletedPayload, ComponentMovedPayload, ComponentNode,
    ComponentUpdatedPayload, EventPayload, LayoutConfig, LayoutConstraints, LayoutType,
    PropertyChangedPayload, StateMetadata, StyleUpdatedPayload, Theme, UiEvent, UiState,
};
use crate::utils::current_timestamp_ms;

/// The canonical empty editor state
pub fn initial_state() -> UiState {
    let now = current_timestamp_ms();
    UiState {
        page_id: "main-page".to_string(),
        components: Default::default(),
        layout: LayoutConfig {
            layout_type: LayoutType::Free,
            constraints: Some(LayoutConstraints {
                max_width: None,
                max_height: None,
                grid_size: Some(10),
                snap_to_grid: Some(false),
            }),
        },
        global_styles: crate::types::GlobalStyles {
            theme: Some(Theme::Light),
            custom_css: None,
            variables: None,
        },
        selected_id: None,
        metadata: StateMetadata {
            version: 0,
            created: now,
            modified: now,
            title: "Untitled Page".to_string(),
        },
    }
}

/// Apply a single event, producing a new state
///
/// The input state is never touched. After the payload-specific change,
/// `metadata.version` is max-merged with the event version (which keeps
/// replay idempotent regardless of the starting snapshot) and
/// `metadata.modified` takes the event timestamp.
pub fn apply(state: &UiState, event: &UiEvent) -> UiState {
    let mut next = state.clone();

    match &event.payload {
        EventPayload::ComponentCreated(p) => apply_component_created(&mut next, p),
        EventPayload::ComponentUpdated(p) => apply_component_updated(&mut next, p),
        EventPayload::ComponentDeleted(p) => apply_component_deleted(&mut next, p),
        EventPayload::ComponentMoved(p) => apply_component_moved(&mut next, p),
        EventPayload::PropertyChanged(p) => apply_property_changed(&mut next, p),
        EventPayload::StyleUpdated(p) => apply_style_updated(&mut next, p),
    }

    if let Some(meta) = &event.metadata {
        next.metadata.version = next.metadata.version.max(meta.version);
    }
    next.metadata.modified = event.timestamp;

    next
}

/// Rebuild state by folding events left-to-right
///
/// Events are sorted by timestamp ascending with a stable sort, so ties
/// keep their log order and the result is deterministic.
pub fn replay(events: &[UiEvent], initial: Option<UiState>) -> UiState {
    let mut sorted: Vec<&UiEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    let mut state = initial.unwrap_or_else(initial_state);
    for event in sorted {
        state = apply(&state, event);
    }
    state
}

fn apply_component_created(state: &mut UiState, p: &ComponentCreatedPayload) {
    let node = ComponentNode {
        id: p.component_id.clone(),
        component_type: p.component_type.clone(),
        props: p.initial_props.clone(),
        styles: p.initial_styles.clone(),
        position: p.position,
        size: p.size,
        parent_id: p.parent_id.clone(),
        children: Vec::new(),
        visible: true,
        locked: false,
        z_index: state.components.len() as u32 + 1,
    };
    state.components.insert(p.component_id.clone(), node);

    if let Some(parent_id) = &p.parent_id {
        match state.components.get_mut(parent_id) {
            Some(parent) => {
                // Idempotent: a replayed create must not duplicate the link.
                if !parent.children.contains(&p.component_id) {
                    parent.children.push(p.component_id.clone());
                }
            }
            None => {
                warn!(
                    component_id = %p.component_id,
                    parent_id = %parent_id,
                    "parent not found, creating component as orphan"
                );
            }
        }
    }
}

fn apply_component_updated(state: &mut UiState, p: &ComponentUpdatedPayload) {
    let Some(node) = state.components.get_mut(&p.component_id) else {
        warn!(component_id = %p.component_id, "component not found for update");
        return;
    };

    if let Some(position) = p.updates.position {
        node.position = position;
    }
    if let Some(size) = p.updates.size {
        node.size = size;
    }
    if let Some(props) = &p.updates.props {
        for (key, value) in props {
            node.props.insert(key.clone(), value.clone());
        }
    }
    if let Some(styles) = &p.updates.styles {
        for (key, value) in styles {
            node.styles.insert(key.clone(), value.clone());
        }
    }
}

fn apply_component_deleted(state: &mut UiState, p: &ComponentDeletedPayload) {
    if !state.components.contains_key(&p.component_id) {
        warn!(component_id = %p.component_id, "component not found for delete");
        return;
    }

    let mut deleted = Vec::new();
    delete_subtree(state, &p.component_id, &mut deleted);

    if let Some(parent_id) = &p.parent_id {
        if let Some(parent) = state.components.get_mut(parent_id) {
            parent.children.retain(|child| child != &p.component_id);
        }
    }

    if let Some(selected) = &state.selected_id {
        if deleted.iter().any(|id| id == selected) {
            state.selected_id = None;
        }
    }
}

/// Depth-first removal: children go before their parent
fn delete_subtree(state: &mut UiState, id: &str, deleted: &mut Vec<String>) {
    let children = match state.components.get(id) {
        Some(node) => node.children.clone(),
        None => return,
    };
    for child in children {
        delete_subtree(state, &child, deleted);
    }
    state.components.remove(id);
    deleted.push(id.to_string());
}

fn apply_component_moved(state: &mut UiState, p: &ComponentMovedPayload) {
    if !state.components.contains_key(&p.component_id) {
        warn!(component_id = %p.component_id, "component not found for move");
        return;
    }

    // Position update and reparenting happen in the same apply pass.
    if let Some(node) = state.components.get_mut(&p.component_id) {
        node.position = p.new_position;
    }

    if p.old_parent_id != p.new_parent_id {
        if let Some(old_parent_id) = &p.old_parent_id {
            if let Some(old_parent) = state.components.get_mut(old_parent_id) {
                old_parent.children.retain(|child| child != &p.component_id);
            }
        }

        if let Some(new_parent_id) = &p.new_parent_id {
            if let Some(new_parent) = state.components.get_mut(new_parent_id) {
                if !new_parent.children.contains(&p.component_id) {
                    new_parent.children.push(p.component_id.clone());
                }
            }
        }

        if let Some(node) = state.components.get_mut(&p.component_id) {
            node.parent_id = p.new_parent_id.clone();
        }
    }
}

fn apply_property_changed(state: &mut UiState, p: &PropertyChangedPayload) {
    let Some(node) = state.components.get(&p.component_id) else {
        warn!(component_id = %p.component_id, "component not found for property change");
        return;
    };

    // Dotted paths address the wire shape of the node (`position.x`,
    // `props.label`), so the write goes through a JSON value round trip.
    // A path whose first segment is not a node field is routed into
    // `props`, so ad hoc keys like `label` persist instead of being
    // dropped by the typed decode.
    let mut value = match serde_json::to_value(node) {
        Ok(value) => value,
        Err(e) => {
            warn!(component_id = %p.component_id, error = %e, "failed to project component");
            return;
        }
    };
    let first = p.property_path.split('.').next().unwrap_or("");
    let path = if is_node_field(first) {
        p.property_path.clone()
    } else {
        format!("props.{}", p.property_path)
    };
    set_value_path(&mut value, &path, p.new_value.clone());

    match serde_json::from_value::<ComponentNode>(value) {
        Ok(updated) => {
            state.components.insert(p.component_id.clone(), updated);
        }
        Err(e) => {
            warn!(
                component_id = %p.component_id,
                path = %p.property_path,
                error = %e,
                "property change produced an invalid component, skipping"
            );
        }
    }
}

fn apply_style_updated(state: &mut UiState, p: &StyleUpdatedPayload) {
    let Some(node) = state.components.get_mut(&p.component_id) else {
        warn!(component_id = %p.component_id, "component not found for style update");
        return;
    };
    node.styles
        .insert(p.style_property.clone(), p.new_value.clone());
}

/// Wire-level fields of a component node
fn is_node_field(segment: &str) -> bool {
    matches!(
        segment,
        "id" | "type"
            | "props"
            | "styles"
            | "position"
            | "size"
            | "parentId"
            | "children"
            | "visible"
            | "locked"
            | "zIndex"
    )
}

/// Set `new_value` at a dotted `path` within a JSON object tree
///
/// Missing or non-object intermediates are replaced with fresh objects.
fn set_value_path(root: &mut Value, path: &str, new_value: Value) {
    let mut current = root;
    let segments: Vec<&str> = path.split('.').collect();

    for (i, segment) in segments.iter().enumerate() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Some(map) = current.as_object_mut() else {
            return;
        };

        if i == segments.len() - 1 {
            map.insert((*segment).to_string(), new_value);
            return;
        }
        current = map
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

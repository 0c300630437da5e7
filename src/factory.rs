//! Event construction
//!
//! The engine never builds events itself; callers use an `EventFactory`
//! to stamp each action with an id, timestamp, user/session identity, and
//! a monotonically increasing version. The version sequence is an explicit
//! `VersionClock` instance rather than process-global state, so separate
//! editing sessions and tests never share a counter.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::types::{
    ComponentCreatedPayload, ComponentDeletedPayload, ComponentMovedPayload,
    ComponentUpdatedPayload, ComponentUpdates, EventMeta, EventPayload, EventSource, Position,
    PropertyChangedPayload, Size, StyleUpdatedPayload, UiEvent,
};
use crate::utils::{current_timestamp_ms, get_current_user};

/// Monotonic version sequence for one editing session
#[derive(Debug, Clone)]
pub struct VersionClock {
    next: u64,
}

impl VersionClock {
    /// Start at version 1
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Resume from a known version, e.g. after importing a log
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Take the next version
    pub fn next(&mut self) -> u64 {
        let version = self.next;
        self.next += 1;
        version
    }

    /// Last version handed out (0 before the first `next`)
    pub fn current(&self) -> u64 {
        self.next.saturating_sub(1)
    }
}

impl Default for VersionClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds events for a single user session
#[derive(Debug)]
pub struct EventFactory {
    user_id: String,
    session_id: String,
    clock: VersionClock,
}

impl EventFactory {
    /// New factory with a fresh session id and version sequence
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::with_session(user_id, Uuid::new_v4().to_string(), VersionClock::new())
    }

    /// Fully explicit constructor, mainly for tests and session resume
    pub fn with_session(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        clock: VersionClock,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            clock,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Last version assigned by this factory
    pub fn current_version(&self) -> u64 {
        self.clock.current()
    }

    fn event(&mut self, payload: EventPayload) -> UiEvent {
        UiEvent {
            id: Uuid::new_v4().to_string(),
            payload,
            timestamp: current_timestamp_ms(),
            user_id: self.user_id.clone(),
            session_id: self.session_id.clone(),
            metadata: Some(EventMeta {
                version: self.clock.next(),
                source: EventSource::User,
                description: None,
            }),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn component_created(
        &mut self,
        component_id: impl Into<String>,
        component_type: impl Into<String>,
        position: Position,
        size: Size,
        initial_props: Map<String, Value>,
        initial_styles: Map<String, Value>,
        parent_id: Option<String>,
    ) -> UiEvent {
        self.event(EventPayload::ComponentCreated(ComponentCreatedPayload {
            component_id: component_id.into(),
            component_type: component_type.into(),
            parent_id,
            position,
            size,
            initial_props,
            initial_styles,
        }))
    }

    pub fn component_updated(
        &mut self,
        component_id: impl Into<String>,
        updates: ComponentUpdates,
    ) -> UiEvent {
        self.event(EventPayload::ComponentUpdated(ComponentUpdatedPayload {
            component_id: component_id.into(),
            updates,
        }))
    }

    pub fn component_deleted(
        &mut self,
        component_id: impl Into<String>,
        parent_id: Option<String>,
    ) -> UiEvent {
        self.event(EventPayload::ComponentDeleted(ComponentDeletedPayload {
            component_id: component_id.into(),
            parent_id,
        }))
    }

    pub fn component_moved(
        &mut self,
        component_id: impl Into<String>,
        old_position: Position,
        new_position: Position,
        old_parent_id: Option<String>,
        new_parent_id: Option<String>,
    ) -> UiEvent {
        self.event(EventPayload::ComponentMoved(ComponentMovedPayload {
            component_id: component_id.into(),
            old_position,
            new_position,
            old_parent_id,
            new_parent_id,
        }))
    }

    pub fn property_changed(
        &mut self,
        component_id: impl Into<String>,
        property_path: impl Into<String>,
        old_value: Value,
        new_value: Value,
    ) -> UiEvent {
        self.event(EventPayload::PropertyChanged(PropertyChangedPayload {
            component_id: component_id.into(),
            property_path: property_path.into(),
            old_value,
            new_value,
        }))
    }

    pub fn style_updated(
        &mut self,
        component_id: impl Into<String>,
        style_property: impl Into<String>,
        old_value: Value,
        new_value: Value,
    ) -> UiEvent {
        self.event(EventPayload::StyleUpdated(StyleUpdatedPayload {
            component_id: component_id.into(),
            style_property: style_property.into(),
            old_value,
            new_value,
        }))
    }
}

impl Default for EventFactory {
    /// Factory for the user detected from git config or the environment
    fn default() -> Self {
        Self::new(get_current_user())
    }
}

//! Data types for the canvas store
//!
//! This module contains the core data structures: events, component tree
//! nodes, the full editor state, snapshots, and the export contract.

mod component;
mod event;
mod export;
mod snapshot;
mod state;

pub use component::{ComponentNode, Position, Size};
pub use event::{
    ComponentCreatedPayload, ComponentDeletedPayload, ComponentMovedPayload,
    ComponentUpdatedPayload, ComponentUpdates, EventMeta, EventPayload, EventSource,
    PropertyChangedPayload, StyleUpdatedPayload, UiEvent,
};
pub use export::{ExportData, ExportMeta, EXPORT_FORMAT_VERSION};
pub use snapshot::Snapshot;
pub use state::{
    GlobalStyles, LayoutConfig, LayoutConstraints, LayoutType, StateMetadata, Theme, UiState,
};

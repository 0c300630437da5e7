//! # Canvas Store
//!
//! Event-sourced state engine for a visual component editor.
//!
//! Every edit is an immutable event appended to an ordered log; the
//! canvas state is never mutated directly but derived by folding the log
//! through a pure reducer. On top of the log sit:
//!
//! - **History**: a cursor over the applied prefix giving linear
//!   undo/redo and time-travel by version or timestamp
//! - **Snapshots**: periodic checkpoints that bound replay cost and
//!   survive export/import
//! - **Subscriptions**: synchronous listeners for state and history
//!   changes
//!
//! ## Example
//!
//! ```
//! use canvas_store::{EventFactory, Position, Size, UiEventStore};
//! use serde_json::Map;
//!
//! let mut factory = EventFactory::new("alice");
//! let mut store = UiEventStore::new();
//!
//! store.add_event(factory.component_created(
//!     "btn-1",
//!     "Button",
//!     Position::new(10.0, 20.0),
//!     Size::new(120.0, 40.0),
//!     Map::new(),
//!     Map::new(),
//!     None,
//! ));
//!
//! assert_eq!(store.current_state().component_count(), 1);
//! assert!(store.undo().is_some());
//! assert_eq!(store.current_state().component_count(), 0);
//! ```

pub mod error;
pub mod event_store;
pub mod factory;
pub mod types;
pub mod utils;

pub use error::{StoreError, StoreResult};
pub use event_store::{
    HistoryStatus, StoreConfig, StoreStats, SubscriptionId, UiEventStore,
};
pub use factory::{EventFactory, VersionClock};
pub use types::{
    ComponentNode, EventPayload, ExportData, Position, Size, Snapshot, UiEvent, UiState,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

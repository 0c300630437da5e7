//! Event store module
//!
//! The core event sourcing infrastructure:
//! - `UiEventStore`: owns the log, derived state, and subscriptions
//! - `HistoryLog`: undo/redo cursor over the applied event prefix
//! - `SnapshotManager`: checkpoint creation, pruning, and selection
//! - `reducer`: pure fold of events into `UiState`
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌────────┐    ┌─────────────┐    ┌──────────────────┐    ┌────────────┐
//! │ UiEvent│───►│ append to   │───►│ rebuild state    │───►│ checkpoint │
//! │        │    │ history log │    │ (snapshot+replay)│    │ every 50   │
//! └────────┘    └─────────────┘    └──────────────────┘    └────────────┘
//!
//! Undo / Redo / Time Travel:
//! ┌──────────────┐    ┌───────────────────┐
//! │ move cursor  │───►│ replay applied    │───► notify subscribers
//! │ over the log │    │ prefix from best  │
//! └──────────────┘    │ snapshot          │
//!                     └───────────────────┘
//! ```

mod history;
mod reducer;
mod snapshot;
mod stats;
mod store;

pub use history::{HistoryLog, HistoryStatus};
pub use reducer::{apply, initial_state, replay};
pub use snapshot::SnapshotManager;
pub use stats::{StoreStats, TimeSpan};
pub use store::{StoreConfig, SubscriptionId, UiEventStore};

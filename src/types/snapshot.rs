//! Snapshot type
//!
//! A snapshot is a checkpointed deep copy of `UiState` at a known version.
//! It exists purely to bound replay cost; restoring always goes through the
//! history log, never through the snapshot state directly.

use serde::{Deserialize, Serialize};

use super::state::UiState;

/// A point-in-time copy of the editor state
///
/// The embedded state is owned outright; `UiState` contains no shared
/// pointers, so a snapshot can never alias the live state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unique snapshot id (uuid)
    pub id: String,
    /// Version at which the snapshot was taken
    pub version: u64,
    /// Creation time, ms since epoch
    pub timestamp: i64,
    pub state: UiState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

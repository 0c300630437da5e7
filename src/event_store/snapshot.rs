//! Snapshot manager
//!
//! Creates, prunes, selects, and validates checkpoints of editor state.
//! Snapshots bound replay cost: reconstruction starts from the best
//! checkpoint at or below the target version and folds only the events
//! after it.

use tracing::warn;
use uuid::Uuid;

use crate::types::{Snapshot, UiState};
use crate::utils::current_timestamp_ms;

use super::StoreConfig;

/// Checkpoint policy and bookkeeping
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    interval: usize,
    max_snapshots: usize,
}

impl SnapshotManager {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            interval: config.snapshot_interval,
            max_snapshots: config.max_snapshots,
        }
    }

    /// True every `interval` events (never for an empty log)
    pub fn should_snapshot(&self, event_count: usize) -> bool {
        self.interval > 0 && event_count > 0 && event_count % self.interval == 0
    }

    /// Checkpoint `state` at `version`
    ///
    /// The state is cloned field by field into the snapshot; nothing in it
    /// aliases the live state.
    pub fn create(&self, state: &UiState, version: u64, description: Option<String>) -> Snapshot {
        Snapshot {
            id: Uuid::new_v4().to_string(),
            version,
            timestamp: current_timestamp_ms(),
            state: state.clone(),
            description: Some(
                description.unwrap_or_else(|| format!("Auto snapshot at version {}", version)),
            ),
        }
    }

    /// Keep only the `max_snapshots` highest-version snapshots
    pub fn prune(&self, mut snapshots: Vec<Snapshot>) -> Vec<Snapshot> {
        if snapshots.len() <= self.max_snapshots {
            return snapshots;
        }
        snapshots.sort_by(|a, b| b.version.cmp(&a.version));
        snapshots.truncate(self.max_snapshots);
        snapshots
    }

    /// Highest-version snapshot with `version <= target_version`
    pub fn select_best<'a>(
        &self,
        snapshots: &'a [Snapshot],
        target_version: u64,
    ) -> Option<&'a Snapshot> {
        snapshots
            .iter()
            .filter(|s| s.version <= target_version)
            .max_by_key(|s| s.version)
    }

    /// Structural check applied to imported snapshot data
    pub fn validate(&self, snapshot: &Snapshot) -> bool {
        let valid = !snapshot.id.is_empty()
            && snapshot.timestamp > 0
            && !snapshot.state.page_id.is_empty();
        if !valid {
            warn!(snapshot_id = %snapshot.id, "snapshot failed validation");
        }
        valid
    }

    /// Rough memory footprint of a snapshot in bytes
    ///
    /// Serialization failure counts as zero rather than aborting the
    /// caller's aggregation.
    pub fn estimate_size(&self, snapshot: &Snapshot) -> usize {
        match serde_json::to_string(snapshot) {
            Ok(json) => json.len(),
            Err(e) => {
                warn!(snapshot_id = %snapshot.id, error = %e, "failed to estimate snapshot size");
                0
            }
        }
    }
}

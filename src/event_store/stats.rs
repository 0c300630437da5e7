//! Store statistics
//!
//! Aggregated counters over the event log and snapshot list, cheap enough
//! to compute on demand for a diagnostics panel.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{Snapshot, UiState};

use super::history::HistoryLog;
use super::snapshot::SnapshotManager;

/// First/last event timestamps in the retained log, ms since epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSpan {
    pub start: i64,
    pub end: i64,
}

/// Aggregated counters for the whole store
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    /// Retained events, including any redo tail
    pub total_events: usize,
    /// Cursor position as an applied-event count
    pub current_position: usize,
    pub events_by_type: BTreeMap<String, usize>,
    pub events_by_user: BTreeMap<String, usize>,
    /// Serialized size of the retained log in bytes
    pub estimated_log_size: usize,
    pub time_span: Option<TimeSpan>,
    pub total_snapshots: usize,
    /// Serialized size of all snapshots in bytes
    pub total_snapshot_size: usize,
    /// Components in the current state
    pub component_count: usize,
}

pub(crate) fn collect(
    history: &HistoryLog,
    snapshots: &[Snapshot],
    manager: &SnapshotManager,
    state: &UiState,
) -> StoreStats {
    let events = history.all_events();

    let mut events_by_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut events_by_user: BTreeMap<String, usize> = BTreeMap::new();
    let mut estimated_log_size = 0;

    for event in events {
        *events_by_type
            .entry(event.payload.type_name().to_string())
            .or_insert(0) += 1;
        *events_by_user.entry(event.user_id.clone()).or_insert(0) += 1;
        // A failed encode just contributes nothing to the size estimate.
        estimated_log_size += event.to_json().map(|json| json.len()).unwrap_or(0);
    }

    let time_span = match (events.first(), events.last()) {
        (Some(first), Some(last)) => Some(TimeSpan {
            start: first.timestamp,
            end: last.timestamp,
        }),
        _ => None,
    };

    StoreStats {
        total_events: events.len(),
        current_position: history.current_events().len(),
        events_by_type,
        events_by_user,
        estimated_log_size,
        time_span,
        total_snapshots: snapshots.len(),
        total_snapshot_size: snapshots.iter().map(|s| manager.estimate_size(s)).sum(),
        component_count: state.component_count(),
    }
}

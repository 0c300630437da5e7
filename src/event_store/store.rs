//! Store orchestrator
//!
//! `UiEventStore` composes the history log, the snapshot manager, and the
//! reducer. It owns the authoritative cached state: every mutation goes
//! through the log, state is rebuilt by replaying from the best snapshot,
//! and both subscriber sets are notified afterwards (state first, then
//! history).
//!
//! The store is single-writer by design. No operation blocks or suspends;
//! embedding in a multi-threaded host requires funneling calls through one
//! exclusive-access boundary.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{ExportData, ExportMeta, Snapshot, UiEvent, UiState, EXPORT_FORMAT_VERSION};

use super::history::{HistoryLog, HistoryStatus};
use super::reducer;
use super::snapshot::SnapshotManager;
use super::stats::{self, StoreStats};

/// Retention and checkpoint limits for a store instance
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum events retained in the log; older entries evict from the front
    pub max_history_size: usize,
    /// Auto-checkpoint every N appended events; 0 disables auto snapshots
    pub snapshot_interval: usize,
    /// Maximum snapshots kept; lowest versions are pruned first
    pub max_snapshots: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_history_size: 1000,
            snapshot_interval: 50,
            max_snapshots: 10,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type StateListener = Box<dyn Fn(&UiState)>;
type HistoryListener = Box<dyn Fn(&HistoryStatus)>;

/// Event-sourced store for the editor state
pub struct UiEventStore {
    config: StoreConfig,
    history: HistoryLog,
    snapshot_manager: SnapshotManager,
    snapshots: Vec<Snapshot>,
    /// Session-stable empty state; keeps `metadata.created` fixed across rebuilds
    base_state: UiState,
    current_state: UiState,
    state_listeners: Vec<(SubscriptionId, StateListener)>,
    history_listeners: Vec<(SubscriptionId, HistoryListener)>,
    next_subscription: u64,
}

impl UiEventStore {
    /// Create a store with default limits
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a store with explicit limits
    pub fn with_config(config: StoreConfig) -> Self {
        let base_state = reducer::initial_state();
        Self {
            history: HistoryLog::new(config.max_history_size),
            snapshot_manager: SnapshotManager::new(&config),
            snapshots: Vec::new(),
            current_state: base_state.clone(),
            base_state,
            state_listeners: Vec::new(),
            history_listeners: Vec::new(),
            next_subscription: 0,
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Record an event and publish the resulting state
    ///
    /// Appends (truncating any redo branch, evicting past the history
    /// cap), rebuilds state from the best snapshot, auto-checkpoints on
    /// the snapshot interval, then notifies subscribers.
    pub fn add_event(&mut self, event: UiEvent) -> &UiState {
        // Appending behind the cursor truncates the redo branch; snapshots
        // taken past the cursor embed that branch's effects and would
        // resurrect it during rebuild, so they go with it.
        if self.history.can_redo() {
            let cutoff = self.history.current_version();
            self.snapshots.retain(|s| s.version <= cutoff);
        }
        self.history.append(event);
        self.rebuild_current_state();

        let total_events = self.history.len();
        if self.snapshot_manager.should_snapshot(total_events) {
            self.checkpoint(Some(format!("Auto snapshot at {} events", total_events)));
        }

        self.notify_state_listeners();
        self.notify_history_listeners();
        &self.current_state
    }

    /// Step back one event; `None` if there is nothing to undo
    pub fn undo(&mut self) -> Option<&UiState> {
        let events = self.history.undo()?;
        self.rebuild_from_events(&events);
        self.notify_state_listeners();
        self.notify_history_listeners();
        Some(&self.current_state)
    }

    /// Step forward one event; `None` if there is nothing to redo
    pub fn redo(&mut self) -> Option<&UiState> {
        let events = self.history.redo()?;
        self.rebuild_from_events(&events);
        self.notify_state_listeners();
        self.notify_history_listeners();
        Some(&self.current_state)
    }

    /// Time-travel to the event carrying `version`
    pub fn jump_to_version(&mut self, version: u64) -> Option<&UiState> {
        let events = self.history.jump_to_version(version)?;
        self.rebuild_from_events(&events);
        self.notify_state_listeners();
        self.notify_history_listeners();
        Some(&self.current_state)
    }

    /// Time-travel to the last event at or before `timestamp`
    pub fn jump_to_timestamp(&mut self, timestamp: i64) -> Option<&UiState> {
        let events = self.history.jump_to_timestamp(timestamp)?;
        self.rebuild_from_events(&events);
        self.notify_state_listeners();
        self.notify_history_listeners();
        Some(&self.current_state)
    }

    /// Jump to the version a snapshot marks
    ///
    /// A snapshot is a replay accelerator, never an independent state
    /// source: restoring resolves its version and time-travels there.
    pub fn restore_from_snapshot(&mut self, snapshot_id: &str) -> Option<&UiState> {
        let version = self
            .snapshots
            .iter()
            .find(|s| s.id == snapshot_id)
            .map(|s| s.version)?;
        self.jump_to_version(version)
    }

    /// Manually checkpoint the current state
    pub fn create_snapshot(&mut self, description: Option<String>) -> Snapshot {
        let snapshot = self.checkpoint(description);
        self.notify_history_listeners();
        snapshot
    }

    pub fn current_state(&self) -> &UiState {
        &self.current_state
    }

    pub fn history_state(&self) -> HistoryStatus {
        self.history.status()
    }

    pub fn all_events(&self) -> &[UiEvent] {
        self.history.all_events()
    }

    pub fn all_snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Aggregate counters over the log and snapshot list
    pub fn statistics(&self) -> StoreStats {
        stats::collect(
            &self.history,
            &self.snapshots,
            &self.snapshot_manager,
            &self.current_state,
        )
    }

    /// Full store contents in the stable round-trip shape
    pub fn export_data(&self) -> ExportData {
        ExportData {
            events: self.history.all_events().to_vec(),
            snapshots: self.snapshots.clone(),
            current_state: self.current_state.clone(),
            metadata: ExportMeta {
                export_time: chrono::Utc::now(),
                version: EXPORT_FORMAT_VERSION.to_string(),
            },
        }
    }

    /// Replace the store contents with an exported payload
    ///
    /// All-or-nothing: the event list is staged and fully parsed before
    /// anything is cleared, so a malformed payload returns `false` with
    /// the store untouched. Invalid snapshots are dropped individually
    /// rather than failing the import. Rebuild replays the complete
    /// incoming event list without the snapshot shortcut.
    pub fn import_data(&mut self, data: &Value) -> bool {
        let staged_events: Vec<UiEvent> = match data.get("events") {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => match serde_json::from_value(raw.clone()) {
                Ok(events) => events,
                Err(e) => {
                    warn!(error = %e, "rejecting import: malformed event list");
                    return false;
                }
            },
        };

        let staged_snapshots = match data.get("snapshots") {
            Some(Value::Array(raw)) => {
                let mut kept = Vec::with_capacity(raw.len());
                for entry in raw {
                    match serde_json::from_value::<Snapshot>(entry.clone()) {
                        Ok(snapshot) if self.snapshot_manager.validate(&snapshot) => {
                            kept.push(snapshot)
                        }
                        Ok(snapshot) => {
                            debug!(snapshot_id = %snapshot.id, "dropping invalid imported snapshot")
                        }
                        Err(e) => warn!(error = %e, "dropping unparseable imported snapshot"),
                    }
                }
                kept
            }
            _ => Vec::new(),
        };

        self.reset();
        for event in staged_events {
            self.history.append(event);
        }
        self.snapshots = staged_snapshots;
        // Imports replay the full incoming log rather than trusting the
        // imported snapshots as a starting point.
        self.current_state =
            reducer::replay(self.history.current_events(), Some(self.base_state.clone()));

        self.notify_state_listeners();
        self.notify_history_listeners();
        true
    }

    /// Convenience wrapper over `import_data` for raw JSON text
    pub fn import_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Value>(json) {
            Ok(data) => self.import_data(&data),
            Err(e) => {
                warn!(error = %e, "rejecting import: payload is not valid JSON");
                false
            }
        }
    }

    /// Drop all events, snapshots, and state, then notify
    pub fn clear(&mut self) {
        self.reset();
        self.notify_state_listeners();
        self.notify_history_listeners();
    }

    /// Subscribe to state changes; called synchronously in registration order
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&UiState) + 'static,
    {
        let id = self.next_subscription_id();
        self.state_listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a state subscription; `false` if the id is unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.state_listeners.len();
        self.state_listeners.retain(|(sid, _)| *sid != id);
        self.state_listeners.len() != before
    }

    /// Subscribe to history cursor changes
    pub fn subscribe_history<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&HistoryStatus) + 'static,
    {
        let id = self.next_subscription_id();
        self.history_listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a history subscription; `false` if the id is unknown
    pub fn unsubscribe_history(&mut self, id: SubscriptionId) -> bool {
        let before = self.history_listeners.len();
        self.history_listeners.retain(|(sid, _)| *sid != id);
        self.history_listeners.len() != before
    }

    fn next_subscription_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        id
    }

    fn reset(&mut self) {
        self.history.clear();
        self.snapshots.clear();
        self.base_state = reducer::initial_state();
        self.current_state = self.base_state.clone();
    }

    fn checkpoint(&mut self, description: Option<String>) -> Snapshot {
        let version = self.history.current_version();
        let snapshot = self
            .snapshot_manager
            .create(&self.current_state, version, description);
        self.snapshots.push(snapshot.clone());
        self.snapshots = self.snapshot_manager.prune(std::mem::take(&mut self.snapshots));
        snapshot
    }

    fn rebuild_current_state(&mut self) {
        let events = self.history.current_events().to_vec();
        self.rebuild_from_events(&events);
    }

    /// Rebuild state for the given replay set
    ///
    /// Starts from the best snapshot at or below the replay set length and
    /// folds only the events versioned after it; falls back to a full
    /// replay when no snapshot qualifies.
    fn rebuild_from_events(&mut self, events: &[UiEvent]) {
        let best = self
            .snapshot_manager
            .select_best(&self.snapshots, events.len() as u64);

        self.current_state = match best {
            Some(snapshot) => {
                let after: Vec<UiEvent> = events
                    .iter()
                    .filter(|e| e.version() > snapshot.version)
                    .cloned()
                    .collect();
                debug!(
                    snapshot_version = snapshot.version,
                    replayed = after.len(),
                    "rebuilding from snapshot"
                );
                reducer::replay(&after, Some(snapshot.state.clone()))
            }
            None => reducer::replay(events, Some(self.base_state.clone())),
        };
    }

    fn notify_state_listeners(&self) {
        for (id, listener) in &self.state_listeners {
            // A panicking subscriber must not stop delivery to the rest.
            let result = catch_unwind(AssertUnwindSafe(|| listener(&self.current_state)));
            if result.is_err() {
                warn!(subscription = id.0, "state subscriber panicked");
            }
        }
    }

    fn notify_history_listeners(&self) {
        let status = self.history.status();
        for (id, listener) in &self.history_listeners {
            let result = catch_unwind(AssertUnwindSafe(|| listener(&status)));
            if result.is_err() {
                warn!(subscription = id.0, "history subscriber panicked");
            }
        }
    }
}

impl Default for UiEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{EventFactory, VersionClock};
    use crate::types::{Position, Size};
    use serde_json::{json, Map};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn factory() -> EventFactory {
        EventFactory::with_session("tester", "session-1", VersionClock::new())
    }

    fn create_event(f: &mut EventFactory, id: &str, parent: Option<&str>) -> UiEvent {
        f.component_created(
            id,
            "Button",
            Position::new(0.0, 0.0),
            Size::new(10.0, 10.0),
            Map::new(),
            Map::new(),
            parent.map(|p| p.to_string()),
        )
    }

    #[test]
    fn test_default_config_limits() {
        let config = StoreConfig::default();
        assert_eq!(config.max_history_size, 1000);
        assert_eq!(config.snapshot_interval, 50);
        assert_eq!(config.max_snapshots, 10);
    }

    #[test]
    fn test_add_event_updates_state() {
        let mut f = factory();
        let mut store = UiEventStore::new();

        store.add_event(create_event(&mut f, "a", None));

        assert_eq!(store.current_state().component_count(), 1);
        assert!(store.current_state().component("a").is_some());
        assert_eq!(store.history_state().total_events, 1);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut f = factory();
        let mut store = UiEventStore::new();

        store.add_event(create_event(&mut f, "a", None));
        let after_add = store.add_event(create_event(&mut f, "b", None)).clone();

        let undone = store.undo().unwrap().clone();
        assert_eq!(undone.component_count(), 1);
        assert!(undone.component("b").is_none());

        let redone = store.redo().unwrap().clone();
        assert_eq!(redone, after_add);
    }

    #[test]
    fn test_undo_on_empty_store_returns_none() {
        let mut store = UiEventStore::new();
        assert!(store.undo().is_none());
        assert!(store.redo().is_none());
    }

    #[test]
    fn test_branch_truncation_kills_redo() {
        let mut f = factory();
        let mut store = UiEventStore::new();

        store.add_event(create_event(&mut f, "a", None));
        store.add_event(create_event(&mut f, "b", None));
        store.undo().unwrap();
        store.add_event(create_event(&mut f, "c", None));

        // The pre-undo future is permanently discarded.
        assert!(store.redo().is_none());
        assert!(store.current_state().component("b").is_none());
        assert!(store.current_state().component("c").is_some());
    }

    #[test]
    fn test_branch_truncation_discards_stale_snapshots() {
        let mut f = factory();
        let mut store = UiEventStore::new();

        store.add_event(create_event(&mut f, "a", None));
        store.add_event(create_event(&mut f, "b", None));
        store.add_event(create_event(&mut f, "c", None));
        store.create_snapshot(None); // version 3, embeds b and c

        store.undo().unwrap();
        store.undo().unwrap();
        store.add_event(create_event(&mut f, "d", None));

        // The snapshot covering the discarded branch must not be used to
        // resurrect it.
        assert!(store.all_snapshots().iter().all(|s| s.version <= 2));
        assert_eq!(store.current_state().component_count(), 2);
        assert!(store.current_state().component("b").is_none());
        assert!(store.current_state().component("c").is_none());
        assert!(store.current_state().component("d").is_some());
    }

    #[test]
    fn test_jump_to_version_and_timestamp() {
        let mut f = factory();
        let mut store = UiEventStore::new();

        let mut e1 = create_event(&mut f, "a", None);
        let mut e2 = create_event(&mut f, "b", None);
        let mut e3 = create_event(&mut f, "c", None);
        e1.timestamp = 1_000;
        e2.timestamp = 2_000;
        e3.timestamp = 3_000;
        store.add_event(e1);
        store.add_event(e2);
        store.add_event(e3);

        let state = store.jump_to_version(2).unwrap();
        assert_eq!(state.component_count(), 2);

        let state = store.jump_to_timestamp(1_500).unwrap();
        assert_eq!(state.component_count(), 1);

        assert!(store.jump_to_version(42).is_none());
        assert!(store.jump_to_timestamp(10).is_none());
        // Failed jumps leave the state where it was.
        assert_eq!(store.current_state().component_count(), 1);
    }

    #[test]
    fn test_auto_snapshot_on_interval() {
        let mut f = factory();
        let mut store = UiEventStore::with_config(StoreConfig {
            snapshot_interval: 3,
            ..Default::default()
        });

        for i in 0..6 {
            store.add_event(create_event(&mut f, &format!("c{}", i), None));
        }

        // Under the cap, prune leaves the list in creation order.
        let versions: Vec<u64> = store.all_snapshots().iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![3, 6]);
        assert!(store.all_snapshots()[0]
            .description
            .as_deref()
            .unwrap()
            .contains("Auto snapshot"));
    }

    #[test]
    fn test_snapshot_equivalence() {
        // State rebuilt through a snapshot must equal a cold full replay.
        let mut f = factory();
        let mut store = UiEventStore::with_config(StoreConfig {
            snapshot_interval: 4,
            ..Default::default()
        });

        let mut events = Vec::new();
        for i in 0..10 {
            let event = create_event(&mut f, &format!("c{}", i), None);
            events.push(event.clone());
            store.add_event(event);
        }
        assert!(!store.all_snapshots().is_empty());

        let cold = reducer::replay(&events, None);
        assert_eq!(store.current_state().components, cold.components);
        assert_eq!(
            store.current_state().metadata.version,
            cold.metadata.version
        );
    }

    #[test]
    fn test_manual_snapshot_and_restore() {
        let mut f = factory();
        let mut store = UiEventStore::new();

        store.add_event(create_event(&mut f, "a", None));
        store.add_event(create_event(&mut f, "b", None));
        let snapshot = store.create_snapshot(Some("two components".to_string()));
        store.add_event(create_event(&mut f, "c", None));

        let state = store.restore_from_snapshot(&snapshot.id).unwrap();
        assert_eq!(state.component_count(), 2);
        assert!(state.component("c").is_none());

        assert!(store.restore_from_snapshot("no-such-id").is_none());
    }

    #[test]
    fn test_snapshot_list_is_pruned() {
        let mut f = factory();
        let mut store = UiEventStore::with_config(StoreConfig {
            max_snapshots: 2,
            ..Default::default()
        });

        for i in 0..4 {
            store.add_event(create_event(&mut f, &format!("c{}", i), None));
            store.create_snapshot(None);
        }

        assert_eq!(store.all_snapshots().len(), 2);
        assert_eq!(store.all_snapshots()[0].version, 4);
    }

    #[test]
    fn test_history_cap_keeps_cursor_in_window() {
        let mut f = factory();
        let mut store = UiEventStore::with_config(StoreConfig {
            max_history_size: 5,
            ..Default::default()
        });

        for i in 0..9 {
            store.add_event(create_event(&mut f, &format!("c{}", i), None));
        }

        let status = store.history_state();
        assert_eq!(status.total_events, 5);
        assert_eq!(status.current_version, 5);
        // Only the retained window is replayable.
        assert_eq!(store.current_state().component_count(), 5);
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut f = factory();
        let mut store = UiEventStore::new();
        store.add_event(create_event(&mut f, "a", None));
        store.add_event(create_event(&mut f, "b", Some("a")));
        store.create_snapshot(None);
        store.add_event(f.style_updated("b", "color", serde_json::Value::Null, json!("red")));

        let json = store.export_data().to_json().unwrap();

        let mut restored = UiEventStore::new();
        assert!(restored.import_json(&json));

        assert_eq!(
            restored.current_state().components,
            store.current_state().components
        );
        assert_eq!(restored.all_events().len(), store.all_events().len());
        assert_eq!(restored.all_snapshots().len(), 1);
    }

    #[test]
    fn test_import_malformed_events_leaves_store_untouched() {
        let mut f = factory();
        let mut store = UiEventStore::new();
        store.add_event(create_event(&mut f, "a", None));

        let bad = json!({"events": [{"type": "NOT_A_THING"}]});
        assert!(!store.import_data(&bad));

        assert_eq!(store.all_events().len(), 1);
        assert!(store.current_state().component("a").is_some());
    }

    #[test]
    fn test_import_drops_invalid_snapshots() {
        let mut f = factory();
        let mut source = UiEventStore::new();
        source.add_event(create_event(&mut f, "a", None));
        let good = source.create_snapshot(None);

        let mut payload = serde_json::to_value(source.export_data()).unwrap();
        let mut bad = serde_json::to_value(&good).unwrap();
        bad["id"] = json!("");
        payload["snapshots"]
            .as_array_mut()
            .unwrap()
            .push(bad);
        payload["snapshots"].as_array_mut().unwrap().push(json!("not a snapshot"));

        let mut store = UiEventStore::new();
        assert!(store.import_data(&payload));
        assert_eq!(store.all_snapshots().len(), 1);
        assert_eq!(store.all_snapshots()[0].id, good.id);
    }

    #[test]
    fn test_import_not_json_fails() {
        let mut store = UiEventStore::new();
        assert!(!store.import_json("{ nope"));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut f = factory();
        let mut store = UiEventStore::new();
        store.add_event(create_event(&mut f, "a", None));
        store.create_snapshot(None);

        store.clear();

        assert_eq!(store.all_events().len(), 0);
        assert_eq!(store.all_snapshots().len(), 0);
        assert_eq!(store.current_state().component_count(), 0);
        assert!(!store.history_state().can_undo);
    }

    #[test]
    fn test_subscribers_are_notified_in_order() {
        let mut f = factory();
        let mut store = UiEventStore::new();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&calls);
        store.subscribe(move |_| first.borrow_mut().push("first"));
        let second = Rc::clone(&calls);
        store.subscribe(move |_| second.borrow_mut().push("second"));
        let history = Rc::clone(&calls);
        store.subscribe_history(move |_| history.borrow_mut().push("history"));

        store.add_event(create_event(&mut f, "a", None));

        // State listeners in registration order, history after state.
        assert_eq!(*calls.borrow(), vec!["first", "second", "history"]);
    }

    #[test]
    fn test_failed_operations_do_not_notify() {
        let mut store = UiEventStore::new();
        let calls = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&calls);
        store.subscribe(move |_| *counter.borrow_mut() += 1);

        assert!(store.undo().is_none());
        assert!(store.jump_to_version(1).is_none());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_panicking_subscriber_does_not_stop_delivery() {
        let mut f = factory();
        let mut store = UiEventStore::new();
        let calls = Rc::new(RefCell::new(0));

        store.subscribe(|_| panic!("listener bug"));
        let counter = Rc::clone(&calls);
        store.subscribe(move |_| *counter.borrow_mut() += 1);

        store.add_event(create_event(&mut f, "a", None));

        assert_eq!(*calls.borrow(), 1);
        // Engine state survives the panic.
        assert_eq!(store.current_state().component_count(), 1);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut f = factory();
        let mut store = UiEventStore::new();
        let calls = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&calls);
        let id = store.subscribe(move |_| *counter.borrow_mut() += 1);

        store.add_event(create_event(&mut f, "a", None));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.add_event(create_event(&mut f, "b", None));

        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_statistics_reflect_log() {
        let mut f = factory();
        let mut store = UiEventStore::new();
        store.add_event(create_event(&mut f, "a", None));
        store.add_event(f.style_updated("a", "color", serde_json::Value::Null, json!("red")));
        store.create_snapshot(None);

        let stats = store.statistics();
        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.current_position, 2);
        assert_eq!(stats.events_by_type.get("COMPONENT_CREATED"), Some(&1));
        assert_eq!(stats.total_snapshots, 1);
        assert_eq!(stats.component_count, 1);
    }
}

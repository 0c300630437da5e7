//! Linear history log with a single cursor
//!
//! The log is append-only until an append happens behind the cursor, at
//! which point the abandoned redo branch is discarded: history is strictly
//! linear, never a DAG. The cursor is stored internally as the length of
//! the applied prefix (`0..=len`), which maps onto the external
//! `[-1, len-1]` cursor contract as `applied - 1`.

use serde::Serialize;

use crate::types::{EventPayload, UiEvent};

/// Published view of the history cursor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStatus {
    #[serde(rename = "canUndo")]
    pub can_undo: bool,
    #[serde(rename = "canRedo")]
    pub can_redo: bool,
    /// Number of applied events (cursor + 1)
    #[serde(rename = "currentVersion")]
    pub current_version: u64,
    #[serde(rename = "totalEvents")]
    pub total_events: usize,
    #[serde(rename = "undoDescription", skip_serializing_if = "Option::is_none")]
    pub undo_description: Option<String>,
    #[serde(rename = "redoDescription", skip_serializing_if = "Option::is_none")]
    pub redo_description: Option<String>,
}

/// Append-only event sequence plus undo/redo cursor
#[derive(Debug)]
pub struct HistoryLog {
    events: Vec<UiEvent>,
    /// Length of the applied prefix; `events[..applied]` is current
    applied: usize,
    max_size: usize,
}

impl HistoryLog {
    /// Create an empty log bounded to `max_size` retained events
    pub fn new(max_size: usize) -> Self {
        Self {
            events: Vec::new(),
            applied: 0,
            max_size,
        }
    }

    /// Append a new event at the cursor
    ///
    /// Everything after the cursor is discarded first (branch truncation),
    /// then the retained window is capped by evicting oldest events.
    pub fn append(&mut self, event: UiEvent) {
        if self.applied < self.events.len() {
            self.events.truncate(self.applied);
        }
        self.events.push(event);
        self.applied = self.events.len();
        self.prune();
    }

    /// Step the cursor back; `None` when already at the beginning
    pub fn undo(&mut self) -> Option<Vec<UiEvent>> {
        if !self.can_undo() {
            return None;
        }
        self.applied -= 1;
        Some(self.current_events().to_vec())
    }

    /// Step the cursor forward; `None` when already at the end
    pub fn redo(&mut self) -> Option<Vec<UiEvent>> {
        if !self.can_redo() {
            return None;
        }
        self.applied += 1;
        Some(self.current_events().to_vec())
    }

    /// Move the cursor onto the event carrying `version`
    ///
    /// Events without metadata carry no version and never match.
    pub fn jump_to_version(&mut self, version: u64) -> Option<Vec<UiEvent>> {
        let index = self
            .events
            .iter()
            .position(|e| e.metadata.as_ref().map(|m| m.version) == Some(version))?;
        self.applied = index + 1;
        Some(self.current_events().to_vec())
    }

    /// Move the cursor onto the last event with `timestamp <= t`
    pub fn jump_to_timestamp(&mut self, timestamp: i64) -> Option<Vec<UiEvent>> {
        let mut target: Option<usize> = None;
        for (i, event) in self.events.iter().enumerate() {
            if event.timestamp <= timestamp {
                target = Some(i);
            } else {
                break;
            }
        }
        self.applied = target? + 1;
        Some(self.current_events().to_vec())
    }

    /// The authoritative replay set: events up to and including the cursor
    pub fn current_events(&self) -> &[UiEvent] {
        &self.events[..self.applied]
    }

    /// Every retained event, including any redo tail
    pub fn all_events(&self) -> &[UiEvent] {
        &self.events
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.events.len()
    }

    /// External cursor in `[-1, len - 1]`
    pub fn cursor(&self) -> isize {
        self.applied as isize - 1
    }

    /// Applied prefix length, used as the version of new snapshots
    pub fn current_version(&self) -> u64 {
        self.applied as u64
    }

    /// Number of retained events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Reset to empty with the cursor at the initial position
    pub fn clear(&mut self) {
        self.events.clear();
        self.applied = 0;
    }

    /// Cursor state plus undo/redo previews for UI consumption
    pub fn status(&self) -> HistoryStatus {
        let undo_description = self
            .can_undo()
            .then(|| describe_event(&self.events[self.applied - 1]));
        let redo_description = self
            .can_redo()
            .then(|| describe_event(&self.events[self.applied]));

        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            current_version: self.current_version(),
            total_events: self.events.len(),
            undo_description,
            redo_description,
        }
    }

    fn prune(&mut self) {
        if self.events.len() <= self.max_size {
            return;
        }
        let excess = self.events.len() - self.max_size;
        self.events.drain(..excess);
        self.applied = self.applied.saturating_sub(excess);
    }
}

/// Human-readable action label for undo/redo previews
fn describe_event(event: &UiEvent) -> String {
    match &event.payload {
        EventPayload::ComponentCreated(p) => format!("Create {} component", p.component_type),
        EventPayload::ComponentUpdated(_) => "Update component".to_string(),
        EventPayload::ComponentDeleted(_) => "Delete component".to_string(),
        EventPayload::ComponentMoved(_) => "Move component".to_string(),
        EventPayload::PropertyChanged(p) => format!("Change property: {}", p.property_path),
        EventPayload::StyleUpdated(p) => format!("Update style: {}", p.style_property),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{EventFactory, VersionClock};
    use crate::types::{Position, Size};
    use serde_json::Map;

    fn factory() -> EventFactory {
        EventFactory::with_session("tester", "session-1", VersionClock::new())
    }

    fn create_event(factory: &mut EventFactory, id: &str) -> UiEvent {
        factory.component_created(
            id,
            "Button",
            Position::new(0.0, 0.0),
            Size::new(10.0, 10.0),
            Map::new(),
            Map::new(),
            None,
        )
    }

    fn filled_log(factory: &mut EventFactory, n: usize, max: usize) -> HistoryLog {
        let mut log = HistoryLog::new(max);
        for i in 0..n {
            log.append(create_event(factory, &format!("c{}", i)));
        }
        log
    }

    #[test]
    fn test_append_advances_cursor() {
        let mut f = factory();
        let log = filled_log(&mut f, 3, 100);

        assert_eq!(log.len(), 3);
        assert_eq!(log.cursor(), 2);
        assert_eq!(log.current_events().len(), 3);
        assert!(log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn test_undo_redo_move_cursor() {
        let mut f = factory();
        let mut log = filled_log(&mut f, 3, 100);

        let events = log.undo().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(log.cursor(), 1);
        assert!(log.can_redo());

        let events = log.redo().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(log.cursor(), 2);
    }

    #[test]
    fn test_undo_at_start_and_redo_at_end_fail() {
        let mut f = factory();
        let mut log = filled_log(&mut f, 1, 100);

        assert!(log.undo().is_some());
        assert!(log.undo().is_none(), "cursor already at -1");
        assert_eq!(log.cursor(), -1);

        assert!(log.redo().is_some());
        assert!(log.redo().is_none(), "cursor already at the end");
    }

    #[test]
    fn test_append_after_undo_truncates_branch() {
        let mut f = factory();
        let mut log = filled_log(&mut f, 3, 100);

        log.undo().unwrap();
        log.undo().unwrap();
        log.append(create_event(&mut f, "new"));

        // The two undone events are gone for good.
        assert_eq!(log.len(), 2);
        assert!(!log.can_redo());
        assert!(log.redo().is_none());
        assert_eq!(log.all_events()[1].version(), 4);
    }

    #[test]
    fn test_jump_to_version() {
        let mut f = factory();
        let mut log = filled_log(&mut f, 5, 100);

        let events = log.jump_to_version(2).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(log.cursor(), 1);

        assert!(log.jump_to_version(99).is_none());
        // Failed jump leaves the cursor in place.
        assert_eq!(log.cursor(), 1);
    }

    #[test]
    fn test_jump_to_version_skips_metadata_less_events() {
        let mut f = factory();
        let mut log = HistoryLog::new(100);
        let mut event = create_event(&mut f, "a");
        event.metadata = None;
        log.append(event);

        // An absent version is not version 0.
        assert!(log.jump_to_version(0).is_none());
        assert_eq!(log.cursor(), 0);
    }

    #[test]
    fn test_jump_to_timestamp_picks_last_at_or_before() {
        let mut f = factory();
        let mut log = HistoryLog::new(100);
        for (i, ts) in [1_000_i64, 2_000, 3_000].iter().enumerate() {
            let mut event = create_event(&mut f, &format!("c{}", i));
            event.timestamp = *ts;
            log.append(event);
        }

        let events = log.jump_to_timestamp(2_500).unwrap();
        assert_eq!(events.len(), 2);

        let events = log.jump_to_timestamp(3_000).unwrap();
        assert_eq!(events.len(), 3);

        assert!(log.jump_to_timestamp(500).is_none());
    }

    #[test]
    fn test_history_cap_evicts_oldest() {
        let mut f = factory();
        let log = filled_log(&mut f, 12, 10);

        assert_eq!(log.len(), 10);
        assert_eq!(log.cursor(), 9);
        assert_eq!(log.current_events().len(), 10);
        // Oldest two evicted: first retained event is the third created.
        assert_eq!(log.all_events()[0].version(), 3);
    }

    #[test]
    fn test_status_descriptions() {
        let mut f = factory();
        let mut log = HistoryLog::new(100);
        log.append(create_event(&mut f, "a"));
        log.append(f.style_updated("a", "color", serde_json::Value::Null, serde_json::json!("red")));

        let status = log.status();
        assert!(status.can_undo);
        assert!(!status.can_redo);
        assert_eq!(status.current_version, 2);
        assert_eq!(status.undo_description.as_deref(), Some("Update style: color"));
        assert_eq!(status.redo_description, None);

        log.undo().unwrap();
        let status = log.status();
        assert_eq!(status.undo_description.as_deref(), Some("Create Button component"));
        assert_eq!(status.redo_description.as_deref(), Some("Update style: color"));
    }

    #[test]
    fn test_clear_resets_cursor() {
        let mut f = factory();
        let mut log = filled_log(&mut f, 4, 100);
        log.clear();

        assert!(log.is_empty());
        assert_eq!(log.cursor(), -1);
        assert!(!log.can_undo());
        assert!(!log.can_redo());
    }
}

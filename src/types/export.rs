//! Export/import round-trip contract
//!
//! This is the stable JSON shape handed to the persistence transport. The
//! engine itself performs no I/O; it only produces and consumes this value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

use super::event::UiEvent;
use super::snapshot::Snapshot;
use super::state::UiState;

/// Version string stamped into every export
pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// Metadata block of an export payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMeta {
    #[serde(rename = "exportTime")]
    pub export_time: DateTime<Utc>,
    pub version: String,
}

/// Complete exported store contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    #[serde(default)]
    pub events: Vec<UiEvent>,
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
    #[serde(rename = "currentState")]
    pub current_state: UiState,
    pub metadata: ExportMeta,
}

impl ExportData {
    /// Serialize to a JSON string
    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Strict parse of a well-formed export payload
    ///
    /// Rejects payloads from an incompatible format major version.
    /// Import through the store (`UiEventStore::import_json`) is more
    /// lenient: it drops invalid snapshots instead of failing outright.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let data: Self = serde_json::from_str(json)?;

        let major = data.metadata.version.split('.').next().unwrap_or("");
        let expected = EXPORT_FORMAT_VERSION.split('.').next().unwrap_or("");
        if major != expected {
            return Err(StoreError::InvalidImport(format!(
                "unsupported format version {}",
                data.metadata.version
            )));
        }

        Ok(data)
    }
}

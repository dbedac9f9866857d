//! Storage health probe.

use serde::Serialize;
use tracing::warn;

use crate::store::{EventStore, StorageBackend};

/// Scratch key written and removed by the writability probe.
pub const PROBE_KEY: &str = "eventhub_probe";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// A scratch value could be written and removed.
    pub storage_writable: bool,
    /// The event container is absent or parses as an event list.
    pub event_data_valid: bool,
    pub event_count: usize,
    /// Human-readable reasons for each failed check.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub problems: Vec<String>,
}

impl HealthReport {
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        self.storage_writable && self.event_data_valid
    }
}

/// Probe the backend and the event container.
#[must_use]
pub fn check<B: StorageBackend>(store: &EventStore<B>) -> HealthReport {
    let mut problems = Vec::new();

    let backend = store.backend();
    let storage_writable = match backend
        .write(PROBE_KEY, "probe")
        .and_then(|()| backend.delete(PROBE_KEY))
    {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "storage probe failed");
            problems.push(format!("storage: {err}"));
            false
        }
    };

    let (event_data_valid, event_count) = match store.try_load_all() {
        Ok(events) => (true, events.len()),
        Err(err) => {
            warn!(error = %err, "event data check failed");
            problems.push(format!("events: {err}"));
            (false, 0)
        }
    };

    HealthReport {
        storage_writable,
        event_data_valid,
        event_count,
        problems,
    }
}

//! Capacity-checked registration.
//!
//! The lookup, the duplicate and capacity checks, and the write all happen in
//! one store write cycle against a freshly loaded list, so two registrations
//! racing for the last seat cannot both succeed.

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::model::EventStatus;
use crate::store::{EventStore, Mutation, StorageBackend};

/// Result of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "code")]
pub enum RegistrationOutcome {
    Registered,
    AlreadyRegistered,
    Full,
    NotFound,
    /// The event exists but is not active.
    Closed,
    /// The registrant identifier was empty.
    InvalidRegistrant,
    /// Storage could not be read or the write was rejected; nothing changed.
    PersistFailure(ErrorCode),
}

impl RegistrationOutcome {
    #[must_use]
    pub const fn is_registered(self) -> bool {
        matches!(self, Self::Registered)
    }

    /// Error code for every outcome other than [`RegistrationOutcome::Registered`].
    #[must_use]
    pub const fn code(self) -> Option<ErrorCode> {
        match self {
            Self::Registered => None,
            Self::AlreadyRegistered => Some(ErrorCode::AlreadyRegistered),
            Self::Full => Some(ErrorCode::EventFull),
            Self::NotFound => Some(ErrorCode::EventNotFound),
            Self::Closed => Some(ErrorCode::EventClosed),
            Self::InvalidRegistrant => Some(ErrorCode::InvalidRegistrant),
            Self::PersistFailure(code) => Some(code),
        }
    }

    /// User-facing sentence for this outcome.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Registered => "Registration successful",
            Self::AlreadyRegistered => "You are already registered for this event",
            Self::Full => "Sorry, this event is full",
            Self::NotFound => "Event not found",
            Self::Closed => "This event is not open for registration",
            Self::InvalidRegistrant => "A registrant identifier is required",
            Self::PersistFailure(_) => "Registration failed. Please try again.",
        }
    }
}

impl fmt::Display for RegistrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Register `registrant` for the event with `event_id`.
///
/// Checks run in order: not found, already registered, closed, full. Only a
/// [`RegistrationOutcome::Registered`] result changes storage.
pub fn register<B: StorageBackend>(
    store: &EventStore<B>,
    event_id: &str,
    registrant: &str,
) -> RegistrationOutcome {
    let registrant = registrant.trim();
    if registrant.is_empty() {
        return RegistrationOutcome::InvalidRegistrant;
    }

    let result = store.update(event_id, |event| {
        if event.is_registered(registrant) {
            return Mutation::Discard(RegistrationOutcome::AlreadyRegistered);
        }
        if event.status != EventStatus::Active {
            return Mutation::Discard(RegistrationOutcome::Closed);
        }
        if event.is_full() {
            return Mutation::Discard(RegistrationOutcome::Full);
        }

        event.registrations.push(registrant.to_string());
        event.attendees += 1;
        Mutation::Commit(RegistrationOutcome::Registered)
    });

    match result {
        Ok(Some(outcome)) => {
            if outcome.is_registered() {
                info!(event_id, registrant, "registered");
            }
            outcome
        }
        Ok(None) => RegistrationOutcome::NotFound,
        Err(err) => {
            warn!(event_id, registrant, error = %err, "registration not persisted");
            RegistrationOutcome::PersistFailure(err.code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileBackend, MemoryBackend};
    use crate::test_support::sample_event;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn store_with(events: &[crate::model::Event]) -> EventStore<MemoryBackend> {
        let store = EventStore::new(MemoryBackend::new());
        store.replace_all(events).unwrap();
        store
    }

    #[test]
    fn capacity_scenario() {
        let mut e1 = sample_event("E1", 2);
        e1.registrations = vec!["a@x.com".into()];
        e1.attendees = 1;
        let store = store_with(&[e1]);

        assert_eq!(register(&store, "E1", "b@x.com"), RegistrationOutcome::Registered);
        assert_eq!(store.find_by_id("E1").unwrap().attendees, 2);

        assert_eq!(register(&store, "E1", "c@x.com"), RegistrationOutcome::Full);
        assert_eq!(store.find_by_id("E1").unwrap().attendees, 2);

        assert_eq!(
            register(&store, "E1", "a@x.com"),
            RegistrationOutcome::AlreadyRegistered
        );
        let e1 = store.find_by_id("E1").unwrap();
        assert!(e1.invariants_hold());
        assert_eq!(e1.registrations, vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn registering_twice_counts_once() {
        let store = store_with(&[sample_event("e1", 10)]);
        assert_eq!(register(&store, "e1", "a@x.com"), RegistrationOutcome::Registered);
        assert_eq!(
            register(&store, "e1", "a@x.com"),
            RegistrationOutcome::AlreadyRegistered
        );
        assert_eq!(store.find_by_id("e1").unwrap().attendees, 1);
    }

    #[test]
    fn unknown_event_is_not_found() {
        let store = store_with(&[sample_event("e1", 10)]);
        assert_eq!(register(&store, "e2", "a@x.com"), RegistrationOutcome::NotFound);

        let empty = EventStore::new(MemoryBackend::new());
        assert_eq!(register(&empty, "e1", "a@x.com"), RegistrationOutcome::NotFound);
    }

    #[test]
    fn full_event_is_not_mutated() {
        let mut event = sample_event("e1", 1);
        event.registrations = vec!["a@x.com".into()];
        event.attendees = 1;
        let store = store_with(&[event.clone()]);
        let before = store.backend().raw(store.key());

        assert_eq!(register(&store, "e1", "b@x.com"), RegistrationOutcome::Full);
        assert_eq!(store.backend().raw(store.key()), before);
    }

    #[test]
    fn inactive_events_are_closed() {
        let mut event = sample_event("e1", 10);
        event.status = EventStatus::Cancelled;
        let store = store_with(&[event]);
        assert_eq!(register(&store, "e1", "a@x.com"), RegistrationOutcome::Closed);
        assert_eq!(store.find_by_id("e1").unwrap().attendees, 0);
    }

    #[test]
    fn blank_registrant_is_rejected() {
        let store = store_with(&[sample_event("e1", 10)]);
        assert_eq!(register(&store, "e1", "   "), RegistrationOutcome::InvalidRegistrant);
    }

    #[test]
    fn registrant_is_trimmed() {
        let store = store_with(&[sample_event("e1", 10)]);
        assert!(register(&store, "e1", " a@x.com ").is_registered());
        assert_eq!(
            register(&store, "e1", "a@x.com"),
            RegistrationOutcome::AlreadyRegistered
        );
    }

    #[test]
    fn persist_failure_leaves_event_unregistered() {
        let store = store_with(&[sample_event("e1", 10)]);
        store.backend().set_read_only(true);

        let outcome = register(&store, "e1", "a@x.com");
        assert_eq!(
            outcome,
            RegistrationOutcome::PersistFailure(ErrorCode::StorageUnavailable)
        );
        let event = store.find_by_id("e1").unwrap();
        assert_eq!(event.attendees, 0);
        assert!(!event.is_registered("a@x.com"));
    }

    #[test]
    fn outcome_codes_and_messages() {
        assert!(RegistrationOutcome::Registered.code().is_none());
        assert_eq!(RegistrationOutcome::Full.code(), Some(ErrorCode::EventFull));
        assert_eq!(RegistrationOutcome::Full.to_string(), "Sorry, this event is full");
        let json = serde_json::to_value(RegistrationOutcome::AlreadyRegistered).unwrap();
        assert_eq!(json["outcome"], "already_registered");
    }

    #[test]
    fn concurrent_registrations_never_overbook() {
        let store = Arc::new(store_with(&[sample_event("e1", 5)]));
        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || register(&store, "e1", &format!("user{i}@x.com")))
            })
            .collect();

        let registered = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|o| o.is_registered())
            .count();

        assert_eq!(registered, 5);
        let event = store.find_by_id("e1").unwrap();
        assert_eq!(event.attendees, 5);
        assert!(event.invariants_hold());
    }

    #[test]
    fn separate_file_handles_serialize_through_the_lock_file() {
        let tmp = TempDir::new().expect("tempdir");
        let dir = tmp.path().join(".eventhub");
        EventStore::new(FileBackend::new(&dir))
            .replace_all(&[sample_event("e1", 3)])
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let dir = dir.clone();
                thread::spawn(move || {
                    let store = EventStore::new(FileBackend::new(dir));
                    register(&store, "e1", &format!("user{i}@x.com"))
                })
            })
            .collect();

        let registered = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|o| o.is_registered())
            .count();

        assert_eq!(registered, 3);
        let event = EventStore::new(FileBackend::new(&dir)).find_by_id("e1").unwrap();
        assert_eq!(event.attendees, 3);
        assert!(event.invariants_hold());
    }
}

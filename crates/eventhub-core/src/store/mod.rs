//! The event store: one named container holding the full event list.
//!
//! Every mutation is a whole-list read-modify-write. Writers are serialized by
//! an in-process mutex and, for backends that provide one, a cross-process
//! advisory lock held for the whole cycle. Readers take no lock; backends
//! replace the container atomically.
//!
//! Reads degrade: a missing or unparseable container loads as an empty list.
//! Writes never overwrite a container that fails to parse.

pub mod backend;

use std::io;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::lock::LockError;
use crate::model::Event;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};

/// Storage key of the event container.
pub const DEFAULT_EVENTS_KEY: &str = "eventhub_events";

/// Errors surfaced at the store boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be read or rejected a write.
    #[error("storage unavailable: {0}")]
    Io(#[from] io::Error),

    /// The write would exceed the backend's size quota.
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    /// The writer lock could not be taken.
    #[error("lock error: {0}")]
    Lock(#[from] LockError),

    /// The persisted container is not a valid event list.
    #[error("malformed event data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A record handed to the store breaks the seat-count invariants.
    #[error(
        "event '{id}' is inconsistent: {attendees} attendees, {registrations} registrations, {max_seats} seats"
    )]
    Inconsistent {
        id: String,
        attendees: u32,
        registrations: usize,
        max_seats: u32,
    },

    /// The event list could not be encoded for writing.
    #[error("failed to encode events: {0}")]
    Encode(serde_json::Error),
}

impl StoreError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) | Self::QuotaExceeded { .. } | Self::Encode(_) => {
                ErrorCode::StorageUnavailable
            }
            Self::Lock(err) => err.code(),
            Self::Malformed(_) => ErrorCode::MalformedData,
            Self::Inconsistent { .. } => ErrorCode::ValidationFailed,
        }
    }
}

/// What a write-cycle closure wants done with the list it was handed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation<T> {
    /// Persist the list and return the value.
    Commit(T),
    /// Leave storage untouched and return the value.
    Discard(T),
}

/// Authoritative owner of the persisted event list.
///
/// Callers only ever receive owned snapshots; changes go back through
/// [`EventStore::upsert`], [`EventStore::remove`] or a write cycle.
#[derive(Debug)]
pub struct EventStore<B: StorageBackend> {
    backend: B,
    key: String,
    writer: Mutex<()>,
}

impl<B: StorageBackend> EventStore<B> {
    /// Open the store over `backend` using [`DEFAULT_EVENTS_KEY`].
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, DEFAULT_EVENTS_KEY)
    }

    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            writer: Mutex::new(()),
        }
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the full list, surfacing storage and parse failures.
    ///
    /// Records whose attendee count disagrees with their registrant set are
    /// normalized on the way out.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the backend cannot be read, or
    /// [`StoreError::Malformed`] if the container is not a valid event list.
    pub fn try_load_all(&self) -> Result<Vec<Event>, StoreError> {
        let Some(raw) = self.backend.read(&self.key)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut events: Vec<Event> = serde_json::from_str(&raw)?;
        for event in &mut events {
            let attendees = event.attendees;
            if event.normalize() {
                warn!(
                    event_id = %event.id,
                    stored_attendees = attendees,
                    registrations = event.registrations.len(),
                    "normalized inconsistent attendee count"
                );
            }
        }
        Ok(events)
    }

    /// Load the full list; an absent or unreadable container is empty.
    #[must_use]
    pub fn load_all(&self) -> Vec<Event> {
        self.try_load_all().unwrap_or_else(|err| {
            warn!(key = %self.key, error = %err, "failed to load events; treating store as empty");
            Vec::new()
        })
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<Event> {
        self.load_all().into_iter().find(|event| event.id == id)
    }

    /// Replace the record with the same id, or append it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Inconsistent`] if `event` has duplicate
    /// registrants, an attendee count that differs from its registrations, or
    /// more attendees than seats. Otherwise the [`StoreError`] that prevented
    /// the write. Storage is left unchanged on every error.
    pub fn upsert(&self, event: &Event) -> Result<(), StoreError> {
        ensure_consistent(event)?;
        self.modify_all(|events| {
            match events.iter_mut().find(|e| e.id == event.id) {
                Some(existing) => *existing = event.clone(),
                None => events.push(event.clone()),
            }
            Mutation::Commit(())
        })
    }

    /// Delete the record with `id`. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns the [`StoreError`] that prevented the write.
    pub fn remove(&self, id: &str) -> Result<bool, StoreError> {
        self.modify_all(|events| {
            let before = events.len();
            events.retain(|event| event.id != id);
            if events.len() == before {
                Mutation::Discard(false)
            } else {
                Mutation::Commit(true)
            }
        })
    }

    /// Overwrite the whole container with `events`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Inconsistent`] for the first record that breaks
    /// the seat-count invariants, or the [`StoreError`] that prevented the
    /// write.
    pub fn replace_all(&self, events: &[Event]) -> Result<(), StoreError> {
        events.iter().try_for_each(ensure_consistent)?;
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _lock = self.backend.lock(&self.key)?;
        self.persist(events)
    }

    /// Run `f` against the record with `id` inside one write cycle.
    ///
    /// Returns `Ok(None)` if no record has that id; nothing is written then.
    ///
    /// # Errors
    ///
    /// Returns the [`StoreError`] that prevented loading or persisting.
    pub fn update<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Event) -> Mutation<T>,
    ) -> Result<Option<T>, StoreError> {
        self.modify_all(|events| match events.iter_mut().find(|e| e.id == id) {
            Some(event) => match f(event) {
                Mutation::Commit(value) => Mutation::Commit(Some(value)),
                Mutation::Discard(value) => Mutation::Discard(Some(value)),
            },
            None => Mutation::Discard(None),
        })
    }

    /// Run `f` against the full list inside one write cycle.
    ///
    /// The list is loaded fresh while holding the writer lock. A container
    /// that fails to parse is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns the [`StoreError`] that prevented loading or persisting.
    pub fn modify_all<T>(
        &self,
        f: impl FnOnce(&mut Vec<Event>) -> Mutation<T>,
    ) -> Result<T, StoreError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _lock = self.backend.lock(&self.key)?;

        let mut events = self.try_load_all()?;
        match f(&mut events) {
            Mutation::Commit(value) => {
                self.persist(&events)?;
                Ok(value)
            }
            Mutation::Discard(value) => Ok(value),
        }
    }

    fn persist(&self, events: &[Event]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(events).map_err(StoreError::Encode)?;
        self.backend.write(&self.key, &raw)?;
        debug!(key = %self.key, count = events.len(), bytes = raw.len(), "persisted events");
        Ok(())
    }
}

fn ensure_consistent(event: &Event) -> Result<(), StoreError> {
    if event.invariants_hold() {
        return Ok(());
    }
    Err(StoreError::Inconsistent {
        id: event.id.clone(),
        attendees: event.attendees,
        registrations: event.registrations.len(),
        max_seats: event.max_seats,
    })
}

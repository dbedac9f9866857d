//! Administrative status changes and deletion.
//!
//! Moderation never touches `registrations` or `attendees`; it only moves an
//! event through its lifecycle and records who reviewed it.

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::info;

use crate::error::ErrorCode;
use crate::model::{Event, EventStatus, InvalidTransition};
use crate::session::{Role, Session};
use crate::store::{EventStore, Mutation, StorageBackend, StoreError};

/// A lifecycle change requested by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Approve,
    Reject,
    Cancel,
    Complete,
    Reinstate,
}

impl Action {
    #[must_use]
    pub const fn target(self) -> EventStatus {
        match self {
            Self::Approve | Self::Reinstate => EventStatus::Active,
            Self::Reject => EventStatus::Rejected,
            Self::Cancel => EventStatus::Cancelled,
            Self::Complete => EventStatus::Completed,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
            Self::Reinstate => "reinstate",
        }
    }

    /// Admins may do anything; organizers may cancel their own events.
    fn permitted(self, session: &Session, event: &Event) -> bool {
        session.is_admin() || (matches!(self, Self::Cancel) && session.owns(event))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("event '{0}' not found")]
    NotFound(String),

    #[error("role '{role}' may not {action} event '{event_id}'")]
    PermissionDenied {
        action: &'static str,
        role: Role,
        event_id: String,
    },

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ModerationError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::EventNotFound,
            Self::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            Self::InvalidTransition(_) => ErrorCode::InvalidTransition,
            Self::Store(err) => err.code(),
        }
    }
}

/// Apply `action` to the event with `id` and return the updated record.
///
/// # Errors
///
/// Returns [`ModerationError::NotFound`], [`ModerationError::PermissionDenied`],
/// [`ModerationError::InvalidTransition`], or the store error that prevented
/// the write. Storage is unchanged on every error.
pub fn apply<B: StorageBackend>(
    store: &EventStore<B>,
    session: &Session,
    id: &str,
    action: Action,
    now: DateTime<Utc>,
) -> Result<Event, ModerationError> {
    let outcome = store.update(id, |event| {
        if !action.permitted(session, event) {
            return Mutation::Discard(Err(ModerationError::PermissionDenied {
                action: action.as_str(),
                role: session.role,
                event_id: event.id.clone(),
            }));
        }
        if let Err(err) = event.status.can_transition_to(action.target()) {
            return Mutation::Discard(Err(err.into()));
        }

        let from = event.status;
        event.status = action.target();
        event.reviewed_at = Some(now);
        event.reviewed_by = Some(session.name.clone());
        info!(event_id = %event.id, %from, to = %event.status, reviewer = %session.id, "event {action}");
        Mutation::Commit(Ok(event.clone()))
    })?;

    outcome.unwrap_or_else(|| Err(ModerationError::NotFound(id.to_string())))
}

/// `pending -> active`.
///
/// # Errors
///
/// See [`apply`].
pub fn approve<B: StorageBackend>(
    store: &EventStore<B>,
    session: &Session,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Event, ModerationError> {
    apply(store, session, id, Action::Approve, now)
}

/// `pending -> rejected`.
///
/// # Errors
///
/// See [`apply`].
pub fn reject<B: StorageBackend>(
    store: &EventStore<B>,
    session: &Session,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Event, ModerationError> {
    apply(store, session, id, Action::Reject, now)
}

/// `active -> cancelled`.
///
/// # Errors
///
/// See [`apply`].
pub fn cancel<B: StorageBackend>(
    store: &EventStore<B>,
    session: &Session,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Event, ModerationError> {
    apply(store, session, id, Action::Cancel, now)
}

/// `active -> completed`.
///
/// # Errors
///
/// See [`apply`].
pub fn complete<B: StorageBackend>(
    store: &EventStore<B>,
    session: &Session,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Event, ModerationError> {
    apply(store, session, id, Action::Complete, now)
}

/// `cancelled -> active`.
///
/// # Errors
///
/// See [`apply`].
pub fn reinstate<B: StorageBackend>(
    store: &EventStore<B>,
    session: &Session,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Event, ModerationError> {
    apply(store, session, id, Action::Reinstate, now)
}

/// Approve every pending event in one write. Returns how many changed.
///
/// # Errors
///
/// Returns [`ModerationError::PermissionDenied`] for non-admin sessions, or
/// the store error that prevented the write.
pub fn bulk_approve<B: StorageBackend>(
    store: &EventStore<B>,
    session: &Session,
    now: DateTime<Utc>,
) -> Result<usize, ModerationError> {
    if !session.is_admin() {
        return Err(ModerationError::PermissionDenied {
            action: "bulk approve",
            role: session.role,
            event_id: "*".to_string(),
        });
    }

    let approved = store.modify_all(|events| {
        let mut count = 0;
        for event in events.iter_mut().filter(|e| e.status == EventStatus::Pending) {
            event.status = EventStatus::Active;
            event.reviewed_at = Some(now);
            event.reviewed_by = Some(session.name.clone());
            count += 1;
        }
        if count == 0 {
            Mutation::Discard(0)
        } else {
            Mutation::Commit(count)
        }
    })?;

    info!(count = approved, reviewer = %session.id, "bulk approved pending events");
    Ok(approved)
}

/// Permanently remove an event. Allowed for admins and the event's organizer.
///
/// Returns the removed record.
///
/// # Errors
///
/// Returns [`ModerationError::NotFound`], [`ModerationError::PermissionDenied`],
/// or the store error that prevented the write.
pub fn delete_event<B: StorageBackend>(
    store: &EventStore<B>,
    session: &Session,
    id: &str,
) -> Result<Event, ModerationError> {
    let removed = store.modify_all(|events| {
        let Some(pos) = events.iter().position(|e| e.id == id) else {
            return Mutation::Discard(Err(ModerationError::NotFound(id.to_string())));
        };
        if !(session.is_admin() || session.owns(&events[pos])) {
            return Mutation::Discard(Err(ModerationError::PermissionDenied {
                action: "delete",
                role: session.role,
                event_id: id.to_string(),
            }));
        }
        Mutation::Commit(Ok(events.remove(pos)))
    })??;

    info!(event_id = %removed.id, by = %session.id, "deleted event");
    Ok(removed)
}

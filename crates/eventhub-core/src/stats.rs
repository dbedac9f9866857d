//! Dashboard summaries derived from a snapshot.

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Event, EventStatus};

/// Counts shown to a registrant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistrantStats {
    pub registered: usize,
    /// Registered events dated before `as_of` that were not cancelled.
    pub attended: usize,
    /// Registered events dated on or after `as_of` that were not cancelled.
    pub upcoming: usize,
}

/// Counts shown to an organizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrganizerStats {
    pub organized: usize,
    /// Sum of attendees across the organizer's events.
    pub total_registrations: u64,
}

/// Event totals by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub rejected: usize,
    pub cancelled: usize,
    pub completed: usize,
}

#[must_use]
pub fn registrant_stats(events: &[Event], registrant: &str, as_of: NaiveDate) -> RegistrantStats {
    events
        .iter()
        .filter(|e| e.is_registered(registrant))
        .fold(RegistrantStats::default(), |mut stats, event| {
            stats.registered += 1;
            if event.status != EventStatus::Cancelled {
                if event.date < as_of {
                    stats.attended += 1;
                } else {
                    stats.upcoming += 1;
                }
            }
            stats
        })
}

#[must_use]
pub fn organizer_stats(events: &[Event], organizer_id: &str) -> OrganizerStats {
    events
        .iter()
        .filter(|e| e.organizer_id == organizer_id)
        .fold(OrganizerStats::default(), |mut stats, event| {
            stats.organized += 1;
            stats.total_registrations += u64::from(event.attendees);
            stats
        })
}

#[must_use]
pub fn admin_stats(events: &[Event]) -> AdminStats {
    let mut stats = AdminStats {
        total: events.len(),
        ..AdminStats::default()
    };
    for event in events {
        match event.status {
            EventStatus::Active => stats.active += 1,
            EventStatus::Pending => stats.pending += 1,
            EventStatus::Rejected => stats.rejected += 1,
            EventStatus::Cancelled => stats.cancelled += 1,
            EventStatus::Completed => stats.completed += 1,
        }
    }
    stats
}

//! Pure derivations over an event snapshot.
//!
//! Nothing here touches storage: callers load a snapshot with
//! [`EventStore::load_all`](crate::store::EventStore::load_all) and filter it.
//! Every function returns owned clones in snapshot order.

use chrono::NaiveDate;

use crate::model::{Event, EventStatus};

/// Category value that disables category filtering in [`search`].
pub const ALL_CATEGORIES: &str = "all";

/// Active events on or after `as_of`.
#[must_use]
pub fn active_upcoming(events: &[Event], as_of: NaiveDate) -> Vec<Event> {
    events
        .iter()
        .filter(|e| e.status == EventStatus::Active && e.date >= as_of)
        .cloned()
        .collect()
}

/// Events whose `organizer_id` equals `organizer_id` exactly.
#[must_use]
pub fn by_organizer(events: &[Event], organizer_id: &str) -> Vec<Event> {
    events
        .iter()
        .filter(|e| e.organizer_id == organizer_id)
        .cloned()
        .collect()
}

/// Case-insensitive text search intersected with an exact category match.
///
/// The term matches title, description, venue or organizer name. A blank term
/// matches everything; a category of [`ALL_CATEGORIES`] matches every category.
#[must_use]
pub fn search(events: &[Event], term: &str, category: &str) -> Vec<Event> {
    let needle = term.trim().to_lowercase();
    events
        .iter()
        .filter(|e| matches_term(e, &needle) && matches_category(e, category))
        .cloned()
        .collect()
}

/// Events `registrant` is registered for.
#[must_use]
pub fn registered_by(events: &[Event], registrant: &str) -> Vec<Event> {
    events
        .iter()
        .filter(|e| e.is_registered(registrant))
        .cloned()
        .collect()
}

/// Remaining capacity; never negative.
#[must_use]
pub const fn seats_left(event: &Event) -> u32 {
    event.seats_left()
}

/// Order events by date, then start time, then id.
pub fn sort_by_schedule(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.start_time.cmp(&b.start_time))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn matches_term(event: &Event, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        event.title.as_str(),
        event.description.as_str(),
        event.venue.as_str(),
        event.organizer.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

fn matches_category(event: &Event, category: &str) -> bool {
    category == ALL_CATEGORIES || event.category == category
}

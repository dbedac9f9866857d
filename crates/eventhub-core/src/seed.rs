//! Sample events for an empty store.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use tracing::info;

use crate::id::generate_event_id;
use crate::model::{Event, EventStatus};
use crate::store::{EventStore, Mutation, StorageBackend, StoreError};

struct Sample {
    title: &'static str,
    description: &'static str,
    days_ahead: u64,
    start: (u32, u32),
    venue: &'static str,
    category: &'static str,
    max_seats: u32,
    organizer: &'static str,
    organizer_id: &'static str,
}

const SAMPLES: [Sample; 3] = [
    Sample {
        title: "Tech Innovation Summit",
        description: "Join industry leaders for a day of cutting-edge technology presentations, \
                      networking, and innovation showcase. Discover the latest trends in AI, \
                      blockchain, and software development.",
        days_ahead: 1,
        start: (10, 0),
        venue: "Main Auditorium, Tech Campus",
        category: "Technology",
        max_seats: 150,
        organizer: "Tech Society",
        organizer_id: "org_tech_001",
    },
    Sample {
        title: "Annual Cultural Festival",
        description: "Experience a vibrant celebration of diverse cultures with music, dance, \
                      food, and art from around the world. A perfect event for the entire \
                      community to come together.",
        days_ahead: 7,
        start: (18, 0),
        venue: "College Grounds",
        category: "Cultural",
        max_seats: 500,
        organizer: "Cultural Committee",
        organizer_id: "org_cultural_001",
    },
    Sample {
        title: "Career Development Workshop",
        description: "Learn essential career skills including resume writing, interview \
                      techniques, and professional networking. Perfect for students and recent \
                      graduates looking to advance their careers.",
        days_ahead: 30,
        start: (14, 0),
        venue: "Conference Hall B",
        category: "Career",
        max_seats: 80,
        organizer: "Career Services",
        organizer_id: "org_career_001",
    },
];

/// Build the sample events relative to `now`.
#[must_use]
pub fn sample_events(now: DateTime<Utc>) -> Vec<Event> {
    let today = now.date_naive();
    SAMPLES
        .iter()
        .map(|s| Event {
            id: generate_event_id(now),
            title: s.title.to_string(),
            description: s.description.to_string(),
            date: offset(today, s.days_ahead),
            start_time: NaiveTime::from_hms_opt(s.start.0, s.start.1, 0).unwrap_or_default(),
            end_time: None,
            venue: s.venue.to_string(),
            category: s.category.to_string(),
            max_seats: s.max_seats,
            organizer: s.organizer.to_string(),
            organizer_id: s.organizer_id.to_string(),
            created_at: now,
            status: EventStatus::Active,
            attendees: 0,
            registrations: Vec::new(),
            image: None,
            reviewed_at: None,
            reviewed_by: None,
        })
        .collect()
}

fn offset(today: NaiveDate, days: u64) -> NaiveDate {
    today.checked_add_days(Days::new(days)).unwrap_or(today)
}

/// Write the sample events if the store holds none. Returns how many were
/// written; a store that already has events is left alone.
///
/// # Errors
///
/// Returns the store error that prevented loading or writing.
pub fn seed_sample_events<B: StorageBackend>(
    store: &EventStore<B>,
    now: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let written = store.modify_all(|events| {
        if !events.is_empty() {
            return Mutation::Discard(0);
        }
        *events = sample_events(now);
        Mutation::Commit(events.len())
    })?;

    if written > 0 {
        info!(count = written, "seeded sample events");
    }
    Ok(written)
}

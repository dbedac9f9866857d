use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

use crate::model::{Event, EventStatus};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

/// An active, empty event on 2026-11-20 at 10:00 with `max_seats` capacity.
pub fn sample_event(id: &str, max_seats: u32) -> Event {
    Event {
        id: id.to_string(),
        title: format!("Event {id}"),
        description: "A sample event used across unit tests.".to_string(),
        date: date(2026, 11, 20),
        start_time: NaiveTime::from_hms_opt(10, 0, 0).expect("valid test time"),
        end_time: None,
        venue: "Main Auditorium".to_string(),
        category: "Technology".to_string(),
        max_seats,
        organizer: "Tech Society".to_string(),
        organizer_id: "org_tech_001".to_string(),
        created_at: Utc
            .with_ymd_and_hms(2026, 10, 1, 9, 0, 0)
            .single()
            .expect("valid test timestamp"),
        status: EventStatus::Active,
        attendees: 0,
        registrations: Vec::new(),
        image: None,
        reviewed_at: None,
        reviewed_by: None,
    }
}

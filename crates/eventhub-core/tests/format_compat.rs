//! Containers written by earlier versions of the site must keep loading.
//!
//! `tests/fixtures/legacy_events.json` is a golden container holding the
//! legacy shapes: the single `time` field, the `approved` status, string seat
//! counts, attendee counts that disagree with the registrant list, and
//! duplicate registrants. It is never modified.

use std::fs;
use std::path::PathBuf;

use eventhub_core::model::EventStatus;
use eventhub_core::store::{DEFAULT_EVENTS_KEY, EventStore, FileBackend};
use eventhub_core::{RegistrationOutcome, register};
use tempfile::TempDir;

fn fixture() -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/legacy_events.json");
    fs::read_to_string(path).expect("fixture must exist")
}

fn legacy_store(tmp: &TempDir) -> EventStore<FileBackend> {
    let backend = FileBackend::new(tmp.path().join(".eventhub"));
    fs::create_dir_all(backend.dir()).expect("create data dir");
    fs::write(backend.container_path(DEFAULT_EVENTS_KEY), fixture()).expect("write fixture");
    EventStore::new(backend)
}

#[test]
fn legacy_container_loads_completely() {
    let tmp = TempDir::new().expect("tempdir");
    let store = legacy_store(&tmp);

    let events = store.try_load_all().expect("legacy container must parse");
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.invariants_hold()));
}

#[test]
fn legacy_fields_map_to_current_ones() {
    let tmp = TempDir::new().expect("tempdir");
    let events = legacy_store(&tmp).load_all();

    let summit = &events[0];
    assert_eq!(summit.start_time.format("%H:%M").to_string(), "10:00");
    assert_eq!(summit.attendees, 0, "counts follow the registrant list");

    let festival = &events[1];
    assert_eq!(festival.status, EventStatus::Active);
    assert_eq!(festival.max_seats, 500);
    assert_eq!(
        festival.registrations,
        vec!["sarah@college.edu", "mike@college.edu"]
    );
    assert_eq!(festival.reviewed_by.as_deref(), Some("Admin"));

    let workshop = &events[2];
    assert_eq!(workshop.status, EventStatus::Pending);
    assert_eq!(
        workshop.end_time.map(|t| t.format("%H:%M").to_string()),
        Some("16:30".to_string())
    );
    assert_eq!(workshop.image.as_deref(), Some("/images/career.png"));
}

#[test]
fn first_write_rewrites_in_current_shape() {
    let tmp = TempDir::new().expect("tempdir");
    let store = legacy_store(&tmp);

    let outcome = register(&store, "evt_1710320400001_p8d2m1c7z", "ana@college.edu");
    assert_eq!(outcome, RegistrationOutcome::Registered);

    let raw = fs::read_to_string(store.backend().container_path(DEFAULT_EVENTS_KEY))
        .expect("read container");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    let festival = &value[1];
    assert_eq!(festival["status"], "active");
    assert_eq!(festival["maxSeats"], 500);
    assert_eq!(festival["startTime"], "18:00");
    assert!(festival.get("time").is_none());
    assert_eq!(festival["attendees"], 3);
    assert_eq!(festival["registrations"].as_array().map(Vec::len), Some(3));
}

#[test]
fn duplicate_registrant_in_legacy_data_is_already_registered() {
    let tmp = TempDir::new().expect("tempdir");
    let store = legacy_store(&tmp);
    assert_eq!(
        register(&store, "evt_1710320400001_p8d2m1c7z", "sarah@college.edu"),
        RegistrationOutcome::AlreadyRegistered
    );
}

#[test]
fn unknown_fields_are_tolerated() {
    let tmp = TempDir::new().expect("tempdir");
    let store = legacy_store(&tmp);
    let raw = fixture().replacen("\"image\": null", "\"image\": null, \"featured\": true", 1);
    fs::write(store.backend().container_path(DEFAULT_EVENTS_KEY), raw).expect("rewrite");
    assert_eq!(store.try_load_all().expect("parse").len(), 3);
}

#[test]
fn one_bad_record_makes_the_container_malformed() {
    let tmp = TempDir::new().expect("tempdir");
    let store = legacy_store(&tmp);
    let raw = fixture().replacen("\"time\": \"10:00\"", "\"time\": \"ten\"", 1);
    fs::write(store.backend().container_path(DEFAULT_EVENTS_KEY), &raw).expect("rewrite");

    assert!(store.try_load_all().is_err());
    assert!(store.load_all().is_empty());

    // Writes refuse to replace data they could not read.
    let outcome = register(&store, "evt_1710320400001_p8d2m1c7z", "ana@college.edu");
    assert!(matches!(outcome, RegistrationOutcome::PersistFailure(_)));
    let after = fs::read_to_string(store.backend().container_path(DEFAULT_EVENTS_KEY))
        .expect("read container");
    assert_eq!(after, raw);
}

/// Shape written by the plain HTML event form: no registrant list, no
/// organizer, a single `time` field and a pending status.
const PLAIN_FORM_RECORD: &str = r#"{
    "id": "1710400000000abc",
    "title": "Spring Poetry Reading",
    "description": "Open floor for original poems and short prose.",
    "date": "2024-04-12",
    "time": "17:30",
    "venue": "Library Atrium",
    "category": "Cultural",
    "maxSeats": 60,
    "image": "",
    "createdAt": "2024-03-14T07:06:40.000Z",
    "status": "pending",
    "attendees": 0
}"#;

#[test]
fn plain_form_record_loads_beside_full_records() {
    let tmp = TempDir::new().expect("tempdir");
    let store = legacy_store(&tmp);
    let mut container: Vec<serde_json::Value> =
        serde_json::from_str(&fixture()).expect("fixture is a list");
    container.push(serde_json::from_str(PLAIN_FORM_RECORD).expect("record is json"));
    fs::write(
        store.backend().container_path(DEFAULT_EVENTS_KEY),
        serde_json::to_string(&container).expect("encode"),
    )
    .expect("rewrite");

    let events = store.try_load_all().expect("mixed container must parse");
    assert_eq!(events.len(), 4);
    let plain = &events[3];
    assert!(plain.registrations.is_empty());
    assert_eq!(plain.status, EventStatus::Pending);
    assert!(plain.organizer.is_empty());
    assert!(events.iter().all(|e| e.invariants_hold()));

    // Writes for the other records keep working and keep the plain record.
    let outcome = register(&store, "evt_1710320400001_p8d2m1c7z", "ana@college.edu");
    assert_eq!(outcome, RegistrationOutcome::Registered);
    let reloaded = store.load_all();
    assert_eq!(reloaded.len(), 4);
    assert_eq!(reloaded[3].id, "1710400000000abc");
    assert!(reloaded[3].registrations.is_empty());
}

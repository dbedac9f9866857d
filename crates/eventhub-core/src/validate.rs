//! Declarative field validation and event creation.
//!
//! Each form field is described once by a [`FieldRule`]; [`validate_fields`]
//! walks a rule table and collects every violation per field. The event draft
//! table is [`EVENT_RULES`].

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use tracing::info;

use crate::error::ErrorCode;
use crate::id::generate_event_id;
use crate::model::{CATEGORIES, Event, EventStatus, wire};
use crate::session::Session;
use crate::store::{EventStore, StorageBackend, StoreError};

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"));
static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern compiles")
});
static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("digits pattern compiles"));

/// Shape a field value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// `YYYY-MM-DD` naming a real calendar day.
    Date,
    /// 24-hour `H:MM` or `HH:MM`.
    Time,
    Digits,
}

impl Pattern {
    fn matches(self, value: &str) -> bool {
        match self {
            Self::Date => {
                DATE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
            }
            Self::Time => TIME.is_match(value),
            Self::Digits => DIGITS.is_match(value),
        }
    }
}

/// Value-level check applied after length and pattern checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// A date on or after the context's `today`.
    NotPast,
    /// An integer within `min..=max`.
    Range { min: u32, max: u32 },
    /// One of the context's categories.
    Category,
    /// A time strictly after the time in another field.
    After(&'static str),
}

/// Validation rule for one named field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    /// Capitalized name used in generated messages.
    pub label: &'static str,
    pub required: bool,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub pattern: Option<Pattern>,
    pub check: Option<Check>,
    /// Message for pattern and check failures.
    pub message: &'static str,
}

impl FieldRule {
    const fn new(field: &'static str, label: &'static str, message: &'static str) -> Self {
        Self {
            field,
            label,
            required: true,
            min_len: None,
            max_len: None,
            pattern: None,
            check: None,
            message,
        }
    }

    const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    const fn lengths(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_len = min;
        self.max_len = max;
        self
    }

    const fn pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    const fn check(mut self, check: Check) -> Self {
        self.check = Some(check);
        self
    }
}

/// Rules for a new event.
pub const EVENT_RULES: &[FieldRule] = &[
    FieldRule::new("title", "Title", "Title must be between 5 and 100 characters")
        .lengths(Some(5), Some(100)),
    FieldRule::new(
        "description",
        "Description",
        "Description must be between 20 and 1000 characters",
    )
    .lengths(Some(20), Some(1000)),
    FieldRule::new("date", "Date", "Event date cannot be in the past")
        .pattern(Pattern::Date)
        .check(Check::NotPast),
    FieldRule::new("startTime", "Start time", "Please enter a valid time").pattern(Pattern::Time),
    FieldRule::new("endTime", "End time", "End time must be after the start time")
        .optional()
        .pattern(Pattern::Time)
        .check(Check::After("startTime")),
    FieldRule::new("venue", "Venue", "Venue must be at least 3 characters").lengths(Some(3), None),
    FieldRule::new("category", "Category", "Please select a valid category")
        .check(Check::Category),
    FieldRule::new("maxSeats", "Max seats", "Maximum seats must be between 1 and 10,000")
        .pattern(Pattern::Digits)
        .check(Check::Range { min: 1, max: 10_000 }),
];

/// Inputs that checks compare against.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub today: NaiveDate,
    pub categories: &'a [String],
}

/// Field values looked up by rule name.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<&str>;
}

/// Every violation found, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn push(&mut self, field: &str, message: String) {
        self.fields.entry(field.to_string()).or_default().push(message);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for messages in self.fields.values() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                f.write_str(message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Apply every rule in `rules` to `values`.
///
/// A missing required field reports only that it is required. An empty
/// optional field is skipped.
///
/// # Errors
///
/// Returns all violations when any rule fails.
pub fn validate_fields(
    rules: &[FieldRule],
    values: &dyn FieldSource,
    ctx: &ValidationContext<'_>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    for rule in rules {
        let value = values.field(rule.field).map(str::trim).unwrap_or_default();
        if value.is_empty() {
            if rule.required {
                errors.push(rule.field, format!("{} is required", rule.label));
            }
            continue;
        }

        let len = value.chars().count();
        if let Some(min) = rule.min_len.filter(|&min| len < min) {
            errors.push(
                rule.field,
                format!("{} must be at least {min} characters", rule.label),
            );
        }
        if let Some(max) = rule.max_len.filter(|&max| len > max) {
            errors.push(
                rule.field,
                format!("{} must be no more than {max} characters", rule.label),
            );
        }

        if let Some(pattern) = rule.pattern {
            if !pattern.matches(value) {
                errors.push(rule.field, rule.message.to_string());
                continue;
            }
        }

        if let Some(check) = rule.check {
            if !passes(check, value, values, ctx) {
                errors.push(rule.field, rule.message.to_string());
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn passes(check: Check, value: &str, values: &dyn FieldSource, ctx: &ValidationContext<'_>) -> bool {
    match check {
        Check::NotPast => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok_and(|d| d >= ctx.today),
        Check::Range { min, max } => value
            .parse::<u32>()
            .is_ok_and(|n| (min..=max).contains(&n)),
        Check::Category => ctx.categories.iter().any(|c| c == value),
        Check::After(other) => {
            let start = values.field(other).and_then(|raw| wire::parse_time(raw.trim()));
            match (start, wire::parse_time(value)) {
                (Some(start), Some(end)) => end > start,
                // A bad start time is reported against its own field.
                (None, _) => true,
                (Some(_), None) => false,
            }
        }
    }
}

/// Unvalidated event fields as entered by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    pub venue: String,
    pub category: String,
    pub max_seats: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl FieldSource for EventDraft {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "description" => Some(&self.description),
            "date" => Some(&self.date),
            "startTime" => Some(&self.start_time),
            "endTime" => self.end_time.as_deref(),
            "venue" => Some(&self.venue),
            "category" => Some(&self.category),
            "maxSeats" => Some(&self.max_seats),
            "image" => self.image.as_deref(),
            _ => None,
        }
    }
}

/// Project-level policy for new events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPolicy {
    pub categories: Vec<String>,
    /// New events start `pending` and need an admin approval.
    pub require_approval: bool,
}

impl Default for EventPolicy {
    fn default() -> Self {
        Self {
            categories: CATEGORIES.iter().map(ToString::to_string).collect(),
            require_approval: false,
        }
    }
}

/// Why an event could not be created.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("role '{0}' cannot create events")]
    PermissionDenied(crate::session::Role),

    #[error("invalid event: {0}")]
    Invalid(ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CreateError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::PermissionDenied(_) => ErrorCode::PermissionDenied,
            Self::Invalid(_) => ErrorCode::ValidationFailed,
            Self::Store(err) => err.code(),
        }
    }
}

/// Validate `draft` and persist it as a new event organized by `session`.
///
/// The event gets a fresh id, zero attendees and no registrations. Its status
/// is `active`, or `pending` when the policy requires approval. `today` is the
/// caller's calendar date for the not-in-the-past check; `now` stamps the id
/// and `createdAt`.
///
/// # Errors
///
/// Returns [`CreateError::PermissionDenied`] for participant sessions,
/// [`CreateError::Invalid`] with every violation, or the store error that
/// prevented the write.
pub fn create_event<B: StorageBackend>(
    store: &EventStore<B>,
    session: &Session,
    draft: &EventDraft,
    policy: &EventPolicy,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Event, CreateError> {
    if !session.can_create_events() {
        return Err(CreateError::PermissionDenied(session.role));
    }

    let ctx = ValidationContext {
        today,
        categories: &policy.categories,
    };
    validate_fields(EVENT_RULES, draft, &ctx).map_err(CreateError::Invalid)?;

    let event = build_event(draft, session, policy, now).map_err(CreateError::Invalid)?;
    store.upsert(&event)?;
    info!(event_id = %event.id, organizer_id = %event.organizer_id, status = %event.status, "created event");
    Ok(event)
}

fn build_event(
    draft: &EventDraft,
    session: &Session,
    policy: &EventPolicy,
    now: DateTime<Utc>,
) -> Result<Event, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let date = NaiveDate::parse_from_str(draft.date.trim(), "%Y-%m-%d").ok();
    let start_time = wire::parse_time(draft.start_time.trim());
    let max_seats = draft.max_seats.trim().parse::<u32>().ok();
    let end_time = match draft.end_time.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => wire::parse_time(raw).map(Some).ok_or(()),
    };

    let (Some(date), Some(start_time), Some(max_seats), Ok(end_time)) =
        (date, start_time, max_seats, end_time)
    else {
        errors.push("draft", "Event fields could not be parsed".to_string());
        return Err(errors);
    };

    let status = if policy.require_approval {
        EventStatus::Pending
    } else {
        EventStatus::Active
    };

    Ok(Event {
        id: generate_event_id(now),
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        date,
        start_time,
        end_time,
        venue: draft.venue.trim().to_string(),
        category: draft.category.trim().to_string(),
        max_seats,
        organizer: session.name.clone(),
        organizer_id: session.id.clone(),
        created_at: now,
        status,
        attendees: 0,
        registrations: Vec::new(),
        image: draft
            .image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string),
        reviewed_at: None,
        reviewed_by: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use crate::store::MemoryBackend;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).single().unwrap()
    }

    fn today() -> NaiveDate {
        now().date_naive()
    }

    fn draft() -> EventDraft {
        EventDraft {
            title: "Robotics Demo Day".into(),
            description: "Student teams show off the robots they built this term.".into(),
            date: "2026-11-02".into(),
            start_time: "9:30".into(),
            end_time: Some("12:00".into()),
            venue: "Engineering Hall".into(),
            category: "Technology".into(),
            max_seats: "120".into(),
            image: None,
        }
    }

    fn validate(draft: &EventDraft) -> Result<(), ValidationErrors> {
        let policy = EventPolicy::default();
        let ctx = ValidationContext {
            today: now().date_naive(),
            categories: &policy.categories,
        };
        validate_fields(EVENT_RULES, draft, &ctx)
    }

    #[test]
    fn valid_draft_passes() {
        assert!(validate(&draft()).is_ok());
    }

    #[test]
    fn missing_required_fields_only_report_required() {
        let errors = validate(&EventDraft::default()).unwrap_err();
        assert_eq!(errors.get("title").unwrap(), ["Title is required"]);
        assert_eq!(errors.get("maxSeats").unwrap(), ["Max seats is required"]);
        assert!(errors.get("endTime").is_none());
    }

    #[test]
    fn length_limits() {
        let mut d = draft();
        d.title = "Demo".into();
        d.description = "Too short".into();
        d.venue = "AB".into();
        let errors = validate(&d).unwrap_err();
        assert_eq!(
            errors.get("title").unwrap(),
            ["Title must be at least 5 characters"]
        );
        assert_eq!(
            errors.get("description").unwrap(),
            ["Description must be at least 20 characters"]
        );
        assert_eq!(
            errors.get("venue").unwrap(),
            ["Venue must be at least 3 characters"]
        );

        d = draft();
        d.title = "x".repeat(101);
        let errors = validate(&d).unwrap_err();
        assert_eq!(
            errors.get("title").unwrap(),
            ["Title must be no more than 100 characters"]
        );
    }

    #[test]
    fn date_rules() {
        let mut d = draft();
        d.date = "2026-10-18".into();
        let errors = validate(&d).unwrap_err();
        assert_eq!(errors.get("date").unwrap(), ["Event date cannot be in the past"]);

        d.date = "2026-10-19".into();
        assert!(validate(&d).is_ok());

        d.date = "2026-02-30".into();
        assert!(validate(&d).is_err());
        d.date = "02/11/2026".into();
        assert!(validate(&d).is_err());
    }

    #[test]
    fn time_rules() {
        let mut d = draft();
        d.start_time = "24:00".into();
        let errors = validate(&d).unwrap_err();
        assert_eq!(errors.get("startTime").unwrap(), ["Please enter a valid time"]);
        // End time is not judged against a broken start time.
        assert!(errors.get("endTime").is_none());

        d = draft();
        d.end_time = Some("09:00".into());
        let errors = validate(&d).unwrap_err();
        assert_eq!(
            errors.get("endTime").unwrap(),
            ["End time must be after the start time"]
        );

        d.end_time = Some(String::new());
        assert!(validate(&d).is_ok());
    }

    #[test]
    fn category_must_be_known() {
        let mut d = draft();
        d.category = "Gaming".into();
        let errors = validate(&d).unwrap_err();
        assert_eq!(errors.get("category").unwrap(), ["Please select a valid category"]);
    }

    #[test]
    fn seat_rules() {
        for bad in ["0", "10001", "12a", "-5", "99999999999"] {
            let mut d = draft();
            d.max_seats = bad.into();
            let errors = validate(&d).unwrap_err();
            assert_eq!(
                errors.get("maxSeats").unwrap(),
                ["Maximum seats must be between 1 and 10,000"],
                "value {bad}"
            );
        }
        let mut d = draft();
        d.max_seats = "10000".into();
        assert!(validate(&d).is_ok());
    }

    #[test]
    fn errors_display_joined() {
        let mut d = draft();
        d.title = String::new();
        d.venue = String::new();
        let errors = validate(&d).unwrap_err();
        assert_eq!(errors.to_string(), "Title is required; Venue is required");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["title"][0], "Title is required");
    }

    #[test]
    fn create_assigns_identity_and_persists() {
        let store = EventStore::new(MemoryBackend::new());
        let session = Session::from_identifier("ana@campus.edu", Role::Organizer);

        let event =
            create_event(&store, &session, &draft(), &EventPolicy::default(), today(), now()).unwrap();
        assert!(crate::id::is_event_id(&event.id));
        assert_eq!(event.status, EventStatus::Active);
        assert_eq!(event.attendees, 0);
        assert!(event.registrations.is_empty());
        assert_eq!(event.organizer, "ana");
        assert_eq!(event.organizer_id, "ana@campus.edu");
        assert_eq!(event.max_seats, 120);
        assert_eq!(event.start_time.to_string(), "09:30:00");
        assert_eq!(event.created_at, now());

        assert_eq!(store.find_by_id(&event.id), Some(event));
    }

    #[test]
    fn not_past_check_uses_the_callers_calendar_date() {
        let store = EventStore::new(MemoryBackend::new());
        let session = Session::from_identifier("ana@campus.edu", Role::Organizer);
        let mut d = draft();
        d.date = "2026-10-19".into();

        // 01:00 UTC on the 20th is still the evening of the 19th west of UTC.
        let late = Utc.with_ymd_and_hms(2026, 10, 20, 1, 0, 0).single().unwrap();
        let event = create_event(&store, &session, &d, &EventPolicy::default(), today(), late)
            .unwrap();
        assert_eq!(event.date, today());
        assert_eq!(event.created_at, late);

        let tomorrow = today().succ_opt().unwrap();
        let err = create_event(&store, &session, &d, &EventPolicy::default(), tomorrow, late)
            .unwrap_err();
        assert!(matches!(err, CreateError::Invalid(ref e) if e.get("date").is_some()));
    }

    #[test]
    fn create_honors_approval_policy() {
        let store = EventStore::new(MemoryBackend::new());
        let session = Session::from_identifier("ana@campus.edu", Role::Admin);
        let policy = EventPolicy {
            require_approval: true,
            ..EventPolicy::default()
        };
        let event = create_event(&store, &session, &draft(), &policy, today(), now()).unwrap();
        assert_eq!(event.status, EventStatus::Pending);
    }

    #[test]
    fn participants_cannot_create() {
        let store = EventStore::new(MemoryBackend::new());
        let session = Session::from_identifier("p@campus.edu", Role::Participant);
        let err =
            create_event(&store, &session, &draft(), &EventPolicy::default(), today(), now()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PermissionDenied);
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn invalid_drafts_are_not_persisted() {
        let store = EventStore::new(MemoryBackend::new());
        let session = Session::from_identifier("ana@campus.edu", Role::Organizer);
        let mut d = draft();
        d.max_seats = "0".into();
        let err = create_event(&store, &session, &d, &EventPolicy::default(), today(), now()).unwrap_err();
        assert!(matches!(err, CreateError::Invalid(_)));
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn custom_category_list() {
        let store = EventStore::new(MemoryBackend::new());
        let session = Session::from_identifier("ana@campus.edu", Role::Organizer);
        let policy = EventPolicy {
            categories: vec!["Hackathon".into()],
            require_approval: false,
        };
        let mut d = draft();
        assert!(create_event(&store, &session, &d, &policy, today(), now()).is_err());
        d.category = "Hackathon".into();
        assert!(create_event(&store, &session, &d, &policy, today(), now()).is_ok());
    }
}

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::wire;

/// Lifecycle status of an event.
///
/// `approved` is a legacy spelling of [`EventStatus::Active`] and is accepted
/// on read only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    #[serde(alias = "approved")]
    Active,
    Rejected,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Active,
        Self::Rejected,
        Self::Cancelled,
        Self::Completed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Validate whether a transition from self to `target` is allowed.
    ///
    /// Valid transitions:
    /// - `pending -> active` (approve)
    /// - `pending -> rejected` (reject)
    /// - `active -> cancelled`
    /// - `active -> completed`
    /// - `cancelled -> active` (reinstate)
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] for no-op or disallowed transitions.
    pub fn can_transition_to(self, target: Self) -> Result<(), InvalidTransition> {
        if self == target {
            return Err(InvalidTransition {
                from: self,
                to: target,
                reason: "no-op transition is not allowed",
            });
        }

        let allowed = matches!(
            (self, target),
            (Self::Pending, Self::Active | Self::Rejected)
                | (Self::Active, Self::Cancelled | Self::Completed)
                | (Self::Cancelled, Self::Active)
        );

        if allowed {
            Ok(())
        } else {
            Err(InvalidTransition {
                from: self,
                to: target,
                reason: "transition not allowed by lifecycle rules",
            })
        }
    }
}

/// A schedulable happening with fixed capacity that users register for.
///
/// Serialized with the camelCase field names of the persisted container.
/// `startTime` is canonical; the legacy single `time` field is read as an
/// alias for it and never written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    #[serde(with = "wire::hhmm", alias = "time")]
    pub start_time: NaiveTime,
    #[serde(
        default,
        with = "wire::hhmm_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<NaiveTime>,
    pub venue: String,
    pub category: String,
    #[serde(deserialize_with = "wire::seats")]
    pub max_seats: u32,
    #[serde(default)]
    pub organizer: String,
    #[serde(default)]
    pub organizer_id: String,
    pub created_at: DateTime<Utc>,
    pub status: EventStatus,
    #[serde(default)]
    pub attendees: u32,
    /// Records written by the plain HTML front-end carry no registrant list;
    /// those read as empty and the count is normalized on load.
    #[serde(default)]
    pub registrations: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
}

impl Event {
    /// Seats still available; zero when the event is at or over capacity.
    #[must_use]
    pub const fn seats_left(&self) -> u32 {
        self.max_seats.saturating_sub(self.attendees)
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.attendees >= self.max_seats
    }

    #[must_use]
    pub fn is_registered(&self, registrant: &str) -> bool {
        self.registrations.iter().any(|r| r == registrant)
    }

    /// True when the count matches the registrant set, the set has no
    /// duplicates, and capacity is respected.
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        let unique = self.registrations.iter().all(|r| seen.insert(r.as_str()));
        unique
            && usize::try_from(self.attendees).is_ok_and(|n| n == self.registrations.len())
            && self.attendees <= self.max_seats
    }

    /// Restore `attendees == registrations.len()` and drop duplicate
    /// registrants, keeping first occurrences.
    ///
    /// Returns `true` if anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut seen = std::collections::HashSet::new();
        let before = self.registrations.len();
        self.registrations.retain(|r| seen.insert(r.clone()));
        let deduped = before != self.registrations.len();

        let count = u32::try_from(self.registrations.len()).unwrap_or(u32::MAX);
        let recounted = count != self.attendees;
        self.attendees = count;

        deduped || recounted
    }
}

/// Error returned when a status transition is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: EventStatus,
    pub to: EventStatus,
    pub reason: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot move event from {} to {}: {}", self.from, self.to, self.reason)
    }
}

impl std::error::Error for InvalidTransition {}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "active" | "approved" => Ok(Self::Active),
            "rejected" => Ok(Self::Rejected),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

//! The current user, passed explicitly into operations that need one.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::model::{Event, ParseEnumError};

/// What a session is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Participant,
    Organizer,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Organizer => "organizer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "participant" | "student" => Ok(Self::Participant),
            "organizer" | "organiser" => Ok(Self::Organizer),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseEnumError {
                expected: "role",
                got: s.to_string(),
            }),
        }
    }
}

/// Identity and role of whoever is driving an operation.
///
/// `id` is what events record as `organizerId`; `email` is the registrant
/// identifier stored in `registrations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Session {
    /// Build a session from a single identifier, usually an email address.
    ///
    /// The display name is the part before `@`.
    #[must_use]
    pub fn from_identifier(identifier: &str, role: Role) -> Self {
        let identifier = identifier.trim();
        let name = identifier
            .split_once('@')
            .map_or(identifier, |(local, _)| local)
            .to_string();
        Self {
            id: identifier.to_string(),
            name,
            email: identifier.to_string(),
            role,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    #[must_use]
    pub const fn can_create_events(&self) -> bool {
        matches!(self.role, Role::Organizer | Role::Admin)
    }

    /// True when this session organized `event`.
    #[must_use]
    pub fn owns(&self, event: &Event) -> bool {
        !self.id.is_empty() && event.organizer_id == self.id
    }
}

use std::fmt;

/// Machine-readable error codes for scripts and agents driving the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    EventNotFound,
    AlreadyRegistered,
    EventFull,
    EventClosed,
    InvalidRegistrant,
    InvalidTransition,
    PermissionDenied,
    ValidationFailed,
    MalformedData,
    StorageUnavailable,
    LockContention,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::EventNotFound => "E2001",
            Self::AlreadyRegistered => "E2002",
            Self::EventFull => "E2003",
            Self::EventClosed => "E2004",
            Self::InvalidRegistrant => "E2005",
            Self::InvalidTransition => "E3001",
            Self::PermissionDenied => "E3002",
            Self::ValidationFailed => "E4001",
            Self::MalformedData => "E4002",
            Self::StorageUnavailable => "E5001",
            Self::LockContention => "E5002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Event store not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::EventNotFound => "Event not found",
            Self::AlreadyRegistered => "Already registered for this event",
            Self::EventFull => "Event is full",
            Self::EventClosed => "Event is not open for registration",
            Self::InvalidRegistrant => "Invalid registrant identifier",
            Self::InvalidTransition => "Invalid status transition",
            Self::PermissionDenied => "Permission denied",
            Self::ValidationFailed => "Event validation failed",
            Self::MalformedData => "Stored event data is malformed",
            Self::StorageUnavailable => "Storage unavailable",
            Self::LockContention => "Lock contention",
        }
    }

    /// Optional remediation hint that can be surfaced to users and scripts.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `eh init` to create the event store."),
            Self::ConfigParseError => Some("Fix syntax in .eventhub/config.toml and retry."),
            Self::EventNotFound => Some("Use `eh list --all` to see known event IDs."),
            Self::AlreadyRegistered => None,
            Self::EventFull => Some("Pick another event or ask the organizer to add seats."),
            Self::EventClosed => Some("Only active events accept registrations."),
            Self::InvalidRegistrant => Some("Pass a non-empty registrant (usually an email)."),
            Self::InvalidTransition => Some(
                "Follow valid transitions: pending -> active|rejected, active -> cancelled|completed, cancelled -> active.",
            ),
            Self::PermissionDenied => Some("Retry with --role admin or as the event organizer."),
            Self::ValidationFailed => Some("Fix the listed fields and retry."),
            Self::MalformedData => {
                Some("Inspect .eventhub/eventhub_events.json or restore it from an export.")
            }
            Self::StorageUnavailable => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `eh` process releases its lock."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl serde::Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

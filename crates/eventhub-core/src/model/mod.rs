pub mod event;
pub mod wire;

pub use event::{Event, EventStatus, InvalidTransition, ParseEnumError};

/// Categories an event may be filed under unless the project config
/// overrides the list.
pub const CATEGORIES: [&str; 10] = [
    "Technology",
    "Cultural",
    "Career",
    "Education",
    "Sports",
    "Health & Wellness",
    "Entertainment",
    "Social",
    "Professional",
    "Academic",
];

//! Field codecs for the persisted event container.
//!
//! Times are written as `HH:MM`. On read, `H:MM` and `HH:MM:SS` are accepted
//! as well. Seat counts are numbers, but older containers stored the raw form
//! value, so digit strings are accepted on read.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, de};

const WRITE_FORMAT: &str = "%H:%M";
const READ_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// Parse a time of day in any accepted container format.
#[must_use]
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    READ_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

pub mod hhmm {
    use super::{WRITE_FORMAT, parse_time};
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&time.format(WRITE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_time(&raw).ok_or_else(|| de::Error::custom(format!("invalid time of day: '{raw}'")))
    }
}

pub mod hhmm_opt {
    use super::{WRITE_FORMAT, parse_time};
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.collect_str(&t.format(WRITE_FORMAT)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_time(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid time of day: '{raw}'"))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeatRepr {
    Number(u32),
    Text(String),
}

/// Deserialize a seat count from a number or a digit string.
pub fn seats<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    match SeatRepr::deserialize(d)? {
        SeatRepr::Number(n) => Ok(n),
        SeatRepr::Text(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| de::Error::custom(format!("invalid seat count: '{raw}'"))),
    }
}

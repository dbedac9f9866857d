//! Event identifier generation.
//!
//! Identifiers look like `evt_1718000000000_k3j9x0q2a`: a prefix, the creation
//! time in Unix milliseconds, and nine random base-36 characters.

use chrono::{DateTime, Utc};
use rand::Rng;

pub const EVENT_ID_PREFIX: &str = "evt_";

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a new event identifier stamped with `now`.
#[must_use]
pub fn generate_event_id(now: DateTime<Utc>) -> String {
    generate_with(now, &mut rand::thread_rng())
}

fn generate_with<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("{EVENT_ID_PREFIX}{}_{suffix}", now.timestamp_millis())
}

/// True when `id` has the shape produced by [`generate_event_id`].
#[must_use]
pub fn is_event_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix(EVENT_ID_PREFIX) else {
        return false;
    };
    let Some((millis, suffix)) = rest.split_once('_') else {
        return false;
    };
    !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix.bytes().all(|b| BASE36.contains(&b))
}

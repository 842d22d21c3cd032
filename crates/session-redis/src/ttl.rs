//! Expiration to TTL conversion

use chrono::{DateTime, Utc};

/// Seconds from `now` until `expires`, rounded to the nearest second.
/// Expirations in the past give 0, never a negative TTL.
pub fn expires_to_seconds(expires: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let delta_ms = (expires - now).num_milliseconds();
    let seconds = (delta_ms as f64 / 1000.0).round();
    if seconds < 0.0 {
        0
    } else {
        seconds as u64
    }
}

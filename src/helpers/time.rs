use chrono::{DateTime, Utc};
use tokio::time::Instant;

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Seconds from `now` until an RFC 3339 timestamp; negative once it has passed.
/// `None` when the value is not RFC 3339.
pub fn seconds_until(rfc3339: &str, now: i64) -> Option<i64> {
    DateTime::parse_from_rfc3339(rfc3339)
        .ok()
        .map(|expires_at| expires_at.timestamp() - now)
}

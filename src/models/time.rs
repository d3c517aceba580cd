//! Vendor timestamp normalisation.
//!
//! The tracker emits ISO-8601 timestamps in several shapes (`Z` suffix,
//! `+HH:MM` / `+HHMM` offsets, or naive local strings). Everything is
//! normalised to UTC instants here. A fixed correction is then added to every
//! successfully parsed value to compensate for a known server-side offset in
//! the source data; results would not match the historical reports without it.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// The server-side clock correction applied to every parsed timestamp.
pub const TIMESTAMP_SHIFT_HOURS: i64 = 1;

/// Parse a vendor timestamp string into a corrected UTC instant.
///
/// Accepted forms:
/// - `2024-03-01T10:00:00.000+0000` (offset without colon)
/// - `2024-03-01T10:00:00+02:00`
/// - `2024-03-01T10:00:00Z`
/// - `2024-03-01T10:00:00` (naive, treated as UTC)
///
/// Returns `None` when the string cannot be parsed. Callers treat such
/// entries as non-events: they are dropped from ordering decisions, never
/// interpreted as "the beginning of time".
pub fn parse_vendor_timestamp(value: &str, shift: Duration) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let parsed = parse_utc(value)?;
    Some(parsed + shift)
}

fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    // Normalise a trailing `+HHMM`/`-HHMM` offset to `+HH:MM` so a single
    // RFC 3339 parse covers both vendor variants.
    let normalised = if let Some(stripped) = value.strip_suffix('Z') {
        format!("{}+00:00", stripped)
    } else if has_compact_offset(value) {
        let (head, tail) = value.split_at(value.len() - 2);
        format!("{}:{}", head, tail)
    } else {
        value.to_string()
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Some(dt.with_timezone(&Utc));
    }

    // Naive fallbacks, interpreted as UTC.
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalised, format) {
            return Some(naive.and_utc());
        }
    }

    None
}

/// True when the string ends in `+HHMM` or `-HHMM` (no colon).
fn has_compact_offset(value: &str) -> bool {
    if value.len() < 5 {
        return false;
    }
    let tail = &value[value.len() - 5..];
    let mut chars = tail.chars();
    let sign = chars.next().unwrap();
    (sign == '+' || sign == '-') && chars.all(|c| c.is_ascii_digit())
}

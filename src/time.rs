//! Thin wrapper over the embedder-supplied "time interface" (spec §6).
//!
//! The core engine never performs calendar arithmetic itself; it only needs
//! to parse/print timestamps, compare them, and add an interval. Here that
//! interface is realized directly on top of `chrono` rather than injected as
//! a trait object, since this crate is its own only embedder.

use chrono::{DateTime, Utc};

use crate::error::MeosError;

/// A point in time. An alias rather than a newtype so call sites can use
/// `chrono`'s full API without an extra layer of indirection.
pub type Timestamp = DateTime<Utc>;

/// A signed duration between two timestamps.
pub type Interval = chrono::TimeDelta;

/// Parses a timestamp literal as it appears in WKT: an RFC 3339 string, a
/// `YYYY-MM-DD HH:MM:SS[.ffffff][+TZ]` string, or a bare `YYYY-MM-DD` date
/// (midnight UTC is assumed when no time-of-day is given).
pub fn timestamp_parse(op: &'static str, s: &str) -> Result<Timestamp, MeosError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Accept a space instead of 'T' and an optional numeric offset/zone letter.
    for fmt in [
        "%Y-%m-%d %H:%M:%S%.f%#z",
        "%Y-%m-%d %H:%M:%S%#z",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap().and_utc());
    }
    Err(MeosError::text_input(op, format!("invalid timestamp literal `{s}`")))
}

/// Prints a timestamp the way the printer (C6) reproduces it: RFC 3339 with
/// a `+00` style offset, seconds always shown, fractional seconds only when
/// non-zero.
pub fn timestamp_print(t: Timestamp) -> String {
    if t.timestamp_subsec_nanos() == 0 {
        t.format("%Y-%m-%d %H:%M:%S%:::z").to_string()
    } else {
        t.format("%Y-%m-%d %H:%M:%S%.6f%:::z").to_string()
    }
}

/// Total ordering on timestamps.
pub fn timestamp_cmp(a: Timestamp, b: Timestamp) -> std::cmp::Ordering {
    a.cmp(&b)
}

/// Adds a (possibly negative) interval to a timestamp.
pub fn timestamp_plus_interval(t: Timestamp, delta: Interval) -> Timestamp {
    t + delta
}

/// Total ordering on intervals.
pub fn interval_cmp(a: Interval, b: Interval) -> std::cmp::Ordering {
    a.cmp(&b)
}

/// Adds two intervals.
pub fn interval_add(a: Interval, b: Interval) -> Interval {
    a + b
}

/// Scales an interval by a floating-point factor, rounding to the nearest
/// microsecond.
pub fn interval_mul_double(a: Interval, factor: f64) -> Interval {
    let micros = (a.num_microseconds().unwrap_or(0) as f64) * factor;
    chrono::TimeDelta::microseconds(micros.round() as i64)
}

/// Ratio `(t - lower) / (upper - lower)` computed in extended (floating
/// point microsecond) precision, clamped to `[0, 1]`.
pub fn fraction(lower: Timestamp, upper: Timestamp, t: Timestamp) -> f64 {
    let total = (upper - lower).num_microseconds().unwrap_or(1) as f64;
    let elapsed = (t - lower).num_microseconds().unwrap_or(0) as f64;
    if total == 0.0 {
        0.0
    } else {
        crate::epsilon::clamp_ratio(elapsed / total)
    }
}

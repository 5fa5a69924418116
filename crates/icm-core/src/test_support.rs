//! Fixtures shared by unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::event::{Event, Trace};
use crate::types::ActivityKey;

pub fn ts(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap() + chrono::Duration::minutes(minutes)
}

pub fn key(name: &str) -> ActivityKey {
    ActivityKey::new(name).unwrap()
}

pub fn event(name: &str, minutes: i64) -> Event {
    Event::new(key(name), ts(minutes))
}

/// A trace of bare events one minute apart, starting at `start` minutes.
pub fn trace_from(start: i64, names: &[&str]) -> Trace {
    names
        .iter()
        .zip(start..)
        .map(|(name, minute)| event(name, minute))
        .collect::<Vec<_>>()
        .into()
}

pub fn trace(names: &[&str]) -> Trace {
    trace_from(0, names)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

//! JSON event log format.
//!
//! A log is an array of traces, or an object with a `traces` array. A trace
//! is an array of event objects, or an object with an `events` array. Event
//! objects map attribute keys to values.

use icm_core::event::keys;
use icm_core::{ActivityKey, AttributeValue, Event, Trace};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{LogError, parse_instant};

type RawEvent = Map<String, Value>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLog {
    Traces(Vec<RawTrace>),
    Wrapped { traces: Vec<RawTrace> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTrace {
    Events(Vec<RawEvent>),
    Wrapped { events: Vec<RawEvent> },
}

impl RawLog {
    fn into_traces(self) -> Vec<RawTrace> {
        match self {
            Self::Traces(traces) | Self::Wrapped { traces } => traces,
        }
    }
}

impl RawTrace {
    fn into_events(self) -> Vec<RawEvent> {
        match self {
            Self::Events(events) | Self::Wrapped { events } => events,
        }
    }
}

/// Converts one event object, or returns `None` when the activity name or
/// timestamp is missing or malformed.
fn convert_event(attributes: RawEvent) -> Option<Event> {
    let Some(activity) = attributes
        .get(keys::ACTIVITY)
        .and_then(Value::as_str)
        .and_then(|name| ActivityKey::new(name).ok())
    else {
        tracing::debug!("dropping event without an activity name");
        return None;
    };
    let Some(timestamp) = attributes
        .get(keys::TIMESTAMP)
        .and_then(Value::as_str)
        .and_then(parse_instant)
    else {
        tracing::debug!(%activity, "dropping event without a valid timestamp");
        return None;
    };

    let mut event = Event::new(activity, timestamp);
    for (key, value) in attributes {
        let Value::String(text) = value else {
            continue;
        };
        match key.as_str() {
            keys::ACTIVITY | keys::TIMESTAMP => {}
            keys::LIFECYCLE => event.lifecycle = Some(text),
            keys::RESOURCE => event.resource = Some(text),
            keys::ROLE => event.role = Some(text),
            keys::GROUP => event.group = Some(text),
            _ => {
                let value = parse_instant(&text)
                    .map_or_else(|| AttributeValue::String(text), AttributeValue::Instant);
                event.extra.insert(key, value);
            }
        }
    }
    Some(event)
}

/// Parses a JSON log, keeping at most `max_traces` non-empty traces.
pub fn parse_json_log(json: &str, max_traces: usize) -> Result<Vec<Trace>, LogError> {
    let raw: RawLog = serde_json::from_str(json)?;

    let traces: Vec<Trace> = raw
        .into_traces()
        .into_iter()
        .filter_map(|trace| {
            let events: Vec<Event> = trace
                .into_events()
                .into_iter()
                .filter_map(convert_event)
                .collect();
            (!events.is_empty()).then(|| Trace::new(events))
        })
        .take(max_traces)
        .collect();

    tracing::debug!(traces = traces.len(), "parsed JSON event log");
    Ok(traces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array_of_traces() {
        let json = r#"[
            [
                {"concept:name": "A", "time:timestamp": "2025-01-15T09:00:00Z"},
                {"concept:name": "B", "time:timestamp": "2025-01-15T09:01:00Z"}
            ],
            [
                {"concept:name": "A", "time:timestamp": "2025-01-15T10:00:00+01:00"}
            ]
        ]"#;
        let log = parse_json_log(json, 100).unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log[0].len(), 2);
        assert_eq!(log[0].events()[1].activity.as_str(), "B");
        // Offsets are normalized to UTC.
        assert_eq!(log[1].events()[0].timestamp, log[0].events()[0].timestamp);
    }

    #[test]
    fn parses_wrapped_objects() {
        let json = r#"{
            "name": "orders",
            "traces": [
                {"id": "case-1", "events": [
                    {"concept:name": "A", "time:timestamp": "2025-01-15T09:00:00Z"}
                ]}
            ]
        }"#;
        let log = parse_json_log(json, 100).unwrap();

        assert_eq!(log.len(), 1);
        assert_eq!(log[0].events()[0].activity.as_str(), "A");
    }

    #[test]
    fn well_known_attributes_fill_fixed_fields() {
        let json = r#"[[{
            "concept:name": "Approve",
            "time:timestamp": "2025-01-15T09:00:00Z",
            "lifecycle:transition": "complete",
            "org:resource": "alice",
            "org:role": "clerk",
            "org:group": "finance",
            "deadline": "2025-01-20T12:00:00Z",
            "channel": "email",
            "amount": 250
        }]]"#;
        let log = parse_json_log(json, 100).unwrap();
        let event = &log[0].events()[0];

        assert_eq!(event.lifecycle.as_deref(), Some("complete"));
        assert_eq!(event.resource.as_deref(), Some("alice"));
        assert_eq!(event.role.as_deref(), Some("clerk"));
        assert_eq!(event.group.as_deref(), Some("finance"));
        assert!(matches!(
            event.extra.get("deadline"),
            Some(AttributeValue::Instant(_))
        ));
        assert_eq!(
            event.extra.get("channel"),
            Some(&AttributeValue::String("email".to_string()))
        );
        // Non-string values are ignored.
        assert!(!event.extra.contains_key("amount"));
    }

    #[test]
    fn malformed_events_are_dropped() {
        let json = r#"[[
            {"time:timestamp": "2025-01-15T09:00:00Z"},
            {"concept:name": "", "time:timestamp": "2025-01-15T09:00:00Z"},
            {"concept:name": "A"},
            {"concept:name": "A", "time:timestamp": "yesterday"},
            {"concept:name": 7, "time:timestamp": "2025-01-15T09:00:00Z"},
            {"concept:name": "B", "time:timestamp": "2025-01-15T09:05:00Z"}
        ]]"#;
        let log = parse_json_log(json, 100).unwrap();

        assert_eq!(log.len(), 1);
        assert_eq!(log[0].len(), 1);
        assert_eq!(log[0].events()[0].activity.as_str(), "B");
    }

    #[test]
    fn empty_traces_do_not_count_against_limit() {
        let json = r#"[
            [],
            [{"concept:name": "A"}],
            [{"concept:name": "A", "time:timestamp": "2025-01-15T09:00:00Z"}],
            [{"concept:name": "B", "time:timestamp": "2025-01-15T09:00:00Z"}],
            [{"concept:name": "C", "time:timestamp": "2025-01-15T09:00:00Z"}]
        ]"#;
        let log = parse_json_log(json, 2).unwrap();

        let names: Vec<&str> = log
            .iter()
            .map(|t| t.events()[0].activity.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(parse_json_log("{not json", 10), Err(LogError::Json(_))));
        assert!(matches!(parse_json_log(r#"{"cases": []}"#, 10), Err(LogError::Json(_))));
    }
}

//! XES event log format.
//!
//! Only `<string>` and `<date>` attributes that are direct children of an
//! `<event>` are read. Nested attributes, other attribute types, trace-level
//! attributes and `<global>` defaults are ignored. When a key repeats, the
//! first occurrence wins.

use icm_core::event::keys;
use icm_core::{ActivityKey, AttributeValue, Event, Trace};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event as XmlEvent};

use crate::{LogError, parse_instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    String,
    Date,
}

#[derive(Debug)]
struct RawAttribute {
    kind: Kind,
    key: String,
    value: String,
}

/// Reads a `<string key=.. value=..>` or `<date ...>` element. Other tags and
/// attributes missing `key` or `value` yield `None`.
fn attribute(start: &BytesStart<'_>) -> Result<Option<RawAttribute>, LogError> {
    let kind = match start.local_name().as_ref() {
        b"string" => Kind::String,
        b"date" => Kind::Date,
        _ => return Ok(None),
    };
    let mut key = None;
    let mut value = None;
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        match attr.key.local_name().as_ref() {
            b"key" => key = Some(attr.unescape_value()?.into_owned()),
            b"value" => value = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }
    Ok(key
        .zip(value)
        .map(|(key, value)| RawAttribute { kind, key, value }))
}

fn fill(slot: &mut Option<String>, value: String) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

fn convert_event(attributes: Vec<RawAttribute>) -> Option<Event> {
    let find = |kind: Kind, key: &str| {
        attributes
            .iter()
            .find(|attr| attr.kind == kind && attr.key == key)
            .map(|attr| attr.value.as_str())
    };
    let Some(activity) =
        find(Kind::String, keys::ACTIVITY).and_then(|name| ActivityKey::new(name).ok())
    else {
        tracing::debug!("dropping XES event without an activity name");
        return None;
    };
    let Some(timestamp) = find(Kind::Date, keys::TIMESTAMP).and_then(parse_instant) else {
        tracing::debug!(%activity, "dropping XES event without a valid timestamp");
        return None;
    };

    let mut event = Event::new(activity, timestamp);
    for attr in attributes {
        match (attr.kind, attr.key.as_str()) {
            (_, keys::ACTIVITY | keys::TIMESTAMP) => {}
            (Kind::String, keys::LIFECYCLE) => fill(&mut event.lifecycle, attr.value),
            (Kind::String, keys::RESOURCE) => fill(&mut event.resource, attr.value),
            (Kind::String, keys::ROLE) => fill(&mut event.role, attr.value),
            (Kind::String, keys::GROUP) => fill(&mut event.group, attr.value),
            (Kind::String, _) => {
                event
                    .extra
                    .entry(attr.key)
                    .or_insert(AttributeValue::String(attr.value));
            }
            (Kind::Date, _) => {
                let Some(instant) = parse_instant(&attr.value) else {
                    tracing::debug!(key = %attr.key, "ignoring unparsable XES date");
                    continue;
                };
                event
                    .extra
                    .entry(attr.key)
                    .or_insert(AttributeValue::Instant(instant));
            }
        }
    }
    Some(event)
}

/// Parses an XES document, keeping at most `max_traces` non-empty traces.
///
/// Reading stops as soon as the limit is reached, so trailing content past
/// the last kept trace is not validated.
pub fn parse_xes_log(xml: &str, max_traces: usize) -> Result<Vec<Trace>, LogError> {
    let mut reader = Reader::from_str(xml);
    let mut traces = Vec::new();
    let mut saw_log = false;
    let mut trace: Option<Vec<Event>> = None;
    let mut event: Option<Vec<RawAttribute>> = None;
    // Elements currently open below the event being read.
    let mut depth = 0usize;

    while traces.len() < max_traces {
        match reader.read_event()? {
            XmlEvent::Start(start) => {
                if let Some(attributes) = event.as_mut() {
                    if depth == 0 {
                        attributes.extend(attribute(&start)?);
                    }
                    depth += 1;
                    continue;
                }
                match start.local_name().as_ref() {
                    b"log" => saw_log = true,
                    b"trace" if saw_log => trace = Some(Vec::new()),
                    b"event" if trace.is_some() => {
                        event = Some(Vec::new());
                        depth = 0;
                    }
                    _ => {}
                }
            }
            XmlEvent::Empty(start) => {
                if let Some(attributes) = event.as_mut() {
                    if depth == 0 {
                        attributes.extend(attribute(&start)?);
                    }
                } else if start.local_name().as_ref() == b"log" {
                    saw_log = true;
                }
            }
            XmlEvent::End(end) => {
                if event.is_some() {
                    if depth > 0 {
                        depth -= 1;
                    } else if let (Some(attributes), Some(events)) = (event.take(), trace.as_mut())
                    {
                        events.extend(convert_event(attributes));
                    }
                } else if end.local_name().as_ref() == b"trace" {
                    if let Some(events) = trace.take().filter(|events| !events.is_empty()) {
                        traces.push(Trace::new(events));
                    }
                }
            }
            XmlEvent::Eof => {
                if !saw_log {
                    return Err(LogError::MissingLogElement);
                }
                break;
            }
            _ => {}
        }
    }

    tracing::debug!(traces = traces.len(), "parsed XES event log");
    Ok(traces)
}

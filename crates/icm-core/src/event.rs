//! Recorded activity events and traces.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ActivityKey;

/// Well-known attribute keys, named as in XES-style process logs.
pub mod keys {
    pub const ACTIVITY: &str = "concept:name";
    pub const TIMESTAMP: &str = "time:timestamp";
    pub const LIFECYCLE: &str = "lifecycle:transition";
    pub const RESOURCE: &str = "org:resource";
    pub const ROLE: &str = "org:role";
    pub const GROUP: &str = "org:group";
}

/// A typed extension attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    String(String),
    Instant(DateTime<Utc>),
}

impl AttributeValue {
    pub fn borrowed(&self) -> AttributeRef<'_> {
        match self {
            Self::String(s) => AttributeRef::String(s),
            Self::Instant(t) => AttributeRef::Instant(*t),
        }
    }
}

/// A borrowed view of any attribute value on an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeRef<'a> {
    String(&'a str),
    Instant(DateTime<Utc>),
}

/// A single recorded step of a process execution.
///
/// The activity name and timestamp are mandatory; ingestion drops events
/// that lack either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub activity: ActivityKey,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Attributes beyond the well-known ones.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, AttributeValue>,
}

impl Event {
    /// Creates an event with only the mandatory fields set.
    pub const fn new(activity: ActivityKey, timestamp: DateTime<Utc>) -> Self {
        Self {
            activity,
            timestamp,
            lifecycle: None,
            resource: None,
            role: None,
            group: None,
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_lifecycle(mut self, lifecycle: impl Into<String>) -> Self {
        self.lifecycle = Some(lifecycle.into());
        self
    }

    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Every attribute present on the event, keyed by its log attribute name.
    ///
    /// Well-known fields come first in a fixed order, then extension
    /// attributes in key order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, AttributeRef<'_>)> {
        let fixed = [
            (keys::ACTIVITY, Some(AttributeRef::String(self.activity.as_str()))),
            (keys::TIMESTAMP, Some(AttributeRef::Instant(self.timestamp))),
            (keys::LIFECYCLE, self.lifecycle.as_deref().map(AttributeRef::String)),
            (keys::RESOURCE, self.resource.as_deref().map(AttributeRef::String)),
            (keys::ROLE, self.role.as_deref().map(AttributeRef::String)),
            (keys::GROUP, self.group.as_deref().map(AttributeRef::String)),
        ];
        fixed
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.borrowed())))
    }
}

/// One complete recorded process execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace(Vec<Event>);

impl Trace {
    pub const fn new(events: Vec<Event>) -> Self {
        Self(events)
    }

    pub fn events(&self) -> &[Event] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.0.iter()
    }
}

impl From<Vec<Event>> for Trace {
    fn from(events: Vec<Event>) -> Self {
        Self(events)
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Iterates every event of a log in trace order.
pub fn all_events(log: &[Trace]) -> impl Iterator<Item = &Event> {
    log.iter().flat_map(Trace::iter)
}

/// Total number of events across all traces.
pub fn total_events(log: &[Trace]) -> usize {
    log.iter().map(Trace::len).sum()
}

/// Distinct activities in first-seen order.
pub fn activities_in_order(log: &[Trace]) -> Vec<&ActivityKey> {
    let mut seen = std::collections::HashSet::new();
    all_events(log)
        .map(|e| &e.activity)
        .filter(|a| seen.insert(*a))
        .collect()
}

//! Contextual information content.
//!
//! Each activity gets a context profile (lifecycle transition and group) taken
//! from its last occurrence in a bounded log prefix. The score is the weighted
//! self-information of the activity conditioned on that context:
//!
//! ```text
//! P(a | ctx) = |events named a matching ctx| / |events matching ctx|
//! IC_contextual(a) = -lambda * log2(P(a | ctx))
//! ```
//!
//! An event matches a context when both fields are equal, absent matching
//! absent. Counts are tabulated once over the prefix instead of rescanning it
//! per event; the resulting ratios are identical.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::event::{Event, Trace, all_events, total_events};
use crate::ic::{IcScores, weighted_information};
use crate::types::ActivityKey;

/// Events between progress reports.
const PROGRESS_INTERVAL: usize = 100;

/// The context fields an activity is conditioned on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextFields {
    pub lifecycle: Option<String>,
    pub group: Option<String>,
}

impl ContextFields {
    pub fn of(event: &Event) -> Self {
        Self {
            lifecycle: event.lifecycle.clone(),
            group: event.group.clone(),
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.lifecycle == event.lifecycle && self.group == event.group
    }
}

/// Activity to context mapping; later occurrences overwrite earlier ones.
pub type ContextProfile = BTreeMap<ActivityKey, ContextFields>;

/// Output of the contextual calculator.
#[derive(Debug, Clone, Default)]
pub struct ContextualScores {
    pub profile: ContextProfile,
    pub scores: IcScores,
}

/// The traces the contextual calculator looks at.
pub fn context_prefix(log: &[Trace], prefix_size: usize) -> &[Trace] {
    &log[..log.len().min(prefix_size)]
}

/// Builds the context profile from the last occurrence of each activity.
pub fn extract_profile(prefix: &[Trace]) -> ContextProfile {
    let total = total_events(prefix);
    let mut profile = ContextProfile::new();

    for (processed, event) in all_events(prefix).enumerate() {
        profile.insert(event.activity.clone(), ContextFields::of(event));
        if (processed + 1) % PROGRESS_INTERVAL == 0 {
            tracing::trace!(processed = processed + 1, total, "extracting context profile");
        }
    }

    profile
}

/// Event counts per context and per (activity, context) over the prefix.
struct ContextTable<'a> {
    by_context: HashMap<ContextFields, usize>,
    by_activity: HashMap<(&'a ActivityKey, ContextFields), usize>,
}

impl<'a> ContextTable<'a> {
    fn build(prefix: &'a [Trace]) -> Self {
        let mut by_context: HashMap<ContextFields, usize> = HashMap::new();
        let mut by_activity: HashMap<(&'a ActivityKey, ContextFields), usize> = HashMap::new();

        for event in all_events(prefix) {
            let fields = ContextFields::of(event);
            *by_activity
                .entry((&event.activity, fields.clone()))
                .or_default() += 1;
            *by_context.entry(fields).or_default() += 1;
        }

        Self {
            by_context,
            by_activity,
        }
    }

    /// `P(activity | context)`, or 0 when no event carries the context.
    fn conditional_probability(&self, activity: &'a ActivityKey, context: &ContextFields) -> f64 {
        let occurrences = self.by_context.get(context).copied().unwrap_or(0);
        if occurrences == 0 {
            return 0.0;
        }
        let matching = self
            .by_activity
            .get(&(activity, context.clone()))
            .copied()
            .unwrap_or(0);
        matching as f64 / occurrences as f64
    }
}

/// Computes the contextual score of every activity in the first
/// `prefix_size` traces.
pub fn contextual_ic(log: &[Trace], lambda: f64, prefix_size: usize) -> ContextualScores {
    let prefix = context_prefix(log, prefix_size);
    let profile = extract_profile(prefix);
    let scores = score_with_profile(prefix, lambda, &profile);
    ContextualScores { profile, scores }
}

/// Scores every event of `prefix` against a previously built profile.
pub fn score_with_profile(prefix: &[Trace], lambda: f64, profile: &ContextProfile) -> IcScores {
    let table = ContextTable::build(prefix);
    let total = total_events(prefix);
    let mut scores = IcScores::new();

    for (processed, event) in all_events(prefix).enumerate() {
        let activity = &event.activity;
        let score = if let Some(context) = profile.get(activity) {
            weighted_information(table.conditional_probability(activity, context), lambda)
        } else {
            tracing::warn!(%activity, "no context found for activity, score set to infinity");
            f64::INFINITY
        };
        scores.insert(activity.clone(), score);

        if (processed + 1) % PROGRESS_INTERVAL == 0 {
            tracing::trace!(processed = processed + 1, total, "contextual scoring progress");
        }
    }

    tracing::debug!(activities = scores.len(), "contextual scores computed");
    scores
}

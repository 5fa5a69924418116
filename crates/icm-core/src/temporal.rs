//! Temporal information content.
//!
//! Scores each activity by its occurrence probability, damped by any known
//! time intervals between it and other activities:
//!
//! ```text
//! adjusted(a) = P(a) * prod(exp(-interval_seconds / 60))   over relations containing a
//! IC_temporal(a) = -lambda * log2(adjusted(a))
//! ```
//!
//! With no relations supplied the adjustment factor is 1.

use std::collections::BTreeMap;

use chrono::TimeDelta;

use crate::event::{Trace, activities_in_order};
use crate::ic::{ActivityCounts, IcScores, weighted_information};
use crate::types::ActivityKey;

/// Supplies the time intervals relevant to an activity.
///
/// This is the seam for callers that know temporal relations between
/// activities; the calculator itself never derives them from the log.
pub trait TemporalRelationSource {
    /// Intervals of every relation whose activity pair contains `activity`.
    fn intervals_for(&self, activity: &ActivityKey) -> Vec<TimeDelta>;
}

/// An explicit map of activity pair to time interval.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalRelations {
    intervals: BTreeMap<(ActivityKey, ActivityKey), TimeDelta>,
}

impl TemporalRelations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the interval between two activities, replacing any previous one.
    pub fn insert(&mut self, from: ActivityKey, to: ActivityKey, interval: TimeDelta) {
        self.intervals.insert((from, to), interval);
    }
}

impl TemporalRelationSource for TemporalRelations {
    fn intervals_for(&self, activity: &ActivityKey) -> Vec<TimeDelta> {
        self.intervals
            .iter()
            .filter(|((from, to), _)| from == activity || to == activity)
            .map(|(_, interval)| *interval)
            .collect()
    }
}

/// Output of the temporal calculator.
#[derive(Debug, Clone, Default)]
pub struct TemporalScores {
    /// `count / total_events` per activity.
    pub probabilities: BTreeMap<ActivityKey, f64>,
    pub scores: IcScores,
}

/// Exponential decay with a one-minute scale.
fn adjustment_factor(interval: TimeDelta) -> f64 {
    let seconds = interval.num_milliseconds() as f64 / 1000.0;
    (-seconds / 60.0).exp()
}

/// Computes the temporal score of every activity in the log.
pub fn temporal_ic<S>(log: &[Trace], lambda: f64, relations: &S) -> TemporalScores
where
    S: TemporalRelationSource + ?Sized,
{
    let counts = ActivityCounts::from_log(log);
    let mut scores = IcScores::new();

    // Scores depend only on the activity, so every occurrence would write the
    // same value; evaluate once per distinct activity.
    for activity in activities_in_order(log) {
        let probability = counts.probability(activity);
        let adjusted = relations
            .intervals_for(activity)
            .into_iter()
            .fold(probability, |p, interval| p * adjustment_factor(interval));

        let score = weighted_information(adjusted, lambda);
        if score.is_infinite() {
            tracing::debug!(%activity, "temporal probability is zero, score set to infinity");
        }
        scores.insert(activity.clone(), score);
    }

    tracing::debug!(activities = scores.len(), "temporal scores computed");

    TemporalScores {
        probabilities: counts.probabilities(),
        scores,
    }
}

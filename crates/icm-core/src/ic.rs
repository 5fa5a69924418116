//! Shared information-content helpers.

use std::collections::BTreeMap;

use crate::event::{Trace, all_events};
use crate::types::ActivityKey;

/// Per-activity scores in bits. `f64::INFINITY` marks an undefined probability.
pub type IcScores = BTreeMap<ActivityKey, f64>;

/// Weighted self-information `-lambda * log2(p)`, or infinity when `p` is not positive.
pub fn weighted_information(probability: f64, lambda: f64) -> f64 {
    if probability > 0.0 {
        -lambda * probability.log2()
    } else {
        f64::INFINITY
    }
}

/// Raw occurrence counts per activity over a whole log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityCounts {
    counts: BTreeMap<ActivityKey, usize>,
    total: usize,
}

impl ActivityCounts {
    pub fn from_log(log: &[Trace]) -> Self {
        let mut counts: BTreeMap<ActivityKey, usize> = BTreeMap::new();
        let mut total = 0;
        for event in all_events(log) {
            *counts.entry(event.activity.clone()).or_default() += 1;
            total += 1;
        }
        Self { counts, total }
    }

    pub const fn total(&self) -> usize {
        self.total
    }

    fn count(&self, activity: &ActivityKey) -> usize {
        self.counts.get(activity).copied().unwrap_or(0)
    }

    /// `count / total`, or 0 for an unseen activity.
    pub fn probability(&self, activity: &ActivityKey) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(activity) as f64 / self.total as f64
    }

    pub fn probabilities(&self) -> BTreeMap<ActivityKey, f64> {
        self.counts
            .keys()
            .map(|a| (a.clone(), self.probability(a)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ActivityKey, usize)> {
        self.counts.iter().map(|(a, c)| (a, *c))
    }
}

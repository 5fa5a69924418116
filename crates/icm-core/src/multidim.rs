//! Multi-dimensional information content.
//!
//! Self-information of single activities and of activity pairs that co-occur
//! within a trace. Both use the total number of events as denominator, so
//! pair probabilities are normalized against event volume rather than against
//! the number of pairs.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};

use crate::event::Trace;
use crate::ic::ActivityCounts;
use crate::types::{ActivityKey, ActivitySet};

/// Scores keyed by one- or two-activity sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiDimScores {
    scores: BTreeMap<ActivitySet, f64>,
}

impl MultiDimScores {
    pub fn get(&self, set: &ActivitySet) -> Option<f64> {
        self.scores.get(set).copied()
    }

    /// Score of a single activity, or 0 when it was never observed.
    pub fn singleton(&self, activity: &ActivityKey) -> f64 {
        self.get(&ActivitySet::single(activity.clone()))
            .unwrap_or(0.0)
    }

    /// Score of a co-occurring pair, if the pair was observed in some trace.
    pub fn pair(&self, a: &ActivityKey, b: &ActivityKey) -> Option<f64> {
        ActivitySet::pair(a.clone(), b.clone()).and_then(|set| self.get(&set))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ActivitySet, f64)> {
        self.scores.iter().map(|(k, v)| (k, *v))
    }
}

#[derive(Serialize)]
struct MultiDimEntry<'a> {
    activities: &'a ActivitySet,
    score: f64,
}

/// Serialized as a list of `{activities, score}` entries in set order, since
/// activity sets cannot be JSON object keys.
impl Serialize for MultiDimScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.iter()
                .map(|(activities, score)| MultiDimEntry { activities, score }),
        )
    }
}

/// Number of traces in which each unordered pair of distinct activities co-occurs.
fn pair_counts(log: &[Trace]) -> BTreeMap<ActivitySet, usize> {
    let mut counts: BTreeMap<ActivitySet, usize> = BTreeMap::new();

    for trace in log {
        let distinct: BTreeSet<&ActivityKey> = trace.iter().map(|e| &e.activity).collect();
        let distinct: Vec<&ActivityKey> = distinct.into_iter().collect();

        for (i, a) in distinct.iter().enumerate() {
            for b in &distinct[i + 1..] {
                if let Some(set) = ActivitySet::pair((*a).clone(), (*b).clone()) {
                    *counts.entry(set).or_default() += 1;
                }
            }
        }
    }

    counts
}

/// Computes singleton and pair scores over the full log.
pub fn multidim_ic(log: &[Trace]) -> MultiDimScores {
    let counts = ActivityCounts::from_log(log);
    let total = counts.total() as f64;
    let mut scores = BTreeMap::new();

    for (activity, count) in counts.iter() {
        let probability = count as f64 / total;
        scores.insert(ActivitySet::single(activity.clone()), -probability.log2());
    }

    for (set, count) in pair_counts(log) {
        let probability = count as f64 / total;
        scores.insert(set, -probability.log2());
    }

    tracing::debug!(entries = scores.len(), "multi-dimensional scores computed");
    MultiDimScores { scores }
}

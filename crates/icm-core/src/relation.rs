//! Relation inference between adjacent ranked activities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RelationThresholds;
use crate::fusion::RankedActivity;
use crate::types::ActivityKey;

/// Control-flow relation between two activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Sequence,
    Parallel,
    Choice,
}

impl RelationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sequence => "sequence",
            Self::Parallel => "parallel",
            Self::Choice => "choice",
        }
    }

    /// Classifies an absolute score difference.
    ///
    /// Bands are checked in order: `diff <= sequence`, then
    /// `sequence < diff <= parallel_max`, then `diff > choice`. A difference
    /// that falls in none of them (NaN, or a gap between `parallel_max` and
    /// `choice`) has no relation.
    pub fn classify(diff: f64, thresholds: &RelationThresholds) -> Option<Self> {
        if diff <= thresholds.sequence {
            Some(Self::Sequence)
        } else if thresholds.sequence < diff && diff <= thresholds.parallel_max {
            Some(Self::Parallel)
        } else if diff > thresholds.choice {
            Some(Self::Choice)
        } else {
            None
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified relation from one ranked activity to the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEdge {
    pub source: ActivityKey,
    pub target: ActivityKey,
    pub kind: RelationKind,
}

impl RelationEdge {
    pub const fn new(source: ActivityKey, target: ActivityKey, kind: RelationKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }
}

/// Classifies every adjacent pair of the ranking.
pub fn infer_relations(
    ranking: &[RankedActivity],
    thresholds: &RelationThresholds,
) -> Vec<RelationEdge> {
    ranking
        .windows(2)
        .filter_map(|pair| {
            let (current, next) = (&pair[0], &pair[1]);
            let diff = (next.score - current.score).abs();
            let kind = RelationKind::classify(diff, thresholds);
            if kind.is_none() {
                tracing::debug!(
                    source = %current.activity,
                    target = %next.activity,
                    diff,
                    "score difference matches no relation"
                );
            }
            kind.map(|kind| {
                RelationEdge::new(current.activity.clone(), next.activity.clone(), kind)
            })
        })
        .collect()
}

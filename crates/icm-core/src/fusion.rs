//! Fusion of the four score dimensions into one ranking.

use serde::{Deserialize, Serialize};

use crate::event::{Trace, activities_in_order};
use crate::ic::IcScores;
use crate::multidim::MultiDimScores;
use crate::types::ActivityKey;

/// An activity and its fused score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedActivity {
    pub activity: ActivityKey,
    pub score: f64,
}

/// Borrowed view of the four per-dimension results.
#[derive(Debug, Clone, Copy)]
pub struct DimensionScores<'a> {
    pub temporal: &'a IcScores,
    pub contextual: &'a IcScores,
    pub multidim: &'a MultiDimScores,
    pub uncertainty: &'a IcScores,
}

impl DimensionScores<'_> {
    /// Mean of the four dimensions, with uncertainty negated. Absent scores count as 0.
    pub fn fused(&self, activity: &ActivityKey) -> f64 {
        let temporal = self.temporal.get(activity).copied().unwrap_or(0.0);
        let contextual = self.contextual.get(activity).copied().unwrap_or(0.0);
        let multidim = self.multidim.singleton(activity);
        let uncertainty = -self.uncertainty.get(activity).copied().unwrap_or(0.0);
        (temporal + contextual + multidim + uncertainty) / 4.0
    }
}

/// Ranks every activity of the log by fused score, highest first.
///
/// The sort is stable, so equal scores keep first-seen order. Infinite
/// scores rank ahead of all finite ones.
pub fn fuse(log: &[Trace], dimensions: &DimensionScores<'_>) -> Vec<RankedActivity> {
    let mut ranking: Vec<RankedActivity> = activities_in_order(log)
        .into_iter()
        .map(|activity| RankedActivity {
            activity: activity.clone(),
            score: dimensions.fused(activity),
        })
        .collect();

    ranking.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranking
}

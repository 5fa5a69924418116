//! End-to-end mining pipeline.
//!
//! The four calculators share no state and run concurrently; fusion waits for
//! all of them before ranking, inference and synthesis run in sequence.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, MinerConfig};
use crate::contextual::{ContextProfile, contextual_ic};
use crate::event::Trace;
use crate::fusion::{DimensionScores, RankedActivity, fuse};
use crate::ic::IcScores;
use crate::multidim::{MultiDimScores, multidim_ic};
use crate::relation::{RelationEdge, infer_relations};
use crate::synthesis::{ProcessModel, synthesize};
use crate::temporal::{TemporalRelationSource, TemporalRelations, TemporalScores, temporal_ic};
use crate::types::{ActivityKey, ActivitySet};
use crate::uncertainty::{UncertaintyError, UncertaintyFactors, UncertaintyScores, uncertainty_ic};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Uncertainty(#[from] UncertaintyError),
}

/// Per-activity scores for a single activity across all dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivityScores {
    pub temporal: Option<f64>,
    pub contextual: Option<f64>,
    pub multidim: Option<f64>,
    pub uncertainty: Option<f64>,
}

/// Everything the pipeline produced.
#[derive(Debug, Clone, Serialize)]
pub struct MiningReport {
    pub trace_count: usize,
    pub event_count: usize,
    /// `count / total_events` per activity.
    pub probabilities: BTreeMap<ActivityKey, f64>,
    pub temporal: IcScores,
    pub contextual: IcScores,
    pub context_profile: ContextProfile,
    /// Singleton and pair scores, as a list of entries.
    pub multidim: MultiDimScores,
    pub uncertainty: IcScores,
    pub uncertainty_factors: BTreeMap<ActivityKey, UncertaintyFactors>,
    pub ranking: Vec<RankedActivity>,
    pub relations: Vec<RelationEdge>,
    pub model: ProcessModel,
}

impl MiningReport {
    pub fn scores_for(&self, activity: &ActivityKey) -> ActivityScores {
        ActivityScores {
            temporal: self.temporal.get(activity).copied(),
            contextual: self.contextual.get(activity).copied(),
            multidim: self.multidim.get(&ActivitySet::single(activity.clone())),
            uncertainty: self.uncertainty.get(activity).copied(),
        }
    }
}

/// Runs the pipeline with no temporal relations.
pub fn mine(log: &[Trace], config: &MinerConfig) -> Result<MiningReport, MineError> {
    mine_with_relations(log, config, &TemporalRelations::new())
}

/// Runs the pipeline, adjusting temporal scores with `relations`.
pub fn mine_with_relations<S>(
    log: &[Trace],
    config: &MinerConfig,
    relations: &S,
) -> Result<MiningReport, MineError>
where
    S: TemporalRelationSource + Sync + ?Sized,
{
    config.validate()?;

    let event_count = crate::event::total_events(log);
    tracing::info!(traces = log.len(), events = event_count, "mining event log");

    let ((temporal, contextual), (multidim, uncertainty)) = rayon::join(
        || {
            rayon::join(
                || temporal_ic(log, config.lambda, relations),
                || contextual_ic(log, config.lambda, config.context_prefix_size),
            )
        },
        || rayon::join(|| multidim_ic(log), || uncertainty_ic(log)),
    );
    let UncertaintyScores {
        factors: uncertainty_factors,
        scores: uncertainty,
    } = uncertainty?;
    let TemporalScores {
        probabilities,
        scores: temporal,
    } = temporal;

    let ranking = fuse(
        log,
        &DimensionScores {
            temporal: &temporal,
            contextual: &contextual.scores,
            multidim: &multidim,
            uncertainty: &uncertainty,
        },
    );
    let relations = infer_relations(&ranking, &config.thresholds());
    let model = synthesize(&relations);

    tracing::info!(
        activities = ranking.len(),
        relations = relations.len(),
        places = model.net.place_count(),
        transitions = model.net.transition_count(),
        "mining complete"
    );

    Ok(MiningReport {
        trace_count: log.len(),
        event_count,
        probabilities,
        temporal,
        contextual: contextual.scores,
        context_profile: contextual.profile,
        multidim,
        uncertainty,
        uncertainty_factors,
        ranking,
        relations,
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::RelationKind;
    use crate::test_support::{assert_close, key, trace, trace_from};

    #[test]
    fn two_trace_log_reproduces_probabilities_and_order() {
        let log = vec![trace(&["A", "B"]), trace_from(10, &["A", "C"])];
        let report = mine(&log, &MinerConfig::default()).unwrap();

        assert_close(report.probabilities[&key("A")], 0.5);
        assert_close(report.probabilities[&key("B")], 0.25);
        assert_close(report.probabilities[&key("C")], 0.25);

        // A: (0.5 + 0.5 + 1 + log2(5.5)) / 4; B and C: (1 + 1 + 2 + log2(2.25)) / 4
        let expected_a = (2.0 + 5.5f64.log2()) / 4.0;
        let expected_bc = (4.0 + 2.25f64.log2()) / 4.0;

        let order: Vec<&str> = report
            .ranking
            .iter()
            .map(|r| r.activity.as_str())
            .collect();
        assert_eq!(order, vec!["B", "C", "A"]);
        assert_close(report.ranking[0].score, expected_bc);
        assert_close(report.ranking[1].score, expected_bc);
        assert_close(report.ranking[2].score, expected_a);

        // Differences 0 and ~0.178 are both sequences.
        assert_eq!(
            report.relations,
            vec![
                RelationEdge::new(key("B"), key("C"), RelationKind::Sequence),
                RelationEdge::new(key("C"), key("A"), RelationKind::Sequence),
            ]
        );
        assert_eq!(report.model.net.place_count(), 6);
        assert_eq!(report.model.net.transition_count(), 5);
    }

    #[test]
    fn frequent_and_rare_activity_ranking() {
        let mut names = vec!["A"; 10];
        names.push("B");
        let log = vec![trace(&names)];
        let report = mine(&log, &MinerConfig::default()).unwrap();

        // A: 10 missing resources, 10 non-numeric names, 9 extra timestamps.
        let p_a = 10.0f64 / 11.0;
        let p_b = 1.0f64 / 11.0;
        let expected_a = (-0.5 * p_a.log2() * 2.0 - p_a.log2() + (p_a + 29.0).log2()) / 4.0;
        let expected_b = (-0.5 * p_b.log2() * 2.0 - p_b.log2() + (p_b + 2.0).log2()) / 4.0;

        assert_eq!(report.ranking.len(), 2);
        assert_eq!(report.ranking[0].activity, key("B"));
        assert_eq!(report.ranking[1].activity, key("A"));
        assert_close(report.ranking[0].score, expected_b);
        assert_close(report.ranking[1].score, expected_a);
        assert!(report.ranking[0].score > report.ranking[1].score);
    }

    #[test]
    fn temporal_relations_flow_into_ranking() {
        let log = vec![trace(&["A", "B"]), trace_from(10, &["A", "C"])];
        let mut relations = TemporalRelations::new();
        relations.insert(key("A"), key("B"), chrono::TimeDelta::minutes(10));

        let plain = mine(&log, &MinerConfig::default()).unwrap();
        let adjusted = mine_with_relations(&log, &MinerConfig::default(), &relations).unwrap();

        assert!(adjusted.temporal[&key("A")] > plain.temporal[&key("A")]);
        assert_close(adjusted.temporal[&key("C")], plain.temporal[&key("C")]);

        let order = |report: &MiningReport| -> Vec<String> {
            report
                .ranking
                .iter()
                .map(|r| r.activity.to_string())
                .collect()
        };
        assert_eq!(order(&plain), vec!["B", "C", "A"]);
        assert_eq!(order(&adjusted), vec!["B", "A", "C"]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = MinerConfig {
            lambda: -1.0,
            ..MinerConfig::default()
        };
        let err = mine(&[trace(&["A"])], &config).unwrap_err();
        assert!(matches!(err, MineError::Config(ConfigError::InvalidLambda(_))));
    }

    #[test]
    fn empty_log_yields_bare_model() {
        let report = mine(&[], &MinerConfig::default()).unwrap();
        assert!(report.ranking.is_empty());
        assert!(report.relations.is_empty());
        assert_eq!(report.model.net.place_count(), 2);
    }

    #[test]
    fn scores_for_collects_every_dimension() {
        let log = vec![trace(&["A", "B"])];
        let report = mine(&log, &MinerConfig::default()).unwrap();
        let scores = report.scores_for(&key("A"));

        assert_close(scores.temporal.unwrap(), 0.5);
        assert_close(scores.contextual.unwrap(), 0.5);
        assert_close(scores.multidim.unwrap(), 1.0);
        assert!(scores.uncertainty.is_some());
        assert!(report.scores_for(&key("Z")).temporal.is_none());
    }
}

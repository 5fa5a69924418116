//! Uncertainty information content.
//!
//! Combines an activity's occurrence probability with a data-quality penalty
//! measured over all of its events:
//!
//! - missing data: one point per expected attribute absent from an event
//! - inconsistency: one point per attribute outside the expected set, and one
//!   per string value that is not purely numeric text (any Unicode digit)
//! - variability: for each attribute, the number of distinct values beyond the first
//!
//! The score is `-log2(probability + uncertainty)`. It is usually negative;
//! fusion inverts this dimension as a whole.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::event::{AttributeRef, Trace, all_events, keys};
use crate::ic::{ActivityCounts, IcScores};
use crate::types::ActivityKey;

/// Attributes every event is expected to carry.
pub const EXPECTED_ATTRIBUTES: [&str; 3] = [keys::ACTIVITY, keys::TIMESTAMP, keys::RESOURCE];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UncertaintyError {
    /// The logarithm argument must be positive; activities must have been observed.
    #[error(
        "probability plus uncertainty for {activity} must be positive, got {probability} + {uncertainty}"
    )]
    NonPositiveArgument {
        activity: ActivityKey,
        probability: f64,
        uncertainty: f64,
    },
}

/// Data-quality measurements for one activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UncertaintyFactors {
    pub missing: usize,
    pub inconsistency: usize,
    pub variability: usize,
}

impl UncertaintyFactors {
    pub const fn total(&self) -> usize {
        self.missing + self.inconsistency + self.variability
    }
}

/// Output of the uncertainty calculator.
#[derive(Debug, Clone, Default)]
pub struct UncertaintyScores {
    pub factors: BTreeMap<ActivityKey, UncertaintyFactors>,
    pub scores: IcScores,
}

/// Non-empty text made only of numeric characters. Non-ASCII digits such as
/// `٣` and `²` count; signs, separators and decimal points do not.
fn is_numeric_text(value: &str) -> bool {
    !value.is_empty() && value.chars().all(char::is_numeric)
}

/// Measures the data-quality factors of every event named `activity`.
pub fn measure_factors(log: &[Trace], activity: &ActivityKey) -> UncertaintyFactors {
    let mut factors = UncertaintyFactors::default();
    let mut values: HashMap<&str, HashSet<AttributeRef<'_>>> = HashMap::new();

    for event in all_events(log).filter(|e| &e.activity == activity) {
        let present: Vec<(&str, AttributeRef<'_>)> = event.attributes().collect();

        factors.missing += EXPECTED_ATTRIBUTES
            .iter()
            .filter(|expected| !present.iter().any(|(key, _)| key == *expected))
            .count();

        for (key, value) in present {
            if !EXPECTED_ATTRIBUTES.contains(&key) {
                factors.inconsistency += 1;
            }
            if matches!(value, AttributeRef::String(text) if !is_numeric_text(text)) {
                factors.inconsistency += 1;
            }
            values.entry(key).or_default().insert(value);
        }
    }

    factors.variability = values
        .values()
        .filter(|distinct| distinct.len() > 1)
        .map(|distinct| distinct.len() - 1)
        .sum();

    factors
}

/// Computes the uncertainty score of every activity in the log.
pub fn uncertainty_ic(log: &[Trace]) -> Result<UncertaintyScores, UncertaintyError> {
    let counts = ActivityCounts::from_log(log);
    let activity_total = counts.iter().count();
    let mut result = UncertaintyScores::default();

    for (index, (activity, _)) in counts.iter().enumerate() {
        let factors = measure_factors(log, activity);
        let probability = counts.probability(activity);
        let ic = score(activity, probability, factors.total() as f64)?;

        result.factors.insert(activity.clone(), factors);
        result.scores.insert(activity.clone(), ic);
        tracing::trace!(
            processed = index + 1,
            total = activity_total,
            "uncertainty scoring progress"
        );
    }

    tracing::debug!(activities = result.scores.len(), "uncertainty scores computed");
    Ok(result)
}

/// `-log2(probability + uncertainty)`, rejecting non-positive arguments.
pub fn score(
    activity: &ActivityKey,
    probability: f64,
    uncertainty: f64,
) -> Result<f64, UncertaintyError> {
    let argument = probability + uncertainty;
    if argument > 0.0 {
        Ok(-argument.log2())
    } else {
        Err(UncertaintyError::NonPositiveArgument {
            activity: activity.clone(),
            probability,
            uncertainty,
        })
    }
}

//! Information-content process mining.
//!
//! This crate contains the scoring and synthesis logic:
//! - Four information-content calculators (temporal, contextual,
//!   multi-dimensional, uncertainty)
//! - Fusion of the per-dimension scores into a ranking
//! - Relation inference between adjacent ranked activities
//! - Petri net synthesis from the inferred relations

pub mod config;
pub mod contextual;
pub mod event;
pub mod fusion;
mod ic;
pub mod multidim;
pub mod net;
mod pipeline;
pub mod relation;
pub mod synthesis;
pub mod temporal;
pub mod types;
pub mod uncertainty;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, MinerConfig, RelationThresholds};
pub use event::{AttributeValue, Event, Trace};
pub use fusion::RankedActivity;
pub use ic::{ActivityCounts, IcScores, weighted_information};
pub use net::{Marking, PetriNet, PlaceId, TransitionId};
pub use pipeline::{ActivityScores, MineError, MiningReport, mine, mine_with_relations};
pub use relation::{RelationEdge, RelationKind};
pub use synthesis::ProcessModel;
pub use temporal::{TemporalRelationSource, TemporalRelations};
pub use types::{ActivityKey, ActivitySet, ValidationError};

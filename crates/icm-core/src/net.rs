//! Arena-backed Petri net.
//!
//! Places and transitions live in indexed vectors; arcs refer to them by
//! index. An arc always connects a place to a transition or a transition to a
//! place, so the graph is bipartite by construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Index of a place in its net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub usize);

/// Index of a transition in its net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Activity label; several transitions may share one.
    pub label: String,
}

/// A directed arc between a place and a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "direction", rename_all = "snake_case")]
pub enum Arc {
    PlaceToTransition { place: PlaceId, transition: TransitionId },
    TransitionToPlace { transition: TransitionId, place: PlaceId },
}

impl Arc {
    pub const fn place(&self) -> PlaceId {
        match self {
            Self::PlaceToTransition { place, .. } | Self::TransitionToPlace { place, .. } => *place,
        }
    }

    pub const fn transition(&self) -> TransitionId {
        match self {
            Self::PlaceToTransition { transition, .. }
            | Self::TransitionToPlace { transition, .. } => *transition,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetriNet {
    places: Vec<Place>,
    transitions: Vec<Transition>,
    arcs: Vec<Arc>,
}

impl PetriNet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_place(&mut self, name: impl Into<String>) -> PlaceId {
        self.places.push(Place { name: name.into() });
        PlaceId(self.places.len() - 1)
    }

    pub fn add_transition(&mut self, label: impl Into<String>) -> TransitionId {
        self.transitions.push(Transition {
            label: label.into(),
        });
        TransitionId(self.transitions.len() - 1)
    }

    pub fn add_input_arc(&mut self, place: PlaceId, transition: TransitionId) {
        self.arcs.push(Arc::PlaceToTransition { place, transition });
    }

    pub fn add_output_arc(&mut self, transition: TransitionId, place: PlaceId) {
        self.arcs.push(Arc::TransitionToPlace { transition, place });
    }

    pub fn has_arc(&self, arc: &Arc) -> bool {
        self.arcs.contains(arc)
    }

    pub fn place(&self, id: PlaceId) -> Option<&Place> {
        self.places.get(id.0)
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.get(id.0)
    }

    pub fn places(&self) -> impl Iterator<Item = (PlaceId, &Place)> {
        self.places.iter().enumerate().map(|(i, p)| (PlaceId(i), p))
    }

    pub fn transitions(&self) -> impl Iterator<Item = (TransitionId, &Transition)> {
        self.transitions
            .iter()
            .enumerate()
            .map(|(i, t)| (TransitionId(i), t))
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Number of arcs entering a place.
    pub fn place_in_degree(&self, place: PlaceId) -> usize {
        self.arcs
            .iter()
            .filter(|arc| matches!(arc, Arc::TransitionToPlace { place: p, .. } if *p == place))
            .count()
    }

    /// Number of arcs leaving a place.
    pub fn place_out_degree(&self, place: PlaceId) -> usize {
        self.arcs
            .iter()
            .filter(|arc| matches!(arc, Arc::PlaceToTransition { place: p, .. } if *p == place))
            .count()
    }

    /// Places feeding a transition, in arc order.
    pub fn input_places(&self, transition: TransitionId) -> Vec<PlaceId> {
        self.arcs
            .iter()
            .filter_map(|arc| match arc {
                Arc::PlaceToTransition { place, transition: t } if *t == transition => {
                    Some(*place)
                }
                _ => None,
            })
            .collect()
    }

    /// Transitions carrying a label.
    pub fn transitions_labelled(&self, label: &str) -> Vec<TransitionId> {
        self.transitions()
            .filter(|(_, t)| t.label == label)
            .map(|(id, _)| id)
            .collect()
    }
}

/// Token counts per place. Places without tokens are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marking(BTreeMap<PlaceId, u32>);

impl Marking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, place: PlaceId, tokens: u32) {
        if tokens == 0 {
            self.0.remove(&place);
        } else {
            self.0.insert(place, tokens);
        }
    }

    pub fn tokens(&self, place: PlaceId) -> u32 {
        self.0.get(&place).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlaceId, u32)> {
        self.0.iter().map(|(p, t)| (*p, *t))
    }
}

//! Incremental process model synthesis from classified relations.
//!
//! # Algorithm
//!
//! 1. Start with a `start` place holding one token.
//! 2. For each relation, in order:
//!    - sequence: a fresh source transition fed by the source's last place,
//!      a fresh place, a fresh target transition and a fresh place that
//!      becomes the target's last place
//!    - parallel / choice: from the source's last place, one fresh transition
//!      and place per target; later relations of the same kind and source are
//!      folded into the same fan-out and are not replayed on their own, so each
//!      folded target gets exactly one transition labelled with the target
//! 3. Connect the last place of every end activity to one shared `End`
//!    transition feeding an `end` place, which holds the final token.
//!
//! Activities with no recorded last place continue from `start`. Transitions
//! are never reused, so an activity can appear as several transitions.
//! Parallel and choice produce the same structure.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::net::{Arc, Marking, PetriNet, PlaceId, TransitionId};
use crate::relation::{RelationEdge, RelationKind};
use crate::types::ActivityKey;

/// Label of the shared terminal transition.
pub const END_LABEL: &str = "End";

/// A synthesized net together with its markings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessModel {
    pub net: PetriNet,
    pub initial_marking: Marking,
    pub final_marking: Marking,
    pub start: PlaceId,
    pub end: PlaceId,
    pub end_transition: TransitionId,
}

/// Mutable synthesis state; consumed by [`NetBuilder::finish`].
struct NetBuilder {
    net: PetriNet,
    start: PlaceId,
    last_place: BTreeMap<ActivityKey, PlaceId>,
    places_created: usize,
}

impl NetBuilder {
    fn new() -> Self {
        let mut net = PetriNet::new();
        let start = net.add_place("start");
        Self {
            net,
            start,
            last_place: BTreeMap::new(),
            places_created: 0,
        }
    }

    fn fresh_place(&mut self) -> PlaceId {
        self.places_created += 1;
        self.net.add_place(format!("p{}", self.places_created))
    }

    fn place_of(&self, activity: &ActivityKey) -> PlaceId {
        self.last_place.get(activity).copied().unwrap_or(self.start)
    }

    fn sequence(&mut self, source: &ActivityKey, target: &ActivityKey) {
        let source_place = self.place_of(source);
        let source_transition = self.net.add_transition(source.as_str());
        self.net.add_input_arc(source_place, source_transition);

        let between = self.fresh_place();
        self.net.add_output_arc(source_transition, between);

        let target_transition = self.net.add_transition(target.as_str());
        self.net.add_input_arc(between, target_transition);

        let after = self.fresh_place();
        self.net.add_output_arc(target_transition, after);
        self.last_place.insert(target.clone(), after);
    }

    fn fan_out(&mut self, source: &ActivityKey, targets: &[&ActivityKey]) {
        let divergence = self.place_of(source);
        for target in targets {
            let transition = self.net.add_transition(target.as_str());
            self.net.add_input_arc(divergence, transition);

            let after = self.fresh_place();
            self.net.add_output_arc(transition, after);
            self.last_place.insert((*target).clone(), after);
        }
    }

    fn finish(mut self, edges: &[RelationEdge]) -> ProcessModel {
        let end_transition = self.net.add_transition(END_LABEL);

        // Every source except the last relation's counts as continuing.
        let continuing: HashSet<&ActivityKey> = edges[..edges.len().saturating_sub(1)]
            .iter()
            .map(|e| &e.source)
            .collect();
        let terminal_places: Vec<PlaceId> = self
            .last_place
            .iter()
            .filter(|(activity, _)| !continuing.contains(activity))
            .map(|(_, place)| *place)
            .collect();
        for place in terminal_places {
            self.connect_to_end(place, end_transition);
        }

        for activity in end_activities(edges) {
            if let Some(place) = self.last_place.get(activity).copied() {
                self.connect_to_end(place, end_transition);
            }
        }

        let end = self.net.add_place("end");
        self.net.add_output_arc(end_transition, end);

        let mut initial_marking = Marking::new();
        initial_marking.set(self.start, 1);
        let mut final_marking = Marking::new();
        final_marking.set(end, 1);

        ProcessModel {
            net: self.net,
            initial_marking,
            final_marking,
            start: self.start,
            end,
            end_transition,
        }
    }

    fn connect_to_end(&mut self, place: PlaceId, end_transition: TransitionId) {
        let arc = Arc::PlaceToTransition {
            place,
            transition: end_transition,
        };
        if !self.net.has_arc(&arc) {
            self.net.add_input_arc(place, end_transition);
        }
    }
}

/// Sources that never appear as a target, in first-seen order.
pub fn end_activities(edges: &[RelationEdge]) -> Vec<&ActivityKey> {
    let targets: HashSet<&ActivityKey> = edges.iter().map(|e| &e.target).collect();
    let mut seen = HashSet::new();
    edges
        .iter()
        .map(|e| &e.source)
        .filter(|source| !targets.contains(source) && seen.insert(*source))
        .collect()
}

/// Builds a process model from relations in the order given.
pub fn synthesize(edges: &[RelationEdge]) -> ProcessModel {
    let mut builder = NetBuilder::new();
    let mut folded = vec![false; edges.len()];

    for (i, edge) in edges.iter().enumerate() {
        if folded[i] {
            continue;
        }
        match edge.kind {
            RelationKind::Sequence => builder.sequence(&edge.source, &edge.target),
            RelationKind::Parallel | RelationKind::Choice => {
                let mut targets = vec![&edge.target];
                for (j, later) in edges.iter().enumerate().skip(i + 1) {
                    if !folded[j] && later.kind == edge.kind && later.source == edge.source {
                        targets.push(&later.target);
                        folded[j] = true;
                    }
                }
                builder.fan_out(&edge.source, &targets);
            }
        }
    }

    let model = builder.finish(edges);
    tracing::debug!(
        places = model.net.place_count(),
        transitions = model.net.transition_count(),
        arcs = model.net.arcs().len(),
        "process model synthesized"
    );
    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::key;

    fn edge(source: &str, target: &str, kind: RelationKind) -> RelationEdge {
        RelationEdge::new(key(source), key(target), kind)
    }

    fn place_named(model: &ProcessModel, name: &str) -> PlaceId {
        model
            .net
            .places()
            .find(|(_, p)| p.name == name)
            .map(|(id, _)| id)
            .unwrap()
    }

    #[test]
    fn sequence_chain_structure() {
        let edges = vec![
            edge("A", "B", RelationKind::Sequence),
            edge("B", "C", RelationKind::Sequence),
            edge("C", "D", RelationKind::Sequence),
        ];
        let model = synthesize(&edges);
        let net = &model.net;

        // start, two places per relation, end
        assert_eq!(net.place_count(), 8);
        // two transitions per relation, plus End
        assert_eq!(net.transition_count(), 7);
        assert_eq!(net.transitions_labelled("B").len(), 2);
        assert_eq!(net.transitions_labelled("C").len(), 2);

        assert_eq!(model.initial_marking.total(), 1);
        assert_eq!(model.initial_marking.tokens(model.start), 1);
        assert_eq!(model.final_marking.total(), 1);
        assert_eq!(model.final_marking.tokens(model.end), 1);

        for (id, _) in net.places() {
            if id == model.start || id == model.end {
                continue;
            }
            assert!(net.place_in_degree(id) >= 1, "place {id:?} has no input");
            assert!(net.place_out_degree(id) >= 1, "place {id:?} has no output");
        }

        // C and D are not sources of the leading relations.
        assert_eq!(
            net.input_places(model.end_transition),
            vec![place_named(&model, "p4"), place_named(&model, "p6")]
        );
        assert_eq!(net.place_in_degree(model.end), 1);
    }

    #[test]
    fn sequence_continues_from_target_place() {
        let edges = vec![
            edge("A", "B", RelationKind::Sequence),
            edge("B", "C", RelationKind::Sequence),
        ];
        let model = synthesize(&edges);
        let net = &model.net;

        // The second B transition is fed by the place after the first B.
        let second_b = net.transitions_labelled("B")[1];
        assert_eq!(net.input_places(second_b), vec![place_named(&model, "p2")]);
    }

    #[test]
    fn parallel_fans_out_from_start() {
        let edges = vec![edge("A", "B", RelationKind::Parallel)];
        let model = synthesize(&edges);
        let net = &model.net;

        assert_eq!(net.place_count(), 3);
        assert_eq!(net.transition_count(), 2);
        assert!(net.transitions_labelled("A").is_empty());

        let b = net.transitions_labelled("B")[0];
        assert_eq!(net.input_places(b), vec![model.start]);
        assert_eq!(
            net.input_places(model.end_transition),
            vec![place_named(&model, "p1")]
        );
    }

    #[test]
    fn choice_matches_parallel_structure() {
        let parallel = synthesize(&[
            edge("A", "B", RelationKind::Sequence),
            edge("B", "C", RelationKind::Parallel),
        ]);
        let choice = synthesize(&[
            edge("A", "B", RelationKind::Sequence),
            edge("B", "C", RelationKind::Choice),
        ]);

        assert_eq!(parallel, choice);
    }

    #[test]
    fn same_source_branches_share_divergence_place() {
        let edges = vec![
            edge("A", "B", RelationKind::Choice),
            edge("A", "C", RelationKind::Choice),
        ];
        let model = synthesize(&edges);
        let net = &model.net;

        // The second relation is folded into the first fan-out.
        assert_eq!(net.transition_count(), 3);
        assert!(net.transitions_labelled("A").is_empty());
        assert_eq!(net.transitions_labelled("C").len(), 1);
        assert_eq!(net.place_count(), 4);
        let b = net.transitions_labelled("B")[0];
        let c = net.transitions_labelled("C")[0];
        assert_eq!(net.input_places(b), vec![model.start]);
        assert_eq!(net.input_places(c), vec![model.start]);
        assert_eq!(net.input_places(model.end_transition).len(), 2);
    }

    #[test]
    fn branch_after_sequence_starts_at_last_place() {
        let edges = vec![
            edge("A", "B", RelationKind::Sequence),
            edge("B", "C", RelationKind::Parallel),
        ];
        let model = synthesize(&edges);
        let net = &model.net;

        let c = net.transitions_labelled("C")[0];
        let p2 = place_named(&model, "p2");
        assert_eq!(net.input_places(c), vec![p2]);
        // p2 feeds both C and End.
        assert_eq!(net.place_out_degree(p2), 2);
    }

    #[test]
    fn no_relations_yields_bare_start_and_end() {
        let model = synthesize(&[]);

        assert_eq!(model.net.place_count(), 2);
        assert_eq!(model.net.transition_count(), 1);
        assert!(model.net.input_places(model.end_transition).is_empty());
        assert_eq!(model.initial_marking.total(), 1);
        assert_eq!(model.final_marking.total(), 1);
    }

    #[test]
    fn end_activities_are_sources_never_targeted() {
        let edges = vec![
            edge("A", "B", RelationKind::Sequence),
            edge("B", "C", RelationKind::Parallel),
            edge("D", "E", RelationKind::Choice),
        ];
        let ends: Vec<&str> = end_activities(&edges)
            .into_iter()
            .map(ActivityKey::as_str)
            .collect();
        assert_eq!(ends, vec!["A", "D"]);
    }

    #[test]
    fn net_is_bipartite() {
        let edges = vec![
            edge("A", "B", RelationKind::Sequence),
            edge("B", "C", RelationKind::Parallel),
            edge("C", "D", RelationKind::Choice),
        ];
        let model = synthesize(&edges);

        for arc in model.net.arcs() {
            assert!(model.net.place(arc.place()).is_some());
            assert!(model.net.transition(arc.transition()).is_some());
        }
    }
}

//! Graphviz DOT rendering of process models.

use std::fmt::{self, Write};

use icm_core::ProcessModel;
use icm_core::net::Arc;

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Renders a model as a left-to-right DOT digraph.
///
/// Places are circles labelled with their name and, when marked initially,
/// their token count. Places of the final marking get a double border.
/// Transitions are boxes labelled with their activity.
pub fn to_dot(model: &ProcessModel) -> Result<String, fmt::Error> {
    let net = &model.net;
    let mut out = String::from("digraph process {\n    rankdir=LR;\n");

    for (id, place) in net.places() {
        let tokens = model.initial_marking.tokens(id);
        let label = if tokens > 0 {
            format!("{} ({tokens})", place.name)
        } else {
            place.name.clone()
        };
        let border = if model.final_marking.tokens(id) > 0 {
            ", peripheries=2"
        } else {
            ""
        };
        writeln!(
            out,
            "    p{} [shape=circle{border}, label=\"{}\"];",
            id.0,
            escape(&label)
        )?;
    }

    for (id, transition) in net.transitions() {
        writeln!(
            out,
            "    t{} [shape=box, label=\"{}\"];",
            id.0,
            escape(&transition.label)
        )?;
    }

    for arc in net.arcs() {
        match arc {
            Arc::PlaceToTransition { place, transition } => {
                writeln!(out, "    p{} -> t{};", place.0, transition.0)
            }
            Arc::TransitionToPlace { transition, place } => {
                writeln!(out, "    t{} -> p{};", transition.0, place.0)
            }
        }?;
    }

    out.push_str("}\n");
    Ok(out)
}

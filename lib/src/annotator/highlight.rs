//! Post-passes emphasising a provenance or a set of critical attacks.
use std::collections::BTreeSet;

use crate::{
    af::Af,
    config::Palette,
    critical::CriticalSet,
    graph::{Band, BandKind, GraphDescription},
    provenance::{LocalView, Provenance, ProvenanceKind},
    ranking::Ranking,
};

use super::style::{primed_label, Arrow, Direction, Line, NodeClass};

/// Fades everything outside of the provenance.
///
/// Potential and actual provenances drop the rank from the node labels and reduce the edges to
/// their color; a primary provenance keeps every edge attribute. With a local view, the edges are
/// directed and layered by their distance towards the target instead of the ranking.
pub fn provenance(
    graph: &mut GraphDescription,
    af: &Af,
    provenance: &Provenance,
    local_view: Option<&LocalView>,
    palette: &Palette,
) {
    let nodes: BTreeSet<&str> = provenance.nodes.iter().map(|&arg| af.id(arg)).collect();
    let edges: BTreeSet<(&str, &str)> = provenance
        .edges
        .iter()
        .map(|attack| (af.id(attack.from), af.id(attack.to)))
        .collect();
    let target = af.id(provenance.target);
    let reduced = matches!(
        provenance.kind,
        ProvenanceKind::Potential | ProvenanceKind::Actual
    );

    for node in graph.nodes.iter_mut() {
        if reduced {
            node.label = node.id.clone();
        }
        if !nodes.contains(node.id.as_str()) {
            node.border = Some(palette.faded_border.clone());
            if node.fill.is_some() {
                node.fill = Some(palette.faded_fill.clone());
            }
            continue;
        }
        if provenance.kind == ProvenanceKind::Potential {
            node.fill = Some(palette.highlight_fill.clone());
        }
        if node.id == target {
            node.pen_width = Some(5.0);
        }
    }

    for edge in graph.edges.iter_mut() {
        if let Some(view) = local_view {
            let distance = |id: &str| af.arg(id).and_then(|arg| view.distance(arg));
            edge.direction = match (distance(&edge.from), distance(&edge.to)) {
                (Some(from), Some(to)) => Direction::by_distance(from, to),
                _ => Direction::Forward,
            };
        }
        let highlighted = edges.contains(&(edge.from.as_str(), edge.to.as_str()));
        if highlighted && provenance.kind == ProvenanceKind::Primary {
            continue;
        }
        edge.color = Some(match (highlighted, provenance.kind) {
            (false, _) => palette.faded_edge.clone(),
            (true, ProvenanceKind::Potential) => palette.highlight_edge.clone(),
            (true, _) => edge
                .color
                .clone()
                .unwrap_or_else(|| palette.highlight_edge.clone()),
        });
        edge.line = match edge.direction {
            Direction::Reversed => Line::Dashed,
            Direction::Forward => Line::Solid,
        };
        edge.arrow = Arrow::Normal;
        edge.label = None;
    }

    if let Some(view) = local_view {
        graph.bands = view
            .bands()
            .into_values()
            .map(|members| Band {
                kind: BandKind::Same,
                members: members.into_iter().map(|arg| af.id(arg).to_string()).collect(),
            })
            .collect();
    }
}

/// Marks the selected attacks with an error stroke, and draws never-settling arguments dashed.
///
/// Selected attacks are dashed whatever their direction.
pub fn critical(
    graph: &mut GraphDescription,
    af: &Af,
    ranking: &Ranking,
    selection: &CriticalSet,
    palette: &Palette,
) {
    if selection.is_empty() {
        return;
    }
    for (arg, node) in af.args().zip(graph.nodes.iter_mut()) {
        if node.class != NodeClass::Plain && ranking.rank(arg).is_unbounded() {
            node.line = Line::Dashed;
            node.pen_width.get_or_insert(1.5);
        }
    }
    for (&attack, edge) in af.attacks().iter().zip(graph.edges.iter_mut()) {
        if selection.contains(af, attack) {
            edge.color = Some(palette.critical.clone());
            edge.line = Line::Dashed;
        }
    }
}

/// Relabels a description built from the ranking after a fix was applied.
///
/// Arguments which only settle because of the fix carry a primed rank; the round labels of the
/// edges are dropped.
pub fn apply(graph: &mut GraphDescription, af: &Af, before: &Ranking, after: &Ranking) {
    for arg in after.newly_bounded(before) {
        if let Some(node) = graph.nodes.get_mut(arg.value()) {
            node.label = primed_label(af.id(arg), after.rank(arg));
        }
    }
    for edge in graph.edges.iter_mut() {
        edge.label = None;
    }
}

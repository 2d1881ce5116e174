//! Embedded layered placement.
//!
//! Nodes are layered by their distance from the sources of the constraining edges, as drawn.
//! Nodes sharing a band are moved to the deepest layer of the band; nodes only reachable through
//! cycles are put below all other layers.
use std::collections::{HashMap, VecDeque};

use crate::{
    annotator::style::Direction,
    config::RankDir,
    graph::{BandKind, GraphDescription},
};

use super::{LayoutEngine, LayoutError, Point, Positions};

/// Deterministic grid placement, needing no external tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layered {
    spacing: f64,
}

impl Default for Layered {
    fn default() -> Self {
        Self { spacing: 1.5 }
    }
}

impl Layered {
    /// Creates an engine with the given distance between neighbouring nodes.
    pub fn new(spacing: f64) -> Self {
        Self { spacing }
    }

    fn layers(graph: &GraphDescription) -> Vec<usize> {
        let index: HashMap<&str, usize> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(pos, node)| (node.id.as_str(), pos))
            .collect();
        let mut successors = vec![Vec::new(); graph.nodes.len()];
        let mut indegree = vec![0usize; graph.nodes.len()];
        for edge in graph.edges.iter().filter(|edge| edge.constraint) {
            let (tail, head) = match edge.direction {
                Direction::Forward => (&edge.from, &edge.to),
                Direction::Reversed => (&edge.to, &edge.from),
            };
            if let (Some(&tail), Some(&head)) = (index.get(tail.as_str()), index.get(head.as_str())) {
                if tail != head {
                    successors[tail].push(head);
                    indegree[head] += 1;
                }
            }
        }
        let mut layer: Vec<Option<usize>> = vec![None; graph.nodes.len()];
        let mut queue: VecDeque<usize> = (0..graph.nodes.len())
            .filter(|&pos| indegree[pos] == 0)
            .collect();
        for &pos in queue.iter() {
            layer[pos] = Some(0);
        }
        while let Some(pos) = queue.pop_front() {
            let next = layer[pos].map_or(0, |value| value + 1);
            for &succ in successors[pos].iter() {
                if layer[succ].is_none() {
                    layer[succ] = Some(next);
                    queue.push_back(succ);
                }
            }
        }
        let deepest = layer.iter().flatten().max().map_or(0, |value| value + 1);
        let mut layer: Vec<usize> = layer.into_iter().map(|value| value.unwrap_or(deepest)).collect();
        for band in graph.bands.iter() {
            let members: Vec<usize> = band
                .members
                .iter()
                .filter_map(|id| index.get(id.as_str()).copied())
                .collect();
            let common = match band.kind {
                BandKind::Same => members.iter().map(|&pos| layer[pos]).max(),
                BandKind::Min => Some(0),
            };
            if let Some(common) = common {
                for pos in members {
                    layer[pos] = common;
                }
            }
        }
        layer
    }
}

impl LayoutEngine for Layered {
    fn layout(&self, graph: &GraphDescription) -> Result<Positions, LayoutError> {
        let layers = Self::layers(graph);
        let mut used: HashMap<usize, usize> = HashMap::new();
        let mut positions = Positions::default();
        for (node, &depth) in graph.nodes.iter().zip(layers.iter()) {
            let column = used.entry(depth).or_insert(0);
            let along = *column as f64 * self.spacing;
            let across = depth as f64 * self.spacing;
            *column += 1;
            let point = match graph.rank_dir {
                RankDir::TB => Point::new(along, -across),
                RankDir::BT => Point::new(along, across),
                RankDir::LR => Point::new(across, -along),
                RankDir::RL => Point::new(-across, -along),
            };
            positions.insert(node.id.clone(), point);
        }
        log::debug!("layered {} nodes in {} layers", positions.len(), used.len());
        Ok(positions)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::{Band, Edge, Node};
    use test_log::test;

    fn graph(edges: Vec<Edge>, bands: Vec<Band>) -> GraphDescription {
        GraphDescription {
            name: "g".into(),
            rank_dir: RankDir::TB,
            frozen: false,
            nodes: ["a", "b", "c", "d"].into_iter().map(Node::plain).collect(),
            edges,
            bands,
        }
    }

    #[test]
    fn chain() {
        let g = graph(
            vec![Edge::plain("a", "b"), Edge::plain("b", "c")],
            Vec::new(),
        );
        assert_eq!(Layered::layers(&g), vec![0, 1, 2, 0]);
        let positions = Layered::default().layout(&g).unwrap();
        assert_eq!(positions.get("a"), Some(Point::new(0.0, 0.0)));
        assert_eq!(positions.get("d"), Some(Point::new(1.5, 0.0)));
        assert_eq!(positions.get("c"), Some(Point::new(0.0, -3.0)));
    }

    #[test]
    fn reversed_and_free_edges() {
        let mut back = Edge::plain("b", "a");
        back.direction = Direction::Reversed;
        let mut loose = Edge::plain("c", "d");
        loose.constraint = false;
        let g = graph(vec![Edge::plain("a", "b"), back, loose], Vec::new());
        assert_eq!(Layered::layers(&g), vec![0, 1, 0, 0]);
    }

    #[test]
    fn cycles_and_bands() {
        let g = graph(
            vec![Edge::plain("a", "b"), Edge::plain("c", "d"), Edge::plain("d", "c")],
            vec![Band {
                kind: BandKind::Same,
                members: vec!["a".into(), "b".into()],
            }],
        );
        assert_eq!(Layered::layers(&g), vec![1, 1, 2, 2]);
    }
}

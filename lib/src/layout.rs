//! Static layout engines, which place the nodes of a [GraphDescription].
use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::graph::GraphDescription;

#[cfg(feature = "graphviz")]
pub mod graphviz;
pub mod layered;

/// Errors of a [LayoutEngine].
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The engine is not installed.
    #[error("layout engine is unavailable: {0}")]
    Unavailable(String),
    /// The engine exceeded its time limit.
    #[error("layout engine exceeded its limit of {0:?}")]
    Timeout(Duration),
    /// The engine terminated with an error.
    #[error("layout engine failed with code {code:?}: {message}")]
    Failed {
        /// Exit code, if the engine was not killed by a signal.
        code: Option<i32>,
        /// Diagnostics of the engine.
        message: String,
    },
    /// The output of the engine could not be read.
    #[error("cannot read layout: {0}")]
    Parse(String),
    /// Communication with the engine failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Node coordinates by argument id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Positions(BTreeMap<String, Point>);

impl Positions {
    /// Returns the coordinates of the node, if it was placed.
    pub fn get(&self, id: &str) -> Option<Point> {
        self.0.get(id).copied()
    }

    /// Places a node.
    pub fn insert(&mut self, id: impl Into<String>, point: Point) {
        self.0.insert(id.into(), point);
    }

    /// Number of placed nodes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns [true] if no node is placed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the placed nodes in the order of their ids.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Point)> {
        self.0.iter().map(|(id, point)| (id.as_str(), *point))
    }
}

impl FromIterator<(String, Point)> for Positions {
    fn from_iter<T: IntoIterator<Item = (String, Point)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Places the nodes of a graph description.
pub trait LayoutEngine {
    /// Computes coordinates for every node of the graph.
    fn layout(&self, graph: &GraphDescription) -> Result<Positions, LayoutError>;
}

impl<E: LayoutEngine + ?Sized> LayoutEngine for Box<E> {
    fn layout(&self, graph: &GraphDescription) -> Result<Positions, LayoutError> {
        (**self).layout(graph)
    }
}

impl<E: LayoutEngine + ?Sized> LayoutEngine for &E {
    fn layout(&self, graph: &GraphDescription) -> Result<Positions, LayoutError> {
        (**self).layout(graph)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn positions() {
        let mut positions: Positions = [("b".to_string(), Point::new(1.0, 2.0))].into_iter().collect();
        positions.insert("a", Point::new(0.5, 0.0));
        assert_eq!(positions.len(), 2);
        assert_eq!(positions.get("a"), Some(Point::new(0.5, 0.0)));
        assert_eq!(positions.get("c"), None);
        assert_eq!(
            positions.iter().map(|(id, _)| id).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(
            serde_json::to_string(&positions).unwrap(),
            r#"{"a":{"x":0.5,"y":0.0},"b":{"x":1.0,"y":2.0}}"#
        );
    }
}

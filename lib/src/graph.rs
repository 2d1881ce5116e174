/*!
Renderer-ready description of a framework.

A [GraphDescription] carries every visual decision, so a renderer can draw it without knowing
anything about argumentation. It is serialisable and its [Display] implementation writes the
Graphviz DOT language.
*/
use std::fmt::{Display, Write};

use serde::{Deserialize, Serialize};

use crate::{
    annotator::style::{Arrow, Direction, EdgeClass, Line, NodeClass},
    config::RankDir,
    layout::Point,
};

/// A node of the description, one per argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier of the argument.
    pub id: String,
    /// Displayed text.
    pub label: String,
    /// Visual class.
    pub class: NodeClass,
    /// Fill color; unfilled if absent.
    pub fill: Option<String>,
    /// Border color.
    pub border: Option<String>,
    /// Border style.
    pub line: Line,
    /// Border width.
    pub pen_width: Option<f64>,
    /// Hover text.
    pub tooltip: Option<String>,
    /// Link target.
    pub url: Option<String>,
    /// Coordinates, if the node has been placed.
    pub position: Option<Point>,
}

impl Node {
    /// An unstyled node.
    pub fn plain(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            class: NodeClass::Plain,
            fill: None,
            border: None,
            line: Line::Solid,
            pen_width: None,
            tooltip: None,
            url: None,
            position: None,
        }
    }
}

/// An edge of the description, one per attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// The attacker.
    pub from: String,
    /// The attacked argument.
    pub to: String,
    /// Visual class.
    pub class: EdgeClass,
    /// Drawing direction.
    pub direction: Direction,
    /// Stroke color.
    pub color: Option<String>,
    /// Stroke style.
    pub line: Line,
    /// Arrow head.
    pub arrow: Arrow,
    /// Text at the attacker's end.
    pub label: Option<String>,
    /// Whether the edge constrains the layering.
    pub constraint: bool,
    /// Hover text.
    pub tooltip: Option<String>,
}

impl Edge {
    /// An unstyled edge.
    pub fn plain(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            class: EdgeClass::Plain,
            direction: Direction::Forward,
            color: None,
            line: Line::Solid,
            arrow: Arrow::Normal,
            label: None,
            constraint: true,
            tooltip: None,
        }
    }
}

/// How the members of a [Band] are aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BandKind {
    /// All members share a layer.
    Same,
    /// The members share the first layer.
    Min,
}

/// A group of nodes placed on a common layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    /// Alignment of the members.
    pub kind: BandKind,
    /// Identifiers of the members.
    pub members: Vec<String>,
}

/// A fully styled graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    /// Name of the framework.
    pub name: String,
    /// Direction of the layers.
    pub rank_dir: RankDir,
    /// Whether the node positions are pinned.
    pub frozen: bool,
    /// The nodes, in the order of the arguments.
    pub nodes: Vec<Node>,
    /// The edges, in the order of the attacks.
    pub edges: Vec<Edge>,
    /// Layer constraints.
    pub bands: Vec<Band>,
}

impl GraphDescription {
    /// Returns the node of the given argument.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Returns the edge of the given attack.
    pub fn edge(&self, from: &str, to: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|edge| edge.from == from && edge.to == to)
    }

    /// Returns [true] if every node has been placed.
    pub fn is_placed(&self) -> bool {
        self.nodes.iter().all(|node| node.position.is_some())
    }
}

/// Quotes a DOT identifier.
pub(crate) fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

struct Attributes(Vec<(&'static str, String)>);

impl Attributes {
    fn new() -> Self {
        Self(Vec::new())
    }

    fn quoted(&mut self, key: &'static str, value: &str) -> &mut Self {
        self.0.push((key, quote(value)));
        self
    }

    fn raw(&mut self, key: &'static str, value: impl Display) -> &mut Self {
        self.0.push((key, value.to_string()));
        self
    }
}

impl Display for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        let joined = self
            .0
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, " [{joined}]")
    }
}

impl Node {
    fn attributes(&self, frozen: bool) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.quoted("label", &self.label);
        let mut styles = Vec::new();
        if self.fill.is_some() {
            styles.push("filled".to_string());
        }
        if self.line != Line::Solid {
            styles.push(self.line.to_string());
        }
        if !styles.is_empty() {
            attributes.quoted("style", &styles.join(","));
        }
        if let Some(fill) = &self.fill {
            attributes.quoted("fillcolor", fill);
        }
        if let Some(border) = &self.border {
            attributes.quoted("color", border);
        }
        if let Some(width) = self.pen_width {
            attributes.raw("penwidth", width);
        }
        if let Some(tooltip) = &self.tooltip {
            attributes.quoted("tooltip", tooltip);
        }
        if let Some(url) = &self.url {
            attributes.quoted("URL", url).quoted("target", "_blank");
        }
        if let (true, Some(point)) = (frozen, self.position) {
            attributes.quoted("pos", &format!("{},{}!", point.x, point.y));
        }
        attributes
    }
}

impl Edge {
    fn attributes(&self) -> Attributes {
        let mut attributes = Attributes::new();
        let reversed = self.direction == Direction::Reversed;
        if reversed {
            attributes.raw("dir", "back");
        }
        if let Some(color) = &self.color {
            attributes.quoted("color", color).quoted("fontcolor", color);
        }
        if self.class != EdgeClass::Plain || self.line != Line::Solid {
            attributes.quoted("style", &self.line.to_string());
        }
        if self.arrow != Arrow::Normal {
            let arrow = self.arrow.to_string();
            attributes
                .quoted("arrowhead", &arrow)
                .quoted("arrowtail", &arrow);
        }
        if !self.constraint {
            attributes.quoted("constraint", "false");
        }
        if let Some(label) = &self.label {
            attributes.quoted(if reversed { "headlabel" } else { "taillabel" }, label);
        }
        if let Some(tooltip) = &self.tooltip {
            attributes.quoted("tooltip", tooltip);
        }
        attributes
    }
}

impl Display for GraphDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "digraph {} {{", quote(&self.name))?;
        if self.frozen {
            writeln!(f, "    graph [layout=neato overlap=false]")?;
        } else {
            writeln!(f, "    layout=dot")?;
        }
        writeln!(f, "    rankdir={}", self.rank_dir)?;
        writeln!(
            f,
            "    node [fontname=\"helvetica\" shape=circle fixedsize=true width=0.8 height=0.8 fontsize=14]"
        )?;
        writeln!(
            f,
            "    edge [labeldistance=1.5 fontsize=12 fontname=\"helvetica\"]"
        )?;
        writeln!(f)?;
        for node in self.nodes.iter() {
            writeln!(
                f,
                "    {}{}",
                quote(&node.id),
                node.attributes(self.frozen)
            )?;
        }
        writeln!(f)?;
        for edge in self.edges.iter() {
            let (tail, head) = match edge.direction {
                Direction::Forward => (&edge.from, &edge.to),
                Direction::Reversed => (&edge.to, &edge.from),
            };
            writeln!(
                f,
                "    {} -> {}{}",
                quote(tail),
                quote(head),
                edge.attributes()
            )?;
        }
        if !self.bands.is_empty() {
            writeln!(f)?;
        }
        for band in self.bands.iter() {
            let mut members = String::new();
            for member in band.members.iter() {
                write!(members, " {}", quote(member))?;
            }
            // a band of one node does not constrain anything
            let prefix = if band.kind == BandKind::Same && band.members.len() == 1 {
                "// "
            } else {
                ""
            };
            writeln!(f, "    {prefix}{{rank = {}{members}}}", band.kind)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    fn sample() -> GraphDescription {
        let mut a = Node::plain("a");
        a.label = "a.0".into();
        a.class = NodeClass::Accepted;
        a.fill = Some("#40cfff".into());
        a.url = Some("https://example.org".into());
        let mut b = Node::plain("b \"x\"");
        b.position = Some(Point::new(1.5, 2.0));
        let mut back = Edge::plain("b \"x\"", "a");
        back.class = EdgeClass::Other;
        back.direction = Direction::Reversed;
        back.line = Line::Dashed;
        back.label = Some("∞".into());
        back.constraint = false;
        GraphDescription {
            name: "sample".into(),
            rank_dir: RankDir::LR,
            frozen: false,
            nodes: vec![a, b],
            edges: vec![Edge::plain("a", "b \"x\""), back],
            bands: vec![
                Band {
                    kind: BandKind::Same,
                    members: vec!["a".into()],
                },
                Band {
                    kind: BandKind::Min,
                    members: vec!["a".into(), "b \"x\"".into()],
                },
            ],
        }
    }

    #[test]
    fn dot() {
        let dot = sample().to_string();
        assert!(dot.starts_with("digraph \"sample\" {\n    layout=dot\n    rankdir=LR\n"));
        assert!(dot.contains(
            r##"    "a" [label="a.0" style="filled" fillcolor="#40cfff" URL="https://example.org" target="_blank"]"##
        ));
        assert!(dot.contains(r#"    "b \"x\"" [label="b \"x\""]"#));
        assert!(dot.contains(r#"    "a" -> "b \"x\"""#));
        assert!(dot.contains(
            r#"    "a" -> "b \"x\"" [dir=back style="dashed" constraint="false" headlabel="∞"]"#
        ));
        assert!(dot.contains(r#"    // {rank = same "a"}"#));
        assert!(dot.contains(r#"    {rank = min "a" "b \"x\""}"#));
        assert!(dot.ends_with('}'));
    }

    #[test]
    fn frozen_positions() {
        let mut graph = sample();
        graph.frozen = true;
        let dot = graph.to_string();
        assert!(dot.contains("graph [layout=neato overlap=false]"));
        assert!(dot.contains(r#"pos="1.5,2!""#));
    }

    #[test]
    fn lookups() {
        let graph = sample();
        assert_eq!(graph.node("a").map(|node| node.class), Some(NodeClass::Accepted));
        assert!(graph.edge("b \"x\"", "a").is_some());
        assert!(graph.edge("a", "a").is_none());
        assert!(!graph.is_placed());
        let json = serde_json::to_string(&graph).unwrap();
        let back: GraphDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(back, graph);
    }
}

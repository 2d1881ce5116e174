//! Classification of nodes and edges, and their presentation.
use serde::{Deserialize, Serialize};

use crate::{
    config::Palette,
    datatypes::{labeling::Label, Rank, Status},
};

/// Visual class of an argument, derived from its grounded status and its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    /// No labeling is shown.
    Plain,
    /// Labeled in and accepted by the grounded semantics.
    Accepted,
    /// Labeled in, but undecided by the grounded semantics.
    LightAccepted,
    /// Labeled out and defeated by the grounded semantics.
    Defeated,
    /// Labeled out, but undecided by the grounded semantics.
    LightDefeated,
    /// Labeled undec.
    Undecided,
}

impl NodeClass {
    /// Classifies an argument.
    pub fn of(status: Status, label: Label) -> Self {
        match (label, status) {
            (Label::In, Status::Undecided) => NodeClass::LightAccepted,
            (Label::In, _) => NodeClass::Accepted,
            (Label::Out, Status::Undecided) => NodeClass::LightDefeated,
            (Label::Out, _) => NodeClass::Defeated,
            (Label::Undec, _) => NodeClass::Undecided,
        }
    }

    /// Fill color of the class, none for [Plain][NodeClass::Plain].
    pub fn fill(self, palette: &Palette) -> Option<&str> {
        match self {
            NodeClass::Plain => None,
            NodeClass::Accepted => Some(palette.accepted.as_str()),
            NodeClass::LightAccepted => Some(palette.light_accepted.as_str()),
            NodeClass::Defeated => Some(palette.defeated.as_str()),
            NodeClass::LightDefeated => Some(palette.light_defeated.as_str()),
            NodeClass::Undecided => Some(palette.undecided.as_str()),
        }
    }
}

/// Visual class of an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EdgeClass {
    /// No labeling is shown.
    Plain,
    /// Grounded accepted attacker, grounded defeated target.
    GroundedAccepted,
    /// Grounded defeated attacker, grounded accepted target.
    GroundedDefeated,
    /// Attacker labeled in, target labeled out.
    ExtensionAccepted,
    /// Attacker labeled out, target labeled in.
    ExtensionDefeated,
    /// Both ends labeled undec.
    Undecided,
    /// An attack which does not contribute to the labeling.
    Blunder,
    /// Any other attack.
    Other,
}

impl EdgeClass {
    /// Classifies an attack by the grounded status and the label of both of its ends.
    /// The grounded statuses take precedence over the labels.
    pub fn of(from: (Status, Label), to: (Status, Label)) -> Self {
        match (from, to) {
            ((Status::Accepted, _), (Status::Defeated, _)) => EdgeClass::GroundedAccepted,
            ((Status::Defeated, _), (Status::Accepted, _)) => EdgeClass::GroundedDefeated,
            ((_, Label::In), (_, Label::Out)) => EdgeClass::ExtensionAccepted,
            ((_, Label::Out), (_, Label::In)) => EdgeClass::ExtensionDefeated,
            ((_, Label::Undec), (_, Label::Undec)) => EdgeClass::Undecided,
            ((_, Label::Undec), (_, Label::Out))
            | ((_, Label::Out), (_, Label::Undec))
            | ((_, Label::Out), (_, Label::Out)) => EdgeClass::Blunder,
            _ => EdgeClass::Other,
        }
    }

    /// Stroke color of the class.
    pub fn color(self, palette: &Palette) -> &str {
        match self {
            EdgeClass::GroundedAccepted | EdgeClass::ExtensionAccepted => palette.edge_accepted.as_str(),
            EdgeClass::GroundedDefeated | EdgeClass::ExtensionDefeated => palette.edge_defeated.as_str(),
            EdgeClass::Undecided => palette.edge_undecided.as_str(),
            EdgeClass::Blunder => palette.edge_blunder.as_str(),
            EdgeClass::Plain | EdgeClass::Other => palette.edge_default.as_str(),
        }
    }

    /// Returns [true] if the edge carries the round label of its attacker.
    pub fn has_round_label(self) -> bool {
        !matches!(
            self,
            EdgeClass::ExtensionAccepted | EdgeClass::ExtensionDefeated | EdgeClass::Blunder
        )
    }

    /// Line and arrow style of the class, before the direction is taken into account.
    ///
    /// Forward edges are solid except for blunders, which stay dotted so that they can be told
    /// apart from attacks that decide the labeling.
    pub fn stroke(self) -> (Line, Arrow) {
        match self {
            EdgeClass::Plain => (Line::Solid, Arrow::Normal),
            EdgeClass::Blunder => (Line::Dotted, Arrow::ONormal),
            _ => (Line::Solid, Arrow::Vee),
        }
    }
}

/// Whether an edge is drawn along or against the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// From the attacker towards the attacked argument.
    Forward,
    /// Against the wind: the attacker settles later than the attacked argument.
    Reversed,
}

impl Direction {
    /// Derives the direction from the ranks of the attacker and the attacked argument.
    pub fn of(from: Rank, to: Rank) -> Self {
        if from > to {
            Direction::Reversed
        } else {
            Direction::Forward
        }
    }

    /// Derives the direction from attack distances towards a target.
    /// Edges leading away from the target are reversed.
    pub fn by_distance(from: usize, to: usize) -> Self {
        if from < to {
            Direction::Reversed
        } else {
            Direction::Forward
        }
    }
}

/// Line style of an edge or a node border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Line {
    /// Continuous.
    Solid,
    /// Dotted.
    Dotted,
    /// Dashed.
    Dashed,
}

/// Arrow head of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Arrow {
    /// Filled triangle.
    Normal,
    /// Pointed.
    Vee,
    /// Open triangle.
    ONormal,
}

/// End label of an attack: the round after the one in which the attacker settles.
pub fn round_label(attacker: Rank) -> String {
    attacker.succ().to_string()
}

/// Node label while an extension is shown.
pub fn ranked_label(id: &str, rank: Rank) -> String {
    format!("{id}.{rank}")
}

/// Node label of an argument which became bounded after a fix was applied.
pub fn primed_label(id: &str, rank: Rank) -> String {
    format!("{id}.{rank}′")
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn node_classes() {
        assert_eq!(NodeClass::of(Status::Accepted, Label::In), NodeClass::Accepted);
        assert_eq!(NodeClass::of(Status::Undecided, Label::In), NodeClass::LightAccepted);
        assert_eq!(NodeClass::of(Status::Undecided, Label::Out), NodeClass::LightDefeated);
        assert_eq!(NodeClass::of(Status::Defeated, Label::Out), NodeClass::Defeated);
        assert_eq!(NodeClass::of(Status::Undecided, Label::Undec), NodeClass::Undecided);
        let palette = Palette::default();
        assert_eq!(NodeClass::LightAccepted.fill(&palette), Some("#a6e9ff"));
        assert_eq!(NodeClass::Plain.fill(&palette), None);
    }

    #[test]
    fn edge_classes() {
        let acc = (Status::Accepted, Label::In);
        let def = (Status::Defeated, Label::Out);
        let und_in = (Status::Undecided, Label::In);
        let und_out = (Status::Undecided, Label::Out);
        let und = (Status::Undecided, Label::Undec);
        assert_eq!(EdgeClass::of(acc, def), EdgeClass::GroundedAccepted);
        assert_eq!(EdgeClass::of(def, acc), EdgeClass::GroundedDefeated);
        assert_eq!(EdgeClass::of(und_in, und_out), EdgeClass::ExtensionAccepted);
        assert_eq!(EdgeClass::of(und_out, und_in), EdgeClass::ExtensionDefeated);
        assert_eq!(EdgeClass::of(und, und), EdgeClass::Undecided);
        assert_eq!(EdgeClass::of(und, und_out), EdgeClass::Blunder);
        assert_eq!(EdgeClass::of(def, def), EdgeClass::Blunder);
        assert_eq!(EdgeClass::of(def, und), EdgeClass::Blunder);
        assert!(!EdgeClass::Blunder.has_round_label());
        assert!(EdgeClass::Undecided.has_round_label());
        assert_eq!(EdgeClass::Blunder.stroke(), (Line::Dotted, Arrow::ONormal));
    }

    #[test]
    fn directions() {
        assert_eq!(Direction::of(Rank::Finite(0), Rank::Finite(1)), Direction::Forward);
        assert_eq!(Direction::of(Rank::Finite(2), Rank::Finite(1)), Direction::Reversed);
        assert_eq!(Direction::of(Rank::Unbounded, Rank::Finite(7)), Direction::Reversed);
        assert_eq!(Direction::of(Rank::Unbounded, Rank::Unbounded), Direction::Forward);
        assert_eq!(Direction::by_distance(1, 2), Direction::Reversed);
        assert_eq!(Direction::by_distance(2, 1), Direction::Forward);
    }

    #[test]
    fn labels() {
        assert_eq!(round_label(Rank::Finite(0)), "1");
        assert_eq!(round_label(Rank::Unbounded), "∞");
        assert_eq!(ranked_label("a", Rank::Unbounded), "a.∞");
        assert_eq!(primed_label("a", Rank::Finite(3)), "a.3′");
    }
}

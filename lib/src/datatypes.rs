//! A collection of all the necessary datatypes of the system.
pub mod labeling;

use serde::{Deserialize, Serialize};
use std::{fmt::Display, ops::Deref};
use strum::{EnumString, EnumVariantNames};

/// Position of an argument in the insertion order of its [Af][crate::af::Af].
#[derive(Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Arg(pub usize);

impl Deref for Arg {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<usize> for Arg {
    fn from(val: usize) -> Self {
        Self(val)
    }
}

impl Display for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Arg({})", self.0)
    }
}

impl Arg {
    /// Returns the position as a plain [usize].
    pub fn value(self) -> usize {
        self.0
    }
}

/// An argument with its identifier and the display metadata which is carried along.
/// The metadata is never inspected by any of the analyses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// Unique identifier of the argument.
    pub id: String,
    /// Free text shown as a tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    /// External link of the argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Argument {
    /// Creates an argument without metadata.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            annotation: None,
            url: None,
        }
    }

    /// Attaches an annotation.
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Attaches an url.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl From<&str> for Argument {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A (directed) attack between two arguments of the same framework.
#[derive(Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Attack {
    /// The attacker.
    pub from: Arg,
    /// The attacked argument.
    pub to: Arg,
}

impl Attack {
    /// Creates a new attack.
    pub fn new(from: Arg, to: Arg) -> Self {
        Self { from, to }
    }

    /// Returns [true] if the argument attacks itself.
    pub fn is_self_attack(&self) -> bool {
        self.from == self.to
    }
}

/// Status of an argument with respect to the grounded semantics.
#[derive(
    Debug,
    Eq,
    PartialEq,
    Hash,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    EnumString,
    EnumVariantNames,
    strum::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// All attackers are defeated.
    Accepted,
    /// Some attacker is accepted.
    Defeated,
    /// Never settled by the grounded construction.
    #[strum(to_string = "undefined", serialize = "undecided")]
    #[serde(rename = "undefined")]
    Undecided,
}

impl Status {
    /// Returns [true] if the status is not [Undecided][Status::Undecided].
    pub fn is_settled(self) -> bool {
        !matches!(self, Status::Undecided)
    }
}

/// The round of the grounded construction in which an argument settles.
///
/// [Unbounded][Rank::Unbounded] compares greater than every finite rank.
#[derive(Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    /// Settled in the given round.
    Finite(usize),
    /// Never settles.
    Unbounded,
}

impl Rank {
    /// Returns the numeric value, if there is one.
    pub fn finite(self) -> Option<usize> {
        match self {
            Rank::Finite(value) => Some(value),
            Rank::Unbounded => None,
        }
    }

    /// Returns [true] if the rank is [Unbounded][Rank::Unbounded].
    pub fn is_unbounded(self) -> bool {
        matches!(self, Rank::Unbounded)
    }

    /// The rank one round later; unbounded stays unbounded.
    pub fn succ(self) -> Rank {
        match self {
            Rank::Finite(value) => Rank::Finite(value + 1),
            Rank::Unbounded => Rank::Unbounded,
        }
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rank::Finite(value) => write!(f, "{value}"),
            Rank::Unbounded => write!(f, "∞"),
        }
    }
}

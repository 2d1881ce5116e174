//! Extensions and three-valued labelings of a framework.
use std::{collections::BTreeSet, fmt::Display};

use lexical_sort::natural_lexical_cmp;
use serde::{Deserialize, Serialize};
use strum::{EnumString, EnumVariantNames};

use super::{Arg, Status};
use crate::{
    af::Af,
    error::{Error, Result},
};

/// The label of an argument.
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
pub enum Label {
    /// Member of the extension.
    In,
    /// Attacked by a member.
    Out,
    /// Neither.
    Undec,
}

impl Label {
    /// Returns [true] if the grounded status agrees with the label.
    pub fn matches(self, status: Status) -> bool {
        matches!(
            (self, status),
            (Label::In, Status::Accepted)
                | (Label::Out, Status::Defeated)
                | (Label::Undec, Status::Undecided)
        )
    }
}

/// A set of argument identifiers as delivered by a semantics oracle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extension(BTreeSet<String>);

impl Extension {
    /// Returns [true] if the identifier is a member.
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Iterates over the members.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns [true] if the extension is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Extension {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl Display for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut members: Vec<&str> = self.iter().collect();
        members.sort_by(|lhs, rhs| natural_lexical_cmp(lhs, rhs));
        write!(f, "{{{}}}", members.join(", "))
    }
}

/// A three-valued labeling, holding exactly one [Label] per argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Labeling(Vec<Label>);

impl Labeling {
    /// Labels every argument of the framework with the same label.
    pub fn uniform(af: &Af, label: Label) -> Self {
        Self(vec![label; af.len()])
    }

    pub(crate) fn from_labels(labels: Vec<Label>) -> Self {
        Self(labels)
    }

    /// Classifies the arguments with respect to an extension.
    ///
    /// Members are [In][Label::In], arguments attacked by a member are [Out][Label::Out] and the remaining ones are [Undec][Label::Undec].
    pub fn from_extension(af: &Af, extension: &Extension) -> Result<Self> {
        log::debug!("[Start] classifying against {extension}");
        let mut labels = vec![Label::Undec; af.len()];
        for id in extension.iter() {
            labels[af.lookup(id)?.value()] = Label::In;
        }
        for attack in af.attacks() {
            if labels[attack.from.value()] == Label::In && labels[attack.to.value()] != Label::In {
                labels[attack.to.value()] = Label::Out;
            }
        }
        log::debug!("[Done] classifying");
        Ok(Self(labels))
    }

    /// Builds a labeling from three possibly inconsistent sets of identifiers.
    ///
    /// Arguments missing from all sets become [Undec][Label::Undec];
    /// arguments listed more than once keep the strongest label (in before out before undec).
    pub fn from_sets<'a, I, O, U>(af: &Af, ins: I, outs: O, undecs: U) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
        O: IntoIterator<Item = &'a str>,
        U: IntoIterator<Item = &'a str>,
    {
        let mut labels: Vec<Option<Label>> = vec![None; af.len()];
        let mut assign = |id: &str, label: Label| -> Result<()> {
            let slot = &mut labels[af.lookup(id)?.value()];
            match *slot {
                Some(previous) if previous != label => {
                    log::warn!("argument {id:?} is labeled {previous} and {label}, keeping the former");
                }
                Some(_) => {}
                None => *slot = Some(label),
            }
            Ok(())
        };
        ins.into_iter().try_for_each(|id| assign(id, Label::In))?;
        outs.into_iter().try_for_each(|id| assign(id, Label::Out))?;
        undecs.into_iter().try_for_each(|id| assign(id, Label::Undec))?;
        Ok(Self(
            labels
                .into_iter()
                .map(|label| label.unwrap_or(Label::Undec))
                .collect(),
        ))
    }

    /// Reads the canonical form `"<in>|<undec>|<out>"` produced by [canonical][Labeling::canonical].
    pub fn from_canonical(af: &Af, text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.trim().split('|').collect();
        if let [ins, undecs, outs] = parts.as_slice() {
            let members = |part: &'_ str| -> Vec<String> {
                part.split('+')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect()
            };
            let (ins, undecs, outs) = (members(ins), members(undecs), members(outs));
            Self::from_sets(
                af,
                ins.iter().map(String::as_str),
                outs.iter().map(String::as_str),
                undecs.iter().map(String::as_str),
            )
        } else {
            Err(Error::Unreadable(format!(
                "labeling {text:?}, expected three '|'-separated groups"
            )))
        }
    }

    /// The label of an argument; arguments the labeling does not know are undec.
    pub fn label(&self, arg: Arg) -> Label {
        self.0.get(arg.value()).copied().unwrap_or(Label::Undec)
    }

    /// All labels in argument order.
    pub fn labels(&self) -> &[Label] {
        &self.0
    }

    /// Number of labeled arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns [true] if no argument is labeled.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All arguments carrying the given label.
    pub fn members(&self, label: Label) -> impl Iterator<Item = Arg> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(move |(_, other)| **other == label)
            .map(|(pos, _)| Arg(pos))
    }

    /// The pairs of arguments and labels.
    pub fn iter(&self) -> impl Iterator<Item = (Arg, Label)> + '_ {
        self.0.iter().enumerate().map(|(pos, &label)| (Arg(pos), label))
    }

    /// The members of each label by identifier, in natural order.
    pub fn sets(&self, af: &Af) -> LabelSets {
        let collect = |label| {
            let mut ids: Vec<String> = af
                .args()
                .filter(|&arg| self.label(arg) == label)
                .map(|arg| af.id(arg).to_string())
                .collect();
            ids.sort_by(|lhs, rhs| natural_lexical_cmp(lhs, rhs));
            ids
        };
        LabelSets {
            ins: collect(Label::In),
            outs: collect(Label::Out),
            undecs: collect(Label::Undec),
        }
    }

    /// The canonical form `"<in>|<undec>|<out>"` with members joined by `+`.
    pub fn canonical(&self, af: &Af) -> String {
        let sets = self.sets(af);
        format!(
            "{}|{}|{}",
            sets.ins.join("+"),
            sets.undecs.join("+"),
            sets.outs.join("+")
        )
    }
}

/// The members of a [Labeling] by identifier, which is the serialised form of a labeling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSets {
    /// Arguments labeled in.
    #[serde(rename = "in")]
    pub ins: Vec<String>,
    /// Arguments labeled out.
    #[serde(rename = "out")]
    pub outs: Vec<String>,
    /// Arguments labeled undec.
    #[serde(rename = "undec")]
    pub undecs: Vec<String>,
}

impl LabelSets {
    /// Turns the sets into a [Labeling] of the given framework.
    pub fn to_labeling(&self, af: &Af) -> Result<Labeling> {
        Labeling::from_sets(
            af,
            self.ins.iter().map(String::as_str),
            self.outs.iter().map(String::as_str),
            self.undecs.iter().map(String::as_str),
        )
    }
}

impl Display for LabelSets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "in: {{{}}}, out: {{{}}}, undec: {{{}}}",
            self.ins.join(", "),
            self.outs.join(", "),
            self.undecs.join(", ")
        )
    }
}

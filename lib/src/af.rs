/*!
This module describes the abstract argumentation framework.

 - construction and validation of frameworks
 - attack relation lookups in both directions
 - the grounded fixpoint together with the round in which each argument settles
*/

use std::{
    collections::{hash_map::DefaultHasher, HashMap, HashSet},
    hash::{Hash, Hasher},
};

use roaring::RoaringBitmap;

use crate::{
    datatypes::{Arg, Argument, Attack, Rank, Status},
    error::{Error, Result},
};

/// An attack given by the identifiers of its endpoints, as it is handed over by the reader of a framework file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackSpec {
    /// Identifier of the attacker.
    pub from: String,
    /// Identifier of the attacked argument.
    pub to: String,
    /// Free text shown as a tooltip on the edge.
    pub annotation: Option<String>,
}

impl<A: AsRef<str>, B: AsRef<str>> From<(A, B)> for AttackSpec {
    fn from((from, to): (A, B)) -> Self {
        Self {
            from: from.as_ref().to_string(),
            to: to.as_ref().to_string(),
            annotation: None,
        }
    }
}

#[derive(Debug, Clone)]
/// Representation of an AF, with the arguments in insertion order, a dictionary which relates identifiers to positions, and the set of attacks.
///
/// Every attack is stored exactly once and both of its endpoints are guaranteed to exist.
pub struct Af {
    name: String,
    arguments: Vec<Argument>,
    mapping: HashMap<String, usize>,
    attacks: Vec<Attack>,
    attack_annotations: Vec<Option<String>>,
    attack_positions: HashMap<Attack, usize>,
    incoming: Vec<Vec<Arg>>,
    outgoing: Vec<Vec<Arg>>,
}

impl Af {
    /// Instantiates a new AF.
    ///
    /// Fails with [MalformedGraph][Error::MalformedGraph] if an identifier is used twice or an attack references an unknown argument.
    /// Repeated attacks are merged; the first occurrence keeps its annotation.
    pub fn new<N, I, J, T>(name: N, arguments: I, attacks: J) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator,
        I::Item: Into<Argument>,
        J: IntoIterator<Item = T>,
        T: Into<AttackSpec>,
    {
        let name = name.into();
        log::debug!("[Start] instantiating framework {name:?}");
        let mut result = Self {
            name,
            arguments: Vec::new(),
            mapping: HashMap::new(),
            attacks: Vec::new(),
            attack_annotations: Vec::new(),
            attack_positions: HashMap::new(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
        };
        for argument in arguments.into_iter().map(Into::into) {
            if result.mapping.contains_key(&argument.id) {
                return Err(Error::MalformedGraph(format!(
                    "argument \"{}\" is defined twice",
                    argument.id
                )));
            }
            result
                .mapping
                .insert(argument.id.clone(), result.arguments.len());
            result.arguments.push(argument);
        }
        result.incoming = vec![Vec::new(); result.arguments.len()];
        result.outgoing = vec![Vec::new(); result.arguments.len()];
        for spec in attacks.into_iter().map(Into::into) {
            let from = result.endpoint(&spec, &spec.from)?;
            let to = result.endpoint(&spec, &spec.to)?;
            let attack = Attack::new(from, to);
            if result.attack_positions.contains_key(&attack) {
                log::trace!("merging repeated attack ({}, {})", spec.from, spec.to);
                continue;
            }
            result
                .attack_positions
                .insert(attack, result.attacks.len());
            result.attacks.push(attack);
            result.attack_annotations.push(spec.annotation);
            result.incoming[to.value()].push(from);
            result.outgoing[from.value()].push(to);
        }
        log::debug!(
            "[Done] instantiated with {} arguments and {} attacks",
            result.len(),
            result.attacks.len()
        );
        Ok(result)
    }

    fn endpoint(&self, spec: &AttackSpec, id: &str) -> Result<Arg> {
        self.arg(id).ok_or_else(|| {
            Error::MalformedGraph(format!(
                "attack ({}, {}) references the unknown argument \"{}\"",
                spec.from, spec.to, id
            ))
        })
    }

    /// Name of the framework.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Returns [true] if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// All arguments in insertion order.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// All argument positions in insertion order.
    pub fn args(&self) -> impl Iterator<Item = Arg> + '_ {
        (0..self.arguments.len()).map(Arg)
    }

    /// The argument at the given position.
    pub fn argument(&self, arg: Arg) -> &Argument {
        &self.arguments[arg.value()]
    }

    /// Identifier of the argument at the given position.
    pub fn id(&self, arg: Arg) -> &str {
        &self.arguments[arg.value()].id
    }

    /// Position of the argument with the given identifier.
    pub fn arg(&self, id: &str) -> Option<Arg> {
        self.mapping.get(id).map(|&pos| Arg(pos))
    }

    /// Like [arg][Af::arg], but fails with [UnknownArgument][Error::UnknownArgument].
    pub fn lookup(&self, id: &str) -> Result<Arg> {
        self.arg(id)
            .ok_or_else(|| Error::UnknownArgument(id.to_string()))
    }

    /// All attacks in insertion order.
    pub fn attacks(&self) -> &[Attack] {
        &self.attacks
    }

    /// Position of an attack in [attacks][Af::attacks].
    pub fn attack_position(&self, attack: Attack) -> Option<usize> {
        self.attack_positions.get(&attack).copied()
    }

    /// Looks up the attack between two identifiers.
    pub fn attack(&self, from: &str, to: &str) -> Result<Attack> {
        let attack = Attack::new(self.lookup(from)?, self.lookup(to)?);
        if self.attack_positions.contains_key(&attack) {
            Ok(attack)
        } else {
            Err(Error::UnknownArgument(format!("({from},{to})")))
        }
    }

    /// The annotation of an attack, if any.
    pub fn attack_annotation(&self, attack: Attack) -> Option<&str> {
        self.attack_position(attack)
            .and_then(|pos| self.attack_annotations[pos].as_deref())
    }

    /// All arguments attacking `arg`.
    pub fn incoming(&self, arg: Arg) -> &[Arg] {
        &self.incoming[arg.value()]
    }

    /// All arguments attacked by `arg`.
    pub fn outgoing(&self, arg: Arg) -> &[Arg] {
        &self.outgoing[arg.value()]
    }

    /// Creates the reduced framework which lacks the given attacks.
    /// Arguments, their order and their metadata stay untouched.
    pub fn without<'a>(&self, removed: impl IntoIterator<Item = &'a Attack>) -> Af {
        let removed: HashSet<Attack> = removed.into_iter().copied().collect();
        log::debug!("reducing {:?} by {} attacks", self.name, removed.len());
        let mut result = Af {
            name: self.name.clone(),
            arguments: self.arguments.clone(),
            mapping: self.mapping.clone(),
            attacks: Vec::new(),
            attack_annotations: Vec::new(),
            attack_positions: HashMap::new(),
            incoming: vec![Vec::new(); self.len()],
            outgoing: vec![Vec::new(); self.len()],
        };
        self.attacks
            .iter()
            .zip(self.attack_annotations.iter())
            .filter(|(attack, _)| !removed.contains(attack))
            .for_each(|(&attack, annotation)| {
                result
                    .attack_positions
                    .insert(attack, result.attacks.len());
                result.attacks.push(attack);
                result.attack_annotations.push(annotation.clone());
                result.incoming[attack.to.value()].push(attack.from);
                result.outgoing[attack.from.value()].push(attack.to);
            });
        result
    }

    /// A hash of the arguments and attacks; metadata does not contribute.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.arguments
            .iter()
            .for_each(|argument| argument.id.hash(&mut hasher));
        self.attacks.hash(&mut hasher);
        hasher.finish()
    }

    /// Computes the grounded fixpoint and returns the status of each argument together with the round in which it settled.
    ///
    /// Round 0 accepts all unattacked arguments.
    /// Round `k` accepts every argument whose attackers are all defeated by round `k-1` and defeats every argument attacked by an argument accepted in round `k-1`.
    /// Arguments which never settle are [Undecided][Status::Undecided] with an [Unbounded][Rank::Unbounded] rank.
    pub fn grounded(&self) -> Vec<(Status, Rank)> {
        self.grounded_without(&RoaringBitmap::new())
    }

    /// Computes the grounded fixpoint as if the attacks at the given positions were absent.
    pub fn grounded_without(&self, suspended: &RoaringBitmap) -> Vec<(Status, Rank)> {
        log::trace!("[Start] grounded fixpoint, {} attacks suspended", suspended.len());
        let mut outgoing: Vec<Vec<Arg>> = vec![Vec::new(); self.len()];
        let mut undefeated: Vec<usize> = vec![0; self.len()];
        for (pos, attack) in self.attacks.iter().enumerate() {
            if !suspended.contains(pos as u32) {
                outgoing[attack.from.value()].push(attack.to);
                undefeated[attack.to.value()] += 1;
            }
        }
        let mut result = vec![(Status::Undecided, Rank::Unbounded); self.len()];
        let mut accepted: Vec<Arg> = self.args().filter(|arg| undefeated[**arg] == 0).collect();
        accepted
            .iter()
            .for_each(|arg| result[arg.value()] = (Status::Accepted, Rank::Finite(0)));
        let mut defeated: Vec<Arg> = Vec::new();
        let mut round = 0;
        while !accepted.is_empty() || !defeated.is_empty() {
            round += 1;
            let mut next_defeated = Vec::new();
            for arg in accepted.iter() {
                for &target in outgoing[arg.value()].iter() {
                    if result[target.value()].0 == Status::Undecided {
                        result[target.value()] = (Status::Defeated, Rank::Finite(round));
                        next_defeated.push(target);
                    }
                }
            }
            let mut next_accepted = Vec::new();
            for arg in defeated.iter() {
                for &target in outgoing[arg.value()].iter() {
                    undefeated[target.value()] -= 1;
                    if undefeated[target.value()] == 0
                        && result[target.value()].0 == Status::Undecided
                    {
                        result[target.value()] = (Status::Accepted, Rank::Finite(round));
                        next_accepted.push(target);
                    }
                }
            }
            accepted = next_accepted;
            defeated = next_defeated;
        }
        log::trace!("[Done] grounded fixpoint after {round} rounds");
        result
    }

    /// All arguments from which one of the given arguments is reachable, the arguments themselves included.
    pub fn ancestors(&self, args: impl IntoIterator<Item = Arg>) -> Vec<bool> {
        let mut seen = vec![false; self.len()];
        let mut stack: Vec<Arg> = args.into_iter().collect();
        stack.iter().for_each(|arg| seen[arg.value()] = true);
        while let Some(arg) = stack.pop() {
            for &attacker in self.incoming(arg) {
                if !seen[attacker.value()] {
                    seen[attacker.value()] = true;
                    stack.push(attacker);
                }
            }
        }
        seen
    }
}

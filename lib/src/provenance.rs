/*!
Reachability based explanations of a target argument.

 - the potential provenance contains everything the target is reachable from
 - the actual provenance only follows attacks which are consistent with the [ChainPolicy]
 - the primary provenance only follows actual attacks which connect consecutive rounds
 - the local view assigns each argument its attack distance to the target
*/
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use derivative::Derivative;
use serde::{Deserialize, Serialize};
use strum::{EnumString, EnumVariantNames};

use crate::{
    af::Af,
    datatypes::{Arg, Attack, Rank, Status},
    error::Result,
    ranking::Ranking,
    solver::{resolve, Atom, Encoding, Program, SolveMode, Solver, SolverError, Symbol},
};

/// The kinds of provenance.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    EnumVariantNames,
    strum::Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ProvenanceKind {
    /// Reverse reachability.
    #[strum(serialize = "potential", serialize = "po")]
    Potential,
    /// Reverse reachability along attacks admitted by the [ChainPolicy].
    #[strum(serialize = "actual", serialize = "ac")]
    Actual,
    /// Reverse reachability along actual attacks between consecutive rounds.
    ///
    /// An attack is kept when its target settles exactly one round after its attacker, or when
    /// neither settles. Every such chain is kept, not only the shortest one.
    #[strum(serialize = "primary", serialize = "pr")]
    Primary,
}

impl ProvenanceKind {
    /// Predicates of the node and edge markers reported by the [provenance][Encoding::Provenance] encoding.
    pub fn markers(self) -> (&'static str, &'static str) {
        match self {
            ProvenanceKind::Potential => ("pot_prov", "pot_edge"),
            ProvenanceKind::Actual => ("act_prov", "act_edge"),
            ProvenanceKind::Primary => ("pr_prov", "pr_edge"),
        }
    }
}

/// Decides which attacks the actual provenance may follow.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumVariantNames,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChainPolicy {
    /// The attacker settles strictly before the attacked argument, or the attacked argument never settles.
    RankIncreasing,
    /// Defeated arguments attack accepted ones, accepted arguments attack defeated ones and undecided arguments attack undecided ones.
    StatusConsistent,
}

impl Default for ChainPolicy {
    fn default() -> Self {
        Self::RankIncreasing
    }
}

impl ChainPolicy {
    /// Returns [true] if the actual provenance may follow an attack between arguments with the given status and rank.
    pub fn admits(self, from: (Status, Rank), to: (Status, Rank)) -> bool {
        match self {
            ChainPolicy::RankIncreasing => to.1.is_unbounded() || from.1 < to.1,
            ChainPolicy::StatusConsistent => matches!(
                (from.0, to.0),
                (Status::Defeated, Status::Accepted)
                    | (Status::Accepted, Status::Defeated)
                    | (Status::Undecided, Status::Undecided)
            ),
        }
    }
}

/// Returns [true] if the attacker settles exactly one round before the attacked argument, or neither settles.
fn is_tight(from: Rank, to: Rank) -> bool {
    match (from, to) {
        (Rank::Unbounded, Rank::Unbounded) => true,
        (from, to) => !to.is_unbounded() && from.succ() == to,
    }
}

/// A provenance of a target argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// The kind.
    pub kind: ProvenanceKind,
    /// The explained argument.
    pub target: Arg,
    /// Arguments in the provenance; the target is always contained.
    pub nodes: BTreeSet<Arg>,
    /// Attacks in the provenance.
    pub edges: BTreeSet<Attack>,
}

impl Provenance {
    /// Returns [true] if the argument is part of the provenance.
    pub fn contains(&self, arg: Arg) -> bool {
        self.nodes.contains(&arg)
    }

    /// Returns [true] if the attack is part of the provenance.
    pub fn contains_edge(&self, attack: Attack) -> bool {
        self.edges.contains(&attack)
    }

    /// Returns [true] if nodes and edges are contained in the other provenance.
    pub fn is_subset(&self, other: &Provenance) -> bool {
        self.nodes.is_subset(&other.nodes) && self.edges.is_subset(&other.edges)
    }
}

/// Attack distances towards a target argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalView {
    /// The argument in the center of the view.
    pub target: Arg,
    distances: BTreeMap<Arg, usize>,
}

impl LocalView {
    /// Creates a view from a distance map; the target is always at distance 0.
    pub fn new(target: Arg, mut distances: BTreeMap<Arg, usize>) -> Self {
        distances.insert(target, 0);
        Self { target, distances }
    }

    /// The distance of an argument, if the target is reachable from it.
    pub fn distance(&self, arg: Arg) -> Option<usize> {
        self.distances.get(&arg).copied()
    }

    /// Arguments grouped by distance.
    pub fn bands(&self) -> BTreeMap<usize, Vec<Arg>> {
        let mut bands: BTreeMap<usize, Vec<Arg>> = BTreeMap::new();
        for (&arg, &distance) in self.distances.iter() {
            bands.entry(distance).or_default().push(arg);
        }
        bands
    }

    /// Number of arguments in the view.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Never true, as the target is part of its own view.
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

/// Nodes and edges of all three kinds of provenance, as computed by [traces].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Traces {
    pub(crate) potential: (BTreeSet<Arg>, BTreeSet<Attack>),
    pub(crate) actual: (BTreeSet<Arg>, BTreeSet<Attack>),
    pub(crate) primary: (BTreeSet<Arg>, BTreeSet<Attack>),
}

/// Collects all arguments from which `target` is reachable along attacks satisfying `follow`,
/// together with the followed attacks.
fn reverse_reach(
    af: &Af,
    target: Arg,
    follow: impl Fn(Attack) -> bool,
) -> (BTreeSet<Arg>, BTreeSet<Attack>) {
    let mut nodes = BTreeSet::from([target]);
    let mut edges = BTreeSet::new();
    let mut stack = vec![target];
    while let Some(arg) = stack.pop() {
        for &attacker in af.incoming(arg) {
            let attack = Attack::new(attacker, arg);
            if follow(attack) {
                edges.insert(attack);
                if nodes.insert(attacker) {
                    stack.push(attacker);
                }
            }
        }
    }
    (nodes, edges)
}

/// Computes the three kinds of provenance of `target`.
pub(crate) fn traces(
    af: &Af,
    target: Arg,
    settled: &[(Status, Rank)],
    policy: ChainPolicy,
) -> Traces {
    log::debug!("[Start] provenance of {:?}", af.id(target));
    let actual = |attack: Attack| {
        policy.admits(settled[attack.from.value()], settled[attack.to.value()])
    };
    let result = Traces {
        potential: reverse_reach(af, target, |_| true),
        actual: reverse_reach(af, target, actual),
        primary: reverse_reach(af, target, |attack| {
            actual(attack)
                && is_tight(settled[attack.from.value()].1, settled[attack.to.value()].1)
        }),
    };
    log::debug!(
        "[Done] provenance with {}/{}/{} arguments",
        result.potential.0.len(),
        result.actual.0.len(),
        result.primary.0.len()
    );
    result
}

/// Breadth-first attack distances towards `target`.
pub(crate) fn distances(af: &Af, target: Arg) -> BTreeMap<Arg, usize> {
    let mut result = BTreeMap::from([(target, 0)]);
    let mut queue = VecDeque::from([target]);
    while let Some(arg) = queue.pop_front() {
        let distance = result[&arg];
        for &attacker in af.incoming(arg) {
            result.entry(attacker).or_insert_with(|| {
                queue.push_back(attacker);
                distance + 1
            });
        }
    }
    result
}

/// Explains target arguments with the help of a [Solver].
#[derive(Derivative, Clone, Copy)]
#[derivative(Debug)]
pub struct ProvenanceAnalyzer<'a> {
    #[derivative(Debug = "ignore")]
    solver: &'a dyn Solver,
    policy: ChainPolicy,
}

impl<'a> ProvenanceAnalyzer<'a> {
    /// Creates an analyzer which delegates to the given solver.
    pub fn new(solver: &'a dyn Solver, policy: ChainPolicy) -> Self {
        Self { solver, policy }
    }

    /// Computes the provenance of the given kind.
    ///
    /// Fails with [UnknownArgument][crate::Error::UnknownArgument] if the target is not part of the framework.
    /// The markers of all returned models are merged.
    pub fn explain(
        &self,
        af: &Af,
        ranking: &Ranking,
        target: &str,
        kind: ProvenanceKind,
    ) -> Result<Provenance> {
        let target = af.lookup(target)?;
        log::info!("[Start] {kind} provenance of {:?}", af.id(target));
        let mut program = Program::new(Encoding::Provenance, SolveMode::All)
            .with_attacks(af)
            .fact(Atom::new("start", vec![Symbol::text(af.id(target))]))
            .fact(Atom::new(
                "chain_policy",
                vec![Symbol::constant(self.policy.to_string())],
            ));
        for (arg, status, rank) in ranking.iter() {
            if let Rank::Finite(value) = rank {
                program = program.fact(Atom::new(
                    "rank",
                    vec![Symbol::text(af.id(arg)), value.into()],
                ));
            }
            program = program.fact(Atom::new(
                "status",
                vec![Symbol::text(af.id(arg)), Symbol::constant(status.to_string())],
            ));
        }
        let (node_marker, edge_marker) = kind.markers();
        let mut result = Provenance {
            kind,
            target,
            nodes: BTreeSet::from([target]),
            edges: BTreeSet::new(),
        };
        for model in self.solver.solve(&program)? {
            for atom in model.matching(node_marker, 1) {
                result.nodes.insert(resolve(af, atom, 0)?);
            }
            for atom in model.matching(edge_marker, 2) {
                let attack = Attack::new(resolve(af, atom, 0)?, resolve(af, atom, 1)?);
                if af.attack_position(attack).is_none() {
                    return Err(SolverError::Parse(format!("{atom} is not an attack")).into());
                }
                result.edges.insert(attack);
            }
        }
        log::info!(
            "[Done] provenance with {} arguments and {} attacks",
            result.nodes.len(),
            result.edges.len()
        );
        Ok(result)
    }

    /// Computes the attack distances towards the target.
    pub fn local_view(&self, af: &Af, target: &str) -> Result<LocalView> {
        let target = af.lookup(target)?;
        log::info!("[Start] local view of {:?}", af.id(target));
        let program = Program::new(Encoding::LocalViewRank, SolveMode::All)
            .with_attacks(af)
            .fact(Atom::new("target", vec![Symbol::text(af.id(target))]));
        let mut distances: BTreeMap<Arg, usize> = BTreeMap::new();
        for model in self.solver.solve(&program)? {
            for atom in model.matching("min_distance", 2) {
                let arg = resolve(af, atom, 0)?;
                let distance = atom
                    .number_at(1)
                    .and_then(|value| usize::try_from(value).ok())
                    .ok_or_else(|| SolverError::Parse(format!("unexpected distance in {atom}")))?;
                distances
                    .entry(arg)
                    .and_modify(|known| *known = (*known).min(distance))
                    .or_insert(distance);
            }
        }
        let view = LocalView::new(target, distances);
        log::info!("[Done] local view with {} arguments", view.len());
        Ok(view)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{error::Error, ranking::GroundedRanker, solver::native::Native};
    use std::str::FromStr;
    use test_log::test;

    fn explain(af: &Af, target: &str, kind: ProvenanceKind) -> Provenance {
        let solver = Native::default();
        let ranking = GroundedRanker::new(&solver).rank(af).unwrap();
        ProvenanceAnalyzer::new(&solver, ChainPolicy::default())
            .explain(af, &ranking, target, kind)
            .unwrap()
    }

    fn ids(af: &Af, nodes: &BTreeSet<Arg>) -> Vec<String> {
        nodes.iter().map(|arg| af.id(*arg).to_string()).collect()
    }

    #[test]
    fn chain() {
        let af = Af::new(
            "chain",
            ["a", "b", "c", "d"],
            [("a", "b"), ("b", "c"), ("c", "d")],
        )
        .unwrap();
        for kind in [
            ProvenanceKind::Potential,
            ProvenanceKind::Actual,
            ProvenanceKind::Primary,
        ] {
            let provenance = explain(&af, "d", kind);
            assert_eq!(ids(&af, &provenance.nodes), vec!["a", "b", "c", "d"]);
            assert_eq!(provenance.edges.len(), 3);
        }
        let provenance = explain(&af, "a", ProvenanceKind::Potential);
        assert_eq!(ids(&af, &provenance.nodes), vec!["a"]);
        assert!(provenance.edges.is_empty());
    }

    #[test]
    fn kinds_differ() {
        // e is accepted in round 4, its attacker f is already defeated in round 1
        let af = Af::new(
            "mixed",
            ["a", "b", "c", "d", "e", "f", "z"],
            [
                ("a", "b"),
                ("b", "c"),
                ("c", "d"),
                ("d", "e"),
                ("a", "f"),
                ("f", "e"),
                ("e", "f"),
                ("z", "z"),
                ("z", "b"),
            ],
        )
        .unwrap();
        let potential = explain(&af, "e", ProvenanceKind::Potential);
        let actual = explain(&af, "e", ProvenanceKind::Actual);
        let primary = explain(&af, "e", ProvenanceKind::Primary);
        assert_eq!(
            ids(&af, &potential.nodes),
            vec!["a", "b", "c", "d", "e", "f", "z"]
        );
        assert_eq!(ids(&af, &actual.nodes), vec!["a", "b", "c", "d", "e", "f"]);
        assert_eq!(ids(&af, &primary.nodes), vec!["a", "b", "c", "d", "e"]);
        assert!(potential.contains_edge(af.attack("e", "f").unwrap()));
        assert!(!actual.contains_edge(af.attack("e", "f").unwrap()));
        assert!(!primary.contains_edge(af.attack("f", "e").unwrap()));
        assert!(primary.is_subset(&actual));
        assert!(actual.is_subset(&potential));
    }

    #[test]
    fn status_consistent_policy() {
        let af = Af::new("chain", ["a", "b", "c"], [("a", "b"), ("b", "c"), ("a", "c")]).unwrap();
        let solver = Native::default();
        let ranking = GroundedRanker::new(&solver).rank(&af).unwrap();
        let provenance = ProvenanceAnalyzer::new(&solver, ChainPolicy::StatusConsistent)
            .explain(&af, &ranking, "c", ProvenanceKind::Actual)
            .unwrap();
        // b and c are both defeated, so b -> c is no good move
        assert_eq!(ids(&af, &provenance.nodes), vec!["a", "c"]);
    }

    #[test]
    fn unknown_target() {
        let af = Af::new("x", ["a"], Vec::<(&str, &str)>::new()).unwrap();
        let solver = Native::default();
        let analyzer = ProvenanceAnalyzer::new(&solver, ChainPolicy::default());
        let ranking = Ranking::unavailable(&af);
        assert!(matches!(
            analyzer.explain(&af, &ranking, "nope", ProvenanceKind::Primary),
            Err(Error::UnknownArgument(_))
        ));
        assert!(matches!(
            analyzer.local_view(&af, "nope"),
            Err(Error::UnknownArgument(_))
        ));
    }

    #[test]
    fn local_view() {
        let af = Af::new(
            "view",
            ["a", "b", "c", "d", "e"],
            [("a", "b"), ("b", "c"), ("d", "c"), ("a", "d"), ("c", "e")],
        )
        .unwrap();
        let solver = Native::default();
        let view = ProvenanceAnalyzer::new(&solver, ChainPolicy::default())
            .local_view(&af, "c")
            .unwrap();
        assert_eq!(view.distance(Arg(2)), Some(0));
        assert_eq!(view.distance(Arg(1)), Some(1));
        assert_eq!(view.distance(Arg(3)), Some(1));
        assert_eq!(view.distance(Arg(0)), Some(2));
        assert_eq!(view.distance(Arg(4)), None);
        assert_eq!(view.bands().get(&1), Some(&vec![Arg(1), Arg(3)]));
    }

    #[test]
    fn kind_names() {
        assert_eq!(ProvenanceKind::from_str("PO"), Ok(ProvenanceKind::Potential));
        assert_eq!(ProvenanceKind::from_str("primary"), Ok(ProvenanceKind::Primary));
        assert_eq!(ProvenanceKind::Actual.to_string(), "actual");
        assert_eq!(ChainPolicy::StatusConsistent.to_string(), "status_consistent");
    }
}

/*!
Minimum sets of critical attacks.

An attack is critical for a desired labeling if it has to be suspended so that the grounded
semantics of the remaining framework agrees with the labeling.
The [CriticalAttackFinder] reports all sets of minimum cardinality.
*/
use std::{fmt::Display, time::Instant};

use derivative::Derivative;
use nom::{
    branch::alt,
    bytes::complete::{is_not, take_until},
    character::complete::{char, multispace0},
    combinator::all_consuming,
    multi::separated_list0,
    sequence::{delimited, separated_pair},
    IResult,
};
use roaring::RoaringBitmap;

use crate::{
    af::Af,
    config::SearchLimits,
    datatypes::{
        labeling::{Label, Labeling},
        Arg, Attack,
    },
    error::{Error, Result},
    solver::{resolve, Atom, Encoding, Model, Program, SolveMode, Solver, SolverError, Symbol},
};

/// A set of attacks of a framework, stored by their position.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalSet(RoaringBitmap);

impl CriticalSet {
    /// Creates a set from attack positions.
    pub fn new(positions: RoaringBitmap) -> Self {
        Self(positions)
    }

    /// Creates a set from attacks of the framework.
    pub fn from_attacks(af: &Af, attacks: impl IntoIterator<Item = Attack>) -> Result<Self> {
        attacks
            .into_iter()
            .map(|attack| {
                af.attack_position(attack)
                    .map(|pos| pos as u32)
                    .ok_or_else(|| {
                        Error::UnknownArgument(format!(
                            "({},{})",
                            af.id(attack.from),
                            af.id(attack.to)
                        ))
                    })
            })
            .collect::<Result<RoaringBitmap>>()
            .map(Self)
    }

    /// Reads the list form `(a, b), (c, d)`.
    pub fn parse(af: &Af, text: &str) -> Result<Self> {
        let (_, pairs) = all_consuming(pair_list)(text.trim())
            .map_err(|err| Error::Unreadable(format!("list of attacks: {err}")))?;
        let attacks = pairs
            .into_iter()
            .map(|(from, to)| af.attack(from.trim(), to.trim()))
            .collect::<Result<Vec<_>>>()?;
        Self::from_attacks(af, attacks)
    }

    /// Number of attacks.
    pub fn len(&self) -> usize {
        self.0.len() as usize
    }

    /// Returns [true] if no attack is contained.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The underlying attack positions.
    pub fn positions(&self) -> &RoaringBitmap {
        &self.0
    }

    /// Returns [true] if the attack is contained.
    pub fn contains(&self, af: &Af, attack: Attack) -> bool {
        af.attack_position(attack)
            .map(|pos| self.0.contains(pos as u32))
            .unwrap_or(false)
    }

    /// The contained attacks in framework order.
    pub fn attacks(&self, af: &Af) -> Vec<Attack> {
        self.0
            .iter()
            .filter_map(|pos| af.attacks().get(pos as usize).copied())
            .collect()
    }

    /// Suspends the attacks, which yields the framework the fix describes.
    pub fn apply(&self, af: &Af) -> Af {
        af.without(self.attacks(af).iter())
    }

    /// A [Display]able view in the list form `(a, b), (c, d)`.
    pub fn display<'a>(&'a self, af: &'a Af) -> impl Display + 'a {
        DisplaySet { set: self, af }
    }
}

struct DisplaySet<'a> {
    set: &'a CriticalSet,
    af: &'a Af,
}

impl Display for DisplaySet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs: Vec<String> = self
            .set
            .attacks(self.af)
            .into_iter()
            .map(|attack| format!("({}, {})", self.af.id(attack.from), self.af.id(attack.to)))
            .collect();
        write!(f, "{}", pairs.join(", "))
    }
}

fn name(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_until("\""), char('"')),
        is_not(",()\""),
    ))(input)
}

fn pair_list(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    separated_list0(
        delimited(multispace0, char(','), multispace0),
        delimited(
            char('('),
            separated_pair(
                delimited(multispace0, name, multispace0),
                char(','),
                delimited(multispace0, name, multispace0),
            ),
            char(')'),
        ),
    )(input)
}

/// Why no set of critical attacks is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoFixReason {
    /// The grounded semantics already agrees with the labeling.
    AlreadyGrounded,
    /// No suspension of attacks makes the grounded semantics agree with the labeling.
    Infeasible,
}

impl Display for NoFixReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoFixReason::AlreadyGrounded => {
                write!(f, "No critical attacks under the selected extension")
            }
            NoFixReason::Infeasible => {
                write!(f, "No set of suspended attacks yields the selected labeling")
            }
        }
    }
}

/// The answer of the [CriticalAttackFinder].
#[derive(Debug, Clone, PartialEq)]
pub enum CriticalOutcome {
    /// All distinct sets of minimum cardinality.
    Fixes(Vec<CriticalSet>),
    /// No set is reported.
    NoFix(NoFixReason),
}

/// Finds critical attacks with the help of a [Solver].
#[derive(Derivative, Clone, Copy)]
#[derivative(Debug)]
pub struct CriticalAttackFinder<'a> {
    #[derivative(Debug = "ignore")]
    solver: &'a dyn Solver,
}

impl<'a> CriticalAttackFinder<'a> {
    /// Creates a finder which delegates to the given solver.
    pub fn new(solver: &'a dyn Solver) -> Self {
        Self { solver }
    }

    /// Finds the minimum sets for a complete labeling.
    pub fn find_for(&self, af: &Af, labeling: &Labeling) -> Result<CriticalOutcome> {
        let constraints: Vec<(Arg, Label)> = af.args().map(|arg| (arg, labeling.label(arg))).collect();
        self.find(af, &constraints)
    }

    /// Finds the minimum sets for the given constraints; unconstrained arguments may take any label.
    pub fn find(&self, af: &Af, constraints: &[(Arg, Label)]) -> Result<CriticalOutcome> {
        log::info!(
            "[Start] critical attacks for {} constraints",
            constraints.len()
        );
        let mut program =
            Program::new(Encoding::Critical, SolveMode::AllOptimal).with_framework(af);
        for &(arg, label) in constraints {
            program = program.constraint(Atom::new(
                label.to_string(),
                vec![Symbol::text(af.id(arg))],
            ));
        }
        let models = self.solver.solve(&program)?;
        let mut sets: Vec<CriticalSet> = Vec::new();
        for model in models.iter() {
            let set = Self::read(af, model)?;
            if !sets.contains(&set) {
                sets.push(set);
            }
        }
        let outcome = match sets.iter().map(CriticalSet::len).min() {
            None => CriticalOutcome::NoFix(NoFixReason::Infeasible),
            Some(0) => CriticalOutcome::NoFix(NoFixReason::AlreadyGrounded),
            Some(minimum) => CriticalOutcome::Fixes(
                sets.into_iter()
                    .filter(|set| set.len() == minimum)
                    .collect(),
            ),
        };
        log::info!("[Done] critical attacks: {outcome:?}");
        Ok(outcome)
    }

    fn read(af: &Af, model: &Model) -> std::result::Result<CriticalSet, SolverError> {
        let mut positions = RoaringBitmap::new();
        for atom in model.matching("critical", 2) {
            let attack = Attack::new(resolve(af, atom, 0)?, resolve(af, atom, 1)?);
            let pos = af
                .attack_position(attack)
                .ok_or_else(|| SolverError::Parse(format!("{atom} is not an attack")))?;
            positions.insert(pos as u32);
        }
        Ok(CriticalSet(positions))
    }
}

/// Lexicographic enumeration of all `k`-subsets of `0..n`.
struct Combinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            started: false,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let k = self.indices.len();
        if k > self.n {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }
        let mut pos = k;
        loop {
            if pos == 0 {
                return None;
            }
            pos -= 1;
            if self.indices[pos] < self.n - k + pos {
                break;
            }
        }
        self.indices[pos] += 1;
        for next in pos + 1..k {
            self.indices[next] = self.indices[next - 1] + 1;
        }
        Some(self.indices.clone())
    }
}

/// Searches all minimum sets of attack positions whose suspension makes the grounded semantics agree with the constraints.
///
/// Returns no set if the constraints cannot be met and the empty set if they already are.
pub(crate) fn minimum_suspensions(
    af: &Af,
    constraints: &[(Arg, Label)],
    limits: &SearchLimits,
) -> std::result::Result<Vec<RoaringBitmap>, SolverError> {
    log::debug!("[Start] native critical search");
    let started = Instant::now();
    let mut required: Vec<Option<Label>> = vec![None; af.len()];
    for &(arg, label) in constraints {
        match required[arg.value()] {
            Some(other) if other != label => {
                log::debug!("{:?} is required to be {other} and {label}", af.id(arg));
                return Ok(Vec::new());
            }
            _ => required[arg.value()] = Some(label),
        }
        // unattacked arguments stay accepted whatever is suspended
        if label != Label::In && af.incoming(arg).is_empty() {
            log::debug!("unattacked {:?} cannot be {label}", af.id(arg));
            return Ok(Vec::new());
        }
    }

    let mut forced = RoaringBitmap::new();
    for (pos, attack) in af.attacks().iter().enumerate() {
        if required[attack.to.value()] == Some(Label::In)
            && (required[attack.from.value()] == Some(Label::In)
                || af.incoming(attack.from).is_empty())
        {
            forced.insert(pos as u32);
        }
    }
    let cone = af.ancestors(constraints.iter().map(|(arg, _)| *arg));
    let candidates: Vec<u32> = af
        .attacks()
        .iter()
        .enumerate()
        .filter(|(pos, attack)| cone[attack.to.value()] && !forced.contains(*pos as u32))
        .map(|(pos, _)| pos as u32)
        .collect();
    log::debug!(
        "{} forced suspensions, {} candidates",
        forced.len(),
        candidates.len()
    );

    let satisfied = |suspended: &RoaringBitmap| {
        let grounded = af.grounded_without(suspended);
        constraints
            .iter()
            .all(|(arg, label)| label.matches(grounded[arg.value()].0))
    };
    let mut inspected: u64 = 0;
    for size in 0..=candidates.len() {
        let mut found = Vec::new();
        for combination in Combinations::new(candidates.len(), size) {
            inspected += 1;
            if started.elapsed() > limits.timeout {
                log::info!("critical search stopped after {inspected} candidates");
                return Err(SolverError::Timeout(limits.timeout));
            }
            if limits.max_candidates.map_or(false, |max| inspected > max) {
                log::info!("critical search reached its candidate limit");
                return Err(SolverError::CandidateLimit(inspected - 1));
            }
            let mut suspended = forced.clone();
            suspended.extend(combination.into_iter().map(|idx| candidates[idx]));
            if satisfied(&suspended) {
                found.push(suspended);
            }
        }
        if !found.is_empty() {
            log::debug!(
                "[Done] native critical search: {} sets of {} forced and {size} chosen attacks",
                found.len(),
                forced.len()
            );
            return Ok(found);
        }
    }
    log::debug!("[Done] native critical search: infeasible");
    Ok(Vec::new())
}

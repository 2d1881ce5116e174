/*!
The boundary to declarative solvers.

Every analysis which may be delegated is phrased as a [Program]: an [Encoding] naming the rule file,
a list of ground facts, a list of atoms which are required to hold and a [SolveMode].
A [Solver] answers with the list of [Model]s it found.
*/
pub mod atoms;
#[cfg(feature = "clingo")]
pub mod clingo;
pub mod native;

use std::{fmt::Display, time::Duration};

use strum::{EnumString, EnumVariantNames};

use crate::{af::Af, datatypes::Arg};

/// Errors reported by a [Solver].
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// The solver could not be started.
    #[error("solver is unavailable: {0}")]
    Unavailable(String),
    /// The solver did not answer within the given time.
    #[error("solver did not answer within {0:?}")]
    Timeout(Duration),
    /// The search inspected its maximal number of candidates without an answer.
    #[error("search gave up after {0} candidates")]
    CandidateLimit(u64),
    /// The solver terminated abnormally.
    #[error("solver failed with exit code {code:?}: {message}")]
    Failed {
        /// Exit code of the process, if any.
        code: Option<i32>,
        /// Diagnostic output of the solver.
        message: String,
    },
    /// The output of the solver could not be read.
    #[error("unreadable solver output: {0}")]
    Parse(String),
    /// The facts do not describe a valid instance of the encoding.
    #[error("invalid program: {0}")]
    InvalidProgram(String),
    /// Communication with the solver failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A ground term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// An integer.
    Number(i64),
    /// A lowercase constant, e.g. `accepted`.
    Constant(String),
    /// A quoted string, used for all argument identifiers.
    Text(String),
}

impl Symbol {
    /// Creates a quoted string symbol.
    pub fn text(value: impl Into<String>) -> Self {
        Symbol::Text(value.into())
    }

    /// Creates a constant symbol.
    pub fn constant(value: impl Into<String>) -> Self {
        Symbol::Constant(value.into())
    }

    /// The name carried by a constant or string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Symbol::Constant(value) | Symbol::Text(value) => Some(value),
            Symbol::Number(_) => None,
        }
    }

    /// The value of a number.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Symbol::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Number(value) => write!(f, "{value}"),
            Symbol::Constant(value) => write!(f, "{value}"),
            Symbol::Text(value) => write!(
                f,
                "\"{}\"",
                value.replace('\\', "\\\\").replace('"', "\\\"")
            ),
        }
    }
}

impl From<i64> for Symbol {
    fn from(value: i64) -> Self {
        Symbol::Number(value)
    }
}

impl From<usize> for Symbol {
    fn from(value: usize) -> Self {
        Symbol::Number(value as i64)
    }
}

/// A ground atom `predicate(args...)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom {
    /// Name of the predicate.
    pub predicate: String,
    /// The arguments, possibly empty.
    pub args: Vec<Symbol>,
}

impl Atom {
    /// Creates a new atom.
    pub fn new(predicate: impl Into<String>, args: Vec<Symbol>) -> Self {
        Self {
            predicate: predicate.into(),
            args,
        }
    }

    /// Returns [true] if predicate and arity match.
    pub fn is(&self, predicate: &str, arity: usize) -> bool {
        self.predicate == predicate && self.args.len() == arity
    }

    /// The name carried by the argument at `pos`.
    pub fn str_at(&self, pos: usize) -> Option<&str> {
        self.args.get(pos).and_then(Symbol::as_str)
    }

    /// The number carried by the argument at `pos`.
    pub fn number_at(&self, pos: usize) -> Option<i64> {
        self.args.get(pos).and_then(Symbol::as_number)
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.predicate)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
            write!(f, "({})", args.join(","))?;
        }
        Ok(())
    }
}

/// An answer of the solver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    atoms: Vec<Atom>,
    cost: Option<Vec<i64>>,
}

impl Model {
    /// Creates a model without optimisation costs.
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms, cost: None }
    }

    /// Attaches the costs reported for this model.
    pub fn with_cost(mut self, cost: Vec<i64>) -> Self {
        self.cost = Some(cost);
        self
    }

    /// All atoms of the model.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// The costs of an optimisation problem, if any.
    pub fn cost(&self) -> Option<&[i64]> {
        self.cost.as_deref()
    }

    /// All atoms with the given predicate and arity.
    pub fn matching<'a>(
        &'a self,
        predicate: &'a str,
        arity: usize,
    ) -> impl Iterator<Item = &'a Atom> + 'a {
        self.atoms
            .iter()
            .filter(move |atom| atom.is(predicate, arity))
    }
}

/// The rule files known to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Encoding {
    /// Grounded statuses together with the settling round.
    Grounded,
    /// Potential, actual and primary provenance of a target.
    Provenance,
    /// Minimum sets of attacks to suspend.
    Critical,
    /// Distances of all arguments to a target.
    LocalViewRank,
}

impl Encoding {
    /// Name of the rule file.
    pub fn file_name(self) -> String {
        format!("{self}.lp")
    }
}

/// How many models are requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SolveMode {
    /// The first model.
    Single,
    /// Every model.
    All,
    /// Every optimal model.
    AllOptimal,
}

/// A request to a [Solver].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// The rule file.
    pub encoding: Encoding,
    /// Ground facts of the instance.
    pub facts: Vec<Atom>,
    /// Atoms every model has to contain.
    pub constraints: Vec<Atom>,
    /// How many models are requested.
    pub mode: SolveMode,
}

impl Program {
    /// Creates a program without facts.
    pub fn new(encoding: Encoding, mode: SolveMode) -> Self {
        Self {
            encoding,
            facts: Vec::new(),
            constraints: Vec::new(),
            mode,
        }
    }

    /// Adds `arg/1` and `att/2` facts for the whole framework.
    pub fn with_framework(mut self, af: &Af) -> Self {
        self.facts.extend(
            af.args()
                .map(|arg| Atom::new("arg", vec![Symbol::text(af.id(arg))])),
        );
        self.with_attacks(af)
    }

    /// Adds `att/2` facts for the whole framework.
    pub fn with_attacks(mut self, af: &Af) -> Self {
        self.facts.extend(af.attacks().iter().map(|attack| {
            Atom::new(
                "att",
                vec![
                    Symbol::text(af.id(attack.from)),
                    Symbol::text(af.id(attack.to)),
                ],
            )
        }));
        self
    }

    /// Adds a fact.
    pub fn fact(mut self, atom: Atom) -> Self {
        self.facts.push(atom);
        self
    }

    /// Requires an atom to hold.
    pub fn constraint(mut self, atom: Atom) -> Self {
        self.constraints.push(atom);
        self
    }

    /// All facts with the given predicate and arity.
    pub fn facts_matching<'a>(
        &'a self,
        predicate: &'a str,
        arity: usize,
    ) -> impl Iterator<Item = &'a Atom> + 'a {
        self.facts
            .iter()
            .filter(move |atom| atom.is(predicate, arity))
    }
}

impl Display for Program {
    /// Writes the instance part of the program, which is handed to the solver together with the rule file.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for fact in self.facts.iter() {
            writeln!(f, "{fact}.")?;
        }
        for constraint in self.constraints.iter() {
            writeln!(f, ":- not {constraint}.")?;
        }
        Ok(())
    }
}

/// Looks up the argument named at position `pos` of an atom.
pub(crate) fn resolve(af: &Af, atom: &Atom, pos: usize) -> Result<Arg, SolverError> {
    atom.str_at(pos)
        .and_then(|id| af.arg(id))
        .ok_or_else(|| SolverError::Parse(format!("{atom} does not name an argument")))
}

/// A solver answering [Program]s.
pub trait Solver {
    /// Computes the models of the program.
    /// An empty list states that the program has no model.
    fn solve(&self, program: &Program) -> Result<Vec<Model>, SolverError>;
}

impl<S: Solver + ?Sized> Solver for Box<S> {
    fn solve(&self, program: &Program) -> Result<Vec<Model>, SolverError> {
        (**self).solve(program)
    }
}

impl<S: Solver + ?Sized> Solver for &S {
    fn solve(&self, program: &Program) -> Result<Vec<Model>, SolverError> {
        (**self).solve(program)
    }
}

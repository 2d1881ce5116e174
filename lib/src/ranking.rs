/*!
Grounded ranking of arguments.

The ranking assigns every argument its grounded [Status] and the [Rank] of the round in which it settles.
It is obtained from a [Solver] running the [grounded][Encoding::Grounded] encoding, which reports
`len(accepted, A, N)` / `len(defeated, A, N)` for settled arguments and `len(undefined, A)` for the others.
*/
use std::collections::BTreeMap;

use derivative::Derivative;

use crate::{
    af::Af,
    datatypes::{
        labeling::{Label, Labeling},
        Arg, Rank, Status,
    },
    error::{Error, Result},
    solver::{resolve, Encoding, Model, Program, SolveMode, Solver, SolverError},
};

/// Status and rank of every argument of a framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    entries: Vec<(Status, Rank)>,
    available: bool,
}

impl Ranking {
    /// Wraps the result of a grounded computation.
    pub fn new(entries: Vec<(Status, Rank)>) -> Self {
        Self {
            entries,
            available: true,
        }
    }

    /// The fallback used when no ranking could be computed: every argument is undecided with an unbounded rank.
    pub fn unavailable(af: &Af) -> Self {
        Self {
            entries: vec![(Status::Undecided, Rank::Unbounded); af.len()],
            available: false,
        }
    }

    /// Returns [false] for the [fallback][Ranking::unavailable].
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Rank of an argument.
    pub fn rank(&self, arg: Arg) -> Rank {
        self.entries[arg.value()].1
    }

    /// Grounded status of an argument.
    pub fn status(&self, arg: Arg) -> Status {
        self.entries[arg.value()].0
    }

    /// Number of ranked arguments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns [true] if no argument is ranked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Status and rank of all arguments in argument order.
    pub fn iter(&self) -> impl Iterator<Item = (Arg, Status, Rank)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(pos, &(status, rank))| (Arg(pos), status, rank))
    }

    /// The grounded labeling.
    pub fn labeling(&self) -> Labeling {
        Labeling::from_labels(
            self.entries
                .iter()
                .map(|(status, _)| match status {
                    Status::Accepted => Label::In,
                    Status::Defeated => Label::Out,
                    Status::Undecided => Label::Undec,
                })
                .collect(),
        )
    }

    /// Arguments grouped by finite rank; unbounded arguments are left out.
    pub fn bands(&self) -> BTreeMap<usize, Vec<Arg>> {
        let mut bands: BTreeMap<usize, Vec<Arg>> = BTreeMap::new();
        for (arg, _, rank) in self.iter() {
            if let Rank::Finite(value) = rank {
                bands.entry(value).or_default().push(arg);
            }
        }
        bands
    }

    /// Arguments whose rank changed from unbounded to finite with respect to an earlier ranking.
    pub fn newly_bounded<'a>(&'a self, before: &'a Ranking) -> impl Iterator<Item = Arg> + 'a {
        self.iter()
            .filter(move |(arg, _, rank)| {
                !rank.is_unbounded()
                    && arg.value() < before.len()
                    && before.rank(*arg).is_unbounded()
            })
            .map(|(arg, _, _)| arg)
    }
}

/// Computes [Ranking]s with the help of a [Solver].
#[derive(Derivative, Clone, Copy)]
#[derivative(Debug)]
pub struct GroundedRanker<'a> {
    #[derivative(Debug = "ignore")]
    solver: &'a dyn Solver,
}

impl<'a> GroundedRanker<'a> {
    /// Creates a ranker which delegates to the given solver.
    pub fn new(solver: &'a dyn Solver) -> Self {
        Self { solver }
    }

    /// Ranks all arguments of the framework.
    ///
    /// Fails with [RankingUnavailable][Error::RankingUnavailable] if the solver does not return a model.
    pub fn rank(&self, af: &Af) -> Result<Ranking> {
        log::info!("[Start] ranking {:?}", af.name());
        let program = Program::new(Encoding::Grounded, SolveMode::Single).with_framework(af);
        let models = self.solver.solve(&program)?;
        let model = models.first().ok_or(Error::RankingUnavailable)?;
        let ranking = Ranking::new(Self::read(af, model)?);
        log::info!("[Done] ranking");
        Ok(ranking)
    }

    fn read(af: &Af, model: &Model) -> std::result::Result<Vec<(Status, Rank)>, SolverError> {
        let mut entries = vec![None; af.len()];
        for atom in model.matching("len", 3) {
            let arg = resolve(af, atom, 1)?;
            let status = match atom.str_at(0) {
                Some("accepted") => Status::Accepted,
                Some("defeated") => Status::Defeated,
                _ => return Err(SolverError::Parse(format!("unexpected status in {atom}"))),
            };
            let round = atom
                .number_at(2)
                .and_then(|value| usize::try_from(value).ok())
                .ok_or_else(|| SolverError::Parse(format!("unexpected round in {atom}")))?;
            entries[arg.value()] = Some((status, Rank::Finite(round)));
        }
        for atom in model.matching("len", 2) {
            if atom.str_at(0) != Some("undefined") {
                return Err(SolverError::Parse(format!("unexpected status in {atom}")));
            }
            entries[resolve(af, atom, 1)?.value()] = Some((Status::Undecided, Rank::Unbounded));
        }
        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(pos, entry)| {
                entry.unwrap_or_else(|| {
                    log::warn!("no rank reported for {:?}", af.id(Arg(pos)));
                    (Status::Undecided, Rank::Unbounded)
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::solver::{native::Native, Atom, Symbol};
    use test_log::test;

    struct Fixed(Vec<Model>);

    impl Solver for Fixed {
        fn solve(&self, _program: &Program) -> std::result::Result<Vec<Model>, SolverError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn chain() {
        let af = Af::new("chain", ["a", "b", "c"], [("a", "b"), ("b", "c")]).unwrap();
        let solver = Native::default();
        let ranking = GroundedRanker::new(&solver).rank(&af).unwrap();
        assert!(ranking.is_available());
        assert_eq!(ranking.rank(Arg(0)), Rank::Finite(0));
        assert_eq!(ranking.status(Arg(1)), Status::Defeated);
        assert_eq!(ranking.rank(Arg(2)), Rank::Finite(2));
        assert_eq!(
            ranking.labeling().labels(),
            &[Label::In, Label::Out, Label::In]
        );
        assert_eq!(ranking.bands().len(), 3);
    }

    #[test]
    fn self_attack() {
        let af = Af::new("self", ["x"], [("x", "x")]).unwrap();
        let ranking = GroundedRanker::new(&Native::default()).rank(&af).unwrap();
        assert_eq!(ranking.status(Arg(0)), Status::Undecided);
        assert_eq!(ranking.rank(Arg(0)), Rank::Unbounded);
        assert!(ranking.bands().is_empty());
    }

    #[test]
    fn no_model() {
        let af = Af::new("x", ["a"], Vec::<(&str, &str)>::new()).unwrap();
        let solver = Fixed(Vec::new());
        assert!(matches!(
            GroundedRanker::new(&solver).rank(&af),
            Err(Error::RankingUnavailable)
        ));
        let fallback = Ranking::unavailable(&af);
        assert!(!fallback.is_available());
        assert_eq!(fallback.rank(Arg(0)), Rank::Unbounded);
    }

    #[test]
    fn foreign_model() {
        let af = Af::new("x", ["a", "b"], [("a", "b")]).unwrap();
        let solver = Fixed(vec![Model::new(vec![
            Atom::new(
                "len",
                vec![Symbol::constant("accepted"), Symbol::text("a"), 0usize.into()],
            ),
            Atom::new("len", vec![Symbol::constant("undefined"), Symbol::text("b")]),
        ])]);
        let ranking = GroundedRanker::new(&solver).rank(&af).unwrap();
        assert_eq!(ranking.rank(Arg(1)), Rank::Unbounded);

        let solver = Fixed(vec![Model::new(vec![Atom::new(
            "len",
            vec![Symbol::constant("accepted"), Symbol::text("zz"), 0usize.into()],
        )])]);
        assert!(matches!(
            GroundedRanker::new(&solver).rank(&af),
            Err(Error::Solver(SolverError::Parse(_)))
        ));
    }

    #[test]
    fn newly_bounded() {
        let af = Af::new("cycle", ["a", "b"], [("a", "b"), ("b", "a")]).unwrap();
        let before = GroundedRanker::new(&Native::default()).rank(&af).unwrap();
        let reduced = af.without(&[af.attack("b", "a").unwrap()]);
        let after = GroundedRanker::new(&Native::default()).rank(&reduced).unwrap();
        assert_eq!(after.newly_bounded(&before).collect::<Vec<_>>(), vec![Arg(0), Arg(1)]);
    }
}

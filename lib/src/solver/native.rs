//! Embedded solver, answering every [Encoding] without an external process.
use std::{collections::HashSet, str::FromStr};

use crate::{
    af::{Af, AttackSpec},
    config::SearchLimits,
    critical::minimum_suspensions,
    datatypes::{labeling::Label, Arg, Rank, Status},
    provenance::{distances, traces, ChainPolicy, ProvenanceKind},
};

use super::{Atom, Encoding, Model, Program, SolveMode, Solver, SolverError, Symbol};

/// The embedded solver.
///
/// The instance is rebuilt from the facts of the [Program], so arguments are only known by their names.
#[derive(Debug, Default, Clone, Copy)]
pub struct Native {
    limits: SearchLimits,
}

impl Native {
    /// Creates a solver, which stops searches exceeding the given limits.
    pub fn new(limits: SearchLimits) -> Self {
        Self { limits }
    }
}

impl Solver for Native {
    fn solve(&self, program: &Program) -> Result<Vec<Model>, SolverError> {
        log::debug!(
            "native solver: {} with {} facts and {} constraints",
            program.encoding,
            program.facts.len(),
            program.constraints.len()
        );
        let af = framework(program)?;
        let mut models = match program.encoding {
            Encoding::Grounded => vec![grounded(&af)],
            Encoding::Provenance => vec![provenance(&af, program)?],
            Encoding::LocalViewRank => vec![local_view(&af, program)?],
            Encoding::Critical => critical(&af, program, &self.limits)?,
        };
        if program.mode == SolveMode::Single {
            models.truncate(1);
        }
        Ok(models)
    }
}

fn name(atom: &Atom, pos: usize) -> Result<&str, SolverError> {
    atom.str_at(pos)
        .ok_or_else(|| SolverError::InvalidProgram(format!("{atom} does not name an argument")))
}

/// Rebuilds the framework from `arg/1` and `att/2` facts.
/// Arguments only mentioned in other facts are added in order of appearance.
fn framework(program: &Program) -> Result<Af, SolverError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut arguments: Vec<&str> = Vec::new();
    let mut attacks: Vec<AttackSpec> = Vec::new();
    let mut add = |id| {
        if seen.insert(id) {
            arguments.push(id);
        }
    };
    for atom in program.facts.iter() {
        match (atom.predicate.as_str(), atom.args.len()) {
            ("arg", 1) | ("start", 1) | ("target", 1) | ("rank", 2) | ("status", 2) => {
                add(name(atom, 0)?)
            }
            ("att", 2) => {
                add(name(atom, 0)?);
                add(name(atom, 1)?);
                attacks.push((name(atom, 0)?, name(atom, 1)?).into());
            }
            _ => {}
        }
    }
    for atom in program.constraints.iter() {
        add(name(atom, 0)?);
    }
    Af::new("program", arguments, attacks)
        .map_err(|err| SolverError::InvalidProgram(err.to_string()))
}

fn lookup(af: &Af, atom: &Atom, pos: usize) -> Result<Arg, SolverError> {
    af.arg(name(atom, pos)?)
        .ok_or_else(|| SolverError::InvalidProgram(format!("{atom} names an unknown argument")))
}

fn text(af: &Af, arg: Arg) -> Symbol {
    Symbol::text(af.id(arg))
}

fn grounded(af: &Af) -> Model {
    Model::new(
        af.grounded()
            .into_iter()
            .enumerate()
            .map(|(pos, (status, rank))| {
                let arg = text(af, pos.into());
                match rank {
                    Rank::Finite(round) => Atom::new(
                        "len",
                        vec![Symbol::constant(status.to_string()), arg, round.into()],
                    ),
                    Rank::Unbounded => {
                        Atom::new("len", vec![Symbol::constant(status.to_string()), arg])
                    }
                }
            })
            .collect(),
    )
}

fn target(af: &Af, program: &Program, predicate: &str) -> Result<Arg, SolverError> {
    program
        .facts_matching(predicate, 1)
        .next()
        .ok_or_else(|| SolverError::InvalidProgram(format!("missing {predicate}/1 fact")))
        .and_then(|atom| lookup(af, atom, 0))
}

fn provenance(af: &Af, program: &Program) -> Result<Model, SolverError> {
    let start = target(af, program, "start")?;
    let mut settled = vec![(Status::Undecided, Rank::Unbounded); af.len()];
    for atom in program.facts_matching("rank", 2) {
        let round = atom
            .number_at(1)
            .and_then(|value| usize::try_from(value).ok())
            .ok_or_else(|| SolverError::InvalidProgram(format!("{atom} carries no round")))?;
        settled[lookup(af, atom, 0)?.value()].1 = Rank::Finite(round);
    }
    for atom in program.facts_matching("status", 2) {
        let status = atom
            .str_at(1)
            .and_then(|value| Status::from_str(value).ok())
            .ok_or_else(|| SolverError::InvalidProgram(format!("{atom} carries no status")))?;
        settled[lookup(af, atom, 0)?.value()].0 = status;
    }
    let policy = match program.facts_matching("chain_policy", 1).next() {
        Some(atom) => atom
            .str_at(0)
            .and_then(|value| ChainPolicy::from_str(value).ok())
            .ok_or_else(|| SolverError::InvalidProgram(format!("unknown policy in {atom}")))?,
        None => ChainPolicy::default(),
    };
    let result = traces(af, start, &settled, policy);
    let mut atoms = Vec::new();
    for (kind, (nodes, edges)) in [
        (ProvenanceKind::Potential, result.potential),
        (ProvenanceKind::Actual, result.actual),
        (ProvenanceKind::Primary, result.primary),
    ] {
        let (node_marker, edge_marker) = kind.markers();
        atoms.extend(
            nodes
                .into_iter()
                .map(|arg| Atom::new(node_marker, vec![text(af, arg)])),
        );
        atoms.extend(edges.into_iter().map(|attack| {
            Atom::new(
                edge_marker,
                vec![text(af, attack.from), text(af, attack.to)],
            )
        }));
    }
    Ok(Model::new(atoms))
}

fn local_view(af: &Af, program: &Program) -> Result<Model, SolverError> {
    let center = target(af, program, "target")?;
    Ok(Model::new(
        distances(af, center)
            .into_iter()
            .map(|(arg, distance)| Atom::new("min_distance", vec![text(af, arg), distance.into()]))
            .collect(),
    ))
}

fn critical(af: &Af, program: &Program, limits: &SearchLimits) -> Result<Vec<Model>, SolverError> {
    let constraints = program
        .constraints
        .iter()
        .map(|atom| {
            let label = Label::from_str(&atom.predicate).map_err(|_| {
                SolverError::InvalidProgram(format!("unsupported constraint {atom}"))
            })?;
            Ok((lookup(af, atom, 0)?, label))
        })
        .collect::<Result<Vec<_>, SolverError>>()?;
    Ok(minimum_suspensions(af, &constraints, limits)?
        .into_iter()
        .map(|positions| {
            let atoms: Vec<Atom> = positions
                .iter()
                .filter_map(|pos| af.attacks().get(pos as usize))
                .map(|attack| {
                    Atom::new("critical", vec![text(af, attack.from), text(af, attack.to)])
                })
                .collect();
            let cost = atoms.len() as i64;
            Model::new(atoms).with_cost(vec![cost])
        })
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    fn chain() -> Af {
        Af::new("chain", ["a", "b", "c"], [("a", "b"), ("b", "c")]).unwrap()
    }

    #[test]
    fn grounded_atoms() {
        let program = Program::new(Encoding::Grounded, SolveMode::Single)
            .with_framework(&Af::new("s", ["a", "x"], [("x", "x")]).unwrap());
        let models = Native::default().solve(&program).unwrap();
        assert_eq!(models.len(), 1);
        let shown: Vec<String> = models[0].atoms().iter().map(ToString::to_string).collect();
        assert_eq!(
            shown,
            vec!["len(accepted,\"a\",0)", "len(undefined,\"x\")"]
        );
    }

    #[test]
    fn provenance_atoms() {
        let af = chain();
        let program = Program::new(Encoding::Provenance, SolveMode::All)
            .with_attacks(&af)
            .fact(Atom::new("start", vec![Symbol::text("c")]));
        let models = Native::default().solve(&program).unwrap();
        // without ranks every argument is unbounded, so all attacks are admitted
        assert_eq!(models[0].matching("pr_prov", 1).count(), 3);
        assert_eq!(models[0].matching("act_edge", 2).count(), 2);
    }

    #[test]
    fn invalid_programs() {
        let program = Program::new(Encoding::Provenance, SolveMode::All).with_attacks(&chain());
        assert!(matches!(
            Native::default().solve(&program),
            Err(SolverError::InvalidProgram(_))
        ));
        let program = Program::new(Encoding::Critical, SolveMode::AllOptimal)
            .with_framework(&chain())
            .constraint(Atom::new("maybe", vec![Symbol::text("a")]));
        assert!(matches!(
            Native::default().solve(&program),
            Err(SolverError::InvalidProgram(_))
        ));
    }

    #[test]
    fn critical_models() {
        let af = Af::new("cycle", ["a", "b"], [("a", "b"), ("b", "a")]).unwrap();
        let program = Program::new(Encoding::Critical, SolveMode::AllOptimal)
            .with_framework(&af)
            .constraint(Atom::new("in", vec![Symbol::text("a")]));
        let models = Native::default().solve(&program).unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].cost(), Some(&[1][..]));
        assert_eq!(models[0].atoms()[0].to_string(), "critical(\"b\",\"a\")");
    }
}

//! Parser for ground atoms and for the textual answer-set output of clingo.
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while},
    character::complete::{char, digit1, multispace0, multispace1, satisfy},
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

use super::{Atom, Model, SolverError, Symbol};

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_lowercase() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '\''),
    ))(input)
}

fn number(input: &str) -> IResult<&str, Symbol> {
    map_res(recognize(pair(opt(char('-')), digit1)), |digits: &str| {
        digits.parse::<i64>().map(Symbol::Number)
    })(input)
}

fn text(input: &str) -> IResult<&str, Symbol> {
    map(
        delimited(
            char('"'),
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((
                    value("\\", tag("\\")),
                    value("\"", tag("\"")),
                    value("\n", tag("n")),
                )),
            )),
            char('"'),
        ),
        |content| Symbol::Text(content.unwrap_or_default()),
    )(input)
}

fn constant(input: &str) -> IResult<&str, Symbol> {
    map(identifier, Symbol::constant)(input)
}

fn symbol(input: &str) -> IResult<&str, Symbol> {
    alt((number, text, constant))(input)
}

fn atom(input: &str) -> IResult<&str, Atom> {
    map(
        pair(
            identifier,
            opt(delimited(
                char('('),
                separated_list0(delimited(multispace0, char(','), multispace0), symbol),
                char(')'),
            )),
        ),
        |(predicate, args)| Atom::new(predicate, args.unwrap_or_default()),
    )(input)
}

fn atom_list(input: &str) -> IResult<&str, Vec<Atom>> {
    delimited(multispace0, separated_list0(multispace1, atom), multispace0)(input)
}

fn costs(input: &str) -> IResult<&str, Vec<i64>> {
    preceded(
        terminated(tag("Optimization:"), multispace0),
        separated_list0(
            multispace1,
            map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<i64>),
        ),
    )(input)
}

/// Parses a whitespace separated list of ground atoms, as printed for one answer set.
pub fn parse_atoms(input: &str) -> Result<Vec<Atom>, SolverError> {
    all_consuming(atom_list)(input)
        .map(|(_, atoms)| atoms)
        .map_err(|err| SolverError::Parse(format!("{err}")))
}

/// Collects the models of the plain text output (`--outf=0`) of clingo.
///
/// Each `Answer:` line is followed by the atoms of the model; a following `Optimization:` line is attached as its cost.
pub fn parse_output(output: &str) -> Result<Vec<Model>, SolverError> {
    let mut models: Vec<Model> = Vec::new();
    let mut lines = output.lines();
    while let Some(line) = lines.next() {
        let line = line.trim();
        if line.starts_with("Answer:") {
            let atoms = parse_atoms(lines.next().unwrap_or_default())?;
            models.push(Model::new(atoms));
        } else if line.starts_with("Optimization:") {
            let (_, cost) = all_consuming(terminated(costs, multispace0))(line)
                .map_err(|err| SolverError::Parse(format!("{err}")))?;
            if let Some(last) = models.pop() {
                models.push(last.with_cost(cost));
            }
        } else if line.starts_with("UNSATISFIABLE") {
            log::debug!("solver reported unsatisfiability");
            return Ok(Vec::new());
        }
    }
    log::trace!("read {} models", models.len());
    Ok(models)
}

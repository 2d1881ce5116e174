//! Delegates the placement to the `dot` executable of Graphviz.
use std::{path::PathBuf, time::Duration};

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    character::complete::{char, none_of, space1},
    combinator::{map, opt, value},
    number::complete::double,
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::{
    config::COMPUTE_TIME,
    graph::GraphDescription,
    process::{run, RunError},
};

use super::{LayoutEngine, LayoutError, Point, Positions};

/// Runs `dot -Tplain` and reads the node coordinates from its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graphviz {
    executable: PathBuf,
    timeout: Duration,
}

impl Default for Graphviz {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("dot"),
            timeout: COMPUTE_TIME,
        }
    }
}

impl Graphviz {
    /// Uses another executable.
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Kills the engine after the given time.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl LayoutEngine for Graphviz {
    fn layout(&self, graph: &GraphDescription) -> Result<Positions, LayoutError> {
        let finished = run(
            &self.executable,
            &["-Tplain".to_string()],
            graph.to_string(),
            self.timeout,
        )
        .map_err(|err| match err {
            RunError::Spawn(err) => LayoutError::Unavailable(format!(
                "cannot start {}: {err}",
                self.executable.display()
            )),
            RunError::Timeout => LayoutError::Timeout(self.timeout),
            RunError::Io(err) => LayoutError::Io(err),
        })?;
        if finished.code != Some(0) {
            return Err(LayoutError::Failed {
                code: finished.code,
                message: finished.stderr.trim().to_string(),
            });
        }
        parse_plain(&finished.stdout)
    }
}

fn quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                none_of("\\\""),
                '\\',
                alt((
                    value("\\", tag("\\")),
                    value("\"", tag("\"")),
                    value("\n", tag("n")),
                )),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

fn bare(input: &str) -> IResult<&str, String> {
    map(is_not(" \t\r\n\""), str::to_string)(input)
}

/// `node <name> <x> <y> ...`
fn node(input: &str) -> IResult<&str, (String, Point)> {
    map(
        tuple((
            preceded(tuple((tag("node"), space1)), alt((quoted, bare))),
            preceded(space1, double),
            preceded(space1, double),
        )),
        |(name, x, y)| (name, Point::new(x, y)),
    )(input)
}

/// Reads the node lines of the `plain` output format; all other lines are skipped.
pub fn parse_plain(output: &str) -> Result<Positions, LayoutError> {
    if output.lines().next().map_or(true, |line| !line.starts_with("graph")) {
        return Err(LayoutError::Parse("missing graph header".to_string()));
    }
    let mut positions = Positions::default();
    for line in output.lines().map(str::trim).filter(|line| line.starts_with("node ")) {
        let (_, (name, point)) =
            node(line).map_err(|err| LayoutError::Parse(format!("{line:?}: {err}")))?;
        positions.insert(name, point);
    }
    Ok(positions)
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn plain_output() {
        let output = "graph 1 2.75 3.5\n\
                      node a 1.375 3.1 0.8 0.8 a.0 solid circle black #40cfff\n\
                      node \"b \\\"1\\\"\" 1.375 0.4 0.8 0.8 \"b\" solid circle black lightgrey\n\
                      edge a \"b \\\"1\\\"\" 4 1.375 2.7 1.375 2.3 1.375 1.9 1.375 1.5 solid black\n\
                      stop\n";
        let positions = parse_plain(output).unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions.get("a"), Some(Point::new(1.375, 3.1)));
        assert_eq!(positions.get("b \"1\""), Some(Point::new(1.375, 0.4)));
    }

    #[test]
    fn broken_output() {
        assert!(matches!(
            parse_plain("graph 1 1 1\nnode a x y\nstop\n"),
            Err(LayoutError::Parse(_))
        ));
        assert!(matches!(parse_plain(""), Err(LayoutError::Parse(_))));
    }

    #[test]
    fn missing_executable() {
        let engine = Graphviz::default().with_executable("/nonexistent/dot");
        let graph = GraphDescription {
            name: "g".into(),
            rank_dir: Default::default(),
            frozen: false,
            nodes: Vec::new(),
            edges: Vec::new(),
            bands: Vec::new(),
        };
        assert!(matches!(
            engine.layout(&graph),
            Err(LayoutError::Unavailable(_))
        ));
    }
}

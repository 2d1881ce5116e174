//! Delegates [Program]s to a clingo executable.
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    config::COMPUTE_TIME,
    process::{run, RunError},
};

use super::{atoms::parse_output, Model, Program, SolveMode, Solver, SolverError};

/// Exit codes from this value on signal an error of clingo; lower codes encode the search result.
const ERROR_CODE: i32 = 65;

/// Runs `clingo` on the rule file of the [Encoding][super::Encoding] and the facts of the [Program].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clingo {
    executable: PathBuf,
    encodings: PathBuf,
    timeout: Duration,
}

impl Clingo {
    /// Creates a solver which reads its rule files from the given directory.
    pub fn new(encodings: impl Into<PathBuf>) -> Self {
        Self {
            executable: PathBuf::from("clingo"),
            encodings: encodings.into(),
            timeout: COMPUTE_TIME,
        }
    }

    /// Uses another executable.
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Kills clingo after the given time.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The directory holding the rule files.
    pub fn encodings(&self) -> &Path {
        &self.encodings
    }

    fn arguments(&self, rules: &Path, mode: SolveMode) -> Vec<String> {
        let mut args = vec![
            rules.display().to_string(),
            "-".to_string(),
            "--outf=0".to_string(),
            "--warn=none".to_string(),
        ];
        match mode {
            SolveMode::Single => args.extend(["-n".to_string(), "1".to_string()]),
            SolveMode::All => args.extend(["-n".to_string(), "0".to_string()]),
            SolveMode::AllOptimal => args.extend([
                "-n".to_string(),
                "0".to_string(),
                "--opt-mode=optN".to_string(),
            ]),
        }
        args
    }
}

impl Solver for Clingo {
    fn solve(&self, program: &Program) -> Result<Vec<Model>, SolverError> {
        let rules = self.encodings.join(program.encoding.file_name());
        if !rules.is_file() {
            return Err(SolverError::Unavailable(format!(
                "rule file {} does not exist",
                rules.display()
            )));
        }
        let finished = run(
            &self.executable,
            &self.arguments(&rules, program.mode),
            program.to_string(),
            self.timeout,
        )
        .map_err(|err| match err {
            RunError::Spawn(err) => SolverError::Unavailable(format!(
                "cannot start {}: {err}",
                self.executable.display()
            )),
            RunError::Timeout => SolverError::Timeout(self.timeout),
            RunError::Io(err) => SolverError::Io(err),
        })?;
        match finished.code {
            Some(code) if code < ERROR_CODE => parse_output(&finished.stdout),
            code => Err(SolverError::Failed {
                code,
                message: finished.stderr.trim().to_string(),
            }),
        }
    }
}

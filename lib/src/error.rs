//! Errors raised by the analyses and by the external collaborators.
use std::time::Duration;

use crate::layout::LayoutError;
use crate::solver::SolverError;

/// Result type of the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors of the analysis pipeline.
///
/// Only [MalformedGraph][Error::MalformedGraph] is fatal for the framework it was raised for,
/// every other kind is recovered by the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The framework violates its structural invariants and was rejected at construction.
    #[error("malformed argumentation framework: {0}")]
    MalformedGraph(String),
    /// A request names an argument which is not part of the framework.
    #[error("unknown argument \"{0}\"")]
    UnknownArgument(String),
    /// A labeling or a set of attacks could not be read from its textual form.
    #[error("cannot read {0}")]
    Unreadable(String),
    /// The solver did not return the grounded model.
    #[error("grounded ranking is unavailable")]
    RankingUnavailable,
    /// The search did not finish within its limits.
    #[error("search exceeded its limit of {0:?}")]
    SearchTimeout(Duration),
    /// The search inspected its maximal number of candidates.
    #[error("search gave up after inspecting {0} candidates")]
    SearchExhausted(u64),
    /// The solver failed for another reason.
    #[error(transparent)]
    Solver(SolverError),
    /// The layout engine failed.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl Error {
    /// Returns [true] if the session may continue with its last good state.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::MalformedGraph(_))
    }
}

impl From<SolverError> for Error {
    fn from(error: SolverError) -> Self {
        match error {
            SolverError::Timeout(limit) => Error::SearchTimeout(limit),
            SolverError::CandidateLimit(inspected) => Error::SearchExhausted(inspected),
            other => Error::Solver(other),
        }
    }
}

/*!
A viewer session: one framework at a time, one [RenderState], and the collaborators all analyses
are delegated to.

Recoverable failures never end a session. A missing ranking degrades to unbounded ranks, an unknown
provenance target to no highlight, and any other recoverable error to the last good description.
Each degradation is reported as a [Notice].
*/
use std::fmt::Display;

use derivative::Derivative;

use crate::{
    af::Af,
    annotator::{state::RenderState, Insight, LayoutAnnotator, Mode, RenderRequest},
    config::Options,
    critical::{CriticalAttackFinder, CriticalOutcome},
    datatypes::labeling::{Extension, Labeling},
    error::{Error, Result},
    graph::GraphDescription,
    layout::LayoutEngine,
    provenance::{Provenance, ProvenanceAnalyzer, ProvenanceKind},
    ranking::{GroundedRanker, Ranking},
    solver::{native::Native, Solver},
};

/// A degradation which happened while serving a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The grounded ranking could not be computed; all arguments are drawn unbounded.
    RankingUnavailable(String),
    /// The provenance target is not part of the framework; nothing is highlighted.
    UnknownTarget(String),
    /// The request failed; the last good description is returned.
    Stale(String),
}

impl Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::RankingUnavailable(reason) => {
                write!(f, "ranking unavailable, showing all arguments unbounded ({reason})")
            }
            Notice::UnknownTarget(target) => {
                write!(f, "argument \"{target}\" does not exist, nothing highlighted")
            }
            Notice::Stale(reason) => write!(f, "showing the previous graph ({reason})"),
        }
    }
}

/// The answer to a [RenderRequest].
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// The description to draw.
    pub graph: GraphDescription,
    /// What went wrong on the way.
    pub notices: Vec<Notice>,
}

/// Owns the collaborators and the [RenderState] of one viewer.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Session {
    #[derivative(Debug = "ignore")]
    solver: Box<dyn Solver>,
    #[derivative(Debug = "ignore")]
    engine: Box<dyn LayoutEngine>,
    options: Options,
    state: RenderState,
}

impl Session {
    /// Creates a session.
    pub fn new(solver: Box<dyn Solver>, engine: Box<dyn LayoutEngine>, options: Options) -> Self {
        Self {
            solver,
            engine,
            options,
            state: RenderState::default(),
        }
    }

    /// Creates a session using the embedded solver with the configured search limits.
    pub fn with_native_solver(engine: Box<dyn LayoutEngine>, options: Options) -> Self {
        let solver = Box::new(Native::new(options.limits));
        Self::new(solver, engine, options)
    }

    /// The settings of the session.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The placement cache of the session.
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Computes the grounded ranking.
    pub fn rank(&self, af: &Af) -> Result<Ranking> {
        GroundedRanker::new(self.solver.as_ref()).rank(af)
    }

    /// Labels the framework by an extension.
    pub fn classify(&self, af: &Af, extension: &Extension) -> Result<Labeling> {
        Labeling::from_extension(af, extension)
    }

    /// Explains a target argument.
    pub fn explain(&self, af: &Af, target: &str, kind: ProvenanceKind) -> Result<Provenance> {
        let ranking = self.rank(af)?;
        ProvenanceAnalyzer::new(self.solver.as_ref(), self.options.chain_policy)
            .explain(af, &ranking, target, kind)
    }

    /// Searches the minimum sets of attacks to suspend for the labeling.
    pub fn critical_sets(&self, af: &Af, labeling: &Labeling) -> Result<CriticalOutcome> {
        CriticalAttackFinder::new(self.solver.as_ref()).find_for(af, labeling)
    }

    /// Serves a request.
    ///
    /// Fails only if the error is not recoverable, or if no earlier description exists to fall back to.
    pub fn render(&mut self, request: &RenderRequest<'_>) -> Result<Rendered> {
        let mut notices = Vec::new();
        match self.draw(request, &mut notices) {
            Ok(graph) => Ok(Rendered { graph, notices }),
            Err(err) if err.is_recoverable() => match self.state.last() {
                Some(last) => {
                    log::warn!("rendering failed, falling back to the previous graph: {err}");
                    notices.push(Notice::Stale(err.to_string()));
                    Ok(Rendered {
                        graph: last.clone(),
                        notices,
                    })
                }
                None => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    fn draw(&mut self, request: &RenderRequest<'_>, notices: &mut Vec<Notice>) -> Result<GraphDescription> {
        let af = request.af;
        let mut insight = Insight::default();
        if request.mode != Mode::Editing {
            insight.ranking = Some(match self.rank(af) {
                Ok(ranking) => ranking,
                Err(err @ (Error::RankingUnavailable | Error::Solver(_))) => {
                    log::warn!("{err}");
                    notices.push(Notice::RankingUnavailable(err.to_string()));
                    Ranking::unavailable(af)
                }
                Err(err) => return Err(err),
            });
        }
        match &request.mode {
            Mode::Provenance {
                target,
                kind,
                local_view,
            } => {
                let analyzer = ProvenanceAnalyzer::new(self.solver.as_ref(), self.options.chain_policy);
                let ranking = insight
                    .ranking
                    .as_ref()
                    .ok_or(Error::RankingUnavailable)?;
                match analyzer.explain(af, ranking, target, *kind) {
                    Ok(provenance) => {
                        insight.provenance = Some(provenance);
                        if *local_view {
                            insight.local_view = Some(analyzer.local_view(af, target)?);
                        }
                    }
                    Err(Error::UnknownArgument(id)) => {
                        log::warn!("provenance target {id:?} is unknown");
                        notices.push(Notice::UnknownTarget(id));
                    }
                    Err(err) => return Err(err),
                }
            }
            Mode::CriticalAttacks {
                selection: Some(selection),
                apply: true,
            } => {
                insight.fixed = Some(self.rank(&selection.apply(af))?);
            }
            Mode::Editing | Mode::Extensions | Mode::CriticalAttacks { .. } => {}
        }
        LayoutAnnotator::new(self.engine.as_ref(), &self.options).annotate(
            &mut self.state,
            request,
            &insight,
        )
    }
}

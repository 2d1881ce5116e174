/*!
Turns a framework and the results of its analyses into a [GraphDescription].

The [LayoutAnnotator] is the only part of the pipeline which talks to a [LayoutEngine].
Coordinates are cached in a [RenderState], which decides per request whether the placement
is computed anew or reused.
*/
pub mod highlight;
pub mod state;
pub mod style;

use derivative::Derivative;

use crate::{
    af::Af,
    config::{Options, RankMode},
    critical::CriticalSet,
    datatypes::{labeling::Labeling, Arg},
    error::Result,
    graph::{Band, BandKind, Edge, GraphDescription, Node},
    layout::LayoutEngine,
    provenance::{LocalView, Provenance, ProvenanceKind},
    ranking::Ranking,
};

use self::{
    state::{Plan, RenderState},
    style::{ranked_label, round_label, Direction, EdgeClass, Line, NodeClass},
};

/// What the viewer is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// The framework is being edited; no semantics are shown.
    Editing,
    /// A labeling is shown.
    Extensions,
    /// The provenance of a target argument is highlighted.
    Provenance {
        /// Identifier of the target.
        target: String,
        /// Kind of the provenance.
        kind: ProvenanceKind,
        /// Whether the layering follows the attack distances towards the target.
        local_view: bool,
    },
    /// A set of critical attacks is previewed.
    CriticalAttacks {
        /// The previewed set.
        selection: Option<CriticalSet>,
        /// Whether the ranking of the framework without the selected attacks is shown.
        apply: bool,
    },
}

/// A single request of the viewer.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    /// The framework to draw.
    pub af: &'a Af,
    /// The labeling to show, if any.
    pub labeling: Option<&'a Labeling>,
    /// What is shown.
    pub mode: Mode,
    /// Whether the node positions are to be pinned.
    pub freeze: bool,
}

impl<'a> RenderRequest<'a> {
    /// A request in the given mode.
    pub fn new(af: &'a Af, mode: Mode) -> Self {
        Self {
            af,
            labeling: None,
            mode,
            freeze: false,
        }
    }

    /// Shows the given labeling.
    pub fn with_labeling(mut self, labeling: &'a Labeling) -> Self {
        self.labeling = Some(labeling);
        self
    }

    /// Pins the node positions.
    pub fn frozen(mut self, freeze: bool) -> Self {
        self.freeze = freeze;
        self
    }

    /// Key of the visible labels, which determines whether a new placement is needed.
    ///
    /// The provenance target and its layering belong to the key; previews of critical attacks do not.
    pub fn visible_labels(&self) -> String {
        let labels = match (&self.mode, self.labeling) {
            (Mode::Editing, _) => return String::new(),
            (_, None) => String::new(),
            (_, Some(labeling)) => labeling.canonical(self.af),
        };
        match &self.mode {
            Mode::Provenance {
                target,
                kind,
                local_view,
            } => format!(
                "{labels}|{kind}:{target}{}",
                if *local_view { ":local" } else { "" }
            ),
            _ => labels,
        }
    }
}

/// Results of the analyses a request depends on.
#[derive(Debug, Clone, Default)]
pub struct Insight {
    /// Grounded ranking of the framework.
    pub ranking: Option<Ranking>,
    /// Provenance of the target.
    pub provenance: Option<Provenance>,
    /// Attack distances towards the target.
    pub local_view: Option<LocalView>,
    /// Grounded ranking of the framework without the selected critical attacks.
    pub fixed: Option<Ranking>,
}

/// Builds graph descriptions and places them.
#[derive(Derivative, Clone, Copy)]
#[derivative(Debug)]
pub struct LayoutAnnotator<'a> {
    #[derivative(Debug = "ignore")]
    engine: &'a dyn LayoutEngine,
    options: &'a Options,
}

impl<'a> LayoutAnnotator<'a> {
    /// Creates an annotator placing its descriptions with the given engine.
    pub fn new(engine: &'a dyn LayoutEngine, options: &'a Options) -> Self {
        Self { engine, options }
    }

    fn empty(&self, af: &Af) -> GraphDescription {
        GraphDescription {
            name: af.name().to_string(),
            rank_dir: self.options.rank_dir,
            frozen: false,
            nodes: Vec::with_capacity(af.len()),
            edges: Vec::with_capacity(af.attacks().len()),
            bands: Vec::new(),
        }
    }

    /// The framework without any semantic styling.
    pub fn plain(&self, af: &Af) -> GraphDescription {
        let mut graph = self.empty(af);
        graph.nodes.extend(af.arguments().iter().map(|argument| {
            let mut node = Node::plain(argument.id.as_str());
            node.tooltip = argument.annotation.clone();
            node.url = argument.url.clone();
            node
        }));
        graph.edges.extend(af.attacks().iter().map(|&attack| {
            let mut edge = Edge::plain(af.id(attack.from), af.id(attack.to));
            edge.tooltip = af.attack_annotation(attack).map(str::to_string);
            edge
        }));
        graph
    }

    /// The framework styled by its grounded ranking and a labeling.
    pub fn describe(&self, af: &Af, ranking: &Ranking, labeling: &Labeling) -> GraphDescription {
        let palette = &self.options.palette;
        let layering = self.options.layering;
        let mut graph = self.plain(af);
        for (arg, node) in af.args().zip(graph.nodes.iter_mut()) {
            let class = NodeClass::of(ranking.status(arg), labeling.label(arg));
            node.label = ranked_label(af.id(arg), ranking.rank(arg));
            node.class = class;
            node.fill = class.fill(palette).map(str::to_string);
        }
        for (attack, edge) in af.attacks().iter().zip(graph.edges.iter_mut()) {
            let (from, to) = (attack.from, attack.to);
            let class = EdgeClass::of(
                (ranking.status(from), labeling.label(from)),
                (ranking.status(to), labeling.label(to)),
            );
            let direction = Direction::of(ranking.rank(from), ranking.rank(to));
            let (line, arrow) = class.stroke();
            edge.class = class;
            edge.direction = direction;
            edge.color = Some(class.color(palette).to_string());
            edge.arrow = arrow;
            edge.label = class
                .has_round_label()
                .then(|| round_label(ranking.rank(from)));
            (edge.line, edge.constraint) = match (direction, class) {
                (Direction::Reversed, _) => (Line::Dashed, layering.rederivations),
                (Direction::Forward, EdgeClass::Blunder) => (line, layering.blunders),
                (Direction::Forward, _) => (line, true),
            };
        }
        graph.bands = self.bands(af, ranking);
        graph
    }

    fn bands(&self, af: &Af, ranking: &Ranking) -> Vec<Band> {
        let ids = |args: &[Arg]| -> Vec<String> {
            args.iter().map(|&arg| af.id(arg).to_string()).collect()
        };
        let bands = ranking.bands();
        match self.options.rank_mode {
            RankMode::None => Vec::new(),
            RankMode::SameRank => bands
                .values()
                .map(|members| Band {
                    kind: BandKind::Same,
                    members: ids(members),
                })
                .collect(),
            RankMode::MinRank => bands
                .values()
                .next()
                .map(|members| Band {
                    kind: BandKind::Min,
                    members: ids(members),
                })
                .into_iter()
                .collect(),
        }
    }

    /// Builds the description of a request and places it.
    ///
    /// The placement follows the policy of the [RenderState]; the attributes are always derived anew.
    pub fn annotate(
        &self,
        state: &mut RenderState,
        request: &RenderRequest<'_>,
        insight: &Insight,
    ) -> Result<GraphDescription> {
        let af = request.af;
        let unavailable;
        let ranking = match &insight.ranking {
            Some(ranking) => ranking,
            None => {
                unavailable = Ranking::unavailable(af);
                &unavailable
            }
        };
        let palette = &self.options.palette;
        let mut graph = match (&request.mode, request.labeling) {
            (Mode::Editing, _) | (_, None) => self.plain(af),
            (
                Mode::CriticalAttacks {
                    selection: Some(_),
                    apply: true,
                },
                Some(labeling),
            ) => match &insight.fixed {
                Some(fixed) => {
                    let mut graph = self.describe(af, fixed, labeling);
                    highlight::apply(&mut graph, af, ranking, fixed);
                    graph
                }
                None => self.describe(af, ranking, labeling),
            },
            (_, Some(labeling)) => self.describe(af, ranking, labeling),
        };
        match &request.mode {
            Mode::Provenance { .. } => {
                if let Some(provenance) = &insight.provenance {
                    highlight::provenance(
                        &mut graph,
                        af,
                        provenance,
                        insight.local_view.as_ref(),
                        palette,
                    );
                }
            }
            Mode::CriticalAttacks {
                selection: Some(selection),
                ..
            } => highlight::critical(&mut graph, af, ranking, selection, palette),
            Mode::Editing | Mode::Extensions | Mode::CriticalAttacks { .. } => {}
        }

        let visible = request.visible_labels();
        match state.plan(af.fingerprint(), &visible, request.freeze) {
            Plan::Compute => {
                log::debug!("[Start] placing {} nodes", graph.nodes.len());
                let positions = self.engine.layout(&graph)?;
                log::debug!("[Done] placing");
                state.store_layout(positions, &visible, request.freeze);
            }
            Plan::Reuse => log::debug!("reusing the cached placement"),
        }
        if let Some(positions) = state.positions() {
            for node in graph.nodes.iter_mut() {
                node.position = positions.get(&node.id);
            }
        }
        graph.frozen = state.is_frozen();
        state.remember(graph.clone());
        Ok(graph)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        config::Layering,
        datatypes::labeling::{Extension, Label},
        layout::{layered::Layered, LayoutError, Positions},
        provenance::ProvenanceAnalyzer,
        ranking::GroundedRanker,
        solver::native::Native,
    };
    use std::cell::Cell;
    use test_log::test;

    struct Counting {
        calls: Cell<usize>,
    }

    impl LayoutEngine for Counting {
        fn layout(&self, graph: &GraphDescription) -> std::result::Result<Positions, LayoutError> {
            self.calls.set(self.calls.get() + 1);
            Layered::default().layout(graph)
        }
    }

    fn ranked(af: &Af) -> Ranking {
        GroundedRanker::new(&Native::default()).rank(af).unwrap()
    }

    #[test]
    fn chain_description() {
        let af = Af::new("chain", ["a", "b", "c"], [("a", "b"), ("b", "c")]).unwrap();
        let ranking = ranked(&af);
        let options = Options::default();
        let engine = Layered::default();
        let annotator = LayoutAnnotator::new(&engine, &options);
        let graph = annotator.describe(&af, &ranking, &ranking.labeling());
        let labels: Vec<&str> = graph.nodes.iter().map(|node| node.label.as_str()).collect();
        assert_eq!(labels, vec!["a.0", "b.1", "c.2"]);
        assert_eq!(graph.nodes[0].fill.as_deref(), Some("#40cfff"));
        assert_eq!(graph.nodes[1].class, NodeClass::Defeated);
        assert_eq!(graph.edges[0].class, EdgeClass::GroundedAccepted);
        assert_eq!(graph.edges[1].class, EdgeClass::GroundedDefeated);
        assert_eq!(graph.edges[0].label.as_deref(), Some("1"));
        assert_eq!(graph.edges[1].label.as_deref(), Some("2"));
        assert!(graph
            .edges
            .iter()
            .all(|edge| edge.direction == Direction::Forward && edge.line == Line::Solid));
        assert_eq!(graph.bands.len(), 3);
        assert_eq!(graph.bands[0].members, vec!["a".to_string()]);
    }

    #[test]
    fn against_the_wind() {
        // the self-attacking u never settles, but attacks d which settles in round 1
        let af = Af::new("wind", ["x", "d", "u"], [("x", "d"), ("u", "u"), ("u", "d")]).unwrap();
        let ranking = ranked(&af);
        let options = Options {
            layering: Layering {
                blunders: false,
                rederivations: true,
            },
            ..Options::default()
        };
        let engine = Layered::default();
        let annotator = LayoutAnnotator::new(&engine, &options);
        let graph = annotator.describe(&af, &ranking, &ranking.labeling());
        let wind = graph.edge("u", "d").unwrap();
        assert_eq!(wind.direction, Direction::Reversed);
        assert_eq!(wind.class, EdgeClass::Blunder);
        for edge in graph.edges.iter() {
            assert_eq!(edge.direction == Direction::Reversed, edge.line == Line::Dashed);
        }
        assert!(graph.edges.iter().all(|edge| edge.constraint));
        assert!(graph.to_string().contains(r#""d" -> "u" [dir=back"#));
    }

    #[test]
    fn self_attack_and_blunders() {
        let af = Af::new("x", ["x", "y"], [("x", "x"), ("x", "y")]).unwrap();
        let ranking = ranked(&af);
        let options = Options::default();
        let engine = Layered::default();
        let annotator = LayoutAnnotator::new(&engine, &options);
        let labeling = Labeling::from_sets(&af, Vec::<&str>::new(), ["y"], ["x"]).unwrap();
        let graph = annotator.describe(&af, &ranking, &labeling);
        assert_eq!(graph.nodes[0].label, "x.∞");
        assert_eq!(graph.nodes[0].class, NodeClass::Undecided);
        assert_eq!(graph.nodes[1].class, NodeClass::LightDefeated);
        assert_eq!(graph.edges[0].class, EdgeClass::Undecided);
        assert_eq!(graph.edges[0].label.as_deref(), Some("∞"));
        let blunder = &graph.edges[1];
        assert_eq!(blunder.class, EdgeClass::Blunder);
        assert_eq!(blunder.line, Line::Dotted);
        assert_eq!(blunder.label, None);
        assert!(!blunder.constraint);
        assert!(graph.bands.is_empty());
        assert_eq!(labeling.label(af.lookup("x").unwrap()), Label::Undec);
    }

    #[test]
    fn placement_policy() {
        let af = Af::new("chain", ["a", "b", "c"], [("a", "b"), ("b", "c")]).unwrap();
        let ranking = ranked(&af);
        let insight = Insight {
            ranking: Some(ranking.clone()),
            ..Insight::default()
        };
        let options = Options::default();
        let engine = Counting { calls: Cell::new(0) };
        let annotator = LayoutAnnotator::new(&engine, &options);
        let mut state = RenderState::default();

        let grounded = ranking.labeling();
        let other = Labeling::from_extension(&af, &Extension::from_iter(["b"])).unwrap();
        let request = RenderRequest::new(&af, Mode::Extensions).with_labeling(&grounded);
        let first = annotator.annotate(&mut state, &request, &insight).unwrap();
        assert!(first.is_placed());
        assert_eq!(engine.calls.get(), 1);
        // same labels, new preview only
        let preview = RenderRequest::new(
            &af,
            Mode::CriticalAttacks {
                selection: Some(CriticalSet::parse(&af, "(a,b)").unwrap()),
                apply: false,
            },
        )
        .with_labeling(&grounded);
        annotator.annotate(&mut state, &preview, &insight).unwrap();
        assert_eq!(engine.calls.get(), 1);
        // visible labels changed
        let request = RenderRequest::new(&af, Mode::Extensions).with_labeling(&other);
        annotator.annotate(&mut state, &request, &insight).unwrap();
        assert_eq!(engine.calls.get(), 2);
        // every provenance target is placed anew
        let insight_for = |target: &str| {
            let native = Native::default();
            let analyzer = ProvenanceAnalyzer::new(&native, options.chain_policy);
            Insight {
                ranking: Some(ranking.clone()),
                provenance: Some(
                    analyzer
                        .explain(&af, &ranking, target, ProvenanceKind::Potential)
                        .unwrap(),
                ),
                local_view: Some(analyzer.local_view(&af, target).unwrap()),
                fixed: None,
            }
        };
        let explain = |target: &str| Mode::Provenance {
            target: target.into(),
            kind: ProvenanceKind::Potential,
            local_view: true,
        };
        for (target, calls) in [("c", 3), ("b", 4), ("b", 4)] {
            let request = RenderRequest::new(&af, explain(target)).with_labeling(&other);
            annotator
                .annotate(&mut state, &request, &insight_for(target))
                .unwrap();
            assert_eq!(engine.calls.get(), calls, "target {target}");
        }
        let request = RenderRequest::new(
            &af,
            Mode::Provenance {
                target: "b".into(),
                kind: ProvenanceKind::Potential,
                local_view: false,
            },
        )
        .with_labeling(&other);
        annotator.annotate(&mut state, &request, &insight).unwrap();
        assert_eq!(engine.calls.get(), 5);
        let request = RenderRequest::new(&af, Mode::Extensions).with_labeling(&other);
        annotator.annotate(&mut state, &request, &insight).unwrap();
        assert_eq!(engine.calls.get(), 6);
        // frozen: placed once more at most, then kept
        let frozen = annotator
            .annotate(&mut state, &request.clone().frozen(true), &insight)
            .unwrap();
        let request = RenderRequest::new(&af, Mode::Extensions)
            .with_labeling(&grounded)
            .frozen(true);
        let again = annotator.annotate(&mut state, &request, &insight).unwrap();
        assert_eq!(engine.calls.get(), 6);
        assert!(again.frozen);
        let positions = |graph: &GraphDescription| -> Vec<String> {
            graph
                .nodes
                .iter()
                .map(|node| format!("{:?}", node.position))
                .collect()
        };
        assert_eq!(positions(&frozen), positions(&again));
        // a changed framework invalidates the cache
        let bigger = Af::new("chain", ["a", "b", "c", "d"], [("a", "b"), ("b", "c")]).unwrap();
        let request = RenderRequest::new(&bigger, Mode::Editing).frozen(true);
        let graph = annotator.annotate(&mut state, &request, &Insight::default()).unwrap();
        assert_eq!(engine.calls.get(), 7);
        assert!(graph.is_placed());
    }
}

/*!
This binary explains `Abstract Argumentation Frameworks (AF)` and renders them as styled graph descriptions.

# Abstract Argumentation Frameworks
An `abstract argumentation framework` consists of arguments and a binary attack relation between them.
The grounded extension is built in rounds, and the round in which an argument settles is its rank.
Based on the ranking the binary can
- label the framework by an extension handed in with `--ext`
- explain an argument by its potential, actual or primary provenance
- search the minimum sets of attacks whose suspension makes the grounded semantics agree with the labeling
- write the framework, styled by all of the above, in the DOT language or as JSON

# Input
Frameworks are read either in the APX format
```plain
arg(a). arg(b). att(a,b).
```
or as JSON
```plain
{"name": "chain", "arguments": [{"id": "a"}, {"id": "b"}], "defeats": [{"from": "a", "to": "b"}]}
```

# Usage
```plain
Usage: af-vis [OPTIONS] <INPUT>

Arguments:
  <INPUT>  Input filename

Options:
      --format <FORMAT>              Format of the input, guessed by the file extension if absent [possible values: apx, json]
      --config <CONFIG>              Read the settings from a JSON file
      --rust_log <RUST_LOG>          Sets the verbosity to 'warn', 'info', 'debug' or 'trace' if -v and -q are not use [env: RUST_LOG=]
  -v...                              Sets log verbosity (multiple times means more verbose)
  -q                                 Sets log verbosity to only errors
      --solver <SOLVER>              Choose the solver of either 'native' or 'clingo' [default: native]
      --encodings <ENCODINGS>        Directory of the rule files used by clingo [env: AF_VIS_ENCODINGS=]
      --engine <ENGINE>              Choose the layout engine of either 'layered' or 'graphviz' [default: layered]
      --rank-dir <RANK_DIR>          Direction of the layers [possible values: TB, BT, LR, RL]
      --rank-mode <RANK_MODE>        Grouping of arguments of equal rank [possible values: none, same_rank, min_rank]
      --chain-policy <CHAIN_POLICY>  Attacks followed by the actual provenance [possible values: rank_increasing, status_consistent]
      --timeout <TIMEOUT>            Time limit of the critical attack search in seconds
      --grd                          Print the grounded ranking
      --ext <EXT>                    Label the framework by the extension, given as comma separated identifiers
      --prov <PROV>                  Explain the given argument
      --kind <KIND>                  Kind of the provenance [default: potential] [possible values: potential, po, actual, ac, primary, pr]
      --local                        Layer the provenance by the attack distances towards the target
      --critical                     Search the critical attacks of the extension
      --select <SELECT>              Preview a set of critical attacks, given as `(a, b), (c, d)`
      --apply                        Show the ranking of the framework without the selected attacks
      --dot                          Write the styled graph in the DOT language
      --json                         Write the styled graph as JSON
  -h, --help                         Print help
  -V, --version                      Print version
```
 */

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

mod input;

use std::{path::PathBuf, process::ExitCode, time::Duration};

use af_vis::{
    af::Af,
    annotator::{Mode, RenderRequest},
    config::{Options, RankDir, RankMode},
    critical::{CriticalOutcome, CriticalSet},
    datatypes::labeling::{Extension, Labeling},
    layout::{layered::Layered, LayoutEngine},
    provenance::{ChainPolicy, ProvenanceKind},
    session::Session,
    solver::{native::Native, Solver},
};
use clap::{builder::PossibleValuesParser, Parser};
use input::Format;
use strum::VariantNames;

type Failure = Box<dyn std::error::Error>;

#[derive(Parser, Debug)]
#[command(name = "af-vis", author, version, about)]
struct App {
    /// Input filename
    input: PathBuf,
    /// Format of the input, guessed by the file extension if absent
    #[arg(long, value_parser = PossibleValuesParser::new(Format::VARIANTS))]
    format: Option<String>,
    /// Read the settings from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Sets the verbosity to 'warn', 'info', 'debug' or 'trace' if -v and -q are not use
    #[arg(long = "rust_log", env)]
    rust_log: Option<String>,
    /// Sets log verbosity (multiple times means more verbose)
    #[arg(short, action = clap::ArgAction::Count, group = "verbosity")]
    verbose: u8,
    /// Sets log verbosity to only errors
    #[arg(short, group = "verbosity")]
    quiet: bool,
    /// Choose the solver of either 'native' or 'clingo'
    #[arg(long, default_value = "native", value_parser = ["native", "clingo"])]
    solver: String,
    /// Directory of the rule files used by clingo
    #[arg(long, env = "AF_VIS_ENCODINGS")]
    encodings: Option<PathBuf>,
    /// Choose the layout engine of either 'layered' or 'graphviz'
    #[arg(long, default_value = "layered", value_parser = ["layered", "graphviz"])]
    engine: String,
    /// Direction of the layers
    #[arg(long, value_parser = PossibleValuesParser::new(RankDir::VARIANTS))]
    rank_dir: Option<String>,
    /// Grouping of arguments of equal rank
    #[arg(long, value_parser = PossibleValuesParser::new(RankMode::VARIANTS))]
    rank_mode: Option<String>,
    /// Attacks followed by the actual provenance
    #[arg(long, value_parser = PossibleValuesParser::new(ChainPolicy::VARIANTS))]
    chain_policy: Option<String>,
    /// Time limit of the critical attack search in seconds
    #[arg(long)]
    timeout: Option<f64>,
    /// Print the grounded ranking
    #[arg(long = "grd")]
    grounded: bool,
    /// Label the framework by the extension, given as comma separated identifiers
    #[arg(long = "ext", value_delimiter = ',')]
    extension: Option<Vec<String>>,
    /// Explain the given argument
    #[arg(long = "prov", group = "mode")]
    provenance: Option<String>,
    /// Kind of the provenance
    #[arg(long, default_value = "potential", value_parser = PossibleValuesParser::new(ProvenanceKind::VARIANTS))]
    kind: String,
    /// Layer the provenance by the attack distances towards the target
    #[arg(long, requires = "provenance")]
    local: bool,
    /// Search the critical attacks of the extension
    #[arg(long, requires = "extension")]
    critical: bool,
    /// Preview a set of critical attacks, given as `(a, b), (c, d)`
    #[arg(long, group = "mode")]
    select: Option<String>,
    /// Show the ranking of the framework without the selected attacks
    #[arg(long, requires = "select")]
    apply: bool,
    /// Write the styled graph in the DOT language
    #[arg(long, group = "output")]
    dot: bool,
    /// Write the styled graph as JSON
    #[arg(long, group = "output")]
    json: bool,
}

impl App {
    fn init_logging(&self) {
        let filter_level = match self.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            3.. => log::LevelFilter::Trace,
            0 => {
                if self.quiet {
                    log::LevelFilter::Error
                } else if let Some(rust_log) = self.rust_log.as_deref() {
                    match rust_log {
                        "error" => log::LevelFilter::Error,
                        "info" => log::LevelFilter::Info,
                        "debug" => log::LevelFilter::Debug,
                        "trace" => log::LevelFilter::Trace,
                        _ => log::LevelFilter::Warn,
                    }
                } else {
                    log::LevelFilter::Warn
                }
            }
        };
        env_logger::builder().filter_level(filter_level).init();
        log::info!("Version: {}", clap::crate_version!());
    }

    fn options(&self) -> Result<Options, Failure> {
        let mut options = match &self.config {
            Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            None => Options::default(),
        };
        if let Some(rank_dir) = &self.rank_dir {
            options.rank_dir = rank_dir.parse()?;
        }
        if let Some(rank_mode) = &self.rank_mode {
            options.rank_mode = rank_mode.parse()?;
        }
        if let Some(chain_policy) = &self.chain_policy {
            options.chain_policy = chain_policy.parse()?;
        }
        if let Some(timeout) = self.timeout {
            options.limits.timeout = Duration::try_from_secs_f64(timeout)?;
        }
        log::debug!("settings: {options:?}");
        Ok(options)
    }

    fn solver(&self, options: &Options) -> Result<Box<dyn Solver>, Failure> {
        match self.solver.as_str() {
            #[cfg(feature = "clingo")]
            "clingo" => {
                let encodings = self
                    .encodings
                    .clone()
                    .ok_or("the clingo solver needs the directory of its rule files (--encodings)")?;
                Ok(Box::new(
                    af_vis::solver::clingo::Clingo::new(encodings).with_timeout(options.limits.timeout),
                ))
            }
            "native" => Ok(Box::new(Native::new(options.limits))),
            other => Err(format!("solver {other:?} is not available in this build").into()),
        }
    }

    #[cfg_attr(not(feature = "graphviz"), allow(unused_variables))]
    fn engine(&self, options: &Options) -> Result<Box<dyn LayoutEngine>, Failure> {
        match self.engine.as_str() {
            #[cfg(feature = "graphviz")]
            "graphviz" => Ok(Box::new(
                af_vis::layout::graphviz::Graphviz::default().with_timeout(options.limits.timeout),
            )),
            "layered" => Ok(Box::new(Layered::default())),
            other => Err(format!("layout engine {other:?} is not available in this build").into()),
        }
    }

    fn read(&self) -> Result<Af, Failure> {
        let input = std::fs::read_to_string(&self.input)
            .map_err(|err| format!("cannot read {}: {err}", self.input.display()))?;
        let format = match &self.format {
            Some(format) => format.parse()?,
            None => Format::guess(&self.input),
        };
        let name = self
            .input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(format.read(&name, &input)?)
    }

    fn run(&self) -> Result<(), Failure> {
        let options = self.options()?;
        let af = self.read()?;
        let mut session = Session::new(self.solver(&options)?, self.engine(&options)?, options);

        if self.grounded {
            let ranking = session.rank(&af)?;
            for (arg, status, rank) in ranking.iter() {
                println!("{} {status} {rank}", af.id(arg));
            }
        }

        let labeling = match &self.extension {
            Some(members) => {
                let extension: Extension = members
                    .iter()
                    .map(|id| id.trim())
                    .filter(|id| !id.is_empty())
                    .collect();
                let labeling = session.classify(&af, &extension)?;
                println!("{}", labeling.sets(&af));
                Some(labeling)
            }
            None => None,
        };

        let kind: ProvenanceKind = self.kind.parse()?;
        if let Some(target) = &self.provenance {
            let provenance = session.explain(&af, target, kind)?;
            let nodes: Vec<&str> = provenance.nodes.iter().map(|&arg| af.id(arg)).collect();
            let edges: Vec<String> = provenance
                .edges
                .iter()
                .map(|attack| format!("({}, {})", af.id(attack.from), af.id(attack.to)))
                .collect();
            println!("{kind} provenance of {target}: {{{}}}", nodes.join(", "));
            println!("attacks: {{{}}}", edges.join(", "));
        }

        if self.critical {
            if let Some(labeling) = &labeling {
                match session.critical_sets(&af, labeling)? {
                    CriticalOutcome::Fixes(sets) => {
                        for set in sets {
                            println!("critical: {}", set.display(&af));
                        }
                    }
                    CriticalOutcome::NoFix(reason) => println!("{reason}"),
                }
            }
        }

        if self.dot || self.json {
            self.render(&mut session, &af, labeling, kind)?;
        }
        Ok(())
    }

    fn render(
        &self,
        session: &mut Session,
        af: &Af,
        labeling: Option<Labeling>,
        kind: ProvenanceKind,
    ) -> Result<(), Failure> {
        let mode = match (&self.provenance, &self.select) {
            (Some(target), _) => Mode::Provenance {
                target: target.clone(),
                kind,
                local_view: self.local,
            },
            (None, Some(selection)) => Mode::CriticalAttacks {
                selection: Some(CriticalSet::parse(af, selection)?),
                apply: self.apply,
            },
            (None, None) if labeling.is_some() || self.grounded => Mode::Extensions,
            (None, None) => Mode::Editing,
        };
        let labeling = match (labeling, &mode) {
            (labeling, Mode::Editing) => labeling,
            (Some(labeling), _) => Some(labeling),
            (None, _) => Some(session.rank(af)?.labeling()),
        };
        let mut request = RenderRequest::new(af, mode);
        if let Some(labeling) = &labeling {
            request = request.with_labeling(labeling);
        }
        let rendered = session.render(&request)?;
        for notice in rendered.notices.iter() {
            log::warn!("{notice}");
        }
        if self.json {
            println!("{}", serde_json::to_string_pretty(&rendered.graph)?);
        } else {
            print!("{}", rendered.graph);
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    let app = App::parse();
    app.init_logging();
    match app.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/*!
This library explains `Abstract Argumentation Frameworks (AF)` and turns them into fully styled graph descriptions for an interactive viewer.

# Abstract Argumentation Frameworks
An `abstract argumentation framework` consists of arguments and a binary attack relation between them.
Arguments are identified by a unique string and may carry an annotation and a URL, which are handed through to the viewer but never inspected.

## Grounded ranking
The grounded extension is built in rounds:
- in round 0 all unattacked arguments are accepted
- in round k all arguments attacked by an argument accepted in round k-1 are defeated
- in round k all arguments whose attackers are all defeated by round k-1 are accepted

The round in which an argument settles is its rank; arguments which never settle are undecided and their rank is unbounded (`∞`).

## Explanations
- a labeling (in, out, undec) derived from an extension handed in by an external semantics oracle
- the provenance of a target argument: every argument reaching it by attacks (potential), only along increasing ranks (actual), or only along attacks between consecutive rounds (primary)
- the local view of a target argument: the attack distance of every argument reaching it
- critical attacks: minimum sets of attacks whose suspension makes the grounded semantics agree with a chosen labeling

## Solvers and layout engines
All analyses are phrased as programs of ground facts, which are handed to a [`Solver`][solver::Solver].
The embedded [`Native`][solver::native::Native] solver answers them directly; with the `clingo` feature they can be delegated to a `clingo` executable instead.
Node placement is done by a [`LayoutEngine`][layout::LayoutEngine]: either the embedded [`Layered`][layout::layered::Layered] engine, or, with the `graphviz` feature, the `dot` executable.
*/

/*!
## Usage examples
Compute the grounded ranking of a framework:
```rust
use af_vis::af::Af;
use af_vis::datatypes::{Rank, Status};
use af_vis::ranking::GroundedRanker;
use af_vis::solver::native::Native;

let af = Af::new("chain", ["a", "b", "c"], [("a", "b"), ("b", "c")])?;
let ranking = GroundedRanker::new(&Native::default()).rank(&af)?;
let c = af.lookup("c")?;
assert_eq!(ranking.rank(c), Rank::Finite(2));
assert_eq!(ranking.status(c), Status::Accepted);
# Ok::<(), af_vis::Error>(())
```
### Render a labeling
```rust
use af_vis::af::Af;
use af_vis::annotator::{Mode, RenderRequest};
use af_vis::config::Options;
use af_vis::datatypes::labeling::Extension;
use af_vis::layout::layered::Layered;
use af_vis::session::Session;

let af = Af::new("chain", ["a", "b", "c"], [("a", "b"), ("b", "c")])?;
let mut session = Session::with_native_solver(Box::new(Layered::default()), Options::default());
let labeling = session.classify(&af, &Extension::from_iter(["a", "c"]))?;
let rendered = session.render(&RenderRequest::new(&af, Mode::Extensions).with_labeling(&labeling))?;
// the description is written in the DOT language
let dot = rendered.graph.to_string();
assert!(dot.contains(r#""a" [label="a.0""#));
# Ok::<(), af_vis::Error>(())
```
### Search critical attacks
```rust
use af_vis::af::Af;
use af_vis::critical::{CriticalAttackFinder, CriticalOutcome};
use af_vis::datatypes::labeling::{Extension, Labeling};
use af_vis::solver::native::Native;

let af = Af::new("cycle", ["a", "b"], [("a", "b"), ("b", "a")])?;
let labeling = Labeling::from_extension(&af, &Extension::from_iter(["a"]))?;
match CriticalAttackFinder::new(&Native::default()).find_for(&af, &labeling)? {
    CriticalOutcome::Fixes(sets) => {
        for set in sets {
            log::info!("suspend {}", set.display(&af));
        }
    }
    CriticalOutcome::NoFix(reason) => log::info!("{reason}"),
}
# Ok::<(), af_vis::Error>(())
```
*/
#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![warn(
    missing_copy_implementations,
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

pub mod af;
pub mod annotator;
pub mod config;
pub mod critical;
pub mod datatypes;
pub mod error;
pub mod graph;
pub mod layout;
#[cfg(any(feature = "clingo", feature = "graphviz"))]
mod process;
pub mod provenance;
pub mod ranking;
pub mod session;
pub mod solver;

pub use error::{Error, Result};

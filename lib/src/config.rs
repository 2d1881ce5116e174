/*!
Settings of the analyses and of the graph description.

All settings can be read from JSON; missing fields take their default value.
*/
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{EnumString, EnumVariantNames};

use crate::provenance::ChainPolicy;

/// Default wall-clock limit of a single solver call.
pub const COMPUTE_TIME: Duration = Duration::from_secs(120);
/// Default number of suspension candidates the native search inspects before giving up.
pub const MAX_CANDIDATES: u64 = 5_000_000;

/// Limits of a (potentially exponential) search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Wall-clock limit, given in seconds.
    #[serde(with = "seconds")]
    pub timeout: Duration,
    /// Maximal number of inspected candidates, unlimited if absent.
    pub max_candidates: Option<u64>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            timeout: COMPUTE_TIME,
            max_candidates: Some(MAX_CANDIDATES),
        }
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(format!("{secs} is not a valid number of seconds"))
        })
    }
}

/// Direction in which the layers of the graph are stacked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumVariantNames, strum::Display,
)]
pub enum RankDir {
    /// Top to bottom.
    TB,
    /// Bottom to top.
    BT,
    /// Left to right.
    LR,
    /// Right to left.
    RL,
}

impl Default for RankDir {
    fn default() -> Self {
        Self::TB
    }
}

/// How arguments of equal grounded rank are grouped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumVariantNames, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RankMode {
    /// No grouping.
    None,
    /// One band per finite rank.
    SameRank,
    /// Only the arguments of minimal rank share a band.
    MinRank,
}

impl Default for RankMode {
    fn default() -> Self {
        Self::SameRank
    }
}

/// Which edges may influence the layering.
/// Edges not selected here are still drawn, but do not constrain the placement.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Layering {
    /// Edges between arguments of which neither is labeled in.
    pub blunders: bool,
    /// Edges drawn against the direction of the ranking.
    pub rederivations: bool,
}

/// Colors of the graph description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Fill of arguments labeled in.
    pub accepted: String,
    /// Fill of arguments labeled in, which are undecided in the grounded extension.
    pub light_accepted: String,
    /// Fill of arguments labeled out.
    pub defeated: String,
    /// Fill of arguments labeled out, which are undecided in the grounded extension.
    pub light_defeated: String,
    /// Fill of arguments labeled undec.
    pub undecided: String,
    /// Edges from an accepted to a defeated argument.
    pub edge_accepted: String,
    /// Edges from a defeated to an accepted argument.
    pub edge_defeated: String,
    /// Edges between undecided arguments.
    pub edge_undecided: String,
    /// Edges which do not contribute to the labeling.
    pub edge_blunder: String,
    /// Edges without a class.
    pub edge_default: String,
    /// Border of arguments outside of a provenance.
    pub faded_border: String,
    /// Fill of arguments outside of a provenance.
    pub faded_fill: String,
    /// Fill of arguments inside of a potential provenance.
    pub highlight_fill: String,
    /// Edges outside of a provenance.
    pub faded_edge: String,
    /// Edges inside of a potential provenance.
    pub highlight_edge: String,
    /// Selected critical attacks.
    pub critical: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            accepted: "#40cfff".into(),
            light_accepted: "#a6e9ff".into(),
            defeated: "#ffb763".into(),
            light_defeated: "#ffe6c9".into(),
            undecided: "#f1dd4b".into(),
            edge_accepted: "#1a9dd9".into(),
            edge_defeated: "#e8862a".into(),
            edge_undecided: "#b8a300".into(),
            edge_blunder: "#bebebe".into(),
            edge_default: "black".into(),
            faded_border: "#cccccc".into(),
            faded_fill: "white".into(),
            highlight_fill: "#bebebe".into(),
            faded_edge: "#d3d3d3".into(),
            highlight_edge: "black".into(),
            critical: "#ff0000".into(),
        }
    }
}

/// All settings of a session.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Direction of the layers.
    pub rank_dir: RankDir,
    /// Grouping of arguments by rank.
    pub rank_mode: RankMode,
    /// Edges which constrain the layering.
    pub layering: Layering,
    /// Colors.
    pub palette: Palette,
    /// Which edges are admitted by the actual provenance.
    pub chain_policy: ChainPolicy,
    /// Limits of the critical attack search.
    pub limits: SearchLimits,
}

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::data::{Metric, PositionCategory};

/// Main scoring configuration.
///
/// Every parameter that affects a ranking lives here, so a run is fully
/// determined by the dataset and this value.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   competitions: ["Premier League", "La Liga"]
///   positions: [FWD, MID]
///   min_nineties: 10
///   shrinkage_k: 10
///   minutes_ref: 15
///   lambda: 0.6
///   comp_weights:
///     Premier League: 2.0
///     La Liga: 1.8
///   metric_weights:
///     FWD: { goals: 0.45, assists: 0.10, shots_on_target: 0.15, xg: 0.15, npxg: 0.10, xag: 0.05 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ScoringConfig {
    /// Competitions to keep. `None` keeps every competition in the dataset.
    pub competitions: Option<BTreeSet<String>>,

    /// Position categories to keep (default: FWD, MID, DEF)
    pub positions: BTreeSet<PositionCategory>,

    /// Minimum nineties (minutes / 90) a record needs to be ranked
    pub min_nineties: f64,

    /// Shrinkage constant K in `r = nineties / (nineties + K)`. 0 disables shrinkage.
    pub shrinkage_k: f64,

    /// Nineties at which the playing-time penalty stops applying
    pub minutes_ref: f64,

    /// Mix between the per-90 score (1.0) and the season-totals score (0.0)
    pub lambda: f64,

    /// Multiplier applied to every statistic of a competition
    pub comp_weights: BTreeMap<String, f64>,

    /// Multiplier for competitions missing from `comp_weights`
    pub default_comp_weight: f64,

    /// Raw metric weights per position; normalized to sum to 1 at run time
    pub metric_weights: BTreeMap<PositionCategory, BTreeMap<Metric, f64>>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            competitions: None,
            positions: BTreeSet::from([
                PositionCategory::Forward,
                PositionCategory::Midfielder,
                PositionCategory::Defender,
            ]),
            min_nineties: 10.0,
            shrinkage_k: 10.0,
            minutes_ref: 15.0,
            lambda: 0.6,
            comp_weights: BTreeMap::new(),
            default_comp_weight: 1.0,
            metric_weights: default_metric_weights(),
        }
    }
}

impl ScoringConfig {
    pub fn comp_weight(&self, competition: &str) -> f64 {
        self.comp_weights
            .get(competition)
            .copied()
            .unwrap_or(self.default_comp_weight)
    }
}

/// Built-in weight profiles. Goalkeepers get all zeros: none of the scored
/// metrics describe their job, so they rank on playing time alone.
pub fn default_metric_weights() -> BTreeMap<PositionCategory, BTreeMap<Metric, f64>> {
    let profile = |w: [f64; Metric::COUNT]| -> BTreeMap<Metric, f64> {
        Metric::ALL.iter().copied().zip(w).collect()
    };
    BTreeMap::from([
        (PositionCategory::Forward, profile([0.45, 0.10, 0.15, 0.15, 0.10, 0.05])),
        (PositionCategory::Midfielder, profile([0.15, 0.35, 0.05, 0.15, 0.10, 0.20])),
        (PositionCategory::Defender, profile([0.05, 0.10, 0.05, 0.05, 0.05, 0.10])),
        (PositionCategory::Goalkeeper, profile([0.0; Metric::COUNT])),
    ])
}

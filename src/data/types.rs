use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A scored statistic. Each metric exists as a per-90 rate and as a season total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[serde(alias = "gls", alias = "gls_p90")]
    Goals,
    #[serde(alias = "ast", alias = "ast_p90")]
    Assists,
    #[serde(alias = "sot", alias = "sot_p90")]
    ShotsOnTarget,
    #[serde(alias = "xg_p90")]
    Xg,
    #[serde(alias = "npxg_p90")]
    Npxg,
    #[serde(alias = "xa", alias = "xag_p90")]
    Xag,
}

impl Metric {
    pub const COUNT: usize = 6;

    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::Goals,
        Metric::Assists,
        Metric::ShotsOnTarget,
        Metric::Xg,
        Metric::Npxg,
        Metric::Xag,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Short key used for config files and output columns
    pub fn key(self) -> &'static str {
        match self {
            Metric::Goals => "goals",
            Metric::Assists => "assists",
            Metric::ShotsOnTarget => "shots_on_target",
            Metric::Xg => "xg",
            Metric::Npxg => "npxg",
            Metric::Xag => "xag",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Fixed-size table holding one value per [`Metric`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricMap<T>([T; Metric::COUNT]);

/// Per-metric statistics where a missing value is distinct from zero.
pub type MetricValues = MetricMap<Option<f64>>;

impl<T: Copy> MetricMap<T> {
    pub fn filled(value: T) -> Self {
        Self([value; Metric::COUNT])
    }

    pub fn from_fn(mut f: impl FnMut(Metric) -> T) -> Self {
        Self(Metric::ALL.map(&mut f))
    }

    pub fn get(&self, metric: Metric) -> T {
        self.0[metric.index()]
    }

    pub fn set(&mut self, metric: Metric, value: T) {
        self.0[metric.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, T)> + '_ {
        Metric::ALL.iter().map(move |m| (*m, self.get(*m)))
    }
}

impl Default for MetricValues {
    fn default() -> Self {
        Self::filled(None)
    }
}

impl<T: Copy + Serialize> Serialize for MetricMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Metric::COUNT))?;
        for (metric, value) in self.iter() {
            map.serialize_entry(metric.key(), &value)?;
        }
        map.end()
    }
}

/// Positional bucket used to pick a metric-weight profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PositionCategory {
    #[serde(rename = "FWD", alias = "FORWARD", alias = "forward")]
    Forward,
    #[serde(rename = "MID", alias = "MIDFIELDER", alias = "midfielder")]
    Midfielder,
    #[serde(rename = "DEF", alias = "DEFENDER", alias = "defender")]
    Defender,
    #[serde(rename = "GK", alias = "GOALKEEPER", alias = "goalkeeper")]
    Goalkeeper,
}

impl PositionCategory {
    pub const ALL: [PositionCategory; 4] = [
        PositionCategory::Forward,
        PositionCategory::Midfielder,
        PositionCategory::Defender,
        PositionCategory::Goalkeeper,
    ];

    /// Classify a free-text position such as "DF,MF" or "Forward".
    ///
    /// Rules are checked in order on the uppercased text and the first match
    /// wins, so "DF,MF" is a defender. Anything unrecognised is a midfielder.
    pub fn from_raw(raw: &str) -> Self {
        let p = raw.trim().to_uppercase();
        if p.contains("GK") {
            PositionCategory::Goalkeeper
        } else if p.contains("DF") || p.starts_with('D') {
            PositionCategory::Defender
        } else if p.contains("FW") || p.starts_with('F') {
            PositionCategory::Forward
        } else {
            // "MF" / "M..." and the fallback land in the same bucket
            PositionCategory::Midfielder
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            PositionCategory::Forward => "FWD",
            PositionCategory::Midfielder => "MID",
            PositionCategory::Defender => "DEF",
            PositionCategory::Goalkeeper => "GK",
        }
    }

    /// Parse a category code or name (case-insensitive), as given on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "FWD" | "FW" | "FORWARD" => Some(PositionCategory::Forward),
            "MID" | "MF" | "MIDFIELDER" => Some(PositionCategory::Midfielder),
            "DEF" | "DF" | "DEFENDER" => Some(PositionCategory::Defender),
            "GK" | "GOALKEEPER" => Some(PositionCategory::Goalkeeper),
            _ => None,
        }
    }
}

impl fmt::Display for PositionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One row of the dataset: a player's season for one team in one competition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSeasonRecord {
    pub player: String,
    pub team: String,
    pub league: String,
    pub position: String,
    pub position_category: PositionCategory,
    pub age: Option<f64>,
    pub minutes: Option<f64>,
    /// Minutes / 90. `None` when neither nineties nor minutes could be read.
    pub nineties: Option<f64>,
    pub shots: Option<f64>,
    pub per90: MetricValues,
    pub totals: MetricValues,
}

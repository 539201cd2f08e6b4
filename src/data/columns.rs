use serde::{Deserialize, Serialize};

use super::types::Metric;

/// Header names for each logical field of a player-season row.
///
/// Example YAML:
/// ```yaml
/// columns:
///   player: Player
///   league: Comp
///   nineties: 90s
/// ```
///
/// A `totals` or `per90` block replaces all six metric headers at once.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ColumnMap {
    pub player: String,
    pub team: String,
    pub position: String,
    pub league: String,
    pub age: String,
    pub minutes: String,
    pub nineties: String,
    /// Season shot total; display only and allowed to be absent
    pub shots: String,
    pub totals: MetricColumns,
    pub per90: MetricColumns,
}

/// One header name per metric.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricColumns {
    pub goals: String,
    pub assists: String,
    pub shots_on_target: String,
    pub xg: String,
    pub npxg: String,
    pub xag: String,
}

impl MetricColumns {
    fn with_suffix(suffix: &str) -> Self {
        Self {
            goals: format!("gls{}", suffix),
            assists: format!("ast{}", suffix),
            shots_on_target: format!("sot{}", suffix),
            xg: format!("xg{}", suffix),
            npxg: format!("npxg{}", suffix),
            xag: format!("xag{}", suffix),
        }
    }

    pub fn get(&self, metric: Metric) -> &str {
        match metric {
            Metric::Goals => &self.goals,
            Metric::Assists => &self.assists,
            Metric::ShotsOnTarget => &self.shots_on_target,
            Metric::Xg => &self.xg,
            Metric::Npxg => &self.npxg,
            Metric::Xag => &self.xag,
        }
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            player: "player_name".to_string(),
            team: "team".to_string(),
            position: "position".to_string(),
            league: "league_name".to_string(),
            age: "age".to_string(),
            minutes: "minutes".to_string(),
            nineties: "nineties".to_string(),
            shots: "sh".to_string(),
            totals: MetricColumns::with_suffix(""),
            per90: MetricColumns::with_suffix("_p90"),
        }
    }
}

impl ColumnMap {
    /// Every column the normalizer cannot work without, in a stable order.
    pub fn required(&self) -> Vec<&str> {
        let mut cols = vec![
            self.player.as_str(),
            self.team.as_str(),
            self.position.as_str(),
            self.league.as_str(),
            self.age.as_str(),
            self.minutes.as_str(),
            self.nineties.as_str(),
        ];
        cols.extend(Metric::ALL.iter().map(|m| self.totals.get(*m)));
        cols.extend(Metric::ALL.iter().map(|m| self.per90.get(*m)));
        cols
    }
}

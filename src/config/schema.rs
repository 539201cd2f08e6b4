use serde::{Deserialize, Serialize};

use crate::data::ColumnMap;
use crate::scoring::ScoringConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
    #[serde(default)]
    pub columns: Option<ColumnMap>,
}

impl Config {
    pub fn scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }

    pub fn columns(&self) -> ColumnMap {
        self.columns.clone().unwrap_or_default()
    }
}

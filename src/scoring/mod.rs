pub mod config;
pub mod engine;
pub mod stats;
pub mod validation;

pub use config::*;
pub use engine::{rank_players, DegenerateColumn, PopulationStats, Ranking, ScoredRecord, StatBlock};
pub use stats::ColumnStats;
pub use validation::validate_scoring;

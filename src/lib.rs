pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod output;
pub mod scoring;

pub use data::{normalize, ColumnMap, PlayerSeasonRecord, PositionCategory, RawTable};
pub use error::ScoreError;
pub use scoring::{rank_players, Ranking, ScoredRecord, ScoringConfig};

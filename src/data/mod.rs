pub mod columns;
pub mod filter;
pub mod normalize;
pub mod table;
pub mod types;

pub use columns::{ColumnMap, MetricColumns};
pub use filter::{filter_records, Selected};
pub use normalize::{normalize, parse_number};
pub use table::RawTable;
pub use types::{Metric, MetricMap, MetricValues, PlayerSeasonRecord, PositionCategory};

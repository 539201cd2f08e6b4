use tracing::{debug, warn};

use super::columns::ColumnMap;
use super::table::RawTable;
use super::types::{Metric, MetricValues, PlayerSeasonRecord, PositionCategory};
use crate::error::ScoreError;

const MISSING_MARKERS: &[&str] = &["", "-", "na", "n/a", "nan", "null", "none"];

/// Coerce a raw table into typed player-season records.
///
/// Unparseable numeric cells become `None` rather than an error or zero.
/// Fails if any required column is absent or the table has no rows.
pub fn normalize(table: &RawTable, columns: &ColumnMap) -> Result<Vec<PlayerSeasonRecord>, ScoreError> {
    let missing: Vec<String> = columns
        .required()
        .into_iter()
        .filter(|name| table.column(name).is_none())
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(ScoreError::MissingColumns { columns: missing });
    }
    if table.is_empty() {
        return Err(ScoreError::EmptyInput);
    }

    let layout = Layout::resolve(table, columns);
    let mut unparsed = 0usize;
    let records: Vec<PlayerSeasonRecord> = table
        .rows()
        .map(|row| layout.record(row, &mut unparsed))
        .collect();

    if unparsed > 0 {
        warn!("{} numeric cells could not be parsed and are treated as missing", unparsed);
    }
    debug!("normalized {} records", records.len());
    Ok(records)
}

/// Parse a numeric cell. Missing markers and non-finite values yield `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if MISSING_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m)) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Resolved column indices for one table.
struct Layout {
    player: usize,
    team: usize,
    position: usize,
    league: usize,
    age: usize,
    minutes: usize,
    nineties: usize,
    shots: Option<usize>,
    totals: [usize; Metric::COUNT],
    per90: [usize; Metric::COUNT],
}

impl Layout {
    // Only called after the required-column check, so lookups default harmlessly.
    fn resolve(table: &RawTable, columns: &ColumnMap) -> Self {
        let col = |name: &str| table.column(name).unwrap_or_default();
        Self {
            player: col(&columns.player),
            team: col(&columns.team),
            position: col(&columns.position),
            league: col(&columns.league),
            age: col(&columns.age),
            minutes: col(&columns.minutes),
            nineties: col(&columns.nineties),
            shots: table.column(&columns.shots),
            totals: Metric::ALL.map(|m| col(columns.totals.get(m))),
            per90: Metric::ALL.map(|m| col(columns.per90.get(m))),
        }
    }

    fn record(&self, row: &[String], unparsed: &mut usize) -> PlayerSeasonRecord {
        let mut number = |idx: usize| {
            let cell = row.get(idx).map(String::as_str).unwrap_or("");
            let value = parse_number(cell);
            if value.is_none() && !is_missing_marker(cell) {
                *unparsed += 1;
            }
            value
        };

        let age = number(self.age);
        let minutes = number(self.minutes);
        // Ingestion derives 90s from minutes; do the same when the cell is blank
        let nineties = number(self.nineties).or(minutes.map(|m| m / 90.0));
        let shots = self.shots.and_then(&mut number);

        let mut totals = MetricValues::default();
        let mut per90 = MetricValues::default();
        for (i, metric) in Metric::ALL.iter().enumerate() {
            totals.set(*metric, number(self.totals[i]));
            per90.set(*metric, number(self.per90[i]));
        }

        let text = |idx: usize| row.get(idx).cloned().unwrap_or_default();
        let position = text(self.position);
        PlayerSeasonRecord {
            player: text(self.player),
            team: text(self.team),
            league: text(self.league),
            position_category: PositionCategory::from_raw(&position),
            position,
            age,
            minutes,
            nineties,
            shots,
            per90,
            totals,
        }
    }
}

fn is_missing_marker(cell: &str) -> bool {
    let s = cell.trim();
    MISSING_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m))
}

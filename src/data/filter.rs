use tracing::debug;

use super::types::PlayerSeasonRecord;
use crate::error::ScoreError;
use crate::scoring::ScoringConfig;

/// A record that passed the filters, tagged with its position in the input.
#[derive(Debug, Clone, Copy)]
pub struct Selected<'a> {
    pub index: usize,
    pub record: &'a PlayerSeasonRecord,
}

/// Keep records whose competition and position are selected and whose
/// nineties reach the threshold. Records without usable nineties never pass.
///
/// An empty result is an error: the scoring stages are undefined on zero rows.
pub fn filter_records<'a>(
    records: &'a [PlayerSeasonRecord],
    config: &ScoringConfig,
) -> Result<Vec<Selected<'a>>, ScoreError> {
    let selected: Vec<Selected<'a>> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| passes(r, config))
        .map(|(index, record)| Selected { index, record })
        .collect();

    debug!(
        "{} of {} records pass the filters",
        selected.len(),
        records.len()
    );

    if selected.is_empty() {
        return Err(ScoreError::FilterEmpty {
            competitions: match &config.competitions {
                Some(set) => set.iter().cloned().collect::<Vec<_>>().join(", "),
                None => "all".to_string(),
            },
            positions: config
                .positions
                .iter()
                .map(|p| p.code())
                .collect::<Vec<_>>()
                .join(", "),
            min_nineties: config.min_nineties,
        });
    }
    Ok(selected)
}

fn passes(record: &PlayerSeasonRecord, config: &ScoringConfig) -> bool {
    if let Some(ref competitions) = config.competitions {
        if !competitions.contains(&record.league) {
            return false;
        }
    }
    if !config.positions.contains(&record.position_category) {
        return false;
    }
    match record.nineties {
        Some(n) if n >= 0.0 => n >= config.min_nineties,
        other => {
            debug!("dropping {} ({}): unusable nineties {:?}", record.player, record.team, other);
            false
        }
    }
}

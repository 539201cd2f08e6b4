use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::config::ScoringConfig;
use super::stats::{self, ColumnStats};
use super::validation::validate_scoring;
use crate::data::{
    filter_records, Metric, MetricMap, MetricValues, PlayerSeasonRecord, PositionCategory, Selected,
};
use crate::error::ScoreError;

/// A record with every intermediate column of the scoring pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    /// 1-based position in the ranking
    pub rank: usize,
    /// Row index in the dataset handed to [`rank_players`]
    pub input_index: usize,
    pub record: PlayerSeasonRecord,
    pub comp_weight: f64,
    pub weighted_per90: MetricValues,
    pub weighted_totals: MetricValues,
    pub reliability: f64,
    pub adjusted_per90: MetricValues,
    pub z_rate: MetricMap<f64>,
    pub z_total: MetricMap<f64>,
    pub rate_score: f64,
    pub total_score: f64,
    pub raw_score: f64,
    pub minutes_factor: f64,
    pub final_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatBlock {
    /// Shrinkage-adjusted per-90 rates
    Rate,
    /// Competition-weighted season totals
    Total,
}

/// A standardized column with no spread; every z-score in it is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DegenerateColumn {
    pub block: StatBlock,
    pub metric: Metric,
    /// No record in the population had a value for this column
    pub all_missing: bool,
}

/// Population-level statistics computed once per run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationStats {
    pub size: usize,
    /// Mean of each weighted per-90 column, the shrinkage target
    pub shrink_means: MetricValues,
    pub rate_medians: MetricMap<f64>,
    pub rate: MetricMap<ColumnStats>,
    pub total_medians: MetricMap<f64>,
    pub total: MetricMap<ColumnStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    /// Sorted by final score, best first
    pub records: Vec<ScoredRecord>,
    pub population: PopulationStats,
    pub warnings: Vec<DegenerateColumn>,
}

/// Validate, filter and score a dataset.
///
/// Pure function of its arguments: the input is never modified and repeated
/// calls with the same values return identical rankings.
pub fn rank_players(records: &[PlayerSeasonRecord], config: &ScoringConfig) -> Result<Ranking, ScoreError> {
    validate_scoring(config).map_err(ScoreError::Config)?;
    let selected = filter_records(records, config)?;
    Ok(score_population(&selected, config))
}

/// Stage 1-2 output for one record.
struct Prepared {
    comp_weight: f64,
    nineties: f64,
    weighted_per90: MetricValues,
    weighted_totals: MetricValues,
    reliability: f64,
    adjusted_per90: MetricValues,
}

fn score_population(selected: &[Selected<'_>], config: &ScoringConfig) -> Ranking {
    // Stage 1: competition weighting
    let mut prepared: Vec<Prepared> = selected
        .iter()
        .map(|s| {
            let comp_weight = config.comp_weight(&s.record.league);
            let scale = |values: &MetricValues| MetricMap::from_fn(|m| values.get(m).map(|v| v * comp_weight));
            Prepared {
                comp_weight,
                // Filtering guarantees a non-negative value here
                nineties: s.record.nineties.unwrap_or(0.0),
                weighted_per90: scale(&s.record.per90),
                weighted_totals: scale(&s.record.totals),
                reliability: stats::reliability(s.record.nineties.unwrap_or(0.0), config.shrinkage_k),
                adjusted_per90: MetricValues::default(),
            }
        })
        .collect();
    debug!("stage 1: weighted {} records", prepared.len());

    // Stage 2: shrink per-90 rates toward the population mean
    let shrink_means = MetricMap::from_fn(|m| stats::mean_present(prepared.iter().map(|p| p.weighted_per90.get(m))));
    for p in &mut prepared {
        p.adjusted_per90 = MetricMap::from_fn(|m| match (p.weighted_per90.get(m), shrink_means.get(m)) {
            (Some(x), Some(mu)) => Some(stats::shrink(x, mu, p.reliability)),
            _ => None,
        });
    }
    debug!("stage 2: shrinkage with k={}", config.shrinkage_k);

    // Stage 3: impute + standardize each block independently
    let mut warnings = Vec::new();
    let rate_columns: Vec<MetricValues> = prepared.iter().map(|p| p.adjusted_per90).collect();
    let total_columns: Vec<MetricValues> = prepared.iter().map(|p| p.weighted_totals).collect();
    let rate = standardize(&rate_columns, StatBlock::Rate, &mut warnings);
    let total = standardize(&total_columns, StatBlock::Total, &mut warnings);
    debug!("stage 3: standardized, {} degenerate columns", warnings.len());

    // Stage 4-5 per record
    let profiles: BTreeMap<PositionCategory, MetricMap<f64>> = config
        .metric_weights
        .iter()
        .map(|(pos, raw)| (*pos, stats::normalize_weights(raw)))
        .collect();

    let mut records: Vec<ScoredRecord> = selected
        .iter()
        .zip(prepared)
        .enumerate()
        .map(|(i, (s, p))| {
            // Selected positions are checked against metric_weights during validation
            let weights = profiles
                .get(&s.record.position_category)
                .copied()
                .unwrap_or_else(|| MetricMap::filled(0.0));
            score_record(s, p, rate.z[i], total.z[i], &weights, config)
        })
        .collect();

    sort_ranking(&mut records);
    debug!("ranked {} records", records.len());

    Ranking {
        records,
        population: PopulationStats {
            size: selected.len(),
            shrink_means,
            rate_medians: rate.medians,
            rate: rate.stats,
            total_medians: total.medians,
            total: total.stats,
        },
        warnings,
    }
}

fn score_record(
    selected: &Selected<'_>,
    prepared: Prepared,
    z_rate: MetricMap<f64>,
    z_total: MetricMap<f64>,
    weights: &MetricMap<f64>,
    config: &ScoringConfig,
) -> ScoredRecord {
    let weighted_sum = |z: &MetricMap<f64>| -> f64 { Metric::ALL.iter().map(|m| z.get(*m) * weights.get(*m)).sum() };
    let rate_score = weighted_sum(&z_rate);
    let total_score = weighted_sum(&z_total);
    let raw_score = config.lambda * rate_score + (1.0 - config.lambda) * total_score;

    let minutes_factor = stats::minutes_factor(prepared.nineties, config.minutes_ref);

    ScoredRecord {
        rank: 0,
        input_index: selected.index,
        record: selected.record.clone(),
        comp_weight: prepared.comp_weight,
        weighted_per90: prepared.weighted_per90,
        weighted_totals: prepared.weighted_totals,
        reliability: prepared.reliability,
        adjusted_per90: prepared.adjusted_per90,
        z_rate,
        z_total,
        rate_score,
        total_score,
        raw_score,
        minutes_factor,
        final_score: raw_score * minutes_factor,
    }
}

struct Standardized {
    medians: MetricMap<f64>,
    stats: MetricMap<ColumnStats>,
    /// One row per record, in input order
    z: Vec<MetricMap<f64>>,
}

/// Median-impute missing values, then z-score each column.
fn standardize(rows: &[MetricValues], block: StatBlock, warnings: &mut Vec<DegenerateColumn>) -> Standardized {
    let mut medians = MetricMap::filled(0.0);
    let mut stats = MetricMap::filled(ColumnStats { mean: 0.0, stdev: 0.0 });
    let mut z = vec![MetricMap::filled(0.0); rows.len()];

    for metric in Metric::ALL {
        let median = stats::median_present(rows.iter().map(|r| r.get(metric)));
        let fill = median.unwrap_or(0.0);
        let imputed: Vec<f64> = rows.iter().map(|r| r.get(metric).unwrap_or(fill)).collect();
        let column = ColumnStats::of(&imputed);

        if column.is_degenerate() {
            warn!("{:?} column {} has zero variance; its z-scores are 0", block, metric);
            warnings.push(DegenerateColumn {
                block,
                metric,
                all_missing: median.is_none(),
            });
        }
        for (row, value) in z.iter_mut().zip(&imputed) {
            row.set(metric, column.zscore(*value));
        }
        medians.set(metric, fill);
        stats.set(metric, column);
    }

    Standardized { medians, stats, z }
}

/// Best score first; ties go to the player name, then to input order.
fn sort_ranking(records: &mut [ScoredRecord]) {
    records.sort_by(|a, b| {
        let score_cmp = b.final_score.total_cmp(&a.final_score);
        if score_cmp != Ordering::Equal {
            return score_cmp;
        }
        a.record
            .player
            .cmp(&b.record.player)
            .then(a.input_index.cmp(&b.input_index))
    });
    for (i, r) in records.iter_mut().enumerate() {
        r.rank = i + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn sample_record(player: &str, position: &str, nineties: f64, per90: [f64; 6]) -> PlayerSeasonRecord {
        PlayerSeasonRecord {
            player: player.to_string(),
            team: "Test FC".to_string(),
            league: "Test League".to_string(),
            position: position.to_string(),
            position_category: PositionCategory::from_raw(position),
            age: Some(25.0),
            minutes: Some(nineties * 90.0),
            nineties: Some(nineties),
            shots: None,
            per90: MetricMap::from_fn(|m| Some(per90[m as usize])),
            totals: MetricMap::from_fn(|m| Some(per90[m as usize] * nineties)),
        }
    }

    fn open_config() -> ScoringConfig {
        ScoringConfig {
            min_nineties: 0.0,
            ..ScoringConfig::default()
        }
    }

    fn sample_population() -> Vec<PlayerSeasonRecord> {
        vec![
            sample_record("Ana", "FW", 30.0, [0.8, 0.2, 1.5, 0.7, 0.6, 0.2]),
            sample_record("Bea", "MF", 25.0, [0.2, 0.4, 0.5, 0.2, 0.2, 0.35]),
            sample_record("Cid", "DF", 34.0, [0.05, 0.1, 0.2, 0.06, 0.06, 0.08]),
            sample_record("Dov", "FW", 4.0, [1.5, 0.0, 2.5, 1.0, 1.0, 0.1]),
            sample_record("Eli", "MF", 12.0, [0.1, 0.3, 0.4, 0.15, 0.12, 0.3]),
        ]
    }

    #[test]
    fn test_ranking_is_sorted_and_ranked() {
        let ranking = rank_players(&sample_population(), &open_config()).unwrap();
        assert_eq!(ranking.records.len(), 5);
        for pair in ranking.records.windows(2) {
            assert!(pair[0].final_score >= pair[1].final_score);
        }
        let ranks: Vec<usize> = ranking.records.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_idempotent() {
        let records = sample_population();
        let config = open_config();
        let a = rank_players(&records, &config).unwrap();
        let b = rank_players(&records, &config).unwrap();
        assert_eq!(a, b);
        for (x, y) in a.records.iter().zip(&b.records) {
            assert_eq!(x.final_score.to_bits(), y.final_score.to_bits());
        }
    }

    #[test]
    fn test_input_not_modified() {
        let records = sample_population();
        let before = records.clone();
        let mut config = open_config();
        config.default_comp_weight = 2.5;
        rank_players(&records, &config).unwrap();
        assert_eq!(records, before);
    }

    #[test]
    fn test_zero_k_leaves_rates_unchanged() {
        let mut config = open_config();
        config.shrinkage_k = 0.0;
        let ranking = rank_players(&sample_population(), &config).unwrap();
        for r in &ranking.records {
            assert_eq!(r.reliability, 1.0);
            assert_eq!(r.adjusted_per90, r.record.per90);
        }
    }

    #[test]
    fn test_huge_k_pulls_rates_to_mean() {
        let mut config = open_config();
        config.shrinkage_k = 1e12;
        let ranking = rank_players(&sample_population(), &config).unwrap();
        for r in &ranking.records {
            for metric in Metric::ALL {
                let mean = ranking.population.shrink_means.get(metric).unwrap();
                let adjusted = r.adjusted_per90.get(metric).unwrap();
                assert!((adjusted - mean).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_lambda_one_uses_rates_only() {
        let mut config = open_config();
        config.lambda = 1.0;
        let ranking = rank_players(&sample_population(), &config).unwrap();
        for r in &ranking.records {
            assert_eq!(r.raw_score, r.rate_score);
            assert_eq!(r.final_score, r.rate_score * r.minutes_factor);
        }
    }

    #[test]
    fn test_lambda_zero_uses_totals_only() {
        let mut config = open_config();
        config.lambda = 0.0;
        let ranking = rank_players(&sample_population(), &config).unwrap();
        for r in &ranking.records {
            assert_eq!(r.raw_score, r.total_score);
        }
    }

    #[test]
    fn test_minutes_factor_values() {
        let mut config = open_config();
        config.minutes_ref = 16.0;
        let records = vec![
            sample_record("Full", "FW", 20.0, [0.5; 6]),
            sample_record("Quarter", "FW", 4.0, [0.4; 6]),
        ];
        let ranking = rank_players(&records, &config).unwrap();
        let by_name = |n: &str| ranking.records.iter().find(|r| r.record.player == n).unwrap();
        assert_eq!(by_name("Full").minutes_factor, 1.0);
        assert_eq!(by_name("Quarter").minutes_factor, 0.5);
    }

    #[test]
    fn test_comp_weight_applied_before_stats() {
        let mut config = open_config();
        config.comp_weights.insert("Test League".to_string(), 2.0);
        let ranking = rank_players(&sample_population(), &config).unwrap();
        for r in &ranking.records {
            assert_eq!(r.comp_weight, 2.0);
            assert_eq!(
                r.weighted_totals.get(Metric::Goals),
                r.record.totals.get(Metric::Goals).map(|v| v * 2.0)
            );
        }
    }

    #[test]
    fn test_uniform_comp_weight_does_not_change_order() {
        let base = rank_players(&sample_population(), &open_config()).unwrap();
        let mut config = open_config();
        config.default_comp_weight = 3.0;
        let scaled = rank_players(&sample_population(), &config).unwrap();
        let order = |r: &Ranking| r.records.iter().map(|s| s.input_index).collect::<Vec<_>>();
        assert_eq!(order(&base), order(&scaled));
        for (a, b) in base.records.iter().zip(&scaled.records) {
            assert!((a.final_score - b.final_score).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_record_population_is_degenerate() {
        let records = vec![sample_record("Solo", "FW", 20.0, [0.5; 6])];
        let ranking = rank_players(&records, &open_config()).unwrap();
        let r = &ranking.records[0];
        assert_eq!(r.final_score, 0.0);
        assert_eq!(ranking.warnings.len(), 2 * Metric::COUNT);
        assert!(ranking.warnings.iter().all(|w| !w.all_missing));
    }

    #[test]
    fn test_missing_values_imputed_with_median() {
        let mut records = vec![
            sample_record("A", "FW", 20.0, [0.1; 6]),
            sample_record("B", "FW", 20.0, [0.3; 6]),
            sample_record("C", "FW", 20.0, [0.8; 6]),
        ];
        records[2].totals.set(Metric::Goals, None);
        let ranking = rank_players(&records, &open_config()).unwrap();
        // Median of {2, 6} is 4
        assert!((ranking.population.total_medians.get(Metric::Goals) - 4.0).abs() < 1e-12);
        let c = ranking.records.iter().find(|r| r.record.player == "C").unwrap();
        let stats = ranking.population.total.get(Metric::Goals);
        assert!((c.z_total.get(Metric::Goals) - stats.zscore(4.0)).abs() < 1e-12);
        assert_eq!(c.weighted_totals.get(Metric::Goals), None);
    }

    #[test]
    fn test_all_missing_column_is_degenerate_not_error() {
        let mut records = sample_population();
        for r in &mut records {
            r.per90.set(Metric::Npxg, None);
        }
        let ranking = rank_players(&records, &open_config()).unwrap();
        assert_eq!(ranking.population.shrink_means.get(Metric::Npxg), None);
        assert!(ranking.warnings.contains(&DegenerateColumn {
            block: StatBlock::Rate,
            metric: Metric::Npxg,
            all_missing: true,
        }));
        for r in &ranking.records {
            assert_eq!(r.adjusted_per90.get(Metric::Npxg), None);
            assert_eq!(r.z_rate.get(Metric::Npxg), 0.0);
        }
    }

    #[test]
    fn test_zero_weight_profile_scores_zero() {
        let mut config = open_config();
        config.positions.insert(PositionCategory::Goalkeeper);
        let mut records = sample_population();
        records.push(sample_record("Keeper", "GK", 38.0, [0.0, 0.01, 0.0, 0.0, 0.0, 0.02]));
        let ranking = rank_players(&records, &config).unwrap();
        let keeper = ranking.records.iter().find(|r| r.record.player == "Keeper").unwrap();
        assert_eq!(keeper.rate_score, 0.0);
        assert_eq!(keeper.total_score, 0.0);
        assert_eq!(keeper.final_score, 0.0);
    }

    #[test]
    fn test_ties_broken_by_name_then_input_order() {
        let records = vec![
            sample_record("Zed", "FW", 20.0, [0.5; 6]),
            sample_record("Amy", "FW", 20.0, [0.5; 6]),
            sample_record("Amy", "FW", 20.0, [0.5; 6]),
        ];
        let ranking = rank_players(&records, &open_config()).unwrap();
        let order: Vec<(String, usize)> = ranking
            .records
            .iter()
            .map(|r| (r.record.player.clone(), r.input_index))
            .collect();
        assert_eq!(
            order,
            vec![("Amy".to_string(), 1), ("Amy".to_string(), 2), ("Zed".to_string(), 0)]
        );
    }

    #[test]
    fn test_config_error_before_filtering() {
        let mut config = open_config();
        config.lambda = 2.0;
        config.competitions = Some(BTreeSet::new());
        let err = rank_players(&sample_population(), &config).unwrap_err();
        assert!(matches!(err, ScoreError::Config(_)));
    }

    #[test]
    fn test_missing_profile_is_config_error() {
        let mut config = open_config();
        config.metric_weights.remove(&PositionCategory::Midfielder);
        match rank_players(&sample_population(), &config) {
            Err(ScoreError::Config(errors)) => assert!(errors[0].contains("MID")),
            other => panic!("expected config error, got {:?}", other.map(|r| r.records.len())),
        }
    }

    #[test]
    fn test_empty_filter_is_error() {
        let mut config = open_config();
        config.min_nineties = 100.0;
        let err = rank_players(&sample_population(), &config).unwrap_err();
        assert!(matches!(err, ScoreError::FilterEmpty { .. }));
    }

    #[test]
    fn test_changing_filter_moves_everyone() {
        // Shrinkage targets depend on the filtered population
        let all = rank_players(&sample_population(), &open_config()).unwrap();
        let mut config = open_config();
        config.min_nineties = 10.0;
        let filtered = rank_players(&sample_population(), &config).unwrap();
        let ana = |r: &Ranking| r.records.iter().find(|s| s.record.player == "Ana").unwrap().adjusted_per90;
        assert_ne!(ana(&all), ana(&filtered));
    }
}

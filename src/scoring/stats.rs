use std::collections::BTreeMap;

use crate::data::{Metric, MetricMap};

/// Below this the column is treated as constant.
pub const STDEV_EPSILON: f64 = 1e-9;

/// Mean and population standard deviation of one column.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub stdev: f64,
}

impl ColumnStats {
    /// Population statistics (N denominator) over a complete column.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                stdev: 0.0,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean,
            stdev: variance.sqrt(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.stdev < STDEV_EPSILON
    }

    /// z-score of `value`; 0 for a constant column.
    pub fn zscore(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        (value - self.mean) / self.stdev
    }
}

/// Mean of the present values, `None` if there are none.
pub fn mean_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Median of the present values (midpoint average for even counts).
pub fn median_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let mut present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);
    let mid = present.len() / 2;
    if present.len() % 2 == 1 {
        Some(present[mid])
    } else {
        Some((present[mid - 1] + present[mid]) / 2.0)
    }
}

/// Sample reliability `nineties / (nineties + k)`. With `k == 0` this is
/// exactly 1, including for a record with zero nineties.
pub fn reliability(nineties: f64, k: f64) -> f64 {
    if k == 0.0 {
        return 1.0;
    }
    nineties / (nineties + k)
}

/// Pull `value` toward `mean` by `1 - r`.
pub fn shrink(value: f64, mean: f64, r: f64) -> f64 {
    if r >= 1.0 {
        return value;
    }
    mean + r * (value - mean)
}

/// `sqrt(min(nineties / minutes_ref, 1))`: half the reference minutes costs ~29%, not 50%.
pub fn minutes_factor(nineties: f64, minutes_ref: f64) -> f64 {
    (nineties / minutes_ref).clamp(0.0, 1.0).sqrt()
}

/// Scale raw weights to sum to 1. Metrics absent from `raw` weigh 0.
///
/// If every weight is 0 the sum falls back to 1.0, which leaves all weights
/// at 0 and the position's composite at 0.
pub fn normalize_weights(raw: &BTreeMap<Metric, f64>) -> MetricMap<f64> {
    let weights = MetricMap::from_fn(|m| raw.get(&m).copied().unwrap_or(0.0));
    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    let sum = if sum > 0.0 { sum } else { 1.0 };
    MetricMap::from_fn(|m| weights.get(m) / sum)
}

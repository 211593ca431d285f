// Z-score standardization of imputed statistic columns.

use super::impute::StatColumn;
use super::ActiveStat;
use serde::Serialize;
use tracing::debug;

// ---------------------------------------------------------------------------
// Pool statistics
// ---------------------------------------------------------------------------

/// Spread below which a statistic counts as constant across the pool.
const STDEV_EPSILON: f64 = 1e-9;

/// Population mean and standard deviation of one statistic over the pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

impl PoolStats {
    /// Mean and population deviation (N denominator) of `values`. Every
    /// qualifying player is in the pool, so it is not a sample. An empty
    /// slice gives zeros.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return PoolStats {
                mean: 0.0,
                stdev: 0.0,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        PoolStats {
            mean,
            stdev: variance.sqrt(),
        }
    }

    /// True when the statistic does not separate players at all.
    pub fn is_flat(&self) -> bool {
        self.stdev < STDEV_EPSILON
    }

    /// Standard score of `value`; 0 for a flat statistic.
    pub fn zscore(&self, value: f64) -> f64 {
        if self.is_flat() {
            0.0
        } else {
            (value - self.mean) / self.stdev
        }
    }
}

// ---------------------------------------------------------------------------
// Column standardization
// ---------------------------------------------------------------------------

/// A statistic's z-scores over the pool, in pool order.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizedStat {
    pub stat: ActiveStat,
    pub pool: PoolStats,
    pub zscores: Vec<f64>,
}

/// Standardize every column against its own pool mean and deviation. The
/// filled-in means take part in the pool statistics like any other value.
pub fn standardize(columns: &[StatColumn]) -> Vec<StandardizedStat> {
    columns
        .iter()
        .map(|column| {
            let pool = PoolStats::of(&column.values);
            if pool.is_flat() {
                debug!("{}: constant across the pool, z-scores set to 0", column.stat.name);
            } else {
                debug!(
                    "{}: mean {:.4}, stdev {:.4}",
                    column.stat.name, pool.mean, pool.stdev
                );
            }
            StandardizedStat {
                stat: column.stat.clone(),
                pool,
                zscores: column
                    .values
                    .iter()
                    .map(|v| pool.zscore(*v))
                    .collect(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

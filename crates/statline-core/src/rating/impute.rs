// Mean imputation of missing statistic values.

use super::{ActiveStat, Checked, RatingError, RatingWarning};
use crate::dataset::Record;
use tracing::debug;

/// One statistic's values over the pool, with every gap filled.
#[derive(Debug, Clone, PartialEq)]
pub struct StatColumn {
    pub stat: ActiveStat,
    /// One value per pool record, in pool order.
    pub values: Vec<f64>,
    /// Mean of the observed (non-missing) values; used as the fill.
    pub observed_mean: f64,
    /// How many values were filled.
    pub imputed: usize,
}

/// Arithmetic mean of the present values, `None` when there are none.
pub fn observed_mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Replace each missing value with the mean of that statistic's observed
/// values over `pool`.
///
/// A statistic with no observed value has no mean. It is dropped with a
/// `StatNoObservations` warning; if that leaves nothing to score the result
/// is a `NoObservations` error.
pub fn impute_means(
    pool: &[&Record],
    stats: &[ActiveStat],
) -> Result<Checked<Vec<StatColumn>>, RatingError> {
    let mut columns = Vec::with_capacity(stats.len());
    let mut warnings = Vec::new();

    for stat in stats {
        let raw: Vec<Option<f64>> = pool.iter().map(|r| r.stat(&stat.name)).collect();
        let Some(mean) = observed_mean(&raw) else {
            warnings.push(RatingWarning::StatNoObservations {
                stat: stat.name.clone(),
            });
            continue;
        };

        let imputed = raw.iter().filter(|v| v.is_none()).count();
        if imputed > 0 {
            debug!(
                "{}: filled {} missing values with mean {:.4}",
                stat.name, imputed, mean
            );
        }

        columns.push(StatColumn {
            stat: stat.clone(),
            values: raw.iter().map(|v| v.unwrap_or(mean)).collect(),
            observed_mean: mean,
            imputed,
        });
    }

    if columns.is_empty() {
        return Err(RatingError::NoObservations {
            stats: stats.iter().map(|s| s.name.clone()).collect(),
        });
    }

    Ok(Checked::new(columns, warnings))
}

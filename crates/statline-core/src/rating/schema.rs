// Schema check: which configured statistics can be scored.

use super::{ActiveStat, Checked, RatingError, RatingWarning};
use crate::config::StatWeights;
use crate::dataset::Dataset;

/// Keep the configured statistics that exist as columns of `dataset`.
///
/// A statistic absent from the data is dropped with a `StatNotFound` warning
/// and its weight goes with it; the remaining weights are left as configured.
/// Values were already coerced to numbers (or missing) when the table was
/// loaded. Fails with `NoActiveStats` when nothing is left.
pub fn validate_schema(
    dataset: &Dataset,
    weights: &StatWeights,
) -> Result<Checked<Vec<ActiveStat>>, RatingError> {
    let mut active = Vec::with_capacity(weights.len());
    let mut warnings = Vec::new();

    for stat in weights {
        let present = dataset.has_column(&stat.name)
            || dataset
                .records
                .iter()
                .any(|r| r.stats.contains_key(&stat.name));
        if present {
            active.push(ActiveStat {
                name: stat.name.clone(),
                weight: stat.weight,
            });
        } else {
            warnings.push(RatingWarning::StatNotFound {
                stat: stat.name.clone(),
            });
        }
    }

    if active.is_empty() {
        return Err(RatingError::NoActiveStats {
            missing: weights.iter().map(|s| s.name.clone()).collect(),
        });
    }

    Ok(Checked::new(active, warnings))
}

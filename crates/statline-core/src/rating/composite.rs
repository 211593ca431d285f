// Weighted composite score and its rescaling to a 0-100 player rating.

use super::zscore::StandardizedStat;
use super::RatingError;
use crate::dataset::Record;
use serde::Serialize;
use std::collections::BTreeMap;

/// Upper bound of the rating scale; the lowest composite maps to 0.
pub const RATING_MAX: f64 = 100.0;

/// Rating given to every player when all composite scores are equal.
pub const FLAT_RATING: f64 = 50.0;

/// A rated player with the raw (pre-imputation) values kept for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedPlayer {
    pub player: String,
    pub rating: f64,
    pub composite_score: f64,
    pub games: u32,
    pub stats: BTreeMap<String, Option<f64>>,
}

/// Sum of weight x z-score over every standardized statistic, per pool record.
///
/// A non-finite result would become an invalid rating, so it is reported as
/// `NonFiniteScore` naming the player.
pub fn composite_scores(
    pool: &[&Record],
    stats: &[StandardizedStat],
) -> Result<Vec<f64>, RatingError> {
    pool.iter()
        .enumerate()
        .map(|(i, record)| {
            let score: f64 = stats.iter().map(|s| s.stat.weight * s.zscores[i]).sum();
            if score.is_finite() {
                Ok(score)
            } else {
                Err(RatingError::NonFiniteScore {
                    player: record.player.clone(),
                })
            }
        })
        .collect()
}

/// Min-max rescale scores to `[0, RATING_MAX]`.
///
/// The minimum maps to 0 and the maximum to `RATING_MAX`. When every score
/// is equal there is no range to scale over and all ratings are
/// `FLAT_RATING`. Finite scores whose spread overflows `f64` cannot be
/// rescaled and yield `ScoreRangeOverflow`.
pub fn rescale_ratings(scores: &[f64]) -> Result<Vec<f64>, RatingError> {
    if scores.is_empty() {
        return Ok(Vec::new());
    }
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() {
        return Err(RatingError::ScoreRangeOverflow { min, max });
    }
    if range <= 0.0 {
        return Ok(vec![FLAT_RATING; scores.len()]);
    }
    Ok(scores
        .iter()
        .map(|s| ((s - min) / range * RATING_MAX).clamp(0.0, RATING_MAX))
        .collect())
}

/// Pair every pool record with its score and rating, sorted by rating
/// descending. The sort is stable, so tied players keep source order.
pub fn rank_players(pool: &[&Record], scores: &[f64], ratings: &[f64]) -> Vec<RatedPlayer> {
    let mut players: Vec<RatedPlayer> = pool
        .iter()
        .zip(scores.iter().zip(ratings))
        .map(|(record, (score, rating))| RatedPlayer {
            player: record.player.clone(),
            rating: *rating,
            composite_score: *score,
            // Pool records always carry a games count.
            games: record.games.unwrap_or(0),
            stats: record.stats.clone(),
        })
        .collect();
    players.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    players
}

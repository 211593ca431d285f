// Rating engine: schema check, games filter, mean imputation, z-scores,
// weighted composite rescaled to a 0-100 player rating.

pub mod composite;
pub mod filter;
pub mod impute;
pub mod schema;
pub mod zscore;

use crate::config::RatingConfig;
use crate::dataset::Dataset;
use composite::RatedPlayer;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};
use zscore::PoolStats;

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// A configured statistic that is present in the data and takes part in
/// scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveStat {
    pub name: String,
    pub weight: f64,
}

/// How a scored statistic looked over the pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatSummary {
    pub name: String,
    /// Mean of the observed values, used to fill gaps.
    pub observed_mean: f64,
    /// Number of filled-in values.
    pub imputed: usize,
    /// Mean and deviation after filling; the basis of the z-scores.
    pub pool: PoolStats,
}

/// Recoverable findings. The run continues; the finding is reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatingWarning {
    /// Configured statistic is not a column of the input; its weight is dropped.
    StatNotFound { stat: String },
    /// No filtered player has a value for the statistic, so it cannot be imputed.
    StatNoObservations { stat: String },
    /// Games played is missing or not a whole number; the player is excluded.
    MissingGames { player: String },
}

impl fmt::Display for RatingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingWarning::StatNotFound { stat } => {
                write!(f, "stat '{stat}' not found in the data, excluded")
            }
            RatingWarning::StatNoObservations { stat } => {
                write!(f, "stat '{stat}' has no values among the filtered players, excluded")
            }
            RatingWarning::MissingGames { player } => {
                write!(f, "player '{player}' has no valid games count, excluded")
            }
        }
    }
}

/// A stage result together with the warnings the stage produced.
#[derive(Debug, Clone)]
pub struct Checked<T> {
    pub value: T,
    pub warnings: Vec<RatingWarning>,
}

impl<T> Checked<T> {
    pub fn new(value: T, warnings: Vec<RatingWarning>) -> Self {
        Checked { value, warnings }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("none of the configured statistics were found in the data (missing: {})", .missing.join(", "))]
    NoActiveStats { missing: Vec<String> },

    #[error("no players with at least {min_games} games ({total} players read)")]
    EmptyPool { min_games: u32, total: usize },

    #[error("no values for {} among the filtered players; nothing left to score", .stats.join(", "))]
    NoObservations { stats: Vec<String> },

    #[error("composite score for player '{player}' is not a finite number")]
    NonFiniteScore { player: String },

    #[error("composite scores span {min:e} to {max:e}, too wide to rescale; check the stat weights")]
    ScoreRangeOverflow { min: f64, max: f64 },
}

// ---------------------------------------------------------------------------
// Pipeline output
// ---------------------------------------------------------------------------

/// Everything a run produced: rated players sorted by rating (highest first,
/// ties in source order), the statistics that were scored, and warnings.
#[derive(Debug, Clone, Serialize)]
pub struct RatingOutcome {
    pub players: Vec<RatedPlayer>,
    pub active_stats: Vec<ActiveStat>,
    pub stat_summaries: Vec<StatSummary>,
    pub warnings: Vec<RatingWarning>,
    pub total_players: usize,
    pub filtered_out: usize,
}

impl RatingOutcome {
    /// The `k` highest rated players.
    pub fn top(&self, k: usize) -> &[RatedPlayer] {
        &self.players[..k.min(self.players.len())]
    }
}

// ---------------------------------------------------------------------------
// Top-level entry point
// ---------------------------------------------------------------------------

/// Rate every player in `dataset` that meets the games threshold.
///
/// Steps:
/// 1. Keep the configured statistics present in the data.
/// 2. Drop players with fewer than `min_games` games.
/// 3. Fill missing values with the statistic's mean over the remaining players.
/// 4. Convert every statistic to z-scores over the same players.
/// 5. Sum weight x z-score into a composite score, rescale it to 0-100 and
///    sort descending.
pub fn rate_players(dataset: &Dataset, config: &RatingConfig) -> Result<RatingOutcome, RatingError> {
    let mut warnings = Vec::new();

    // ---- 1. Schema ----
    let schema = schema::validate_schema(dataset, &config.stat_weights)?;
    let active = collect(schema, &mut warnings);

    // ---- 2. Filter ----
    let pool = filter::filter_by_games(dataset, config.min_games)?;
    let pool = collect(pool, &mut warnings);

    // ---- 3. Impute ----
    let imputed = impute::impute_means(&pool.retained, &active)?;
    let columns = collect(imputed, &mut warnings);

    // ---- 4. Standardize ----
    let standardized = zscore::standardize(&columns);

    // ---- 5. Composite + rescale ----
    let scores = composite::composite_scores(&pool.retained, &standardized)?;
    let ratings = composite::rescale_ratings(&scores)?;
    let players = composite::rank_players(&pool.retained, &scores, &ratings);

    let stat_summaries: Vec<StatSummary> = columns
        .iter()
        .zip(&standardized)
        .map(|(column, standard)| StatSummary {
            name: column.stat.name.clone(),
            observed_mean: column.observed_mean,
            imputed: column.imputed,
            pool: standard.pool,
        })
        .collect();
    let active_stats: Vec<ActiveStat> = standardized.into_iter().map(|s| s.stat).collect();
    info!(
        "Rated {} players on {} statistics",
        players.len(),
        active_stats.len()
    );

    Ok(RatingOutcome {
        players,
        active_stats,
        stat_summaries,
        warnings,
        total_players: dataset.len(),
        filtered_out: pool.removed,
    })
}

/// Log a stage's warnings, move them into the run's list and return its value.
fn collect<T>(checked: Checked<T>, warnings: &mut Vec<RatingWarning>) -> T {
    for w in &checked.warnings {
        warn!("{}", w);
    }
    warnings.extend(checked.warnings);
    checked.value
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::config::StatWeights;

    fn config(weights: &[(&str, f64)], min_games: u32) -> RatingConfig {
        RatingConfig {
            min_games,
            stat_weights: StatWeights::new(weights.iter().copied()),
            ..RatingConfig::default()
        }
    }

    fn three_players() -> Dataset {
        dataset(vec![
            record("A", Some(20), &[("KDA", Some(3.0)), ("GPM", Some(400.0))]),
            record("B", Some(5), &[("KDA", Some(9.0)), ("GPM", Some(500.0))]),
            record("C", Some(30), &[("KDA", Some(5.0)), ("GPM", Some(380.0))]),
        ])
    }

    #[test]
    fn players_below_min_games_never_rated() {
        let outcome = rate_players(&three_players(), &config(&[("KDA", 1.0)], 15)).unwrap();
        let names: Vec<&str> = outcome.players.iter().map(|p| p.player.as_str()).collect();
        assert_eq!(names, vec!["C", "A"]);
        assert_eq!(outcome.total_players, 3);
        assert_eq!(outcome.filtered_out, 1);
    }

    #[test]
    fn extremes_map_to_bounds() {
        let outcome =
            rate_players(&three_players(), &config(&[("KDA", 0.5), ("GPM", 0.5)], 0)).unwrap();
        let max = outcome.players.iter().map(|p| p.rating).fold(f64::MIN, f64::max);
        let min = outcome.players.iter().map(|p| p.rating).fold(f64::MAX, f64::min);
        assert_eq!(max, 100.0);
        assert_eq!(min, 0.0);
        assert_eq!(outcome.players[0].rating, 100.0);
        assert!(outcome
            .players
            .iter()
            .all(|p| (0.0..=100.0).contains(&p.rating)));
    }

    #[test]
    fn missing_stat_is_dropped_with_warning() {
        let outcome =
            rate_players(&three_players(), &config(&[("KDA", 1.0), ("VSPM", 0.5)], 15)).unwrap();
        assert_eq!(
            outcome.warnings,
            vec![RatingWarning::StatNotFound {
                stat: "VSPM".into()
            }]
        );
        assert_eq!(outcome.active_stats.len(), 1);
        assert_eq!(outcome.active_stats[0].name, "KDA");
    }

    #[test]
    fn all_stats_missing_is_fatal() {
        let err = rate_players(&three_players(), &config(&[("VSPM", 1.0)], 15)).unwrap_err();
        assert!(matches!(err, RatingError::NoActiveStats { .. }));
    }

    #[test]
    fn empty_pool_is_fatal() {
        let err = rate_players(&three_players(), &config(&[("KDA", 1.0)], 100)).unwrap_err();
        match err {
            RatingError::EmptyPool { min_games, total } => {
                assert_eq!(min_games, 100);
                assert_eq!(total, 3);
            }
            other => panic!("expected EmptyPool, got: {other}"),
        }
    }

    #[test]
    fn unobserved_stat_dropped_but_run_continues() {
        let data = dataset(vec![
            record("A", Some(20), &[("KDA", Some(3.0)), ("GPM", None)]),
            record("B", Some(20), &[("KDA", Some(4.0)), ("GPM", None)]),
        ]);
        let outcome = rate_players(&data, &config(&[("KDA", 1.0), ("GPM", 1.0)], 15)).unwrap();
        assert_eq!(
            outcome.warnings,
            vec![RatingWarning::StatNoObservations { stat: "GPM".into() }]
        );
        assert_eq!(outcome.players[0].player, "B");
        assert!(outcome.players.iter().all(|p| p.rating.is_finite()));
    }

    #[test]
    fn huge_weight_fails_instead_of_rating_nan() {
        let data = dataset(vec![
            record("A", Some(20), &[("KDA", Some(1.0))]),
            record("B", Some(20), &[("KDA", Some(2.0))]),
            record("C", Some(20), &[("KDA", Some(3.0))]),
        ]);
        let cfg = config(&[("KDA", 1e308)], 15);
        assert!(crate::config::validate(&cfg).is_ok());
        let err = rate_players(&data, &cfg).unwrap_err();
        assert!(matches!(err, RatingError::ScoreRangeOverflow { .. }));
    }

    #[test]
    fn summaries_report_fill_counts_and_pool_spread() {
        let data = dataset(vec![
            record("A", Some(20), &[("GPM", Some(400.0)), ("KDA", Some(3.0))]),
            record("B", Some(20), &[("GPM", None), ("KDA", Some(5.0))]),
            record("C", Some(20), &[("GPM", Some(440.0)), ("KDA", None)]),
        ]);
        let outcome = rate_players(&data, &config(&[("GPM", 0.5), ("KDA", 0.5)], 15)).unwrap();
        let gpm = &outcome.stat_summaries[0];
        assert_eq!(gpm.name, "GPM");
        assert_eq!(gpm.imputed, 1);
        assert!(approx_eq(gpm.observed_mean, 420.0, 1e-12));
        // [400, 420, 440]: population variance 800 / 3
        assert!(approx_eq(gpm.pool.mean, 420.0, 1e-12));
        assert!(approx_eq(gpm.pool.stdev, (800.0f64 / 3.0).sqrt(), 1e-12));
        assert_eq!(outcome.stat_summaries[1].name, "KDA");
        assert_eq!(outcome.stat_summaries[1].imputed, 1);
    }

    #[test]
    fn identical_players_keep_source_order() {
        let data = dataset(vec![
            record("Low", Some(20), &[("KDA", Some(1.0))]),
            record("Tie1", Some(20), &[("KDA", Some(5.0))]),
            record("Tie2", Some(20), &[("KDA", Some(5.0))]),
        ]);
        let outcome = rate_players(&data, &config(&[("KDA", 1.0)], 15)).unwrap();
        let names: Vec<&str> = outcome.players.iter().map(|p| p.player.as_str()).collect();
        assert_eq!(names, vec!["Tie1", "Tie2", "Low"]);
        assert_eq!(outcome.players[0].rating, outcome.players[1].rating);
    }

    #[test]
    fn identical_runs_are_bit_identical() {
        let cfg = config(&[("KDA", 0.7), ("GPM", 0.3)], 0);
        let first = rate_players(&three_players(), &cfg).unwrap();
        let second = rate_players(&three_players(), &cfg).unwrap();
        assert_eq!(first.players, second.players);
        for (a, b) in first.players.iter().zip(&second.players) {
            assert_eq!(a.rating.to_bits(), b.rating.to_bits());
        }
    }

    #[test]
    fn top_caps_at_population() {
        let outcome = rate_players(&three_players(), &config(&[("KDA", 1.0)], 0)).unwrap();
        assert_eq!(outcome.top(2).len(), 2);
        assert_eq!(outcome.top(20).len(), 3);
    }

    #[test]
    fn warning_messages_name_the_stat() {
        let w = RatingWarning::StatNotFound {
            stat: "GD@15".into(),
        };
        assert_eq!(w.to_string(), "stat 'GD@15' not found in the data, excluded");
    }
}

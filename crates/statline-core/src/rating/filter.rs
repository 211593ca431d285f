// Games-played filter.

use super::{Checked, RatingError, RatingWarning};
use crate::dataset::{Dataset, Record};
use tracing::info;

/// Players that met the games threshold, in source order.
#[derive(Debug, Clone)]
pub struct GamesPool<'a> {
    pub retained: Vec<&'a Record>,
    pub removed: usize,
}

/// Keep players with at least `min_games` games. Players without a valid
/// games count are treated as below the threshold and warned about.
///
/// An empty pool leaves nothing to compute statistics over, so it is an
/// `EmptyPool` error rather than an empty result.
pub fn filter_by_games(
    dataset: &Dataset,
    min_games: u32,
) -> Result<Checked<GamesPool<'_>>, RatingError> {
    let mut warnings = Vec::new();
    let retained: Vec<&Record> = dataset
        .records
        .iter()
        .filter(|r| match r.games {
            Some(games) => games >= min_games,
            None => {
                warnings.push(RatingWarning::MissingGames {
                    player: r.player.clone(),
                });
                false
            }
        })
        .collect();
    let removed = dataset.len() - retained.len();

    info!(
        "Filtered {} players with fewer than {} games. Analyzing {} players.",
        removed,
        min_games,
        retained.len()
    );

    if retained.is_empty() {
        return Err(RatingError::EmptyPool {
            min_games,
            total: dataset.len(),
        });
    }

    Ok(Checked::new(GamesPool { retained, removed }, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::test_support::*;

    #[test]
    fn keeps_only_players_at_or_above_threshold() {
        let data = dataset(vec![
            record("A", Some(20), &[]),
            record("B", Some(5), &[]),
            record("C", Some(30), &[]),
        ]);
        let checked = filter_by_games(&data, 15).unwrap();
        let names: Vec<&str> = checked
            .value
            .retained
            .iter()
            .map(|r| r.player.as_str())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(checked.value.removed, 1);
        assert!(checked.warnings.is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let data = dataset(vec![record("A", Some(15), &[]), record("B", Some(14), &[])]);
        let checked = filter_by_games(&data, 15).unwrap();
        assert_eq!(checked.value.retained.len(), 1);
        assert_eq!(checked.value.retained[0].player, "A");
    }

    #[test]
    fn missing_games_excluded_with_warning() {
        let data = dataset(vec![record("A", None, &[]), record("B", Some(40), &[])]);
        let checked = filter_by_games(&data, 0).unwrap();
        assert_eq!(checked.value.retained.len(), 1);
        assert_eq!(checked.value.removed, 1);
        assert_eq!(
            checked.warnings,
            vec![RatingWarning::MissingGames { player: "A".into() }]
        );
    }

    #[test]
    fn nobody_qualifying_is_an_empty_pool() {
        let data = dataset(vec![record("A", Some(3), &[]), record("B", None, &[])]);
        let err = filter_by_games(&data, 15).unwrap_err();
        match err {
            RatingError::EmptyPool { min_games, total } => {
                assert_eq!(min_games, 15);
                assert_eq!(total, 2);
            }
            other => panic!("expected EmptyPool, got: {other}"),
        }
    }
}

// Player table loading and value coercion.
//
// Reads a delimited file whose first column is the player identifier. One
// column holds games played; every other named column is a statistic.

use crate::config::InputConfig;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One player row. A statistic key that is present with `None` is a missing
/// value; an absent key means the column is not in the table at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub player: String,
    pub games: Option<u32>,
    pub stats: BTreeMap<String, Option<f64>>,
}

impl Record {
    /// Numeric value of `name`, or `None` when missing or absent.
    pub fn stat(&self, name: &str) -> Option<f64> {
        self.stats.get(name).copied().flatten()
    }
}

/// Records in source order plus the statistic columns of the header.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Statistic column names in header order (identifier and games excluded).
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path} has no header row")]
    MissingHeader { path: String },

    #[error("required column '{column}' not found in {path}")]
    MissingColumn { path: String, column: String },

    #[error("duplicate player '{player}' in {path} (line {line})")]
    DuplicatePlayer {
        path: String,
        player: String,
        line: u64,
    },
}

// ---------------------------------------------------------------------------
// Value coercion
// ---------------------------------------------------------------------------

/// Coerce a cell to a number. Empty cells, the missing-value sentinel, text,
/// NaN and infinities all yield `None`. A trailing `%` is accepted, so
/// `"55.6%"` reads as 55.6.
pub fn coerce_numeric(cell: &str, missing_value: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell == missing_value {
        return None;
    }
    let digits = cell.strip_suffix('%').map(str::trim_end).unwrap_or(cell);
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Games played must be a non-negative whole number.
fn coerce_games(cell: &str, missing_value: &str) -> Option<u32> {
    coerce_numeric(cell, missing_value)
        .filter(|g| *g >= 0.0 && g.fract() == 0.0 && *g <= u32::MAX as f64)
        .map(|g| g as u32)
}

/// Header cells left blank, or given pandas' `Unnamed: N` placeholder, carry
/// no statistic.
fn is_unnamed(header: &str) -> bool {
    header.is_empty() || header.starts_with("Unnamed:")
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Load a player table from any reader. `source` names the input in
/// diagnostics.
pub fn load_dataset_from_reader<R: Read>(
    rdr: R,
    input: &InputConfig,
    source: &str,
) -> Result<Dataset, DatasetError> {
    let csv_err = |e: csv::Error| DatasetError::Csv {
        path: source.to_string(),
        source: e,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(input.delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let headers = reader.headers().map_err(csv_err)?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(DatasetError::MissingHeader {
            path: source.to_string(),
        });
    }

    let games_idx = headers
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, h)| *h == input.games_column)
        .map(|(i, _)| i)
        .ok_or_else(|| DatasetError::MissingColumn {
            path: source.to_string(),
            column: input.games_column.clone(),
        })?;

    let mut stat_columns: Vec<(usize, String)> = Vec::new();
    for (idx, header) in headers.iter().enumerate().skip(1) {
        if idx == games_idx || is_unnamed(header) {
            continue;
        }
        if stat_columns.iter().any(|(_, name)| name == header) {
            warn!("duplicate column '{}' in {}, keeping the first", header, source);
            continue;
        }
        stat_columns.push((idx, header.to_string()));
    }

    let mut records = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    // Rows are flexible, so a row error is a read failure or undecodable
    // text. Either way the table is incomplete and cannot be rated.
    for result in reader.records() {
        let row = result.map_err(csv_err)?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let player = row.get(0).unwrap_or("").to_string();
        if player.is_empty() {
            warn!("skipping row without a player identifier ({} line {})", source, line);
            continue;
        }
        if !seen.insert(player.clone()) {
            return Err(DatasetError::DuplicatePlayer {
                path: source.to_string(),
                player,
                line,
            });
        }

        let games_cell = row.get(games_idx).unwrap_or("");
        let games = coerce_games(games_cell, &input.missing_value);
        if games.is_none() && !games_cell.is_empty() && games_cell != input.missing_value {
            warn!(
                "player '{}': '{}' value '{}' is not a whole number of games",
                player, input.games_column, games_cell
            );
        }

        let stats = stat_columns
            .iter()
            .map(|(idx, name)| {
                let value = row
                    .get(*idx)
                    .and_then(|cell| coerce_numeric(cell, &input.missing_value));
                (name.clone(), value)
            })
            .collect();

        records.push(Record {
            player,
            games,
            stats,
        });
    }

    Ok(Dataset {
        columns: stat_columns.into_iter().map(|(_, name)| name).collect(),
        records,
    })
}

/// Load a player table from a file on disk.
pub fn load_dataset(path: &Path, input: &InputConfig) -> Result<Dataset, DatasetError> {
    let file = std::fs::File::open(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let dataset = load_dataset_from_reader(file, input, &path.display().to_string())?;
    info!(
        "Loaded {} players with {} statistic columns from {}",
        dataset.len(),
        dataset.columns.len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

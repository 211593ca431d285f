// Report rendering: fixed-width console table and JSON.

use crate::rating::composite::RatedPlayer;
use crate::rating::{ActiveStat, RatingOutcome, RatingWarning, StatSummary};
use serde::Serialize;

/// Column alignment within the table.
#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

/// Render the top `top_k` players as a text table: player, rating, games and
/// the raw `display_stats` values. Missing values print as `missing_value`.
pub fn render_table(
    outcome: &RatingOutcome,
    top_k: usize,
    display_stats: &[String],
    missing_value: &str,
) -> String {
    let players = outcome.top(top_k);

    let mut headers: Vec<String> = vec!["Player".into(), "PlayerRating".into(), "Games".into()];
    headers.extend(display_stats.iter().cloned());
    let mut aligns = vec![Align::Left];
    aligns.resize(headers.len(), Align::Right);

    let rows: Vec<Vec<String>> = players
        .iter()
        .map(|p| row_cells(p, display_stats, missing_value))
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|col| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(headers[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&summary_line(outcome));
    out.push_str("\n\n");
    out.push_str(&format!("--- Top {} Highest Rated Players ---\n", players.len()));
    out.push_str(&format_row(&headers, &widths, &aligns));
    for row in &rows {
        out.push_str(&format_row(row, &widths, &aligns));
    }
    out
}

/// One line describing the population and the statistics that were scored.
pub fn summary_line(outcome: &RatingOutcome) -> String {
    let stats: Vec<String> = outcome
        .active_stats
        .iter()
        .map(|s| format!("{} ({})", s.name, s.weight))
        .collect();
    format!(
        "Rated {} of {} players ({} filtered). Scored on: {}",
        outcome.players.len(),
        outcome.total_players,
        outcome.filtered_out,
        stats.join(", ")
    )
}

fn row_cells(player: &RatedPlayer, display_stats: &[String], missing_value: &str) -> Vec<String> {
    let mut cells = vec![
        player.player.clone(),
        format!("{:.2}", player.rating),
        player.games.to_string(),
    ];
    cells.extend(display_stats.iter().map(|name| {
        match player.stats.get(name).copied().flatten() {
            Some(v) => format!("{v:.2}"),
            None => missing_value.to_string(),
        }
    }));
    cells
}

fn format_row(cells: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let parts: Vec<String> = cells
        .iter()
        .zip(widths)
        .zip(aligns)
        .map(|((cell, &width), align)| match align {
            Align::Left => format!("{cell:<width$}"),
            Align::Right => format!("{cell:>width$}"),
        })
        .collect();
    let mut line = parts.join("  ").trim_end().to_string();
    line.push('\n');
    line
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonReport<'a> {
    total_players: usize,
    filtered_out: usize,
    rated: usize,
    active_stats: &'a [ActiveStat],
    stat_summaries: &'a [StatSummary],
    warnings: &'a [RatingWarning],
    players: &'a [RatedPlayer],
}

/// Render the top `top_k` players plus run metadata as pretty-printed JSON.
pub fn render_json(outcome: &RatingOutcome, top_k: usize) -> serde_json::Result<String> {
    let report = JsonReport {
        total_players: outcome.total_players,
        filtered_out: outcome.filtered_out,
        rated: outcome.players.len(),
        active_stats: &outcome.active_stats,
        stat_summaries: &outcome.stat_summaries,
        warnings: &outcome.warnings,
        players: outcome.top(top_k),
    };
    serde_json::to_string_pretty(&report)
}

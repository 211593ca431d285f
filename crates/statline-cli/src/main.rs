// statline entry point.
//
// Sequence:
// 1. Parse arguments, initialize tracing (stderr; the report goes to stdout)
// 2. Load config, apply command-line overrides
// 3. Load the player table
// 4. Run the rating pipeline
// 5. Print the report

use statline_core::config::{self, RatingConfig};
use statline_core::dataset;
use statline_core::rating;
use statline_core::report;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(name = "statline")]
#[command(about = "Rank players by a weighted 0-100 rating built from their per-game statistics")]
#[command(version)]
struct Cli {
    /// Config file (default: ./statline.toml, then the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Player table to read, overriding `datafile` from the config
    #[arg(short, long)]
    datafile: Option<PathBuf>,

    /// Minimum games played to be rated
    #[arg(long)]
    min_games: Option<u32>,

    /// Number of players to show
    #[arg(short = 'n', long = "top")]
    top_k: Option<usize>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Log pipeline details (pool statistics, imputation counts)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    // 2. Config
    let mut config =
        config::load_config(cli.config.as_deref()).context("failed to load configuration")?;
    apply_overrides(&mut config, cli);
    config::validate(&config).context("invalid configuration")?;

    // 3. Player table
    info!("Loading data from {}...", config.datafile.display());
    let dataset = dataset::load_dataset(&config.datafile, &config.input)
        .context("failed to load player data")?;

    // 4. Ratings
    let outcome =
        rating::rate_players(&dataset, &config).context("failed to compute player ratings")?;

    // 5. Report
    match cli.format {
        OutputFormat::Table => print!(
            "{}",
            report::render_table(
                &outcome,
                config.top_k,
                &config.report.display_stats,
                &config.input.missing_value,
            )
        ),
        OutputFormat::Json => println!(
            "{}",
            report::render_json(&outcome, config.top_k).context("failed to serialize report")?
        ),
    }

    Ok(())
}

fn apply_overrides(config: &mut RatingConfig, cli: &Cli) {
    if let Some(datafile) = &cli.datafile {
        config.datafile = datafile.clone();
    }
    if let Some(min_games) = cli.min_games {
        config.min_games = min_games;
    }
    if let Some(top_k) = cli.top_k {
        config.top_k = top_k;
    }
}

/// Initialize tracing to stderr so stdout carries only the report.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose {
        "statline_core=debug,statline_cli=debug,warn"
    } else {
        "statline_core=info,statline_cli=info,warn"
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

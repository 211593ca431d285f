// Rating configuration loading and parsing (statline.toml).

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// File name searched for in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "statline.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Statistic weights
// ---------------------------------------------------------------------------

/// A configured statistic and its coefficient in the composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatWeight {
    pub name: String,
    pub weight: f64,
}

/// Ordered statistic weights. Order follows the config file and decides both
/// summation order and report order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatWeights(Vec<StatWeight>);

impl StatWeights {
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = (S, f64)>) -> Self {
        StatWeights(
            entries
                .into_iter()
                .map(|(name, weight)| StatWeight {
                    name: name.into(),
                    weight,
                })
                .collect(),
        )
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StatWeight> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a StatWeights {
    type Item = &'a StatWeight;
    type IntoIter = std::slice::Iter<'a, StatWeight>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Deserializes a `{ name = weight }` table keeping the order of the keys,
/// which a `HashMap` target would lose.
impl<'de> Deserialize<'de> for StatWeights {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WeightsVisitor;

        impl<'de> Visitor<'de> for WeightsVisitor {
            type Value = StatWeights;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table mapping statistic names to numeric weights")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<StatWeights, A::Error> {
                let mut entries: Vec<StatWeight> = Vec::new();
                while let Some((name, weight)) = map.next_entry::<String, f64>()? {
                    if entries.iter().any(|e| e.name == name) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate statistic `{name}`"
                        )));
                    }
                    entries.push(StatWeight { name, weight });
                }
                Ok(StatWeights(entries))
            }
        }

        deserializer.deserialize_map(WeightsVisitor)
    }
}

// ---------------------------------------------------------------------------
// statline.toml structs
// ---------------------------------------------------------------------------

/// Everything one rating run needs. Every field may be omitted from the file;
/// omitted fields take the value from `RatingConfig::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RatingConfig {
    /// Delimited file holding one row per player.
    pub datafile: PathBuf,
    /// Players with fewer games than this are left out of the pool.
    pub min_games: u32,
    /// Number of rows shown in the report.
    pub top_k: usize,
    pub input: InputConfig,
    pub stat_weights: StatWeights,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub games_column: String,
    /// Cell text that marks a value as missing.
    pub missing_value: String,
    pub delimiter: char,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Raw statistic columns printed next to the rating.
    pub display_stats: Vec<String>,
}

impl Default for RatingConfig {
    fn default() -> Self {
        RatingConfig {
            datafile: PathBuf::from("LoLData.csv"),
            min_games: 15,
            top_k: 20,
            input: InputConfig::default(),
            stat_weights: StatWeights::new([
                ("Win Rate", 0.25),
                ("KDA", 0.25),
                ("GPM", 0.15),
                ("DMG%", 0.15),
                ("GD@15", 0.10),
                ("VSPM", 0.10),
            ]),
            report: ReportConfig::default(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            games_column: "Games".into(),
            missing_value: "-".into(),
            delimiter: ',',
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            display_stats: vec![
                "Win Rate".into(),
                "KDA".into(),
                "GPM".into(),
                "DMG%".into(),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from an explicit TOML file.
pub fn load_config_from(path: &Path) -> Result<RatingConfig, ConfigError> {
    let text = read_file(path)?;
    let config: RatingConfig = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Locate a config file when none was named: `./statline.toml` first, then
/// the per-user config directory.
pub fn find_config_file(base_dir: &Path) -> Option<PathBuf> {
    let local = base_dir.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    directories::ProjectDirs::from("", "", "statline")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .filter(|p| p.is_file())
}

/// Load the configuration used by a run.
///
/// An explicitly named file must exist. Without one, the first file found by
/// `find_config_file` in the current directory is used, falling back to the
/// built-in defaults when there is none.
pub fn load_config(explicit: Option<&Path>) -> Result<RatingConfig, ConfigError> {
    if let Some(path) = explicit {
        info!("Loading config from {}", path.display());
        return load_config_from(path);
    }
    let cwd = std::env::current_dir().map_err(|e| ConfigError::Io {
        path: PathBuf::from("."),
        source: e,
    })?;
    match find_config_file(&cwd) {
        Some(path) => {
            info!("Loading config from {}", path.display());
            load_config_from(&path)
        }
        None => {
            info!("No {} found, using built-in defaults", CONFIG_FILE_NAME);
            let config = RatingConfig::default();
            validate(&config)?;
            Ok(config)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check invariants the TOML types cannot express. Also run on configs built
/// in code after CLI overrides are applied.
pub fn validate(config: &RatingConfig) -> Result<(), ConfigError> {
    if config.stat_weights.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "stat_weights".into(),
            message: "at least one statistic must be configured".into(),
        });
    }

    for stat in &config.stat_weights {
        if stat.name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "stat_weights".into(),
                message: "statistic names must not be empty".into(),
            });
        }
        if !stat.weight.is_finite() {
            return Err(ConfigError::ValidationError {
                field: format!("stat_weights.{}", stat.name),
                message: format!("must be a finite number, got {}", stat.weight),
            });
        }
    }

    if config.top_k == 0 {
        return Err(ConfigError::ValidationError {
            field: "top_k".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.input.games_column.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "input.games_column".into(),
            message: "must not be empty".into(),
        });
    }

    if !config.input.delimiter.is_ascii() {
        return Err(ConfigError::ValidationError {
            field: "input.delimiter".into(),
            message: format!(
                "must be a single ASCII character, got '{}'",
                config.input.delimiter
            ),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

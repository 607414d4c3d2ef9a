//! Model configuration (`model.toml`).
//!
//! Loading is forgiving: a missing or broken file falls back to defaults and
//! the problem is reported as a warning, so the generator still runs.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sukuk_engine::engine::{ColumnMapper, column_number};
use sukuk_engine::model::{Scenario, all_scenarios};

use crate::error::{Result, SukukError};

const MAX_CONFIG_FILE_BYTES: u64 = 65_536;

/// Widest sheet an xlsx file can hold.
pub const MAX_SHEET_COLUMNS: usize = 16_384;
pub const MAX_ITERATIONS: usize = 16_000;

/// What the iteration cells contain.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Formula text for a spreadsheet to evaluate.
    #[default]
    Formulas,
    /// Precomputed numbers.
    Values,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "formulas" | "formula" => Ok(Mode::Formulas),
            "values" | "value" => Ok(Mode::Values),
            other => Err(format!("Unknown mode '{}' (expected formulas or values)", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Formulas => write!(f, "formulas"),
            Mode::Values => write!(f, "values"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SukukConfig {
    pub iterations: usize,
    /// Sheet column of iteration 1 (9 = "I").
    pub first_column: usize,
    pub mode: Mode,
    pub output: Option<PathBuf>,
    pub seed_workbook: Option<PathBuf>,
    pub seed_row_offset: u32,
    pub seed_column: String,
    pub hide_unused_rows: bool,
    pub parallel: bool,
    pub scenarios: Option<Vec<String>>,
}

impl Default for SukukConfig {
    fn default() -> Self {
        SukukConfig {
            iterations: 1000,
            first_column: ColumnMapper::DEFAULT_FIRST_COLUMN,
            mode: Mode::Formulas,
            output: None,
            seed_workbook: None,
            seed_row_offset: 3,
            seed_column: "I".to_string(),
            hide_unused_rows: true,
            parallel: false,
            scenarios: None,
        }
    }
}

impl SukukConfig {
    pub fn mapper(&self) -> ColumnMapper {
        ColumnMapper::new(self.first_column)
    }

    /// Output path, defaulting to `sukuk_<iterations>_iterations.xlsx`.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("sukuk_{}_iterations.xlsx", self.iterations)))
    }

    /// Scenarios to build, in registry order. Unknown names are skipped.
    pub fn selected_scenarios(&self) -> Vec<Scenario> {
        let registry = all_scenarios();
        let Some(names) = &self.scenarios else {
            return registry;
        };
        let wanted: Vec<Scenario> = names.iter().filter_map(|n| Scenario::from_name(n)).collect();
        registry.into_iter().filter(|s| wanted.contains(s)).collect()
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(SukukError::Config(format!(
                "iterations must be between 1 and {}, got {}",
                MAX_ITERATIONS, self.iterations
            )));
        }
        if !(ColumnMapper::DEFAULT_FIRST_COLUMN..=MAX_ITERATIONS).contains(&self.first_column) {
            return Err(SukukError::Config(format!(
                "first_column must be between {} and {}, got {}",
                ColumnMapper::DEFAULT_FIRST_COLUMN,
                MAX_ITERATIONS,
                self.first_column
            )));
        }
        let last = self.first_column + self.iterations - 1;
        if last > MAX_SHEET_COLUMNS {
            return Err(SukukError::Config(format!(
                "last iteration column {} is past the sheet limit of {}",
                last, MAX_SHEET_COLUMNS
            )));
        }
        if column_number(&self.seed_column).is_none() {
            return Err(SukukError::Config(format!(
                "seed_column '{}' is not a column label",
                self.seed_column
            )));
        }
        if self.scenarios.as_ref().is_some_and(|_| self.selected_scenarios().is_empty()) {
            return Err(SukukError::Config("no known scenario selected".to_string()));
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<SukukConfig> {
    Ok(toml::from_str(content)?)
}

/// `<config_dir>/sukuk/model.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sukuk")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("model.toml");
    Some(path)
}

/// Load the config file (explicit path, else the default location).
///
/// Returns the config together with any warnings; never fails.
pub fn load_config(explicit: Option<&Path>) -> (SukukConfig, Vec<String>) {
    let mut warnings = Vec::new();
    let path = explicit.map(Path::to_path_buf).or_else(default_config_path);

    let config = match path.as_ref() {
        Some(path) if path.exists() => match read_config_file(path) {
            Ok(config) => config,
            Err(err) => {
                warnings.push(format!("Failed to load {}: {}", path.display(), err));
                SukukConfig::default()
            }
        },
        Some(path) if explicit.is_some() => {
            warnings.push(format!("Config file not found: {}", path.display()));
            SukukConfig::default()
        }
        _ => SukukConfig::default(),
    };

    for name in config.scenarios.iter().flatten() {
        if Scenario::from_name(name).is_none() {
            warnings.push(format!("Unknown scenario '{}' in config", name));
        }
    }

    (config, warnings)
}

fn read_config_file(path: &Path) -> Result<SukukConfig> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(SukukError::Config(format!(
            "config file too large ({} bytes, max {})",
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        )));
    }
    parse_config(&std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sukuk_engine::model::{Leverage, TaxShield};

    #[test]
    fn test_defaults() {
        let config = SukukConfig::default();
        assert_eq!(config.iterations, 1000);
        assert_eq!(config.mapper().label(1), "I");
        assert_eq!(config.output_path(), PathBuf::from("sukuk_1000_iterations.xlsx"));
        assert_eq!(config.selected_scenarios().len(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_file() {
        let config = parse_config("iterations = 50\nmode = \"values\"\n").unwrap();
        assert_eq!(config.iterations, 50);
        assert_eq!(config.mode, Mode::Values);
        assert_eq!(config.seed_row_offset, 3);
        assert!(config.hide_unused_rows);
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!(matches!(parse_config("iteration = 5"), Err(SukukError::Toml(_))));
    }

    #[test]
    fn test_validate_bounds() {
        let mut config = SukukConfig {
            iterations: 0,
            ..SukukConfig::default()
        };
        assert!(matches!(config.validate(), Err(SukukError::Config(_))));

        config.iterations = 16_000;
        config.first_column = 9;
        assert!(config.validate().is_ok());

        config.first_column = 400;
        assert!(config.validate().is_err());

        config.iterations = 10;
        config.first_column = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_selected_scenarios_keep_registry_order() {
        let config = SukukConfig {
            scenarios: Some(vec!["dts-zl".into(), "NTS-L".into(), "bogus".into()]),
            ..SukukConfig::default()
        };
        assert_eq!(
            config.selected_scenarios(),
            vec![
                Scenario::new(TaxShield::None, Leverage::Leveraged),
                Scenario::new(TaxShield::Dividend, Leverage::ZeroDebt),
            ]
        );
    }

    #[test]
    fn test_load_reports_problems_as_warnings() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.toml");
        let (config, warnings) = load_config(Some(&missing));
        assert_eq!(config, SukukConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("not found"));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "iterations = \"many\"").unwrap();
        let (config, warnings) = load_config(Some(&broken));
        assert_eq!(config.iterations, 1000);
        assert!(warnings[0].starts_with("Failed to load"));

        let named = dir.path().join("named.toml");
        std::fs::write(&named, "scenarios = [\"NTS-L\", \"XYZ-L\"]").unwrap();
        let (config, warnings) = load_config(Some(&named));
        assert_eq!(config.selected_scenarios().len(), 1);
        assert_eq!(warnings, vec!["Unknown scenario 'XYZ-L' in config".to_string()]);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Values".parse::<Mode>(), Ok(Mode::Values));
        assert_eq!("formulas".parse::<Mode>(), Ok(Mode::Formulas));
        assert!("csv".parse::<Mode>().is_err());
    }
}

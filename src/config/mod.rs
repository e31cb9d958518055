//! Calculator configuration
//!
//! Settings come from three layers, lowest priority first: hardcoded
//! defaults, an optional TOML file, and `CALCULATOR_*` environment
//! variables. The resulting [`CalculatorConfig`] is validated once and then
//! passed by value into [`crate::session::CalculatorSession`].

use crate::error::{CalcError, ErrorCode, Result};
use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod loader;

pub use loader::{ConfigFile, ConfigLoader};

/// Largest precision a `rust_decimal::Decimal` can carry
pub const MAX_PRECISION: u32 = 28;

pub const DEFAULT_MAX_HISTORY_SIZE: usize = 1000;
pub const DEFAULT_PRECISION: u32 = 10;
pub const HISTORY_FILE_NAME: &str = "calculator_history.csv";
pub const CHECKPOINT_FILE_NAME: &str = "session_checkpoint.json";
pub const LOG_FILE_NAME: &str = "calculator.log";

/// Get the per-user data directory used when no base directory is configured
pub fn get_global_calc_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "decicalc", "decicalc")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            CalcError::configuration_with_code(
                ErrorCode::CONFIG_PATH_ERROR,
                "Could not determine home directory",
            )
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    pub base_dir: PathBuf,
    pub max_history_size: usize,
    pub auto_save: bool,
    /// Decimal places used when formatting results for display
    pub precision: u32,
    pub max_input_value: Decimal,
    pub log_dir: Option<PathBuf>,
    pub history_dir: Option<PathBuf>,
    pub history_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self::with_base_dir(get_global_calc_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

impl CalculatorConfig {
    /// Default settings rooted at `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            auto_save: true,
            precision: DEFAULT_PRECISION,
            max_input_value: Decimal::MAX,
            log_dir: None,
            history_dir: None,
            history_file: None,
            log_file: None,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("logs"))
    }

    pub fn history_dir(&self) -> PathBuf {
        self.history_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("history"))
    }

    pub fn history_file(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(|| self.history_dir().join(HISTORY_FILE_NAME))
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.log_dir().join(LOG_FILE_NAME))
    }

    /// The undo/redo checkpoint lives next to the history file
    pub fn checkpoint_file(&self) -> PathBuf {
        self.history_file()
            .parent()
            .map(|dir| dir.join(CHECKPOINT_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CHECKPOINT_FILE_NAME))
    }

    /// Override values from `CALCULATOR_*` environment variables
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_lookup(|key| std::env::var(key).ok())
    }

    /// Override values from an arbitrary variable source.
    ///
    /// Values that are present but cannot be parsed are rejected rather
    /// than ignored.
    pub fn merge_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("CALCULATOR_BASE_DIR") {
            self.base_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup("CALCULATOR_MAX_HISTORY_SIZE") {
            self.max_history_size = parse_value("CALCULATOR_MAX_HISTORY_SIZE", &raw)?;
        }

        if let Some(raw) = lookup("CALCULATOR_AUTO_SAVE") {
            self.auto_save = parse_bool("CALCULATOR_AUTO_SAVE", &raw)?;
        }

        if let Some(raw) = lookup("CALCULATOR_PRECISION") {
            self.precision = parse_value("CALCULATOR_PRECISION", &raw)?;
        }

        if let Some(raw) = lookup("CALCULATOR_MAX_INPUT_VALUE") {
            self.max_input_value = parse_decimal("CALCULATOR_MAX_INPUT_VALUE", &raw)?;
        }

        if let Some(dir) = lookup("CALCULATOR_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir));
        }

        if let Some(dir) = lookup("CALCULATOR_HISTORY_DIR") {
            self.history_dir = Some(PathBuf::from(dir));
        }

        if let Some(file) = lookup("CALCULATOR_HISTORY_FILE") {
            self.history_file = Some(PathBuf::from(file));
        }

        if let Some(file) = lookup("CALCULATOR_LOG_FILE") {
            self.log_file = Some(PathBuf::from(file));
        }

        Ok(())
    }

    /// Check every setting is within range
    pub fn validate(&self) -> Result<()> {
        if self.max_history_size == 0 {
            return Err(CalcError::configuration_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "max_history_size must be positive",
            ));
        }
        if self.precision == 0 || self.precision > MAX_PRECISION {
            return Err(CalcError::configuration_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                format!("precision must be between 1 and {MAX_PRECISION}"),
            ));
        }
        if self.max_input_value <= Decimal::ZERO {
            return Err(CalcError::configuration_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "max_input_value must be positive",
            ));
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim().parse::<T>().map_err(|e| {
        CalcError::configuration_with_code(
            ErrorCode::CONFIG_PARSE_ERROR,
            format!("{key} has invalid value '{raw}'"),
        )
        .with_source(e)
    })
}

pub(crate) fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(CalcError::configuration_with_code(
            ErrorCode::CONFIG_PARSE_ERROR,
            format!("{key} has invalid boolean value '{raw}'"),
        )),
    }
}

/// Decimals may be written plainly or in scientific notation (`1e20`)
pub(crate) fn parse_decimal(key: &str, raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    let parsed = if trimmed.contains(['e', 'E']) {
        Decimal::from_scientific(trimmed)
    } else {
        trimmed.parse::<Decimal>()
    };
    parsed.map_err(|e| {
        CalcError::configuration_with_code(
            ErrorCode::CONFIG_PARSE_ERROR,
            format!("{key} has invalid decimal value '{raw}'"),
        )
        .with_source(e)
    })
}

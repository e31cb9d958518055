use super::{parse_decimal, CalculatorConfig};
use crate::error::{CalcError, ErrorCode, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings as they appear in a TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_dir: Option<PathBuf>,
    pub max_history_size: Option<usize>,
    pub auto_save: Option<bool>,
    pub precision: Option<u32>,
    /// Kept as text so large or scientific values survive TOML parsing
    pub max_input_value: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub history_dir: Option<PathBuf>,
    pub history_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFile {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            CalcError::configuration_with_code(
                ErrorCode::CONFIG_PARSE_ERROR,
                format!("Invalid config file: {}", e.message()),
            )
            .with_source(e)
        })
    }

    fn apply(self, config: &mut CalculatorConfig) -> Result<()> {
        if let Some(base_dir) = self.base_dir {
            config.base_dir = base_dir;
        }
        if let Some(size) = self.max_history_size {
            config.max_history_size = size;
        }
        if let Some(auto_save) = self.auto_save {
            config.auto_save = auto_save;
        }
        if let Some(precision) = self.precision {
            config.precision = precision;
        }
        if let Some(raw) = self.max_input_value {
            config.max_input_value = parse_decimal("max_input_value", &raw)?;
        }
        config.log_dir = self.log_dir.or(config.log_dir.take());
        config.history_dir = self.history_dir.or(config.history_dir.take());
        config.history_file = self.history_file.or(config.history_file.take());
        config.log_file = self.log_file.or(config.log_file.take());
        Ok(())
    }
}

/// Builds a validated [`CalculatorConfig`] from defaults, file and environment
#[derive(Debug, Default)]
pub struct ConfigLoader {
    base: Option<CalculatorConfig>,
    file: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from these settings instead of [`CalculatorConfig::default`]
    pub fn with_base(mut self, base: CalculatorConfig) -> Self {
        self.base = Some(base);
        self
    }

    /// Read a TOML file. A file that was asked for but is missing is an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load using the process environment
    pub fn load(self) -> Result<CalculatorConfig> {
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Load using a custom variable source
    pub fn load_with<F>(self, lookup: F) -> Result<CalculatorConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.base.unwrap_or_default();

        if let Some(path) = self.file {
            if !path.exists() {
                return Err(CalcError::configuration_with_code(
                    ErrorCode::CONFIG_NOT_FOUND,
                    format!("Configuration file not found: {}", path.display()),
                ));
            }
            let content = fs::read_to_string(&path).map_err(|e| {
                CalcError::configuration_with_code(
                    ErrorCode::CONFIG_PATH_ERROR,
                    format!("Cannot read {}", path.display()),
                )
                .with_source(e)
            })?;
            ConfigFile::from_toml(&content)?.apply(&mut config)?;
            debug!("Loaded configuration file {}", path.display());
        }

        config.merge_lookup(lookup)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_defaults_without_file() {
        let config = ConfigLoader::new()
            .with_base(CalculatorConfig::with_base_dir("/tmp/calc"))
            .load_with(no_env)
            .unwrap();
        assert_eq!(config, CalculatorConfig::with_base_dir("/tmp/calc"));
    }

    #[test]
    fn test_file_then_env_precedence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("calc.toml");
        fs::write(
            &path,
            r#"
max_history_size = 20
auto_save = false
max_input_value = "1e10"
history_file = "/srv/history.csv"
"#,
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_base(CalculatorConfig::with_base_dir(temp_dir.path()))
            .with_file(&path)
            .load_with(|key| (key == "CALCULATOR_MAX_HISTORY_SIZE").then(|| "7".to_string()))
            .unwrap();

        assert_eq!(config.max_history_size, 7);
        assert!(!config.auto_save);
        assert_eq!(config.max_input_value, Decimal::from(10_000_000_000i64));
        assert_eq!(config.history_file(), PathBuf::from("/srv/history.csv"));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = ConfigLoader::new()
            .with_base(CalculatorConfig::with_base_dir("/tmp/calc"))
            .with_file("/definitely/not/here.toml")
            .load_with(no_env)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
    }

    #[test]
    fn test_invalid_values_fail_fast() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("calc.toml");
        fs::write(&path, "max_history_size = 0\n").unwrap();

        let err = ConfigLoader::new()
            .with_base(CalculatorConfig::with_base_dir(temp_dir.path()))
            .with_file(&path)
            .load_with(no_env)
            .unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = ConfigFile::from_toml("colour = \"blue\"\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_PARSE_ERROR);
    }
}

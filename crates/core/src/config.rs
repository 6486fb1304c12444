use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::quote::default_cost_split_ratio;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub pricing: PricingDefaults,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PricingDefaults {
    /// Applied to preview pricing, where no quote carries its own ratio.
    pub cost_split_ratio: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub cost_split_ratio: Option<Decimal>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            pricing: PricingDefaults { cost_split_ratio: default_cost_split_ratio() },
        }
    }
}

/// On-disk shape; every field optional so a partial file overrides only what
/// it names.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    logging: FileLogging,
    #[serde(default)]
    pricing: FilePricing,
}

#[derive(Debug, Default, Deserialize)]
struct FileLogging {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct FilePricing {
    cost_split_ratio: Option<Decimal>,
}

impl AppConfig {
    /// Precedence: programmatic overrides > `RATECARD_*` environment
    /// variables > config file > defaults.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();

        let path = options.config_path.clone().or_else(detect_config_path);
        match path {
            Some(path) if path.exists() => config.apply_file(&path)?,
            Some(path) if options.require_file => {
                return Err(ConfigError::MissingConfigFile(path));
            }
            None if options.require_file => {
                return Err(ConfigError::MissingConfigFile(PathBuf::from("ratecard.toml")));
            }
            _ => {}
        }

        config.apply_env()?;
        config.apply_overrides(&options.overrides);
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
        let file: FileConfig = toml::from_str(&raw)
            .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })?;

        if let Some(level) = file.logging.level {
            self.logging.level = level;
        }
        if let Some(format) = file.logging.format {
            self.logging.format = format;
        }
        if let Some(ratio) = file.pricing.cost_split_ratio {
            self.pricing.cost_split_ratio = ratio;
        }
        Ok(())
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(level) = env::var("RATECARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("RATECARD_LOG_FORMAT") {
            self.logging.format = format.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "RATECARD_LOG_FORMAT".to_string(),
                value: format.clone(),
            })?;
        }
        if let Ok(ratio) = env::var("RATECARD_COST_SPLIT_RATIO") {
            self.pricing.cost_split_ratio =
                ratio.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "RATECARD_COST_SPLIT_RATIO".to_string(),
                    value: ratio.clone(),
                })?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
        if let Some(ratio) = overrides.cost_split_ratio {
            self.pricing.cost_split_ratio = ratio;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let known_levels = ["trace", "debug", "info", "warn", "error"];
        if !known_levels.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {known_levels:?}, got `{}`",
                self.logging.level
            )));
        }
        let ratio = self.pricing.cost_split_ratio;
        if ratio < Decimal::ZERO || ratio > Decimal::ONE {
            return Err(ConfigError::Validation(format!(
                "pricing.cost_split_ratio must be within [0, 1], got `{ratio}`"
            )));
        }
        Ok(())
    }
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("ratecard.toml");
    if root.exists() {
        return Some(root);
    }
    let nested = PathBuf::from("config/ratecard.toml");
    if nested.exists() {
        return Some(nested);
    }
    None
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    // `apply_env` reads process-wide state, so tests that load config take
    // this lock and start from a cleared environment.
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const ENV_VARS: &[&str] =
        &["RATECARD_LOG_LEVEL", "RATECARD_LOG_FORMAT", "RATECARD_COST_SPLIT_RATIO"];

    fn env_guard() -> std::sync::MutexGuard<'static, ()> {
        let guard = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for var in ENV_VARS {
            env::remove_var(var);
        }
        guard
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let _guard = env_guard();

        let config = AppConfig::load(LoadOptions::default()).expect("default config");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.pricing.cost_split_ratio, Decimal::new(60, 2));
    }

    #[test]
    fn file_values_override_defaults() {
        let _guard = env_guard();

        let mut file = tempfile::NamedTempFile::new().expect("temp config");
        writeln!(
            file,
            "[logging]\nlevel = \"debug\"\nformat = \"json\"\n\n[pricing]\ncost_split_ratio = \"0.70\"\n"
        )
        .expect("write config");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect("config from file");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.pricing.cost_split_ratio, Decimal::new(70, 2));
    }

    #[test]
    fn env_values_override_the_file() {
        let _guard = env_guard();

        let mut file = tempfile::NamedTempFile::new().expect("temp config");
        writeln!(file, "[logging]\nlevel = \"debug\"\n").expect("write config");

        env::set_var("RATECARD_LOG_LEVEL", "warn");
        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        });
        env::remove_var("RATECARD_LOG_LEVEL");

        assert_eq!(config.expect("config from env").logging.level, "warn");
    }

    #[test]
    fn programmatic_overrides_win() {
        let _guard = env_guard();

        let config = AppConfig::load(LoadOptions {
            config_path: None,
            require_file: false,
            overrides: ConfigOverrides {
                log_level: Some("warn".to_string()),
                log_format: Some(LogFormat::Pretty),
                cost_split_ratio: Some(Decimal::new(80, 2)),
            },
        })
        .expect("config with overrides");

        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.pricing.cost_split_ratio, Decimal::new(80, 2));
    }

    #[test]
    fn rejects_out_of_range_cost_split_ratio() {
        let _guard = env_guard();

        let error = AppConfig::load(LoadOptions {
            config_path: None,
            require_file: false,
            overrides: ConfigOverrides {
                cost_split_ratio: Some(Decimal::new(150, 2)),
                ..ConfigOverrides::default()
            },
        })
        .expect_err("ratio above 1");
        assert!(matches!(error, ConfigError::Validation(_)));
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let _guard = env_guard();

        let error = AppConfig::load(LoadOptions {
            config_path: Some("/nonexistent/ratecard.toml".into()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect_err("missing file");
        assert!(matches!(error, ConfigError::MissingConfigFile(_)));
    }
}

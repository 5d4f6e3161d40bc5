use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Remote provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the primary nutrition database
    pub primary_url: String,
    /// Base URL of the secondary (branded/packaged) database
    pub secondary_url: String,
    /// Quiet period before a typed query fires, in milliseconds
    pub debounce_ms: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            primary_url: "https://nutrition.cutline.app".to_string(),
            secondary_url: "https://brands.cutline.app".to_string(),
            debounce_ms: 500,
        }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the ledger's key-value files
    pub data_dir: ConfigValue<PathBuf>,
    /// Day phase supplied by the protocol plan (baseline, fructose-load,
    /// glucose-load, zero-fiber, protein-free)
    pub phase: String,
    /// Optional path to the protocol engine's plan-food list (JSON)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_path: Option<PathBuf>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Remote provider settings
    pub providers: ProviderSettings,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    phase: Option<String>,
    plan_path: Option<PathBuf>,
    providers: Option<ProviderSettings>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut phase = "baseline".to_string();
        let mut plan_path = None;
        let mut config_file = None;
        let mut providers = ProviderSettings::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(p) = file_config.phase {
                phase = p;
            }
            if let Some(p) = file_config.plan_path {
                let resolved = if p.is_relative() {
                    path.parent().map(|parent| parent.join(&p)).unwrap_or(p)
                } else {
                    p
                };
                plan_path = Some(resolved);
            }
            if let Some(p) = file_config.providers {
                providers = p;
            }
        }

        // Apply environment variable overrides
        if let Ok(dir) = std::env::var("CUTLINE_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("CUTLINE_PRIMARY_URL") {
            providers.primary_url = url;
        }
        if let Ok(url) = std::env::var("CUTLINE_SECONDARY_URL") {
            providers.secondary_url = url;
        }
        if let Ok(p) = std::env::var("CUTLINE_PHASE") {
            phase = p;
        }

        Ok(Self {
            data_dir,
            phase,
            plan_path,
            config_file,
            providers,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/cutline/
    /// - macOS: ~/Library/Application Support/cutline/
    /// - Windows: %APPDATA%/cutline/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cutline")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/cutline/
    /// - macOS: ~/Library/Application Support/cutline/
    /// - Windows: %APPDATA%/cutline/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cutline")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert_eq!(config.phase, "baseline");
        assert!(config.plan_path.is_none());
        assert_eq!(config.providers.debounce_ms, 500);
    }

    #[test]
    fn test_config_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: ledger-data").unwrap();
        writeln!(file, "phase: zero-fiber").unwrap();
        writeln!(file, "providers:").unwrap();
        writeln!(file, "  primary_url: http://localhost:9000").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.source, ConfigSource::File);
        // Relative data_dir resolves against the config file's directory
        assert!(config.data_dir.value.ends_with("ledger-data"));
        assert!(config.data_dir.value.starts_with(temp_dir.path()));
        assert_eq!(config.phase, "zero-fiber");
        assert_eq!(config.providers.primary_url, "http://localhost:9000");
        // Unset provider fields keep their defaults
        assert_eq!(config.providers.debounce_ms, 500);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: [unclosed").unwrap();

        assert!(Config::load(Some(config_path)).is_err());
    }
}

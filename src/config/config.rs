//! TOML configuration parsing and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "nlcall.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// `[llm]` section.
    #[serde(default)]
    pub llm: LlmConfig,
    /// `[definitions]` section.
    #[serde(default)]
    pub definitions: DefinitionsConfig,
    /// `[logging]` section.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// LLM endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat-completions URL.
    pub url: String,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Additional attempts after a failed request.
    pub max_retries: u32,
    /// Per-request timeout.
    pub timeout_seconds: Option<u64>,
    /// Resolve through native tool calling instead of a call-string prompt.
    pub use_tools: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 1.0,
            max_retries: 1,
            timeout_seconds: Some(60),
            use_tools: false,
        }
    }
}

/// Definition cache configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefinitionsConfig {
    /// Directory searched for cached definitions.
    pub load_dir: Option<PathBuf>,
    /// Directory definitions are saved to.
    pub save_dir: Option<PathBuf>,
    /// Replace existing cached definitions.
    pub overwrite: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Session log file; a temp file is used when unset.
    pub log_file: Option<PathBuf>,
    /// `DEBUG` adds parameter schemas to definition entries.
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            log_level: "INFO".to_string(),
        }
    }
}

/// Loads and manages TOML configuration.
#[derive(Debug)]
pub struct ConfigurationLoader {
    /// File the configuration was read from, or would have been.
    pub config_path: PathBuf,
    /// Loaded configuration.
    pub config: Configuration,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None, uses `nlcall.toml`.
    ///   A missing file yields the default configuration.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            Configuration::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a configuration loader from a pre-parsed Configuration.
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            config,
        }
    }

    /// Parse configuration from TOML text, expanding `~` and environment
    /// variables in paths.
    pub fn parse(content: &str) -> Result<Configuration> {
        let mut config: Configuration =
            toml::from_str(content).context("Failed to parse TOML config")?;
        config.expand_paths()?;
        Ok(config)
    }

    fn load_config(path: &Path) -> Result<Configuration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Get configuration value by dot-notation key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        let path_string = |p: &Option<PathBuf>| p.as_ref().map(|p| p.to_string_lossy().to_string());
        match key {
            "llm.url" => Some(self.config.llm.url.clone()),
            "llm.model" => Some(self.config.llm.model.clone()),
            "definitions.load_dir" => path_string(&self.config.definitions.load_dir),
            "definitions.save_dir" => path_string(&self.config.definitions.save_dir),
            "logging.log_file" => path_string(&self.config.logging.log_file),
            "logging.log_level" => Some(self.config.logging.log_level.clone()),
            _ => None,
        }
    }

    /// Get numeric configuration value.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match key {
            "llm.max_retries" => Some(u64::from(self.config.llm.max_retries)),
            "llm.timeout_seconds" => self.config.llm.timeout_seconds,
            _ => None,
        }
    }

    /// Get boolean configuration value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match key {
            "llm.use_tools" => Some(self.config.llm.use_tools),
            "definitions.overwrite" => Some(self.config.definitions.overwrite),
            _ => None,
        }
    }
}

impl Configuration {
    fn expand_paths(&mut self) -> Result<()> {
        for path in [
            &mut self.definitions.load_dir,
            &mut self.definitions.save_dir,
            &mut self.logging.log_file,
        ]
        .into_iter()
        .flatten()
        {
            *path = expand_path(path)?;
        }
        Ok(())
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand path: {}", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

// Configuration file loading

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::providers::get_provider_preset;

/// Product analysis configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Reasoning service settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Idea log settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Chart and HTML report settings
    #[serde(default)]
    pub report: ReportConfig,
    /// Run behaviour
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Reasoning service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// Provider preset id (openrouter, openai, gemini, ollama)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model name; the preset's default model when unset
    #[serde(default)]
    pub model: Option<String>,
    /// Overrides the preset base URL
    #[serde(rename = "baseUrl", alias = "base_url", default)]
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(rename = "maxTokens", alias = "max_tokens", default = "default_max_tokens")]
    pub max_tokens: u32,
    /// HTTP request timeout for a single reasoning call
    #[serde(rename = "timeoutSecs", alias = "timeout_secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String { "openrouter".to_string() }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 2000 }
fn default_timeout_secs() -> u64 { 120 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Idea log configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(rename = "ideasFile", alias = "ideas_file", default = "default_ideas_file")]
    pub ideas_file: PathBuf,
}

fn default_ideas_file() -> PathBuf { PathBuf::from("ideas.json") }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            ideas_file: default_ideas_file(),
        }
    }
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Directory receiving chart PNGs
    #[serde(rename = "outputDir", alias = "output_dir", default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(rename = "reportFile", alias = "report_file", default = "default_report_file")]
    pub report_file: PathBuf,
    /// Open the finished report with the host's default viewer
    #[serde(rename = "openInBrowser", alias = "open_in_browser", default = "default_true")]
    pub open_in_browser: bool,
}

fn default_output_dir() -> PathBuf { PathBuf::from("visualizations") }
fn default_report_file() -> PathBuf { PathBuf::from("product_report.html") }
fn default_true() -> bool { true }

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            report_file: default_report_file(),
            open_in_browser: default_true(),
        }
    }
}

/// Execution configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ExecutionConfig {
    /// Dry-run mode: answer every stage with placeholder text instead of calling the provider
    #[serde(rename = "dryRun", alias = "dry_run", default)]
    pub dry_run: bool,
}

/// Config loader
pub struct ConfigLoader {
    /// Global config path
    global_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            global_path: Self::get_global_config_path(),
        }
    }

    /// Use a specific global config path instead of the platform default
    pub fn with_global_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_path: Some(path.into()),
        }
    }

    /// Get the global config path
    fn get_global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("product-analysis").join("config.toml"))
    }

    /// Load global config
    pub fn load_global(&self) -> Result<Option<AppConfig>> {
        if let Some(ref path) = self.global_path {
            self.load_from_path(path)
        } else {
            Ok(None)
        }
    }

    /// Load an explicitly requested config file. Unlike the global file it must exist.
    pub fn load_explicit(&self, path: &Path) -> Result<AppConfig> {
        self.load_from_path(path)?
            .ok_or_else(|| anyhow!("Config file '{}' does not exist", path.display()))
    }

    /// Load config from a specific path
    pub fn load_from_path(&self, path: &Path) -> Result<Option<AppConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

        validate_config(&config)?;

        Ok(Some(config))
    }

    /// Check if global config exists
    pub fn global_config_exists(&self) -> bool {
        self.global_path.as_ref().map(|p| p.exists()).unwrap_or(false)
    }

    /// Get the global config path
    pub fn global_config_path(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate config values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if get_provider_preset(&config.llm.provider).is_none() {
        return Err(anyhow!("Unknown provider '{}'", config.llm.provider));
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        return Err(anyhow!("temperature must be between 0.0 and 2.0"));
    }

    if config.llm.max_tokens == 0 {
        return Err(anyhow!("max_tokens must be greater than 0"));
    }

    if config.llm.timeout_secs == 0 {
        return Err(anyhow!("timeout_secs must be greater than 0"));
    }

    if config.storage.ideas_file.as_os_str().is_empty() {
        return Err(anyhow!("ideas_file cannot be empty"));
    }

    if config.report.report_file.as_os_str().is_empty() {
        return Err(anyhow!("report_file cannot be empty"));
    }

    Ok(())
}

// Command-line overrides applied on top of file configuration

use crate::config::loader::AppConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Partial configuration for merging
/// Uses Option<T> for all fields so only flags the user passed take effect
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub dry_run: Option<bool>,
    pub open_in_browser: Option<bool>,
}

/// Configuration merger
/// Priority order: CLI -> file (explicit or global) -> Defaults
pub struct ConfigMerger {
    defaults: AppConfig,
    file: Option<AppConfig>,
    cli: Option<CliOverrides>,
}

impl ConfigMerger {
    pub fn new() -> Self {
        Self {
            defaults: AppConfig::default(),
            file: None,
            cli: None,
        }
    }

    pub fn with_file(mut self, config: Option<AppConfig>) -> Self {
        self.file = config;
        self
    }

    pub fn with_cli(mut self, overrides: Option<CliOverrides>) -> Self {
        self.cli = overrides;
        self
    }

    /// Merge all layers with priority
    pub fn merge(&self) -> AppConfig {
        let mut result = self.file.clone().unwrap_or_else(|| self.defaults.clone());

        if let Some(ref cli) = self.cli {
            if let Some(ref provider) = cli.provider {
                // A different provider invalidates a model and URL chosen for the old one
                if *provider != result.llm.provider {
                    result.llm.model = None;
                    result.llm.base_url = None;
                }
                result.llm.provider = provider.clone();
            }
            if let Some(ref model) = cli.model {
                result.llm.model = Some(model.clone());
            }
            if let Some(ref dir) = cli.output_dir {
                result.report.output_dir = dir.clone();
            }
            if let Some(dry_run) = cli.dry_run {
                result.execution.dry_run = dry_run;
            }
            if let Some(open) = cli.open_in_browser {
                result.report.open_in_browser = open;
            }
        }

        result
    }
}

impl Default for ConfigMerger {
    fn default() -> Self {
        Self::new()
    }
}

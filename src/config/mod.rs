// Layered configuration system

pub mod loader;
pub mod merger;
pub mod providers;
pub mod secrets;

// Re-export main types
pub use loader::{
    validate_config, AppConfig, ConfigLoader, ExecutionConfig, LlmConfig, ReportConfig,
    StorageConfig,
};
pub use merger::{CliOverrides, ConfigMerger};
pub use providers::{
    get_all_provider_presets, get_provider_preset, ApiKeySource, LlmSettings, ProviderPreset,
};
pub use secrets::SecretsConfig;

use anyhow::{Context, Result};
use std::path::Path;

/// Load and merge configuration from all sources
/// Priority: CLI -> explicit file (or global file) -> Defaults
pub fn load_merged_config(
    explicit_path: Option<&Path>,
    cli_overrides: Option<CliOverrides>,
) -> Result<AppConfig> {
    load_merged_config_with(&ConfigLoader::new(), explicit_path, cli_overrides)
}

pub fn load_merged_config_with(
    loader: &ConfigLoader,
    explicit_path: Option<&Path>,
    cli_overrides: Option<CliOverrides>,
) -> Result<AppConfig> {
    let file = match explicit_path {
        Some(path) => Some(loader.load_explicit(path)?),
        None => loader
            .load_global()
            .context("Failed to load global config")?,
    };

    let config = ConfigMerger::new()
        .with_file(file)
        .with_cli(cli_overrides)
        .merge();

    // CLI overrides can introduce invalid values (e.g. an unknown provider)
    validate_config(&config)?;

    log::debug!("[Config] Effective configuration: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_file_replaces_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let explicit = temp_dir.path().join("explicit.toml");
        fs::write(&global, "[report]\noutput_dir = \"global-charts\"\n").unwrap();
        fs::write(&explicit, "[report]\noutput_dir = \"explicit-charts\"\n").unwrap();

        let loader = ConfigLoader::with_global_path(&global);
        let config = load_merged_config_with(&loader, Some(&explicit), None).unwrap();
        assert_eq!(config.report.output_dir, PathBuf::from("explicit-charts"));

        let config = load_merged_config_with(&loader, None, None).unwrap();
        assert_eq!(config.report.output_dir, PathBuf::from("global-charts"));
    }

    #[test]
    fn test_invalid_cli_provider_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_global_path(temp_dir.path().join("none.toml"));

        let result = load_merged_config_with(
            &loader,
            None,
            Some(CliOverrides {
                provider: Some("carrier-pigeon".to_string()),
                ..Default::default()
            }),
        );
        assert!(result.is_err());
    }
}
